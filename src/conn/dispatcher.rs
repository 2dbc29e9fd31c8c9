use crate::{
    conn::{
        streams::Streams,
        tcp_client::{TcpReader, TcpWriter},
    },
    protocol::{
        parts::{ChangeEvent, ResultSetMetadata},
        Compression, FrameHeader, Opcode, Reply, Request, EVENT_STREAM_ID, FRAME_HEADER_SIZE,
    },
    CqlError, CqlResult,
};
use debug_ignore::DebugIgnore;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};

// An in-flight request: the response decoder context and the completion
// signal the caller awaits.
#[derive(Debug)]
pub(crate) struct PendingSlot {
    request_opcode: Opcode,
    // column specs to inject when the response skipped its result metadata
    rsmd: Option<Arc<ResultSetMetadata>>,
    reply_tx: oneshot::Sender<CqlResult<Reply>>,
}

// Owns the write half of the connection and the registry of in-flight
// requests; demultiplexes incoming frames by stream id.
//
// The read half is driven by a dedicated task calling `cycle()` in a loop;
// see `run_read_loop`.
#[derive(Debug)]
pub(crate) struct Dispatcher {
    writer: tokio::sync::Mutex<DebugIgnore<TcpWriter>>,
    streams: Mutex<Streams<PendingSlot>>,
    decompression: Mutex<Option<Compression>>,
    events_tx: Mutex<Option<mpsc::Sender<ChangeEvent>>>,
}

impl Dispatcher {
    pub(crate) fn new(writer: TcpWriter) -> Self {
        Self {
            writer: tokio::sync::Mutex::new(DebugIgnore(writer)),
            streams: Mutex::new(Streams::default()),
            decompression: Mutex::new(None),
            events_tx: Mutex::new(None),
        }
    }

    // Fixed for the lifetime of the connection once negotiation chose an
    // algorithm; replies may be compressed from the STARTUP response on.
    pub(crate) fn set_decompression(&self, compression: Compression) -> CqlResult<()> {
        *self.decompression.lock()? = Some(compression);
        Ok(())
    }

    pub(crate) fn set_events_sender(&self, sender: mpsc::Sender<ChangeEvent>) -> CqlResult<()> {
        *self.events_tx.lock()? = Some(sender);
        Ok(())
    }

    pub(crate) fn clear_events_sender(&self) -> CqlResult<()> {
        *self.events_tx.lock()? = None;
        Ok(())
    }

    pub(crate) fn has_events_sender(&self) -> CqlResult<bool> {
        Ok(self.events_tx.lock()?.is_some())
    }

    pub(crate) fn live_streams(&self) -> CqlResult<usize> {
        Ok(self.streams.lock()?.len())
    }

    // Allocates a stream id, registers the slot, assembles the frame and
    // writes it out. Returns the completion handle the caller awaits.
    //
    // Writes are serialized FIFO on the writer lock, so the server observes
    // a well-defined request order.
    pub(crate) async fn send(
        &self,
        request: &Request<'_>,
        rsmd: Option<Arc<ResultSetMetadata>>,
        compression: Option<Compression>,
    ) -> CqlResult<oneshot::Receiver<CqlResult<Reply>>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let slot = PendingSlot {
            request_opcode: request.opcode(),
            rsmd,
            reply_tx,
        };
        let stream_id = self.streams.lock()?.allocate(slot)?;

        let frame = match request.emit(stream_id, compression) {
            Ok(frame) => frame,
            Err(e) => {
                self.streams.lock()?.remove(stream_id)?;
                return Err(e);
            }
        };

        trace!(
            "sending request {:?} on stream {stream_id} ({} bytes)",
            request.opcode(),
            frame.len()
        );
        let write_result = {
            let mut writer = self.writer.lock().await;
            match writer.write_all(&frame).await {
                Ok(()) => writer.flush().await,
                Err(e) => Err(e),
            }
        };
        if let Err(e) = write_result {
            self.streams.lock()?.remove(stream_id)?;
            return Err(e.into());
        }
        Ok(reply_rx)
    }

    // One iteration of the read loop: read one frame, decompress if flagged,
    // route it to its slot or to the event queue.
    //
    // Returns Ok(false) on a clean EOF between frames. Errors raised by the
    // response decoder are stored against the slot's handle rather than
    // propagated, so one bad frame cannot poison the loop.
    pub(crate) async fn cycle(&self, rdr: &mut TcpReader) -> CqlResult<bool> {
        let mut head = [0_u8; FRAME_HEADER_SIZE];
        let mut filled = 0;
        while filled < FRAME_HEADER_SIZE {
            let n = rdr.read(&mut head[filled..]).await?;
            if n == 0 {
                if filled == 0 {
                    return Ok(false);
                }
                return Err(CqlError::ConnectionDropped);
            }
            filled += n;
        }
        let header = FrameHeader::parse(&head)?;

        let mut body = vec![0_u8; header.length as usize];
        rdr.read_exact(&mut body).await?;

        if header.compressed() {
            let decompression = (*self.decompression.lock()?).ok_or_else(|| {
                CqlError::ProtocolError(
                    "server sent a compressed frame, but no compression was negotiated"
                        .to_string(),
                )
            })?;
            body = decompression.decompress(&body)?;
        }

        if header.stream_id == EVENT_STREAM_ID {
            self.handle_event(header.opcode, &body)?;
            return Ok(true);
        }

        let slot = self.streams.lock()?.remove(header.stream_id)?;
        let outcome = Reply::parse(header.opcode, &body, slot.rsmd.as_ref());
        if slot.reply_tx.send(outcome).is_err() {
            // the caller was cancelled or timed out; the decoded response
            // has no observer and is dropped
            trace!(
                "dropping response for request {:?} on stream {}",
                slot.request_opcode,
                header.stream_id
            );
        }
        Ok(true)
    }

    // Frames on the reserved event stream go to the subscriber queue; the
    // queue is bounded and drops events when full.
    fn handle_event(&self, opcode: Opcode, body: &[u8]) -> CqlResult<()> {
        match Reply::parse(opcode, body, None) {
            Ok(Reply::Event(event)) => match &*self.events_tx.lock()? {
                Some(sender) => {
                    if let Err(e) = sender.try_send(event) {
                        warn!("events queue is full, dropping event: {e}");
                    }
                }
                None => {
                    trace!("no event subscriber, dropping event");
                }
            },
            Ok(reply) => {
                warn!("non-event frame on the event stream: {reply:?}");
            }
            Err(e) => {
                warn!("undecodable event frame: {e}");
            }
        }
        Ok(())
    }

    // Used on connection teardown: completes every live slot with an error
    // produced by the given factory and clears the registry.
    pub(crate) fn end_all(&self, make_error: &dyn Fn() -> CqlError) {
        if let Ok(mut streams) = self.streams.lock() {
            trace!("end_all(): live streams: {:?}", streams.ids());
            let drained = streams.drain();
            debug!("end_all(): ending {} pending calls", drained.len());
            for (stream_id, slot) in drained {
                trace!(
                    "ending request {:?} on stream {stream_id}",
                    slot.request_opcode
                );
                let _ = slot.reply_tx.send(Err(make_error()));
            }
        }
    }

    // Closes the write direction; the server answers with EOF, which ends
    // the read loop.
    pub(crate) async fn shutdown_writer(&self) {
        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.shutdown().await {
            trace!("shutdown of the writer failed: {e}");
        }
    }
}

// The read loop, running as a dedicated task. It terminates on clean EOF or
// on cancellation; on any unexpected read error it drains all live slots
// with ConnectionDropped, then exits.
pub(crate) async fn run_read_loop(dispatcher: Arc<Dispatcher>, mut rdr: TcpReader) {
    loop {
        match dispatcher.cycle(&mut rdr).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("server closed the connection");
                dispatcher.end_all(&|| CqlError::ConnectionDropped);
                return;
            }
            Err(e) => {
                warn!(
                    "read loop ends after error: {}",
                    e.display_with_inner()
                );
                dispatcher.end_all(&|| CqlError::ConnectionDropped);
                return;
            }
        }
    }
}
