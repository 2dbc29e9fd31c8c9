use crate::{
    protocol::{EVENT_STREAM_ID, MAX_STREAMS},
    CqlError, CqlResult,
};
use std::collections::HashMap;

// Allocator for the stream ids of in-flight requests.
//
// Allocation advances a cursor modulo 2^15 and scans forward over the
// currently live ids, so an id is never reused while its slot is live.
// The reserved event stream id (-1) is never issued.
#[derive(Debug)]
pub(crate) struct Streams<T> {
    last_stream_id: Option<i16>,
    streams: HashMap<i16, T>,
}

impl<T> Default for Streams<T> {
    fn default() -> Self {
        Self {
            last_stream_id: None,
            streams: HashMap::new(),
        }
    }
}

impl<T> Streams<T> {
    // Allocates the next free id and attaches the slot to it.
    pub(crate) fn allocate(&mut self, slot: T) -> CqlResult<i16> {
        if self.streams.len() >= MAX_STREAMS {
            return Err(CqlError::TooManyStreams);
        }
        let mut next_id = match self.last_stream_id {
            None => 0,
            Some(last_id) => wrapping_next(last_id),
        };
        while self.streams.contains_key(&next_id) {
            next_id = wrapping_next(next_id);
        }
        debug_assert_ne!(next_id, EVENT_STREAM_ID);
        self.streams.insert(next_id, slot);
        self.last_stream_id = Some(next_id);
        Ok(next_id)
    }

    // Detaches and returns the slot of a live id. Removal happens before the
    // slot's completion signal fires, so a retrieve cannot race with a fresh
    // allocation reusing the id.
    pub(crate) fn remove(&mut self, stream_id: i16) -> CqlResult<T> {
        self.streams.remove(&stream_id).ok_or_else(|| {
            CqlError::ProtocolError(format!("stream_id={stream_id} is not open"))
        })
    }

    // Snapshot of the live ids.
    pub(crate) fn ids(&self) -> Vec<i16> {
        self.streams.keys().copied().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.streams.len()
    }

    // Empties the registry, handing out every live slot.
    pub(crate) fn drain(&mut self) -> Vec<(i16, T)> {
        self.streams.drain().collect()
    }
}

fn wrapping_next(stream_id: i16) -> i16 {
    if stream_id as usize >= MAX_STREAMS - 1 {
        0
    } else {
        stream_id + 1
    }
}
