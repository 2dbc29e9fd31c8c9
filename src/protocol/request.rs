//! Since every request is one frame, we model message and frame assembly
//! together, but we differentiate explicitly between request messages and
//! reply messages.

use crate::{
    protocol::{
        codec,
        frame::{self, FrameHeader},
        parts::{EventKind, QueryParameters, StatementId},
        Compression, Opcode, COMPRESS_MINIMUM,
    },
    CqlResult,
};

// A request message: the opcode discriminates the body.
pub(crate) enum Request<'a> {
    Startup {
        options: Vec<(String, String)>,
    },
    Options,
    Query {
        query: &'a str,
        parameters: QueryParameters<'a>,
    },
    Prepare {
        query: &'a str,
    },
    Execute {
        statement_id: &'a StatementId,
        parameters: QueryParameters<'a>,
    },
    Register {
        events: &'a [EventKind],
    },
}

impl Request<'_> {
    pub(crate) fn opcode(&self) -> Opcode {
        match self {
            Self::Startup { .. } => Opcode::Startup,
            Self::Options => Opcode::Options,
            Self::Query { .. } => Opcode::Query,
            Self::Prepare { .. } => Opcode::Prepare,
            Self::Execute { .. } => Opcode::Execute,
            Self::Register { .. } => Opcode::Register,
        }
    }

    // OPTIONS and STARTUP precede the negotiation and are never compressed.
    fn may_compress(&self) -> bool {
        !matches!(self, Self::Startup { .. } | Self::Options)
    }

    fn emit_body(&self, w: &mut Vec<u8>) -> CqlResult<()> {
        match self {
            Self::Startup { options } => codec::encode_string_map(options, w),
            Self::Options => Ok(()),
            Self::Query { query, parameters } => {
                codec::encode_long_string(query, w)?;
                parameters.emit(w)
            }
            Self::Prepare { query } => codec::encode_long_string(query, w),
            Self::Execute {
                statement_id,
                parameters,
            } => {
                codec::encode_short_bytes(statement_id.as_bytes(), w)?;
                parameters.emit(w)
            }
            Self::Register { events } => {
                let names: Vec<String> = events.iter().map(|e| e.name().to_string()).collect();
                codec::encode_strings_list(&names, w)
            }
        }
    }

    // Assembles the full frame: encode the body, compress it when a
    // compression is negotiated and the body is large enough, prepend the
    // 9-byte header.
    pub(crate) fn emit(
        &self,
        stream_id: i16,
        compression: Option<Compression>,
    ) -> CqlResult<Vec<u8>> {
        let mut body = Vec::new();
        self.emit_body(&mut body)?;

        let mut flags = 0x00;
        if let Some(compression) = compression {
            if self.may_compress() && body.len() >= COMPRESS_MINIMUM {
                trace!("compressing the request body of {} bytes", body.len());
                body = compression.compress(&body)?;
                flags |= frame::FLAG_COMPRESSION;
            }
        }

        let header = FrameHeader::emit(flags, stream_id, self.opcode(), body.len() as u32);
        debug!(
            "encoded request opcode={:?} stream_id={} body of {} bytes",
            self.opcode(),
            stream_id,
            body.len()
        );
        let mut frame = Vec::with_capacity(header.len() + body.len());
        frame.extend_from_slice(&header);
        frame.extend_from_slice(&body);
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        protocol::{parts::CqlValue, Consistency},
        statement::QueryValues,
    };

    #[test]
    fn options_frame_is_bare_header() {
        let frame = Request::Options.emit(0, None).unwrap();
        assert_eq!(frame, [0x04, 0x00, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn startup_frame_with_cql_version() {
        let request = Request::Startup {
            options: vec![("CQL_VERSION".to_string(), "3.0.0".to_string())],
        };
        let frame = request.emit(1, None).unwrap();
        let mut expected = vec![0x04, 0x00, 0x00, 0x01, 0x01, 0x00, 0x00, 0x00, 0x16];
        expected.extend_from_slice(&[0x00, 0x01, 0x00, 0x0B]);
        expected.extend_from_slice(b"CQL_VERSION");
        expected.extend_from_slice(&[0x00, 0x05]);
        expected.extend_from_slice(b"3.0.0");
        assert_eq!(frame, expected);
    }

    #[test]
    fn startup_is_never_compressed() {
        let request = Request::Startup {
            options: vec![
                ("CQL_VERSION".to_string(), "3.0.0".to_string()),
                ("COMPRESSION".to_string(), "lz4".to_string()),
            ],
        };
        let frame = request.emit(1, Some(Compression::Lz4)).unwrap();
        assert_eq!(frame[1], 0x00);
    }

    #[test]
    fn query_below_threshold_travels_uncompressed() {
        let parameters = QueryParameters {
            consistency: Consistency::One,
            values: &QueryValues::None,
            skip_metadata: false,
            page_size: None,
            paging_state: None,
            bound_specs: None,
        };
        let request = Request::Query {
            query: "SELECT 1",
            parameters,
        };
        let frame = request.emit(2, Some(Compression::Lz4)).unwrap();
        assert_eq!(frame[1], 0x00);
        // [long string] + consistency + flags
        assert_eq!(frame[8], (4 + 8 + 3) as u8);
    }

    #[test]
    fn large_query_is_compressed_and_flagged() {
        let query = "SELECT user_id, user_name, user_bcity FROM ks.users WHERE user_id IN \
                     (1, 2, 3, 4, 5, 6, 7, 8, 9, 10)";
        let parameters = QueryParameters {
            consistency: Consistency::One,
            values: &QueryValues::None,
            skip_metadata: false,
            page_size: None,
            paging_state: None,
            bound_specs: None,
        };
        let request = Request::Query { query, parameters };
        let frame = request.emit(2, Some(Compression::Lz4)).unwrap();
        assert_eq!(frame[1], frame::FLAG_COMPRESSION);

        let body_length =
            u32::from_be_bytes([frame[5], frame[6], frame[7], frame[8]]) as usize;
        assert_eq!(frame.len(), 9 + body_length);
        let restored = Compression::Lz4.decompress(&frame[9..]).unwrap();
        let uncompressed = request.emit(2, None).unwrap();
        assert_eq!(restored, uncompressed[9..]);
    }

    #[test]
    fn execute_frame_carries_short_bytes_id() {
        let statement_id = StatementId::from(vec![0xAB, 0xCD]);
        let values = QueryValues::Positional(vec![CqlValue::INT(1)]);
        let parameters = QueryParameters {
            consistency: Consistency::One,
            values: &values,
            skip_metadata: true,
            page_size: None,
            paging_state: None,
            bound_specs: None,
        };
        let request = Request::Execute {
            statement_id: &statement_id,
            parameters,
        };
        let frame = request.emit(3, None).unwrap();
        assert_eq!(frame[4], 0x0A);
        assert_eq!(&frame[9..13], &[0x00, 0x02, 0xAB, 0xCD]);
    }

    #[test]
    fn register_frame_lists_event_names() {
        let request = Request::Register {
            events: &[EventKind::SchemaChange, EventKind::StatusChange],
        };
        let frame = request.emit(4, None).unwrap();
        assert_eq!(frame[4], 0x0B);
        let mut expected = vec![0x00, 0x02, 0x00, 0x0D];
        expected.extend_from_slice(b"SCHEMA_CHANGE");
        expected.extend_from_slice(&[0x00, 0x0D]);
        expected.extend_from_slice(b"STATUS_CHANGE");
        assert_eq!(&frame[9..], &expected);
    }
}
