use crate::{
    protocol::{Opcode, CLIENT_VERSION, SERVER_SENT},
    CqlError, CqlResult,
};

pub(crate) const FRAME_HEADER_SIZE: usize = 9;

// Frame flags.
pub(crate) const FLAG_COMPRESSION: u8 = 0x01;
#[allow(dead_code)]
pub(crate) const FLAG_TRACING: u8 = 0x02;
#[allow(dead_code)]
pub(crate) const FLAG_CUSTOM_PAYLOAD: u8 = 0x04;
#[allow(dead_code)]
pub(crate) const FLAG_WARNING: u8 = 0x08;

// The fixed 9-byte frame header:
// version(1) | flags(1) | stream_id(2, signed BE) | opcode(1) | length(4, unsigned BE)
#[derive(Debug)]
pub(crate) struct FrameHeader {
    pub version: u8,
    pub flags: u8,
    pub stream_id: i16,
    pub opcode: Opcode,
    pub length: u32,
}

impl FrameHeader {
    // Parses a server-sent header and verifies the version byte.
    pub(crate) fn parse(bytes: &[u8; FRAME_HEADER_SIZE]) -> CqlResult<Self> {
        let version = bytes[0];
        let expected = SERVER_SENT | CLIENT_VERSION;
        if version != expected {
            return Err(CqlError::VersionMismatch {
                got: version,
                expected,
            });
        }
        let header = FrameHeader {
            version,
            flags: bytes[1],
            stream_id: i16::from_be_bytes([bytes[2], bytes[3]]),
            opcode: Opcode::try_new(bytes[4])?,
            length: u32::from_be_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]),
        };
        trace!(
            "got header with version={:#04x} flags={:#04x} stream_id={} opcode={:?} length={}",
            header.version,
            header.flags,
            header.stream_id,
            header.opcode,
            header.length
        );
        Ok(header)
    }

    pub(crate) fn compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSION != 0
    }

    // Emits a client-sent header in front of `body_length` body bytes.
    pub(crate) fn emit(
        flags: u8,
        stream_id: i16,
        opcode: Opcode,
        body_length: u32,
    ) -> [u8; FRAME_HEADER_SIZE] {
        let stream = stream_id.to_be_bytes();
        let length = body_length.to_be_bytes();
        [
            CLIENT_VERSION,
            flags,
            stream[0],
            stream[1],
            opcode as u8,
            length[0],
            length[1],
            length[2],
            length[3],
        ]
    }
}
