// The wire protocol: frame header, primitive codec, request emission and
// reply parsing for the CQL binary protocol, version 4.

pub(crate) mod codec;
mod compression;
mod consistency;
mod frame;
mod opcode;
pub mod parts;
mod reply;
mod request;

pub(crate) use self::{
    frame::{FrameHeader, FRAME_HEADER_SIZE},
    opcode::Opcode,
    reply::{Reply, ResultBody},
    request::Request,
};

pub use self::{compression::Compression, consistency::Consistency};

/// The protocol version spoken by this driver.
pub(crate) const CLIENT_VERSION: u8 = 0x04;

// The high bit of the version byte marks server-sent frames.
pub(crate) const SERVER_SENT: u8 = 0x80;

// All EVENT frames arrive on this reserved stream id; it is never allocated.
pub(crate) const EVENT_STREAM_ID: i16 = -1;

// Request and reply bodies shorter than this travel uncompressed even when
// compression is negotiated.
pub(crate) const COMPRESS_MINIMUM: usize = 60;

// The CQL version announced in STARTUP.
pub(crate) const CQL_VERSION: &str = "3.0.0";

// Stream ids are 15 bit wide, 0..=32767.
pub(crate) const MAX_STREAMS: usize = 1 << 15;
