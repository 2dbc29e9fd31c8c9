use crate::{CqlError, CqlResult};

/// A body compression algorithm, as negotiated during startup.
///
/// Compression applies to all request and reply bodies after negotiation,
/// except OPTIONS and STARTUP, which precede it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Compression {
    /// The lz4 block codec, with the uncompressed length prepended
    /// as a big-endian 32-bit integer.
    Lz4,
    /// Raw snappy, without framing.
    Snappy,
}

impl Compression {
    /// The name under which the algorithm is announced in SUPPORTED.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Lz4 => "lz4",
            Self::Snappy => "snappy",
        }
    }

    pub(crate) fn parse(name: &str) -> Option<Self> {
        match name {
            "lz4" => Some(Self::Lz4),
            "snappy" => Some(Self::Snappy),
            _ => None,
        }
    }

    // Picks an algorithm from the server's SUPPORTED list, honoring the
    // configured preference when the server offers it.
    pub(crate) fn choose(supported: &[String], preferred: Self) -> Option<Self> {
        let matches: Vec<Self> = supported.iter().filter_map(|s| Self::parse(s)).collect();
        if matches.contains(&preferred) {
            Some(preferred)
        } else {
            matches.first().copied()
        }
    }

    /// Compresses a frame body.
    pub fn compress(self, body: &[u8]) -> CqlResult<Vec<u8>> {
        match self {
            Self::Lz4 => {
                let mut out = Vec::with_capacity(body.len() / 2 + 4);
                out.extend_from_slice(&(body.len() as u32).to_be_bytes());
                out.extend_from_slice(&lz4_flex::block::compress(body));
                Ok(out)
            }
            Self::Snappy => Ok(snap::raw::Encoder::new().compress_vec(body)?),
        }
    }

    /// Decompresses a frame body.
    pub fn decompress(self, body: &[u8]) -> CqlResult<Vec<u8>> {
        match self {
            Self::Lz4 => {
                if body.len() < 4 {
                    return Err(CqlError::ProtocolError(format!(
                        "lz4 body of {} bytes lacks the uncompressed-length prefix",
                        body.len()
                    )));
                }
                let uncompressed_len =
                    u32::from_be_bytes([body[0], body[1], body[2], body[3]]) as usize;
                Ok(lz4_flex::block::decompress(&body[4..], uncompressed_len)?)
            }
            Self::Snappy => Ok(snap::raw::Decoder::new().decompress_vec(body)?),
        }
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
