use crate::protocol::parts::ServerError;
use thiserror::Error;

/// A list specifying categories of [`CqlError`](crate::CqlError).
///
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CqlError {
    /// Database server responded with an ERROR frame;
    /// the contained `ServerError` describes the concrete reason.
    #[error("Database server responded with an error")]
    Server {
        /// The causing Error.
        #[from]
        source: ServerError,
    },

    /// The server demanded authentication, which this driver does not speak.
    #[error("Server requires authentication with {authenticator:?}, which is not supported")]
    Authentication {
        /// The authenticator class announced by the server.
        authenticator: String,
    },

    /// Negotiation did not complete within the configured startup timeout.
    #[error("Connection setup did not complete within the startup timeout")]
    StartupTimeout,

    /// A call did not complete within the configured request timeout.
    #[error("Request did not complete within the request timeout")]
    RequestTimeout,

    /// The connection was lost while requests were in flight.
    #[error("Connection to the server was dropped")]
    ConnectionDropped,

    /// The connection was closed locally; every pending call ends with this error.
    #[error("Connection was closed")]
    ConnectionClosed,

    /// The server answered with an unexpected protocol version byte.
    #[error("Version mismatch: got {got:#04x}, expected {expected:#04x}")]
    VersionMismatch {
        /// The version byte found in the frame header.
        got: u8,
        /// The version byte this driver requires.
        expected: u8,
    },

    /// All 2^15 stream ids are occupied by in-flight requests.
    #[error("Too many streams: all stream ids are in use")]
    TooManyStreams,

    /// Error caused by wrong input, e.g. a bound value whose type does not
    /// match the prepared column spec.
    #[error("Bad input: {}", _0)]
    BadInput(String),

    /// Error caused by an invalid enumeration value.
    #[error("Type violation: {}", _0)]
    TypeViolation(String),

    /// The peer violated the framing contracts of the wire protocol.
    #[error("Protocol error: {}", _0)]
    ProtocolError(String),

    /// A well-formed frame carried a payload this driver cannot interpret.
    #[error("Unknown payload: {}", _0)]
    UnknownPayload(String),

    /// Implementation error.
    #[error("Implementation error: {}", _0)]
    Impl(&'static str),

    /// Implementation error.
    #[error("Implementation error: {}", _0)]
    ImplDetailed(String),

    /// Error occured in thread synchronization.
    #[error("Error occured in thread synchronization")]
    Poison,

    /// Error occured in communication with the database.
    #[error(transparent)]
    Io {
        /// The causing Error.
        #[from]
        source: std::io::Error,
    },

    /// lz4 decompression failed.
    #[error("Decompression failed")]
    Decompression {
        /// The causing Error.
        #[from]
        source: lz4_flex::block::DecompressError,
    },

    /// snappy decompression failed.
    #[error("Decompression failed")]
    SnapDecompression {
        /// The causing Error.
        #[from]
        source: snap::Error,
    },

    /// TLS set up failed because the server name was not valid.
    #[error("TLS setup failed because the server name was not valid")]
    TlsInvalidDnsName {
        /// The causing Error.
        #[from]
        source: rustls::client::InvalidDnsNameError,
    },

    /// TLS protocol error.
    #[error(
        "TLS set up failed, after setting up the TCP connection; is the database prepared for TLS?"
    )]
    TlsProtocol {
        /// The causing Error.
        #[from]
        source: rustls::Error,
    },
}

/// Abbreviation of `Result<T, CqlError>`.
pub type CqlResult<T> = std::result::Result<T, CqlError>;

impl CqlError {
    /// Returns the contained `ServerError`, if any.
    ///
    /// This method helps in case you need programmatic access to e.g. the error code
    /// or the structured details the server attached to the error.
    #[must_use]
    pub fn server_error(&self) -> Option<&ServerError> {
        match self {
            Self::Server {
                source: server_error,
            } => Some(server_error),
            _ => None,
        }
    }

    /// Reveal the inner error.
    #[must_use]
    pub fn inner(&self) -> Option<&dyn std::error::Error> {
        match self {
            Self::Server { source } => Some(source),
            Self::Io { source } => Some(source),
            Self::Decompression { source } => Some(source),
            Self::SnapDecompression { source } => Some(source),
            Self::TlsInvalidDnsName { source } => Some(source),
            Self::TlsProtocol { source } => Some(source),
            _ => None,
        }
    }

    /// Returns a decently formed and hopefully helpful error description.
    #[must_use]
    pub fn display_with_inner(&self) -> String {
        if let Some(e) = self.inner() {
            format!("{}, caused by {:?}", &self, e)
        } else {
            format!("{}", &self)
        }
    }
}

impl<G> From<std::sync::PoisonError<G>> for CqlError {
    fn from(_error: std::sync::PoisonError<G>) -> Self {
        Self::Poison
    }
}
