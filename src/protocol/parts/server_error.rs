use crate::{
    protocol::{codec, codec::Body, Consistency},
    CqlError, CqlResult,
};
use std::error::Error;

/// The error code of an ERROR frame.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorCode {
    /// Something unexpected happened server-side.
    SERVER_ERROR,
    /// A client message triggered a protocol violation.
    PROTOCOL_ERROR,
    /// Authentication was required and failed.
    AUTHENTICATION_ERROR,
    /// Not enough replicas were alive to achieve the requested consistency.
    UNAVAILABLE,
    /// The coordinator shed load.
    OVERLOADED,
    /// The coordinator was bootstrapping.
    IS_BOOTSTRAPPING,
    /// A truncation failed.
    TRUNCATE_ERROR,
    /// A write did not acknowledge within the server timeout.
    WRITE_TIMEOUT,
    /// A read did not respond within the server timeout.
    READ_TIMEOUT,
    /// A replica reported a failure while reading.
    READ_FAILURE,
    /// A user defined function failed during execution.
    FUNCTION_FAILURE,
    /// A replica reported a failure while writing.
    WRITE_FAILURE,
    /// The query string was syntactically wrong.
    SYNTAX_ERROR,
    /// The logged user lacks the needed permissions.
    UNAUTHORIZED,
    /// The query was syntactically correct but invalid.
    INVALID,
    /// The query is invalid under the current configuration.
    CONFIG_ERROR,
    /// The created keyspace or table already exists.
    ALREADY_EXISTS,
    /// The statement id of an EXECUTE is unknown to the coordinator.
    UNPREPARED,

    /// The server sent an error code this driver does not know.
    __UNKNOWN__(i32),
}

impl ErrorCode {
    pub(crate) fn from_i32(code: i32) -> Self {
        match code {
            0x0000 => Self::SERVER_ERROR,
            0x000A => Self::PROTOCOL_ERROR,
            0x0100 => Self::AUTHENTICATION_ERROR,
            0x1000 => Self::UNAVAILABLE,
            0x1001 => Self::OVERLOADED,
            0x1002 => Self::IS_BOOTSTRAPPING,
            0x1003 => Self::TRUNCATE_ERROR,
            0x1100 => Self::WRITE_TIMEOUT,
            0x1200 => Self::READ_TIMEOUT,
            0x1300 => Self::READ_FAILURE,
            0x1400 => Self::FUNCTION_FAILURE,
            0x1500 => Self::WRITE_FAILURE,
            0x2000 => Self::SYNTAX_ERROR,
            0x2100 => Self::UNAUTHORIZED,
            0x2200 => Self::INVALID,
            0x2300 => Self::CONFIG_ERROR,
            0x2400 => Self::ALREADY_EXISTS,
            0x2500 => Self::UNPREPARED,
            code => Self::__UNKNOWN__(code),
        }
    }

    /// Returns the number encoding of the error code.
    #[must_use]
    pub fn to_i32(self) -> i32 {
        match self {
            Self::SERVER_ERROR => 0x0000,
            Self::PROTOCOL_ERROR => 0x000A,
            Self::AUTHENTICATION_ERROR => 0x0100,
            Self::UNAVAILABLE => 0x1000,
            Self::OVERLOADED => 0x1001,
            Self::IS_BOOTSTRAPPING => 0x1002,
            Self::TRUNCATE_ERROR => 0x1003,
            Self::WRITE_TIMEOUT => 0x1100,
            Self::READ_TIMEOUT => 0x1200,
            Self::READ_FAILURE => 0x1300,
            Self::FUNCTION_FAILURE => 0x1400,
            Self::WRITE_FAILURE => 0x1500,
            Self::SYNTAX_ERROR => 0x2000,
            Self::UNAUTHORIZED => 0x2100,
            Self::INVALID => 0x2200,
            Self::CONFIG_ERROR => 0x2300,
            Self::ALREADY_EXISTS => 0x2400,
            Self::UNPREPARED => 0x2500,
            Self::__UNKNOWN__(code) => code,
        }
    }
}

/// The kind of write that timed out or failed.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum WriteType {
    SIMPLE,
    BATCH,
    UNLOGGED_BATCH,
    COUNTER,
    BATCH_LOG,
    CAS,
    VIEW,
    CDC,
}

impl WriteType {
    fn parse(s: &str) -> CqlResult<Self> {
        Ok(match s {
            "SIMPLE" => Self::SIMPLE,
            "BATCH" => Self::BATCH,
            "UNLOGGED_BATCH" => Self::UNLOGGED_BATCH,
            "COUNTER" => Self::COUNTER,
            "BATCH_LOG" => Self::BATCH_LOG,
            "CAS" => Self::CAS,
            "VIEW" => Self::VIEW,
            "CDC" => Self::CDC,
            _ => {
                return Err(CqlError::UnknownPayload(format!("unknown write type {s}")));
            }
        })
    }
}

/// The structured details an ERROR frame carries after code and message;
/// their shape depends on the error code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorDetails {
    /// The error code carries no additional details.
    None,
    /// Details of an UNAVAILABLE error.
    Unavailable {
        /// The consistency level of the failed request.
        consistency: Consistency,
        /// How many replicas the consistency level requires.
        required: i32,
        /// How many replicas were alive.
        alive: i32,
    },
    /// Details of a WRITE_TIMEOUT error.
    WriteTimeout {
        /// The consistency level of the failed request.
        consistency: Consistency,
        /// How many replicas acknowledged.
        received: i32,
        /// How many acknowledgements the consistency level requires.
        block_for: i32,
        /// The kind of write that timed out.
        write_type: WriteType,
    },
    /// Details of a READ_TIMEOUT error.
    ReadTimeout {
        /// The consistency level of the failed request.
        consistency: Consistency,
        /// How many replicas responded.
        received: i32,
        /// How many responses the consistency level requires.
        block_for: i32,
        /// Whether the replica asked for data responded.
        data_present: bool,
    },
    /// Details of a READ_FAILURE error.
    ReadFailure {
        /// The consistency level of the failed request.
        consistency: Consistency,
        /// How many replicas responded.
        received: i32,
        /// How many responses the consistency level requires.
        block_for: i32,
        /// How many replicas reported a failure.
        num_failures: i32,
        /// Whether the replica asked for data responded.
        data_present: bool,
    },
    /// Details of a FUNCTION_FAILURE error.
    FunctionFailure {
        /// The keyspace of the failed function.
        keyspace: String,
        /// The name of the failed function.
        function: String,
        /// The argument types of the failed function.
        arg_types: Vec<String>,
    },
    /// Details of a WRITE_FAILURE error.
    WriteFailure {
        /// The consistency level of the failed request.
        consistency: Consistency,
        /// How many replicas acknowledged.
        received: i32,
        /// How many acknowledgements the consistency level requires.
        block_for: i32,
        /// How many replicas reported a failure.
        num_failures: i32,
        /// The kind of write that failed.
        write_type: WriteType,
    },
    /// Details of an ALREADY_EXISTS error.
    AlreadyExists {
        /// The keyspace of the existing object.
        keyspace: String,
        /// The table name, empty when a keyspace already existed.
        table: String,
    },
    /// Details of an UNPREPARED error.
    Unprepared {
        /// The unknown statement id.
        statement_id: Vec<u8>,
    },
}

/// Describes an error that is reported by the server in an ERROR frame.
///
/// Code, message and details are preserved verbatim.
#[derive(Clone, PartialEq)]
pub struct ServerError {
    code: ErrorCode,
    message: String,
    details: ErrorDetails,
}

impl ServerError {
    /// Returns the error code.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }
    /// Returns the description of the error.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
    /// Returns the structured details of the error.
    #[must_use]
    pub fn details(&self) -> &ErrorDetails {
        &self.details
    }

    pub(crate) fn parse(rdr: &mut Body) -> CqlResult<Self> {
        let code = ErrorCode::from_i32(codec::decode_int(rdr)?);
        let message = codec::decode_string(rdr)?;
        let details = match code {
            ErrorCode::UNAVAILABLE => ErrorDetails::Unavailable {
                consistency: codec::decode_consistency(rdr)?,
                required: codec::decode_int(rdr)?,
                alive: codec::decode_int(rdr)?,
            },
            ErrorCode::WRITE_TIMEOUT => ErrorDetails::WriteTimeout {
                consistency: codec::decode_consistency(rdr)?,
                received: codec::decode_int(rdr)?,
                block_for: codec::decode_int(rdr)?,
                write_type: WriteType::parse(&codec::decode_string(rdr)?)?,
            },
            ErrorCode::READ_TIMEOUT => ErrorDetails::ReadTimeout {
                consistency: codec::decode_consistency(rdr)?,
                received: codec::decode_int(rdr)?,
                block_for: codec::decode_int(rdr)?,
                data_present: codec::decode_byte(rdr)? != 0,
            },
            ErrorCode::READ_FAILURE => ErrorDetails::ReadFailure {
                consistency: codec::decode_consistency(rdr)?,
                received: codec::decode_int(rdr)?,
                block_for: codec::decode_int(rdr)?,
                num_failures: codec::decode_int(rdr)?,
                data_present: codec::decode_byte(rdr)? != 0,
            },
            ErrorCode::FUNCTION_FAILURE => ErrorDetails::FunctionFailure {
                keyspace: codec::decode_string(rdr)?,
                function: codec::decode_string(rdr)?,
                arg_types: codec::decode_strings_list(rdr)?,
            },
            ErrorCode::WRITE_FAILURE => ErrorDetails::WriteFailure {
                consistency: codec::decode_consistency(rdr)?,
                received: codec::decode_int(rdr)?,
                block_for: codec::decode_int(rdr)?,
                num_failures: codec::decode_int(rdr)?,
                write_type: WriteType::parse(&codec::decode_string(rdr)?)?,
            },
            ErrorCode::ALREADY_EXISTS => ErrorDetails::AlreadyExists {
                keyspace: codec::decode_string(rdr)?,
                table: codec::decode_string(rdr)?,
            },
            ErrorCode::UNPREPARED => ErrorDetails::Unprepared {
                statement_id: codec::decode_short_bytes(rdr)?,
            },
            _ => ErrorDetails::None,
        };
        let server_error = Self {
            code,
            message,
            details,
        };
        debug!("ServerError::parse(): found server error {server_error}");
        Ok(server_error)
    }
}

impl Error for ServerError {}

impl std::fmt::Display for ServerError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            fmt,
            r#"{:?}[code: {:#06x}]: "{}""#,
            self.code,
            self.code.to_i32(),
            self.message
        )
    }
}

impl std::fmt::Debug for ServerError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{self} details: {:?}", self.details)
    }
}
