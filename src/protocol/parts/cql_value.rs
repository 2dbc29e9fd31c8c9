use crate::{
    protocol::{
        codec::{self, Body},
        parts::TypeId,
    },
    CqlError, CqlResult,
};
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use std::net::IpAddr;
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

// Days between the julian-day origin and the Unix epoch (1970-01-01).
const UNIX_EPOCH_JULIAN_DAY: i32 = 2_440_588;

// The DATE wire value is an unsigned day count offset by 2^31.
const DATE_EPOCH_OFFSET: i64 = 1 << 31;

// TIME values are nanoseconds since midnight, below 24h.
const NANOS_PER_DAY: i64 = 86_400_000_000_000;

/// Enum for all supported database value types.
#[allow(non_camel_case_types)]
#[derive(Clone, Debug, PartialEq)]
pub enum CqlValue {
    /// Representation of a database NULL value.
    NULL,
    /// Representation of the `not set` bind sentinel: the bound column
    /// keeps its existing value.
    NOT_SET,
    /// Stores an 8-bit signed integer.
    TINYINT(i8),
    /// Stores a 16-bit signed integer.
    SMALLINT(i16),
    /// Stores a 32-bit signed integer.
    INT(i32),
    /// Stores a 64-bit signed integer.
    BIGINT(i64),
    /// Stores a signed integer of arbitrary width.
    VARINT(BigInt),
    /// Representation for fixed-point decimal values.
    DECIMAL(BigDecimal),
    /// Stores a single-precision 32-bit floating-point number.
    FLOAT(f32),
    /// Stores a double-precision 64-bit floating-point number.
    DOUBLE(f64),
    /// BOOLEAN stores boolean values, which are TRUE or FALSE.
    BOOLEAN(bool),
    /// Stores binary data.
    BLOB(Vec<u8>),
    /// The database returns ASCII, VARCHAR and TEXT columns as STRING,
    /// independent of the concrete column type.
    STRING(String),
    /// Stores a universally unique identifier.
    UUID(Uuid),
    /// Stores a version-1, time-based UUID.
    TIMEUUID(Uuid),
    /// Stores an IPv4 or IPv6 address, without a port.
    INET(IpAddr),
    /// DATE with day precision.
    DATE(Date),
    /// TIME with nanosecond precision since midnight.
    TIME(Time),
    /// TIMESTAMP with millisecond precision.
    TIMESTAMP(OffsetDateTime),
}

impl CqlValue {
    /// Returns true if the value is a NULL value.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(*self, CqlValue::NULL)
    }

    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            CqlValue::NULL => "null",
            CqlValue::NOT_SET => "not set",
            CqlValue::TINYINT(_) => "tinyint",
            CqlValue::SMALLINT(_) => "smallint",
            CqlValue::INT(_) => "int",
            CqlValue::BIGINT(_) => "bigint",
            CqlValue::VARINT(_) => "varint",
            CqlValue::DECIMAL(_) => "decimal",
            CqlValue::FLOAT(_) => "float",
            CqlValue::DOUBLE(_) => "double",
            CqlValue::BOOLEAN(_) => "boolean",
            CqlValue::BLOB(_) => "blob",
            CqlValue::STRING(_) => "string",
            CqlValue::UUID(_) => "uuid",
            CqlValue::TIMEUUID(_) => "timeuuid",
            CqlValue::INET(_) => "inet",
            CqlValue::DATE(_) => "date",
            CqlValue::TIME(_) => "time",
            CqlValue::TIMESTAMP(_) => "timestamp",
        }
    }

    // Emits the value as a [value] cell for a column of the given type.
    // A host type that does not match the column spec is a user error.
    pub(crate) fn emit(&self, type_id: TypeId, w: &mut Vec<u8>) -> CqlResult<()> {
        match *self {
            CqlValue::NULL => {
                codec::encode_value(None, w)?;
                return Ok(());
            }
            CqlValue::NOT_SET => {
                codec::encode_value_not_set(w);
                return Ok(());
            }
            _ => {}
        }
        let payload = self.payload_for(type_id)?;
        codec::encode_value(Some(&payload), w)
    }

    // Emits the value as a [value] cell in its natural wire form, used for
    // bind values of unprepared queries, where no column spec dictates a type.
    pub(crate) fn emit_untyped(&self, w: &mut Vec<u8>) -> CqlResult<()> {
        match *self {
            CqlValue::NULL => {
                codec::encode_value(None, w)?;
                Ok(())
            }
            CqlValue::NOT_SET => {
                codec::encode_value_not_set(w);
                Ok(())
            }
            _ => codec::encode_value(Some(&self.natural_payload()?), w),
        }
    }

    fn payload_for(&self, type_id: TypeId) -> CqlResult<Vec<u8>> {
        let matches = matches!(
            (self, type_id),
            (CqlValue::TINYINT(_), TypeId::TINYINT)
                | (CqlValue::SMALLINT(_), TypeId::SMALLINT)
                | (CqlValue::INT(_), TypeId::INT)
                | (CqlValue::BIGINT(_), TypeId::BIGINT)
                | (CqlValue::VARINT(_), TypeId::VARINT)
                | (CqlValue::DECIMAL(_), TypeId::DECIMAL)
                | (CqlValue::FLOAT(_), TypeId::FLOAT)
                | (CqlValue::DOUBLE(_), TypeId::DOUBLE)
                | (CqlValue::BOOLEAN(_), TypeId::BOOLEAN)
                | (CqlValue::BLOB(_), TypeId::BLOB)
                | (CqlValue::STRING(_), TypeId::ASCII | TypeId::VARCHAR)
                | (CqlValue::UUID(_), TypeId::UUID)
                | (CqlValue::TIMEUUID(_), TypeId::TIMEUUID)
                | (CqlValue::INET(_), TypeId::INET)
                | (CqlValue::DATE(_), TypeId::DATE)
                | (CqlValue::TIME(_), TypeId::TIME)
                | (CqlValue::TIMESTAMP(_), TypeId::TIMESTAMP)
        );
        if !matches {
            return Err(CqlError::BadInput(format!(
                "expected type={:?} but got type={} for value={}",
                type_id,
                self.type_name(),
                self
            )));
        }
        self.natural_payload()
    }

    fn natural_payload(&self) -> CqlResult<Vec<u8>> {
        Ok(match self {
            CqlValue::NULL | CqlValue::NOT_SET => {
                return Err(CqlError::Impl("sentinel values have no payload"));
            }
            CqlValue::TINYINT(v) => v.to_be_bytes().to_vec(),
            CqlValue::SMALLINT(v) => v.to_be_bytes().to_vec(),
            CqlValue::INT(v) => v.to_be_bytes().to_vec(),
            CqlValue::BIGINT(v) => v.to_be_bytes().to_vec(),
            CqlValue::VARINT(v) => v.to_signed_bytes_be(),
            CqlValue::DECIMAL(v) => {
                let (unscaled, exponent) = v.as_bigint_and_exponent();
                let mut payload = Vec::new();
                codec::encode_int(exponent as i32, &mut payload);
                codec::encode_varint(&unscaled, &mut payload);
                payload
            }
            CqlValue::FLOAT(v) => v.to_be_bytes().to_vec(),
            CqlValue::DOUBLE(v) => v.to_be_bytes().to_vec(),
            CqlValue::BOOLEAN(v) => vec![u8::from(*v)],
            CqlValue::BLOB(v) => v.clone(),
            CqlValue::STRING(v) => v.as_bytes().to_vec(),
            CqlValue::UUID(v) => v.as_bytes().to_vec(),
            CqlValue::TIMEUUID(v) => {
                if v.get_version_num() != 1 {
                    return Err(CqlError::BadInput(format!(
                        "timeuuid value is not a version-1 UUID, but version={}",
                        v.get_version_num()
                    )));
                }
                v.as_bytes().to_vec()
            }
            CqlValue::INET(v) => match v {
                IpAddr::V4(ip) => ip.octets().to_vec(),
                IpAddr::V6(ip) => ip.octets().to_vec(),
            },
            CqlValue::DATE(v) => {
                let days = i64::from(v.to_julian_day() - UNIX_EPOCH_JULIAN_DAY);
                ((days + DATE_EPOCH_OFFSET) as u32).to_be_bytes().to_vec()
            }
            CqlValue::TIME(v) => {
                let nanos = i64::from(v.hour()) * 3_600_000_000_000
                    + i64::from(v.minute()) * 60_000_000_000
                    + i64::from(v.second()) * 1_000_000_000
                    + i64::from(v.nanosecond());
                nanos.to_be_bytes().to_vec()
            }
            CqlValue::TIMESTAMP(v) => {
                let millis = (v.unix_timestamp_nanos() / 1_000_000) as i64;
                millis.to_be_bytes().to_vec()
            }
        })
    }

    // Decodes a cell payload for a column of the given type; a null cell
    // (negative length) arrives here as None.
    pub(crate) fn parse(type_id: TypeId, cell: Option<Vec<u8>>) -> CqlResult<Self> {
        let Some(bytes) = cell else {
            return Ok(CqlValue::NULL);
        };
        Ok(match type_id {
            TypeId::TINYINT => CqlValue::TINYINT(i8::from_be_bytes(fixed(&bytes, type_id)?)),
            TypeId::SMALLINT => CqlValue::SMALLINT(i16::from_be_bytes(fixed(&bytes, type_id)?)),
            TypeId::INT => CqlValue::INT(i32::from_be_bytes(fixed(&bytes, type_id)?)),
            TypeId::BIGINT => CqlValue::BIGINT(i64::from_be_bytes(fixed(&bytes, type_id)?)),
            TypeId::VARINT => CqlValue::VARINT(BigInt::from_signed_bytes_be(&bytes)),
            TypeId::DECIMAL => {
                let mut rdr = Body::new(&bytes);
                let scale = codec::decode_int(&mut rdr)?;
                let unscaled =
                    BigInt::from_signed_bytes_be(&codec::parse_bytes(
                        codec::remaining(&rdr),
                        &mut rdr,
                    )?);
                CqlValue::DECIMAL(BigDecimal::new(unscaled, i64::from(scale)))
            }
            TypeId::FLOAT => CqlValue::FLOAT(f32::from_be_bytes(fixed(&bytes, type_id)?)),
            TypeId::DOUBLE => CqlValue::DOUBLE(f64::from_be_bytes(fixed(&bytes, type_id)?)),
            TypeId::BOOLEAN => {
                let [byte] = fixed(&bytes, type_id)?;
                CqlValue::BOOLEAN(byte != 0)
            }
            TypeId::BLOB => CqlValue::BLOB(bytes),
            TypeId::ASCII | TypeId::VARCHAR => CqlValue::STRING(
                String::from_utf8(bytes)
                    .map_err(|e| CqlError::ProtocolError(format!("cell is not valid UTF-8: {e}")))?,
            ),
            TypeId::UUID => CqlValue::UUID(Uuid::from_bytes(fixed(&bytes, type_id)?)),
            TypeId::TIMEUUID => CqlValue::TIMEUUID(Uuid::from_bytes(fixed(&bytes, type_id)?)),
            TypeId::INET => match bytes.len() {
                4 => {
                    let octets: [u8; 4] = fixed(&bytes, type_id)?;
                    CqlValue::INET(IpAddr::from(octets))
                }
                16 => {
                    let octets: [u8; 16] = fixed(&bytes, type_id)?;
                    CqlValue::INET(IpAddr::from(octets))
                }
                len => {
                    return Err(CqlError::ProtocolError(format!(
                        "inet cell of {len} bytes, expected 4 or 16"
                    )));
                }
            },
            TypeId::DATE => {
                let wire = u32::from_be_bytes(fixed(&bytes, type_id)?);
                let days = i64::from(wire) - DATE_EPOCH_OFFSET;
                let julian_day = i64::from(UNIX_EPOCH_JULIAN_DAY) + days;
                let julian_day = i32::try_from(julian_day).map_err(|_| {
                    CqlError::ProtocolError(format!("date cell out of range: {wire}"))
                })?;
                CqlValue::DATE(Date::from_julian_day(julian_day).map_err(|_| {
                    CqlError::ProtocolError(format!("date cell out of range: {wire}"))
                })?)
            }
            TypeId::TIME => {
                let nanos = i64::from_be_bytes(fixed(&bytes, type_id)?);
                if !(0..NANOS_PER_DAY).contains(&nanos) {
                    return Err(CqlError::ProtocolError(format!(
                        "time cell out of range: {nanos}"
                    )));
                }
                let hour = (nanos / 3_600_000_000_000) as u8;
                let minute = (nanos / 60_000_000_000 % 60) as u8;
                let second = (nanos / 1_000_000_000 % 60) as u8;
                let nano = (nanos % 1_000_000_000) as u32;
                CqlValue::TIME(
                    Time::from_hms_nano(hour, minute, second, nano).map_err(|_| {
                        CqlError::ProtocolError(format!("time cell out of range: {nanos}"))
                    })?,
                )
            }
            TypeId::TIMESTAMP => {
                let millis = i64::from_be_bytes(fixed(&bytes, type_id)?);
                CqlValue::TIMESTAMP(
                    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
                        .map_err(|_| {
                            CqlError::ProtocolError(format!(
                                "timestamp cell out of range: {millis}"
                            ))
                        })?,
                )
            }
            TypeId::CUSTOM
            | TypeId::COUNTER
            | TypeId::LIST
            | TypeId::MAP
            | TypeId::SET
            | TypeId::UDT
            | TypeId::TUPLE => {
                return Err(CqlError::UnknownPayload(format!(
                    "cannot decode cells of type {type_id:?}"
                )));
            }
        })
    }
}

fn fixed<const N: usize>(bytes: &[u8], type_id: TypeId) -> CqlResult<[u8; N]> {
    bytes.try_into().map_err(|_| {
        CqlError::ProtocolError(format!(
            "cell of {} bytes for type {type_id:?}, expected {N}",
            bytes.len()
        ))
    })
}

impl std::fmt::Display for CqlValue {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CqlValue::NULL => write!(fmt, "NULL"),
            CqlValue::NOT_SET => write!(fmt, "<not set>"),
            CqlValue::TINYINT(v) => write!(fmt, "{v}"),
            CqlValue::SMALLINT(v) => write!(fmt, "{v}"),
            CqlValue::INT(v) => write!(fmt, "{v}"),
            CqlValue::BIGINT(v) => write!(fmt, "{v}"),
            CqlValue::VARINT(v) => write!(fmt, "{v}"),
            CqlValue::DECIMAL(v) => write!(fmt, "{v}"),
            CqlValue::FLOAT(v) => write!(fmt, "{v}"),
            CqlValue::DOUBLE(v) => write!(fmt, "{v}"),
            CqlValue::BOOLEAN(v) => write!(fmt, "{v}"),
            CqlValue::BLOB(v) => write!(fmt, "<blob of {} bytes>", v.len()),
            CqlValue::STRING(v) => write!(fmt, "\"{v}\""),
            CqlValue::UUID(v) | CqlValue::TIMEUUID(v) => write!(fmt, "{v}"),
            CqlValue::INET(v) => write!(fmt, "{v}"),
            CqlValue::DATE(v) => write!(fmt, "{v}"),
            CqlValue::TIME(v) => write!(fmt, "{v}"),
            CqlValue::TIMESTAMP(v) => write!(fmt, "{v}"),
        }
    }
}
