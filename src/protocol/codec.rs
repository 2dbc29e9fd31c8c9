// Primitive encoders and decoders for the typed fields of the protocol:
// [short], [int], [string], [long string], [bytes], [value], [string list],
// [string map], [string multimap], [inet], [consistency].
//
// All integers are big-endian. Decoders consume from a cursor over the
// buffered frame body; reading past its end is a framing violation of the
// peer and reported as ProtocolError.

use crate::{protocol::Consistency, CqlError, CqlResult};
use byteorder::{BigEndian, ReadBytesExt};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

pub(crate) type Body<'a> = std::io::Cursor<&'a [u8]>;

// Sentinel lengths of the [value] notation.
pub(crate) const VALUE_NULL: i32 = -1;
pub(crate) const VALUE_NOT_SET: i32 = -2;

pub(crate) fn remaining(rdr: &Body) -> usize {
    let len = rdr.get_ref().len() as u64;
    len.saturating_sub(rdr.position()) as usize
}

fn ensure_remaining(count: usize, rdr: &Body) -> CqlResult<()> {
    if remaining(rdr) < count {
        return Err(CqlError::ProtocolError(format!(
            "cannot read {count} bytes at offset {pos} of a {len}-byte body",
            pos = rdr.position(),
            len = rdr.get_ref().len()
        )));
    }
    Ok(())
}

// --- encoders --- //

pub(crate) fn encode_byte(value: u8, w: &mut Vec<u8>) {
    w.push(value);
}

pub(crate) fn encode_short(value: u16, w: &mut Vec<u8>) {
    w.extend_from_slice(&value.to_be_bytes());
}

pub(crate) fn encode_int(value: i32, w: &mut Vec<u8>) {
    w.extend_from_slice(&value.to_be_bytes());
}

pub(crate) fn encode_string(value: &str, w: &mut Vec<u8>) -> CqlResult<()> {
    let bytes = value.as_bytes();
    if bytes.len() > u16::MAX as usize {
        return Err(CqlError::BadInput(format!(
            "string of {} bytes does not fit the [string] notation",
            bytes.len()
        )));
    }
    encode_short(bytes.len() as u16, w);
    w.extend_from_slice(bytes);
    Ok(())
}

pub(crate) fn encode_long_string(value: &str, w: &mut Vec<u8>) -> CqlResult<()> {
    let bytes = value.as_bytes();
    if bytes.len() > i32::MAX as usize {
        return Err(CqlError::BadInput(format!(
            "string of {} bytes does not fit the [long string] notation",
            bytes.len()
        )));
    }
    encode_int(bytes.len() as i32, w);
    w.extend_from_slice(bytes);
    Ok(())
}

pub(crate) fn encode_short_bytes(value: &[u8], w: &mut Vec<u8>) -> CqlResult<()> {
    if value.len() > u16::MAX as usize {
        return Err(CqlError::BadInput(format!(
            "{} bytes do not fit the [short bytes] notation",
            value.len()
        )));
    }
    encode_short(value.len() as u16, w);
    w.extend_from_slice(value);
    Ok(())
}

pub(crate) fn encode_bytes(value: &[u8], w: &mut Vec<u8>) -> CqlResult<()> {
    if value.len() > i32::MAX as usize {
        return Err(CqlError::BadInput(format!(
            "{} bytes do not fit the [bytes] notation",
            value.len()
        )));
    }
    encode_int(value.len() as i32, w);
    w.extend_from_slice(value);
    Ok(())
}

// [value]: like [bytes], but with the two negative sentinel lengths.
pub(crate) fn encode_value(value: Option<&[u8]>, w: &mut Vec<u8>) -> CqlResult<()> {
    match value {
        None => {
            encode_int(VALUE_NULL, w);
            Ok(())
        }
        Some(bytes) => encode_bytes(bytes, w),
    }
}

pub(crate) fn encode_value_not_set(w: &mut Vec<u8>) {
    encode_int(VALUE_NOT_SET, w);
}

pub(crate) fn encode_strings_list(values: &[String], w: &mut Vec<u8>) -> CqlResult<()> {
    encode_short(values.len() as u16, w);
    for value in values {
        encode_string(value, w)?;
    }
    Ok(())
}

// [string map]; emitted in the iteration order of the pairs, so that callers
// control the wire layout.
pub(crate) fn encode_string_map(pairs: &[(String, String)], w: &mut Vec<u8>) -> CqlResult<()> {
    encode_short(pairs.len() as u16, w);
    for (key, value) in pairs {
        encode_string(key, w)?;
        encode_string(value, w)?;
    }
    Ok(())
}

pub(crate) fn encode_varint(value: &num_bigint::BigInt, w: &mut Vec<u8>) {
    w.extend_from_slice(&value.to_signed_bytes_be());
}

pub(crate) fn encode_consistency(value: Consistency, w: &mut Vec<u8>) {
    encode_short(value.to_u16(), w);
}

// --- decoders --- //

pub(crate) fn parse_bytes(count: usize, rdr: &mut Body) -> CqlResult<Vec<u8>> {
    ensure_remaining(count, rdr)?;
    let pos = rdr.position() as usize;
    let bytes = rdr.get_ref()[pos..pos + count].to_vec();
    rdr.set_position((pos + count) as u64);
    Ok(bytes)
}

pub(crate) fn decode_byte(rdr: &mut Body) -> CqlResult<u8> {
    ensure_remaining(1, rdr)?;
    Ok(rdr.read_u8()?)
}

pub(crate) fn decode_short(rdr: &mut Body) -> CqlResult<u16> {
    ensure_remaining(2, rdr)?;
    Ok(rdr.read_u16::<BigEndian>()?)
}

pub(crate) fn decode_int(rdr: &mut Body) -> CqlResult<i32> {
    ensure_remaining(4, rdr)?;
    Ok(rdr.read_i32::<BigEndian>()?)
}

pub(crate) fn decode_short_bytes(rdr: &mut Body) -> CqlResult<Vec<u8>> {
    let length = decode_short(rdr)?;
    parse_bytes(length as usize, rdr)
}

// [bytes]: negative length means null.
pub(crate) fn decode_int_bytes(rdr: &mut Body) -> CqlResult<Option<Vec<u8>>> {
    let length = decode_int(rdr)?;
    if length < 0 {
        return Ok(None);
    }
    parse_bytes(length as usize, rdr).map(Some)
}

pub(crate) fn decode_string(rdr: &mut Body) -> CqlResult<String> {
    let bytes = decode_short_bytes(rdr)?;
    String::from_utf8(bytes)
        .map_err(|e| CqlError::ProtocolError(format!("[string] is not valid UTF-8: {e}")))
}

pub(crate) fn decode_strings_list(rdr: &mut Body) -> CqlResult<Vec<String>> {
    let count = decode_short(rdr)?;
    let mut list = Vec::with_capacity(count as usize);
    for _ in 0..count {
        list.push(decode_string(rdr)?);
    }
    Ok(list)
}

pub(crate) fn decode_string_multimap(rdr: &mut Body) -> CqlResult<HashMap<String, Vec<String>>> {
    let count = decode_short(rdr)?;
    let mut multimap = HashMap::with_capacity(count as usize);
    for _ in 0..count {
        let key = decode_string(rdr)?;
        let values = decode_strings_list(rdr)?;
        multimap.insert(key, values);
    }
    Ok(multimap)
}

// [inet]: byte length (4 or 16), address bytes, int port.
pub(crate) fn decode_inet(rdr: &mut Body) -> CqlResult<SocketAddr> {
    let length = decode_byte(rdr)?;
    let ip = match length {
        4 => {
            let octets: [u8; 4] = parse_bytes(4, rdr)?.try_into().unwrap(/* length checked */);
            IpAddr::V4(Ipv4Addr::from(octets))
        }
        16 => {
            let octets: [u8; 16] = parse_bytes(16, rdr)?.try_into().unwrap(/* length checked */);
            IpAddr::V6(Ipv6Addr::from(octets))
        }
        _ => {
            return Err(CqlError::ProtocolError(format!(
                "unhandled inet length {length}"
            )));
        }
    };
    let port = decode_int(rdr)?;
    Ok(SocketAddr::new(ip, port as u16))
}

pub(crate) fn decode_consistency(rdr: &mut Body) -> CqlResult<Consistency> {
    Consistency::try_new(decode_short(rdr)?)
}
