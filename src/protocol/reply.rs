use crate::{
    protocol::{
        codec::{self, Body},
        parts::{
            ChangeEvent, PreparedStatement, ResultSetMetadata, Rows, SchemaChange, ServerError,
        },
        Opcode,
    },
    CqlError, CqlResult,
};
use std::{collections::HashMap, sync::Arc};

// The kind-specific payload of a RESULT frame.
#[derive(Debug)]
pub(crate) enum ResultBody {
    Void,
    Rows(Rows),
    SetKeyspace(String),
    Prepared(PreparedStatement),
    SchemaChange(SchemaChange),
}

// A reply message, decoded from a frame according to its opcode.
#[derive(Debug)]
pub(crate) enum Reply {
    Ready,
    Authenticate(String),
    Supported(HashMap<String, Vec<String>>),
    Error(ServerError),
    Result(ResultBody),
    Event(ChangeEvent),
}

impl Reply {
    // Parses a reply body, building a Reply object.
    //
    // `ResultSetMetadata` needs to be injected in case of execute calls of
    // prepared statements whose result metadata was skipped.
    //
    // Every decoder must consume the entire body; residual bytes are an
    // internal framing violation of the peer.
    pub(crate) fn parse(
        opcode: Opcode,
        body: &[u8],
        o_rsmd: Option<&Arc<ResultSetMetadata>>,
    ) -> CqlResult<Self> {
        trace!("Reply::parse() of opcode {opcode:?} with a {} byte body", body.len());
        let mut rdr = Body::new(body);
        let reply = match opcode {
            Opcode::Ready => Reply::Ready,
            Opcode::Authenticate => Reply::Authenticate(codec::decode_string(&mut rdr)?),
            Opcode::Supported => Reply::Supported(codec::decode_string_multimap(&mut rdr)?),
            Opcode::Error => Reply::Error(ServerError::parse(&mut rdr)?),
            Opcode::Result => Reply::Result(parse_result(&mut rdr, o_rsmd)?),
            Opcode::Event => Reply::Event(ChangeEvent::parse(&mut rdr)?),
            _ => {
                return Err(CqlError::UnknownPayload(format!(
                    "server sent a frame with request opcode {opcode:?}"
                )));
            }
        };
        let leftover = codec::remaining(&rdr);
        if leftover > 0 {
            return Err(CqlError::ProtocolError(format!(
                "decoder for opcode {opcode:?} left {leftover} trailing bytes"
            )));
        }
        Ok(reply)
    }
}

// [int] kind, then the kind-specific body.
fn parse_result(
    rdr: &mut Body,
    o_rsmd: Option<&Arc<ResultSetMetadata>>,
) -> CqlResult<ResultBody> {
    let kind = codec::decode_int(rdr)?;
    debug!("parse_result() kind={kind}");
    Ok(match kind {
        0x0001 => ResultBody::Void,
        0x0002 => {
            let response_rsmd = ResultSetMetadata::parse(rdr)?;
            ResultBody::Rows(Rows::parse(rdr, response_rsmd, o_rsmd)?)
        }
        0x0003 => ResultBody::SetKeyspace(codec::decode_string(rdr)?),
        0x0004 => ResultBody::Prepared(PreparedStatement::parse(rdr)?),
        0x0005 => ResultBody::SchemaChange(SchemaChange::parse(rdr)?),
        _ => {
            return Err(CqlError::UnknownPayload(format!(
                "RESULT message has unknown kind={kind}"
            )));
        }
    })
}
