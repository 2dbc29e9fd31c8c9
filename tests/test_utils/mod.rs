// Shared helpers for the integration tests: logging setup, wire-level
// frame helpers, and a scripted in-process server.
#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Once;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        flexi_logger::Logger::try_with_env_or_str("info")
            .unwrap()
            .start()
            .ok();
    });
}

// opcodes the scripts deal with
pub const OP_ERROR: u8 = 0x00;
pub const OP_STARTUP: u8 = 0x01;
pub const OP_READY: u8 = 0x02;
pub const OP_AUTHENTICATE: u8 = 0x03;
pub const OP_OPTIONS: u8 = 0x05;
pub const OP_SUPPORTED: u8 = 0x06;
pub const OP_QUERY: u8 = 0x07;
pub const OP_RESULT: u8 = 0x08;
pub const OP_PREPARE: u8 = 0x09;
pub const OP_EXECUTE: u8 = 0x0A;
pub const OP_REGISTER: u8 = 0x0B;
pub const OP_EVENT: u8 = 0x0C;

#[derive(Debug)]
pub struct Frame {
    pub flags: u8,
    pub stream_id: i16,
    pub opcode: u8,
    pub body: Vec<u8>,
}

pub async fn read_frame(stream: &mut TcpStream) -> Frame {
    let mut head = [0_u8; 9];
    stream.read_exact(&mut head).await.unwrap();
    assert_eq!(head[0], 0x04, "client must send version 0x04");
    let length = u32::from_be_bytes([head[5], head[6], head[7], head[8]]) as usize;
    let mut body = vec![0_u8; length];
    stream.read_exact(&mut body).await.unwrap();
    Frame {
        flags: head[1],
        stream_id: i16::from_be_bytes([head[2], head[3]]),
        opcode: head[4],
        body,
    }
}

pub async fn write_frame(
    stream: &mut TcpStream,
    flags: u8,
    stream_id: i16,
    opcode: u8,
    body: &[u8],
) {
    let mut frame = vec![0x84_u8, flags];
    frame.extend_from_slice(&stream_id.to_be_bytes());
    frame.push(opcode);
    frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
    frame.extend_from_slice(body);
    stream.write_all(&frame).await.unwrap();
}

// --- body builders, big-endian like the protocol --- //

pub fn e_short(value: u16, w: &mut Vec<u8>) {
    w.extend_from_slice(&value.to_be_bytes());
}

pub fn e_int(value: i32, w: &mut Vec<u8>) {
    w.extend_from_slice(&value.to_be_bytes());
}

pub fn e_string(value: &str, w: &mut Vec<u8>) {
    e_short(value.len() as u16, w);
    w.extend_from_slice(value.as_bytes());
}

pub fn e_bytes(value: &[u8], w: &mut Vec<u8>) {
    e_int(value.len() as i32, w);
    w.extend_from_slice(value);
}

pub fn e_short_bytes(value: &[u8], w: &mut Vec<u8>) {
    e_short(value.len() as u16, w);
    w.extend_from_slice(value);
}

pub fn e_strings_list(values: &[&str], w: &mut Vec<u8>) {
    e_short(values.len() as u16, w);
    for value in values {
        e_string(value, w);
    }
}

pub fn supported_body(compression: &[&str]) -> Vec<u8> {
    let mut body = Vec::new();
    e_short(3, &mut body);
    e_string("CQL_VERSION", &mut body);
    e_strings_list(&["3.4.4"], &mut body);
    e_string("COMPRESSION", &mut body);
    e_strings_list(compression, &mut body);
    e_string("PROTOCOL_VERSIONS", &mut body);
    e_strings_list(&["3/v3", "4/v4", "5/v5-beta"], &mut body);
    body
}

// A Rows result with a global table spec and varchar columns.
pub fn rows_body(
    columns: &[&str],
    rows: &[Vec<Option<&[u8]>>],
    paging_state: Option<&[u8]>,
) -> Vec<u8> {
    let mut body = Vec::new();
    e_int(2, &mut body); // kind: Rows
    let mut flags = 0x01; // GLOBAL_TABLES_SPEC
    if paging_state.is_some() {
        flags |= 0x02; // HAS_MORE_PAGES
    }
    e_int(flags, &mut body);
    e_int(columns.len() as i32, &mut body);
    if let Some(paging_state) = paging_state {
        e_bytes(paging_state, &mut body);
    }
    e_string("system", &mut body);
    e_string("local", &mut body);
    for column in columns {
        e_string(column, &mut body);
        e_short(0x000D, &mut body); // varchar
    }
    e_int(rows.len() as i32, &mut body);
    for row in rows {
        for cell in row {
            match cell {
                Some(bytes) => e_bytes(bytes, &mut body),
                None => e_int(-1, &mut body),
            }
        }
    }
    body
}

pub fn void_body() -> Vec<u8> {
    let mut body = Vec::new();
    e_int(1, &mut body);
    body
}

pub fn parse_string_map(body: &[u8]) -> Vec<(String, String)> {
    let mut pos = 2;
    let mut read_string = |pos: &mut usize| {
        let len = u16::from_be_bytes([body[*pos], body[*pos + 1]]) as usize;
        *pos += 2;
        let s = String::from_utf8(body[*pos..*pos + len].to_vec()).unwrap();
        *pos += len;
        s
    };
    let count = u16::from_be_bytes([body[0], body[1]]);
    let mut pairs = Vec::new();
    for _ in 0..count {
        let key = read_string(&mut pos);
        let value = read_string(&mut pos);
        pairs.push((key, value));
    }
    pairs
}

// Serves the connection handshake: OPTIONS -> SUPPORTED, STARTUP -> READY.
// Returns the compression algorithm the client announced in STARTUP, if any.
pub async fn serve_handshake(stream: &mut TcpStream, compression: &[&str]) -> Option<String> {
    let frame = read_frame(stream).await;
    assert_eq!(frame.opcode, OP_OPTIONS);
    assert_eq!(frame.flags, 0x00, "OPTIONS must not be compressed");
    assert!(frame.body.is_empty());
    let body = supported_body(compression);
    write_frame(stream, 0, frame.stream_id, OP_SUPPORTED, &body).await;

    let frame = read_frame(stream).await;
    assert_eq!(frame.opcode, OP_STARTUP);
    assert_eq!(frame.flags, 0x00, "STARTUP must not be compressed");
    let announced = parse_string_map(&frame.body);
    assert!(announced.contains(&("CQL_VERSION".to_string(), "3.0.0".to_string())));
    write_frame(stream, 0, frame.stream_id, OP_READY, &[]).await;

    announced
        .into_iter()
        .find(|(key, _)| key == "COMPRESSION")
        .map(|(_, value)| value)
}

// Starts a scripted server on an ephemeral port and hands the accepted
// connection to the script.
pub async fn spawn_server<F, Fut>(script: F) -> (SocketAddr, tokio::task::JoinHandle<()>)
where
    F: FnOnce(TcpStream) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        script(stream).await;
    });
    (addr, handle)
}

pub fn connect_params_for(addr: SocketAddr) -> cqlconnect::ConnectParams {
    cqlconnect::ConnectParams::builder()
        .hostname(addr.ip().to_string())
        .port(addr.port())
        .build()
}
