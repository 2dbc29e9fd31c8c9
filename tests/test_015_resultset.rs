mod test_utils;

use cqlconnect::{
    Compression, Connection, CqlError, CqlResponse, CqlValue, ErrorCode, ErrorDetails,
    ExecuteOptions, QueryValues,
};
use log::*;
use test_utils::*;

#[tokio::test]
async fn select_returns_typed_rows() {
    init_logger();
    info!("query a release version, with full metadata");
    let (addr, server) = spawn_server(|mut stream| async move {
        serve_handshake(&mut stream, &[]).await;

        let frame = read_frame(&mut stream).await;
        assert_eq!(frame.opcode, OP_QUERY);
        // [long string] query | consistency ONE | empty flags
        let query = "SELECT release_version FROM system.local";
        let mut expected = Vec::new();
        e_int(query.len() as i32, &mut expected);
        expected.extend_from_slice(query.as_bytes());
        expected.extend_from_slice(&[0x00, 0x01, 0x00]);
        assert_eq!(frame.body, expected);

        let body = rows_body(
            &["release_version"],
            &[vec![Some(b"3.11.5")]],
            None,
        );
        write_frame(&mut stream, 0, frame.stream_id, OP_RESULT, &body).await;
    })
    .await;

    let connection = Connection::new(connect_params_for(addr));
    let response = connection
        .query("SELECT release_version FROM system.local")
        .await
        .unwrap();
    let rows = response.into_rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], CqlValue::STRING("3.11.5".to_string()));
    assert_eq!(rows.metadata()[0].name(), "release_version");
    assert_eq!(rows.metadata()[0].keyspace(), "system");

    connection.close().await.unwrap();
    server.await.unwrap();
}

#[tokio::test]
async fn select_without_metadata_returns_raw_cells() {
    init_logger();
    let (addr, server) = spawn_server(|mut stream| async move {
        serve_handshake(&mut stream, &[]).await;

        let frame = read_frame(&mut stream).await;
        assert_eq!(frame.opcode, OP_QUERY);
        // flags byte carries SKIP_METADATA
        assert_eq!(frame.body[frame.body.len() - 1], 0x02);

        let mut body = Vec::new();
        e_int(2, &mut body); // kind: Rows
        e_int(0x04, &mut body); // NO_METADATA
        e_int(1, &mut body); // one column
        e_int(1, &mut body); // one row
        e_bytes(b"3.11.5", &mut body);
        write_frame(&mut stream, 0, frame.stream_id, OP_RESULT, &body).await;
    })
    .await;

    let connection = Connection::new(connect_params_for(addr));
    let options = ExecuteOptions::default().with_send_metadata(false);
    let response = connection
        .execute_with(
            "SELECT release_version FROM system.local",
            QueryValues::None,
            &options,
        )
        .await
        .unwrap();
    let rows = response.into_rows().unwrap();
    assert_eq!(rows[0][0], CqlValue::BLOB(b"3.11.5".to_vec()));

    connection.close().await.unwrap();
    server.await.unwrap();
}

fn prepared_body(statement_id: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    e_int(4, &mut body); // kind: Prepared
    e_short_bytes(statement_id, &mut body);
    // prepared metadata: global spec, three bound parameters, pk on 0
    e_int(0x01, &mut body);
    e_int(3, &mut body);
    e_int(1, &mut body);
    e_short(0, &mut body);
    e_string("ks", &mut body);
    e_string("users", &mut body);
    for (name, type_id) in [
        ("user_id", 0x0009_u16),
        ("user_name", 0x000D),
        ("user_bcity", 0x000D),
    ] {
        e_string(name, &mut body);
        e_short(type_id, &mut body);
    }
    // result metadata: none
    e_int(0x04, &mut body);
    e_int(0, &mut body);
    body
}

#[tokio::test]
async fn prepare_then_execute() {
    init_logger();
    info!("prepare an insert, execute it with typed values");
    let statement_id: [u8; 16] = [0x5A; 16];
    let (addr, server) = spawn_server(move |mut stream| async move {
        serve_handshake(&mut stream, &[]).await;

        let frame = read_frame(&mut stream).await;
        assert_eq!(frame.opcode, OP_PREPARE);
        write_frame(
            &mut stream,
            0,
            frame.stream_id,
            OP_RESULT,
            &prepared_body(&statement_id),
        )
        .await;

        let frame = read_frame(&mut stream).await;
        assert_eq!(frame.opcode, OP_EXECUTE);
        let mut expected = Vec::new();
        e_short_bytes(&statement_id, &mut expected);
        expected.extend_from_slice(&[0x00, 0x01]); // consistency ONE
        expected.push(0x01); // flags: VALUES
        e_short(3, &mut expected);
        e_bytes(&45_i32.to_be_bytes(), &mut expected);
        e_bytes(b"Trump", &mut expected);
        e_bytes(b"Washington D.C.", &mut expected);
        assert_eq!(frame.body, expected);
        write_frame(&mut stream, 0, frame.stream_id, OP_RESULT, &void_body()).await;
    })
    .await;

    let connection = Connection::new(connect_params_for(addr));
    let statement = connection
        .prepare("INSERT INTO ks.users (user_id, user_name, user_bcity) VALUES (?, ?, ?)")
        .await
        .unwrap();
    assert_eq!(statement.as_bytes(), &[0x5A; 16]);

    let response = connection
        .execute(
            &statement,
            vec![
                CqlValue::INT(45),
                CqlValue::STRING("Trump".to_string()),
                CqlValue::STRING("Washington D.C.".to_string()),
            ],
        )
        .await
        .unwrap();
    assert!(matches!(response, CqlResponse::Void));

    connection.close().await.unwrap();
    server.await.unwrap();
}

#[tokio::test]
async fn mistyped_values_fail_before_send() {
    init_logger();
    let statement_id: [u8; 16] = [0x5B; 16];
    let (addr, server) = spawn_server(move |mut stream| async move {
        serve_handshake(&mut stream, &[]).await;
        let frame = read_frame(&mut stream).await;
        assert_eq!(frame.opcode, OP_PREPARE);
        write_frame(
            &mut stream,
            0,
            frame.stream_id,
            OP_RESULT,
            &prepared_body(&statement_id),
        )
        .await;
        // no EXECUTE must arrive; the connection just closes
        let mut buf = [0_u8; 9];
        let n = tokio::io::AsyncReadExt::read(&mut stream, &mut buf)
            .await
            .unwrap();
        assert_eq!(n, 0, "client must not send the mistyped execute");
    })
    .await;

    let connection = Connection::new(connect_params_for(addr));
    let statement = connection.prepare("INSERT ...").await.unwrap();

    let err = connection
        .execute(
            &statement,
            vec![
                CqlValue::STRING("hillary".to_string()),
                CqlValue::INT(2),
                CqlValue::STRING("Washington D.C.".to_string()),
            ],
        )
        .await
        .unwrap_err();
    match err {
        CqlError::BadInput(msg) => {
            assert!(msg.contains("expected type=INT"));
            assert!(msg.contains("got type=string"));
        }
        other => panic!("unexpected error {other:?}"),
    }

    // count mismatch is also caught client-side
    let err = connection
        .execute(&statement, vec![CqlValue::INT(45)])
        .await
        .unwrap_err();
    assert!(matches!(err, CqlError::BadInput(_)));

    connection.close().await.unwrap();
    server.await.unwrap();
}

#[tokio::test]
async fn server_errors_preserve_code_and_details() {
    init_logger();
    let (addr, server) = spawn_server(|mut stream| async move {
        serve_handshake(&mut stream, &[]).await;
        let frame = read_frame(&mut stream).await;
        let mut body = Vec::new();
        e_int(0x1000, &mut body);
        e_string("Cannot achieve consistency level THREE", &mut body);
        e_short(0x0003, &mut body); // THREE
        e_int(3, &mut body);
        e_int(1, &mut body);
        write_frame(&mut stream, 0, frame.stream_id, OP_ERROR, &body).await;
    })
    .await;

    let connection = Connection::new(connect_params_for(addr));
    let err = connection.query("SELECT * FROM ks.t").await.unwrap_err();
    let server_error = err.server_error().expect("expected a server error");
    assert_eq!(server_error.code(), ErrorCode::UNAVAILABLE);
    assert_eq!(
        server_error.message(),
        "Cannot achieve consistency level THREE"
    );
    match server_error.details() {
        ErrorDetails::Unavailable {
            consistency,
            required,
            alive,
        } => {
            assert_eq!(consistency.to_string(), "THREE");
            assert_eq!(*required, 3);
            assert_eq!(*alive, 1);
        }
        other => panic!("unexpected details {other:?}"),
    }

    connection.close().await.unwrap();
    server.await.unwrap();
}

#[tokio::test]
async fn paged_select_surfaces_the_continuation() {
    init_logger();
    info!("page through a two-page result");
    let (addr, server) = spawn_server(|mut stream| async move {
        serve_handshake(&mut stream, &[]).await;

        let frame = read_frame(&mut stream).await;
        assert_eq!(frame.opcode, OP_QUERY);
        // PAGE_SIZE flag, page size 1
        let flags = frame.body[frame.body.len() - 5];
        assert_eq!(flags, 0x04);
        assert_eq!(&frame.body[frame.body.len() - 4..], &1_i32.to_be_bytes());
        let body = rows_body(&["name"], &[vec![Some(b"page-one")]], Some(b"cursor-1"));
        write_frame(&mut stream, 0, frame.stream_id, OP_RESULT, &body).await;

        let frame = read_frame(&mut stream).await;
        assert_eq!(frame.opcode, OP_QUERY);
        // PAGE_SIZE | WITH_PAGING_STATE, then page size and the cursor
        let mut tail = Vec::new();
        e_int(1, &mut tail);
        e_bytes(b"cursor-1", &mut tail);
        assert!(frame.body.ends_with(&tail));
        let body = rows_body(&["name"], &[vec![Some(b"page-two")]], None);
        write_frame(&mut stream, 0, frame.stream_id, OP_RESULT, &body).await;
    })
    .await;

    let connection = Connection::new(connect_params_for(addr));
    let options = ExecuteOptions::default().with_page_size(1);
    let response = connection
        .execute_with("SELECT name FROM ks.t", QueryValues::None, &options)
        .await
        .unwrap();
    let paging_state = match &response {
        CqlResponse::PagingRows { rows, paging_state } => {
            assert_eq!(rows[0][0], CqlValue::STRING("page-one".to_string()));
            paging_state.clone()
        }
        other => panic!("expected a paged result, got {other:?}"),
    };

    let options = ExecuteOptions::default()
        .with_page_size(1)
        .with_paging_state(paging_state);
    let response = connection
        .execute_with("SELECT name FROM ks.t", QueryValues::None, &options)
        .await
        .unwrap();
    match response {
        CqlResponse::Rows(rows) => {
            assert_eq!(rows[0][0], CqlValue::STRING("page-two".to_string()));
        }
        other => panic!("expected the final page, got {other:?}"),
    }

    connection.close().await.unwrap();
    server.await.unwrap();
}

#[tokio::test]
async fn large_bodies_travel_compressed_once_negotiated() {
    init_logger();
    info!("compression transparency for request and reply bodies");
    let query = "SELECT user_id, user_name, user_bcity FROM ks.users \
                 WHERE user_bcity = 'Washington D.C.' ALLOW FILTERING";
    let (addr, server) = spawn_server(move |mut stream| async move {
        let announced = serve_handshake(&mut stream, &["snappy", "lz4"]).await;
        assert_eq!(announced.as_deref(), Some("lz4"));

        let frame = read_frame(&mut stream).await;
        assert_eq!(frame.opcode, OP_QUERY);
        assert_eq!(frame.flags, 0x01, "large request must be compressed");
        let body = Compression::Lz4.decompress(&frame.body).unwrap();
        let query_len = i32::from_be_bytes([body[0], body[1], body[2], body[3]]) as usize;
        assert_eq!(&body[4..4 + query_len], query.as_bytes());

        // answer with a compressed rows body
        let rows = rows_body(
            &["user_name"],
            &[vec![Some(b"Trump")], vec![Some(b"Obama")], vec![None]],
            None,
        );
        let compressed = Compression::Lz4.compress(&rows).unwrap();
        write_frame(&mut stream, 0x01, frame.stream_id, OP_RESULT, &compressed).await;
    })
    .await;

    let connection = Connection::new(connect_params_for(addr));
    let rows = connection.query(query).await.unwrap().into_rows().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][0], CqlValue::STRING("Trump".to_string()));
    assert_eq!(rows[2][0], CqlValue::NULL);

    connection.close().await.unwrap();
    server.await.unwrap();
}
