//! An asynchronous driver for Apache Cassandra(TM) and compatible databases,
//! speaking the CQL binary protocol, version 4.
//!
//! The driver talks to a single endpoint and multiplexes many in-flight
//! calls over one TCP (optionally TLS) connection, using the stream ids of
//! the wire protocol. Queries are shipped as opaque CQL strings or as
//! prepared statements with typed bind values.
//!
//! ```rust,no_run
//! use cqlconnect::{Connection, ConnectParams, CqlValue};
//!
//! # async fn example() -> cqlconnect::CqlResult<()> {
//! let connection = Connection::new(ConnectParams::default());
//!
//! let statement_id = connection
//!     .prepare("INSERT INTO ks.users (user_id, user_name) VALUES (?, ?)")
//!     .await?;
//! connection
//!     .execute(
//!         &statement_id,
//!         vec![CqlValue::INT(45), CqlValue::STRING("Trump".to_string())],
//!     )
//!     .await?;
//! connection.close().await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_debug_implementations)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

#[macro_use]
extern crate log;

mod conn;
mod cql_error;
mod cql_response;
mod protocol;
mod statement;

pub use crate::conn::{
    ConnectParams, ConnectParamsBuilder, Connection, ConnectionConfiguration, EventSubscription,
    Tls,
};
pub use crate::cql_error::{CqlError, CqlResult};
pub use crate::cql_response::CqlResponse;
pub use crate::protocol::parts::{
    ChangeEvent, ColumnSpec, CqlValue, ErrorCode, ErrorDetails, EventKind, NodeStatus,
    ResultSetMetadata, Row, Rows, SchemaChange, SchemaChangeTarget, SchemaChangeType, ServerError,
    StatementId, StatusChange, TopologyChange, TopologyChangeType, TypeId, WriteType,
};
pub use crate::protocol::{Compression, Consistency};
pub use crate::statement::{ExecuteOptions, QueryValues, Statement};
