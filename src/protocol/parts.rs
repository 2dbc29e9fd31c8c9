// The structured pieces of message bodies.

mod cql_value;
mod event;
mod prepared;
mod query_parameters;
mod resultset_metadata;
mod row;
mod rows;
mod server_error;
mod type_id;

pub(crate) use self::query_parameters::QueryParameters;

pub use self::{
    cql_value::CqlValue,
    event::{
        ChangeEvent, EventKind, NodeStatus, SchemaChange, SchemaChangeTarget, SchemaChangeType,
        StatusChange, TopologyChange, TopologyChangeType,
    },
    prepared::{PreparedStatement, StatementId},
    resultset_metadata::{ColumnSpec, ResultSetMetadata},
    row::Row,
    rows::Rows,
    server_error::{ErrorCode, ErrorDetails, ServerError, WriteType},
    type_id::TypeId,
};
