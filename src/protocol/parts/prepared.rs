use crate::{
    protocol::{
        codec::{self, Body},
        parts::ResultSetMetadata,
    },
    CqlError, CqlResult,
};
use std::sync::Arc;

/// The opaque, server-assigned id of a prepared statement.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct StatementId(Vec<u8>);

impl StatementId {
    /// Returns the raw id bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for StatementId {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Debug for StatementId {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "StatementId(0x")?;
        for byte in &self.0 {
            write!(fmt, "{byte:02x}")?;
        }
        write!(fmt, ")")
    }
}

/// The metadata of a prepared statement: the specs of its bound parameters,
/// the specs of its result columns, and the partition-key indices.
///
/// Statement ids are server- and node-scoped; entries live in the
/// connection's cache until the connection closes.
#[derive(Debug)]
pub struct PreparedStatement {
    statement_id: StatementId,
    parameters: Arc<ResultSetMetadata>,
    result_metadata: Arc<ResultSetMetadata>,
    pk_indexes: Vec<u16>,
}

impl PreparedStatement {
    // Parses a PREPARED result body after its kind field:
    // [short bytes] id | prepared_metadata | result_metadata
    // where prepared_metadata additionally carries the pk indices.
    pub(crate) fn parse(rdr: &mut Body) -> CqlResult<Self> {
        let statement_id = codec::decode_short_bytes(rdr)?;
        if statement_id.is_empty() {
            return Err(CqlError::ProtocolError(
                "cannot use an empty prepared statement id".to_string(),
            ));
        }

        // prepared_metadata: [int] flags | [int] column_count | [int] pk_count
        // | pk_count x [short] | specs
        let flags = codec::decode_int(rdr)?;
        let column_count = codec::decode_int(rdr)?;
        let pk_count = codec::decode_int(rdr)?;
        if pk_count < 0 {
            return Err(CqlError::ProtocolError(format!(
                "negative pk count {pk_count}"
            )));
        }
        let mut pk_indexes = Vec::with_capacity(pk_count as usize);
        for _ in 0..pk_count {
            pk_indexes.push(codec::decode_short(rdr)?);
        }
        let parameters = ResultSetMetadata::parse_after_header(flags, column_count, rdr)?;

        let result_metadata = ResultSetMetadata::parse_strict(rdr)?;

        debug!(
            "PreparedStatement::parse() id={statement_id:02x?} with {} parameters and {} result columns",
            parameters.column_count(),
            result_metadata.column_count(),
        );
        Ok(Self {
            statement_id: StatementId(statement_id),
            parameters: Arc::new(parameters),
            result_metadata: Arc::new(result_metadata),
            pk_indexes,
        })
    }

    /// Returns the server-assigned statement id.
    #[must_use]
    pub fn statement_id(&self) -> &StatementId {
        &self.statement_id
    }

    /// Returns the specs of the bound parameters.
    #[must_use]
    pub fn parameters(&self) -> &Arc<ResultSetMetadata> {
        &self.parameters
    }

    /// Returns the specs of the result columns.
    #[must_use]
    pub fn result_metadata(&self) -> &Arc<ResultSetMetadata> {
        &self.result_metadata
    }

    /// Returns the indices of the partition-key columns among the parameters.
    #[must_use]
    pub fn pk_indexes(&self) -> &[u16] {
        &self.pk_indexes
    }
}
