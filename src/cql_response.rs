use crate::{
    protocol::parts::{Rows, SchemaChange},
    CqlError, CqlResult,
};

/// The result of a call to [`Connection::execute`](crate::Connection::execute).
#[derive(Debug)]
pub enum CqlResponse {
    /// The statement succeeded and returned nothing.
    Void,
    /// The statement returned rows, and this is the last (or only) page.
    Rows(Rows),
    /// The statement returned one page of rows; pass the paging state to
    /// the next call to fetch the following page.
    PagingRows {
        /// The rows of this page.
        rows: Rows,
        /// The continuation token for the next page.
        paging_state: Vec<u8>,
    },
    /// A USE statement switched the keyspace.
    SetKeyspace(String),
    /// A DDL statement changed the schema.
    SchemaChange(SchemaChange),
}

impl CqlResponse {
    /// Converts the response into its rows.
    ///
    /// Fails when the statement did not return rows.
    pub fn into_rows(self) -> CqlResult<Rows> {
        match self {
            Self::Rows(rows) | Self::PagingRows { rows, .. } => Ok(rows),
            response => Err(CqlError::BadInput(format!(
                "the statement did not return rows, but {response:?}"
            ))),
        }
    }

    /// Returns the paging state, if the result has more pages.
    #[must_use]
    pub fn paging_state(&self) -> Option<&[u8]> {
        match self {
            Self::PagingRows { paging_state, .. } => Some(paging_state),
            _ => None,
        }
    }
}
