use crate::{
    protocol::{parts::StatementId, Consistency},
    CqlValue,
};

/// What to execute: a CQL string, or the id of a prepared statement.
#[derive(Clone, Debug)]
pub enum Statement {
    /// An unprepared CQL query string; shipped opaquely.
    Simple(String),
    /// A statement prepared earlier on this connection.
    Prepared(StatementId),
}

impl From<&str> for Statement {
    fn from(query: &str) -> Self {
        Self::Simple(query.to_string())
    }
}
impl From<String> for Statement {
    fn from(query: String) -> Self {
        Self::Simple(query)
    }
}
impl From<StatementId> for Statement {
    fn from(statement_id: StatementId) -> Self {
        Self::Prepared(statement_id)
    }
}
impl From<&StatementId> for Statement {
    fn from(statement_id: &StatementId) -> Self {
        Self::Prepared(statement_id.clone())
    }
}

/// The bind values of a call.
#[derive(Clone, Debug, Default)]
pub enum QueryValues {
    /// No bind values.
    #[default]
    None,
    /// Positional bind values.
    Positional(Vec<CqlValue>),
    /// Named bind values; only valid for unprepared queries.
    Named(Vec<(String, CqlValue)>),
}

impl QueryValues {
    pub(crate) fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Positional(values) => values.is_empty(),
            Self::Named(pairs) => pairs.is_empty(),
        }
    }
}

impl From<Vec<CqlValue>> for QueryValues {
    fn from(values: Vec<CqlValue>) -> Self {
        Self::Positional(values)
    }
}
impl From<()> for QueryValues {
    fn from((): ()) -> Self {
        Self::None
    }
}

/// Per-call options of [`Connection::execute_with`](crate::Connection::execute_with).
#[derive(Clone, Debug)]
pub struct ExecuteOptions {
    consistency: Consistency,
    send_metadata: bool,
    page_size: Option<i32>,
    paging_state: Option<Vec<u8>>,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            consistency: Consistency::One,
            send_metadata: true,
            page_size: None,
            paging_state: None,
        }
    }
}

impl ExecuteOptions {
    /// Returns the consistency level of the call.
    #[must_use]
    pub fn consistency(&self) -> Consistency {
        self.consistency
    }
    /// Builder-method for setting the consistency level of the call.
    #[must_use]
    pub fn with_consistency(mut self, consistency: Consistency) -> Self {
        self.consistency = consistency;
        self
    }

    /// Returns whether the server is asked to send result metadata.
    #[must_use]
    pub fn send_metadata(&self) -> bool {
        self.send_metadata
    }
    /// Builder-method for defining whether the server is asked to send
    /// result metadata.
    ///
    /// Skipping the metadata saves bytes on the wire; for prepared
    /// statements, the column specs cached at PREPARE time are used to
    /// decode the result instead.
    #[must_use]
    pub fn with_send_metadata(mut self, send_metadata: bool) -> Self {
        self.send_metadata = send_metadata;
        self
    }

    /// Returns the requested page size.
    #[must_use]
    pub fn page_size(&self) -> Option<i32> {
        self.page_size
    }
    /// Builder-method for requesting paged results.
    #[must_use]
    pub fn with_page_size(mut self, page_size: i32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Returns the continuation token for the next page.
    #[must_use]
    pub fn paging_state(&self) -> Option<&[u8]> {
        self.paging_state.as_deref()
    }
    /// Builder-method for continuing a paged result with the token of the
    /// previous page.
    #[must_use]
    pub fn with_paging_state(mut self, paging_state: Vec<u8>) -> Self {
        self.paging_state = Some(paging_state);
        self
    }
}
