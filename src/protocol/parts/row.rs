use crate::{
    protocol::parts::{CqlValue, ResultSetMetadata},
    CqlError, CqlResult,
};
use std::sync::Arc;

/// A single line of a [`Rows`](crate::Rows) result.
#[derive(Clone, Debug)]
pub struct Row {
    metadata: Arc<ResultSetMetadata>,
    values: Vec<CqlValue>,
}

impl Row {
    pub(crate) fn new(metadata: Arc<ResultSetMetadata>, values: Vec<CqlValue>) -> Self {
        Self { metadata, values }
    }

    /// Returns the metadata the row was decoded with.
    #[must_use]
    pub fn metadata(&self) -> &ResultSetMetadata {
        &self.metadata
    }

    /// Returns the number of values in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the row contains no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value at the given position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&CqlValue> {
        self.values.get(index)
    }

    /// Returns the value of the column with the given name.
    pub fn field(&self, name: &str) -> CqlResult<&CqlValue> {
        let index = self.metadata.position_of(name).ok_or_else(|| {
            CqlError::BadInput(format!("no column named {name} in this result"))
        })?;
        Ok(&self.values[index])
    }

    /// Consumes the row into its values.
    #[must_use]
    pub fn into_values(self) -> Vec<CqlValue> {
        self.values
    }

    /// Returns an iterator over the values.
    pub fn iter(&self) -> std::slice::Iter<'_, CqlValue> {
        self.values.iter()
    }
}

impl std::ops::Index<usize> for Row {
    type Output = CqlValue;
    fn index(&self, index: usize) -> &CqlValue {
        &self.values[index]
    }
}

impl IntoIterator for Row {
    type Item = CqlValue;
    type IntoIter = std::vec::IntoIter<CqlValue>;
    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        for value in &self.values {
            write!(fmt, "{value}, ")?;
        }
        Ok(())
    }
}
