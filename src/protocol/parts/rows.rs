use crate::{
    protocol::{
        codec::{self, Body},
        parts::{CqlValue, ResultSetMetadata, Row},
    },
    CqlResult,
};
use std::sync::Arc;

/// A set of rows, as returned by a SELECT.
///
/// Each row is an ordered tuple of [`CqlValue`](crate::CqlValue)s matching
/// the column specs of the metadata.
#[derive(Debug)]
pub struct Rows {
    metadata: Arc<ResultSetMetadata>,
    rows: Vec<Row>,
    paging_state: Option<Vec<u8>>,
}

impl Rows {
    // Parses the remainder of a Rows body after its metadata section:
    // [int] row_count | row_count x column_count x [bytes].
    //
    // When the response metadata was skipped, the column specs cached from
    // the PREPARE response can be injected; without any specs the cells
    // surface as opaque BLOBs.
    pub(crate) fn parse(
        rdr: &mut Body,
        response_rsmd: ResultSetMetadata,
        o_injected_rsmd: Option<&Arc<ResultSetMetadata>>,
    ) -> CqlResult<Self> {
        let paging_state = response_rsmd.paging_state().map(<[u8]>::to_vec);
        let column_count = response_rsmd.column_count();

        let metadata = match o_injected_rsmd {
            Some(injected) if response_rsmd.is_metadata_skipped() => Arc::clone(injected),
            _ => Arc::new(response_rsmd),
        };

        let row_count = codec::decode_int(rdr)?;
        trace!("Rows::parse() row_count={row_count} column_count={column_count}");
        let mut rows = Vec::with_capacity(row_count.max(0) as usize);
        for _ in 0..row_count {
            let mut values = Vec::with_capacity(column_count);
            for column in 0..column_count {
                let cell = codec::decode_int_bytes(rdr)?;
                let value = match metadata.get(column) {
                    Some(spec) => CqlValue::parse(spec.type_id(), cell)?,
                    None => match cell {
                        Some(bytes) => CqlValue::BLOB(bytes),
                        None => CqlValue::NULL,
                    },
                };
                values.push(value);
            }
            rows.push(Row::new(Arc::clone(&metadata), values));
        }

        Ok(Self {
            metadata,
            rows,
            paging_state,
        })
    }

    /// Returns the metadata of the result's columns.
    #[must_use]
    pub fn metadata(&self) -> &ResultSetMetadata {
        &self.metadata
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the result contains no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the row at the given position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Returns an iterator over the rows.
    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub(crate) fn take_paging_state(&mut self) -> Option<Vec<u8>> {
        self.paging_state.take()
    }
}

impl std::ops::Index<usize> for Rows {
    type Output = Row;
    fn index(&self, index: usize) -> &Row {
        &self.rows[index]
    }
}

impl IntoIterator for Rows {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;
    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
