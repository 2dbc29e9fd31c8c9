use crate::{
    protocol::{
        codec::{self, Body},
        parts::TypeId,
    },
    CqlError, CqlResult,
};
use std::ops::Deref;

// Flags of the result metadata section.
const GLOBAL_TABLES_SPEC: i32 = 0x01;
const HAS_MORE_PAGES: i32 = 0x02;
const NO_METADATA: i32 = 0x04;

/// Metadata of one column of a result set or of one bound parameter.
#[derive(Clone, Debug)]
pub struct ColumnSpec {
    keyspace: String,
    table: String,
    name: String,
    type_id: TypeId,
}

impl ColumnSpec {
    /// Returns the keyspace the column belongs to.
    #[must_use]
    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }
    /// Returns the table the column belongs to.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }
    /// Returns the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Returns the type of the column's values.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}

/// List of metadata of the columns of a result set.
#[derive(Debug, Default)]
pub struct ResultSetMetadata {
    columns: Vec<ColumnSpec>,
    column_count: usize,
    no_metadata: bool,
    paging_state: Option<Vec<u8>>,
}

impl Deref for ResultSetMetadata {
    type Target = Vec<ColumnSpec>;
    fn deref(&self) -> &Self::Target {
        &self.columns
    }
}

impl ResultSetMetadata {
    // Parses the metadata section in front of a Rows body or inside a
    // PREPARED body:
    // [int] flags | [int] column_count | paging_state? | specs?
    pub(crate) fn parse(rdr: &mut Body) -> CqlResult<Self> {
        let flags = codec::decode_int(rdr)?;
        let column_count = codec::decode_int(rdr)?;
        Self::parse_after_header(flags, column_count, rdr)
    }

    // Continues parsing when the caller already consumed flags and
    // column_count (the prepared-metadata section interleaves the pk indices
    // between them and the specs).
    pub(crate) fn parse_after_header(
        flags: i32,
        column_count: i32,
        rdr: &mut Body,
    ) -> CqlResult<Self> {
        if column_count < 0 {
            return Err(CqlError::ProtocolError(format!(
                "negative column count {column_count}"
            )));
        }
        let column_count = column_count as usize;
        trace!("ResultSetMetadata::parse() flags={flags:#x} column_count={column_count}");

        let paging_state = if flags & HAS_MORE_PAGES != 0 {
            codec::decode_int_bytes(rdr)?
        } else {
            None
        };

        let no_metadata = flags & NO_METADATA != 0;
        let mut columns = Vec::new();
        if !no_metadata {
            let global_spec = if flags & GLOBAL_TABLES_SPEC != 0 {
                Some((codec::decode_string(rdr)?, codec::decode_string(rdr)?))
            } else {
                None
            };
            for _ in 0..column_count {
                let (keyspace, table) = match &global_spec {
                    Some((keyspace, table)) => (keyspace.clone(), table.clone()),
                    None => (codec::decode_string(rdr)?, codec::decode_string(rdr)?),
                };
                let name = codec::decode_string(rdr)?;
                let type_id = TypeId::try_new(codec::decode_short(rdr)?)?;
                columns.push(ColumnSpec {
                    keyspace,
                    table,
                    name,
                    type_id,
                });
            }
        }

        Ok(Self {
            columns,
            column_count,
            no_metadata,
            paging_state,
        })
    }

    // Like parse(), but enforcing the invariant of the result-metadata
    // section of a PREPARED body: NO_METADATA and an empty column list
    // imply each other.
    pub(crate) fn parse_strict(rdr: &mut Body) -> CqlResult<Self> {
        let rsmd = Self::parse(rdr)?;
        if rsmd.no_metadata != (rsmd.column_count == 0) {
            return Err(CqlError::ProtocolError(format!(
                "metadata flags {} column_count {}",
                if rsmd.no_metadata {
                    "announce NO_METADATA, but"
                } else {
                    "carry specs, but"
                },
                rsmd.column_count
            )));
        }
        Ok(rsmd)
    }

    /// Returns the number of columns of each row.
    ///
    /// This can exceed the number of column specs when the server was asked
    /// to skip the metadata.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Returns true when the server skipped the column specs.
    #[must_use]
    pub fn is_metadata_skipped(&self) -> bool {
        self.no_metadata
    }

    /// Returns the continuation token when the result has more pages.
    #[must_use]
    pub fn paging_state(&self) -> Option<&[u8]> {
        self.paging_state.as_deref()
    }

    /// Returns the position of the column with the given name.
    #[must_use]
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|spec| spec.name == name)
    }

    #[cfg(test)]
    pub(crate) fn for_tests(specs: Vec<(&str, TypeId)>) -> Self {
        let columns: Vec<ColumnSpec> = specs
            .into_iter()
            .map(|(name, type_id)| ColumnSpec {
                keyspace: "ks".to_string(),
                table: "tab".to_string(),
                name: name.to_string(),
                type_id,
            })
            .collect();
        Self {
            column_count: columns.len(),
            columns,
            no_metadata: false,
            paging_state: None,
        }
    }
}

impl std::fmt::Display for ResultSetMetadata {
    // Writes the column names
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(fmt)?;
        for column_spec in &self.columns {
            write!(fmt, "{}, ", column_spec.name())?;
        }
        writeln!(fmt)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_table_spec_is_shared() {
        let mut w = Vec::new();
        codec::encode_int(GLOBAL_TABLES_SPEC, &mut w);
        codec::encode_int(2, &mut w);
        codec::encode_string("system", &mut w).unwrap();
        codec::encode_string("local", &mut w).unwrap();
        codec::encode_string("release_version", &mut w).unwrap();
        codec::encode_short(0x000D, &mut w);
        codec::encode_string("cluster_name", &mut w).unwrap();
        codec::encode_short(0x000D, &mut w);

        let mut rdr = Body::new(w.as_slice());
        let rsmd = ResultSetMetadata::parse(&mut rdr).unwrap();
        assert_eq!(codec::remaining(&rdr), 0);
        assert_eq!(rsmd.column_count(), 2);
        assert_eq!(rsmd[0].keyspace(), "system");
        assert_eq!(rsmd[0].table(), "local");
        assert_eq!(rsmd[0].name(), "release_version");
        assert_eq!(rsmd[0].type_id(), TypeId::VARCHAR);
        assert_eq!(rsmd[1].table(), "local");
        assert_eq!(rsmd.position_of("cluster_name"), Some(1));
        assert!(rsmd.paging_state().is_none());
    }

    #[test]
    fn skipped_metadata_reads_no_specs() {
        let mut w = Vec::new();
        codec::encode_int(NO_METADATA, &mut w);
        codec::encode_int(1, &mut w);

        let mut rdr = Body::new(w.as_slice());
        let rsmd = ResultSetMetadata::parse(&mut rdr).unwrap();
        assert!(rsmd.is_metadata_skipped());
        assert_eq!(rsmd.column_count(), 1);
        assert!(rsmd.is_empty());
    }

    #[test]
    fn paging_state_is_surfaced() {
        let mut w = Vec::new();
        codec::encode_int(HAS_MORE_PAGES | NO_METADATA, &mut w);
        codec::encode_int(1, &mut w);
        codec::encode_bytes(b"next-page-token", &mut w).unwrap();

        let mut rdr = Body::new(w.as_slice());
        let rsmd = ResultSetMetadata::parse(&mut rdr).unwrap();
        assert_eq!(rsmd.paging_state(), Some(&b"next-page-token"[..]));
    }

    #[test]
    fn prepared_result_metadata_invariant() {
        let mut w = Vec::new();
        codec::encode_int(NO_METADATA, &mut w);
        codec::encode_int(3, &mut w);

        let mut rdr = Body::new(w.as_slice());
        assert!(matches!(
            ResultSetMetadata::parse_strict(&mut rdr),
            Err(CqlError::ProtocolError(_))
        ));
    }
}
