use crate::{
    protocol::{codec, parts::ResultSetMetadata, Consistency},
    statement::QueryValues,
    CqlError, CqlResult,
};

// Flag bits of the query-parameters section.
const VALUES: u8 = 0x01;
const SKIP_METADATA: u8 = 0x02;
const PAGE_SIZE: u8 = 0x04;
const WITH_PAGING_STATE: u8 = 0x08;
#[allow(dead_code)]
const WITH_SERIAL_CONSISTENCY: u8 = 0x10;
#[allow(dead_code)]
const WITH_DEFAULT_TIMESTAMP: u8 = 0x20;
const WITH_NAMES_FOR_VALUES: u8 = 0x40;

// The <query_parameters> section shared by QUERY and EXECUTE:
// [consistency][flags byte] followed by the sections the flag bits select.
pub(crate) struct QueryParameters<'a> {
    pub consistency: Consistency,
    pub values: &'a QueryValues,
    pub skip_metadata: bool,
    pub page_size: Option<i32>,
    pub paging_state: Option<&'a [u8]>,
    // When executing a prepared statement, the cached parameter specs
    // dictate the value codecs and the expected count.
    pub bound_specs: Option<&'a ResultSetMetadata>,
}

impl QueryParameters<'_> {
    pub(crate) fn emit(&self, w: &mut Vec<u8>) -> CqlResult<()> {
        let mut flags: u8 = 0x00;
        if !self.values.is_empty() {
            flags |= VALUES;
            if matches!(self.values, QueryValues::Named(_)) {
                flags |= WITH_NAMES_FOR_VALUES;
            }
        }
        if self.skip_metadata {
            flags |= SKIP_METADATA;
        }
        if self.page_size.is_some() {
            flags |= PAGE_SIZE;
        }
        if self.paging_state.is_some() {
            flags |= WITH_PAGING_STATE;
        }

        codec::encode_consistency(self.consistency, w);
        codec::encode_byte(flags, w);

        match self.values {
            QueryValues::None => {}
            QueryValues::Positional(values) => {
                if values.is_empty() {
                    // the VALUES flag is clear, nothing to emit
                } else if let Some(specs) = self.bound_specs {
                    if specs.column_count() != values.len() {
                        return Err(CqlError::BadInput(format!(
                            "count of execute params={} doesn't match prepared statement count={}",
                            values.len(),
                            specs.column_count()
                        )));
                    }
                    codec::encode_short(values.len() as u16, w);
                    for (value, spec) in values.iter().zip(specs.iter()) {
                        value.emit(spec.type_id(), w)?;
                    }
                } else {
                    codec::encode_short(values.len() as u16, w);
                    for value in values {
                        value.emit_untyped(w)?;
                    }
                }
            }
            QueryValues::Named(pairs) => {
                if self.bound_specs.is_some() {
                    return Err(CqlError::BadInput(
                        "named values are not supported for prepared statements".to_string(),
                    ));
                }
                if !pairs.is_empty() {
                    codec::encode_short(pairs.len() as u16, w);
                    for (name, value) in pairs {
                        codec::encode_string(name, w)?;
                        value.emit_untyped(w)?;
                    }
                }
            }
        }

        if let Some(page_size) = self.page_size {
            codec::encode_int(page_size, w);
        }
        if let Some(paging_state) = self.paging_state {
            codec::encode_bytes(paging_state, w)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::parts::{CqlValue, TypeId};

    #[test]
    fn minimal_parameters_are_consistency_and_flags() {
        let parameters = QueryParameters {
            consistency: Consistency::One,
            values: &QueryValues::None,
            skip_metadata: true,
            page_size: None,
            paging_state: None,
            bound_specs: None,
        };
        let mut w = Vec::new();
        parameters.emit(&mut w).unwrap();
        assert_eq!(w, [0x00, 0x01, 0x02]);
    }

    #[test]
    fn typed_positional_values_for_prepared_specs() {
        let specs = ResultSetMetadata::for_tests(vec![
            ("user_id", TypeId::INT),
            ("user_name", TypeId::VARCHAR),
        ]);
        let values = QueryValues::Positional(vec![
            CqlValue::INT(45),
            CqlValue::STRING("Trump".to_string()),
        ]);
        let parameters = QueryParameters {
            consistency: Consistency::One,
            values: &values,
            skip_metadata: false,
            page_size: None,
            paging_state: None,
            bound_specs: Some(&specs),
        };
        let mut w = Vec::new();
        parameters.emit(&mut w).unwrap();
        assert_eq!(
            w,
            [
                0x00, 0x01, // consistency ONE
                0x01, // flags: VALUES
                0x00, 0x02, // two values
                0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x2D, // int 45
                0x00, 0x00, 0x00, 0x05, b'T', b'r', b'u', b'm', b'p',
            ]
        );
    }

    #[test]
    fn count_mismatch_fails_before_send() {
        let specs = ResultSetMetadata::for_tests(vec![("user_id", TypeId::INT)]);
        let values =
            QueryValues::Positional(vec![CqlValue::INT(45), CqlValue::INT(46)]);
        let parameters = QueryParameters {
            consistency: Consistency::One,
            values: &values,
            skip_metadata: false,
            page_size: None,
            paging_state: None,
            bound_specs: Some(&specs),
        };
        let mut w = Vec::new();
        let err = parameters.emit(&mut w).unwrap_err();
        assert!(matches!(err, CqlError::BadInput(_)));
    }

    #[test]
    fn mismatched_host_type_fails_before_send() {
        let specs = ResultSetMetadata::for_tests(vec![
            ("user_id", TypeId::INT),
            ("user_name", TypeId::VARCHAR),
            ("user_bcity", TypeId::VARCHAR),
        ]);
        let values = QueryValues::Positional(vec![
            CqlValue::STRING("hillary".to_string()),
            CqlValue::INT(2),
            CqlValue::STRING("Washington D.C.".to_string()),
        ]);
        let parameters = QueryParameters {
            consistency: Consistency::One,
            values: &values,
            skip_metadata: false,
            page_size: None,
            paging_state: None,
            bound_specs: Some(&specs),
        };
        let mut w = Vec::new();
        match parameters.emit(&mut w).unwrap_err() {
            CqlError::BadInput(msg) => {
                assert!(msg.contains("expected type=INT"));
                assert!(msg.contains("got type=string"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn paging_sections_follow_the_flags() {
        let parameters = QueryParameters {
            consistency: Consistency::Quorum,
            values: &QueryValues::None,
            skip_metadata: false,
            page_size: Some(2),
            paging_state: Some(b"token"),
            bound_specs: None,
        };
        let mut w = Vec::new();
        parameters.emit(&mut w).unwrap();
        assert_eq!(
            w,
            [
                0x00, 0x04, // QUORUM
                0x0C, // flags: PAGE_SIZE | WITH_PAGING_STATE
                0x00, 0x00, 0x00, 0x02, // page size
                0x00, 0x00, 0x00, 0x05, b't', b'o', b'k', b'e', b'n',
            ]
        );
    }

    #[test]
    fn named_values_for_unprepared_queries() {
        let values = QueryValues::Named(vec![(
            "user_id".to_string(),
            CqlValue::INT(45),
        )]);
        let parameters = QueryParameters {
            consistency: Consistency::One,
            values: &values,
            skip_metadata: false,
            page_size: None,
            paging_state: None,
            bound_specs: None,
        };
        let mut w = Vec::new();
        parameters.emit(&mut w).unwrap();
        assert_eq!(w[2], VALUES | WITH_NAMES_FOR_VALUES);
    }
}
