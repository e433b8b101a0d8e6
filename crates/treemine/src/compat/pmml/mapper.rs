//! Mapping of PMML field names to table column names.

use std::collections::HashMap;

use super::raw::RawDerivedField;

/// Resolves the field name used in a predicate to a column name.
pub trait FieldMapper {
    fn column_name(&self, field: &str) -> String;
}

/// Field names are column names.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMapper;

impl FieldMapper for IdentityMapper {
    fn column_name(&self, field: &str) -> String {
        field.to_string()
    }
}

/// Maps derived fields that rename a column back to that column.
///
/// Chains of renames are followed; unknown fields map to themselves.
#[derive(Debug, Clone, Default)]
pub struct DerivedFieldMapper {
    derived: HashMap<String, String>,
}

impl DerivedFieldMapper {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            derived: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Collect the plain renames among `fields`.
    pub fn from_derived_fields(fields: &[RawDerivedField]) -> Self {
        Self::new(
            fields
                .iter()
                .filter_map(|f| f.field_ref.as_ref().map(|src| (f.name.clone(), src.clone()))),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.derived.is_empty()
    }
}

impl FieldMapper for DerivedFieldMapper {
    fn column_name(&self, field: &str) -> String {
        let mut name = field;
        // A cycle cannot be longer than the number of entries.
        for _ in 0..=self.derived.len() {
            match self.derived.get(name) {
                Some(source) if source != name => name = source,
                _ => break,
            }
        }
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_keeps_names() {
        assert_eq!(IdentityMapper.column_name("age"), "age");
    }

    #[test]
    fn derived_names_resolve_to_columns() {
        let mapper = DerivedFieldMapper::from_derived_fields(&[
            RawDerivedField {
                name: "age_norm".into(),
                field_ref: Some("age".into()),
            },
            RawDerivedField {
                name: "age_norm2".into(),
                field_ref: Some("age_norm".into()),
            },
            RawDerivedField {
                name: "computed".into(),
                field_ref: None,
            },
        ]);

        assert_eq!(mapper.column_name("age_norm"), "age");
        assert_eq!(mapper.column_name("age_norm2"), "age");
        assert_eq!(mapper.column_name("computed"), "computed");
        assert_eq!(mapper.column_name("income"), "income");
    }

    #[test]
    fn rename_cycles_terminate() {
        let mapper = DerivedFieldMapper::new([("a", "b"), ("b", "a")]);
        let name = mapper.column_name("a");
        assert!(name == "a" || name == "b");
    }
}
