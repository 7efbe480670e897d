//! Branch lookup for Variant (and Variant-like Tuple/Object) columns.
//!
//! Lookup tables are built once during finalization, keyed by the class of a
//! runtime value. Resolution only looks at the shape of a value and its
//! class, never at the value itself.
use std::collections::BTreeMap;

use serde::Serialize;

use crate::descriptor::ColumnDescriptor;
use crate::registry::{build_variant_mapping, DataType};
use crate::value::{Value, ValueClass};

/// Returned by `variant_ordinal_num` when no branch matches.
pub const NOT_FOUND_ORDINAL: i32 = -1;

/// Class to branch ordinal tables for one column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct VariantOrdinals {
    scalar: BTreeMap<ValueClass, usize>,
    /// Keyed on the innermost element class of array branches.
    array: BTreeMap<ValueClass, usize>,
    map_key: BTreeMap<ValueClass, usize>,
    map_value: BTreeMap<ValueClass, usize>,
}

impl VariantOrdinals {
    /// Build the tables for a column's branches.
    ///
    /// Only Variant columns get a scalar table. Tuple and Object columns get
    /// the array and map tables. Everything else has empty tables.
    ///
    /// Ordinals are indexes into `branches`. Variant branches are already
    /// stored sorted by type name, the others keep declaration order.
    pub(crate) fn build(datatype: DataType, branches: &[ColumnDescriptor]) -> Self {
        let mut ordinals = VariantOrdinals::default();
        if !matches!(datatype, DataType::Variant | DataType::Tuple | DataType::Object) {
            return ordinals;
        }

        if datatype == DataType::Variant {
            let types: Vec<_> = branches.iter().map(|b| b.data_type()).collect();
            // Collection types hold no scalar classes.
            ordinals.scalar = build_variant_mapping(&types);
        }

        // Later ordinals overwrite earlier ones for shared classes.
        for (ordinal, branch) in branches.iter().enumerate() {
            match branch.data_type() {
                DataType::Array => {
                    if let Some(base) = branch.array_base_descriptor() {
                        insert_all(&mut ordinals.array, base.data_type(), ordinal);
                    }
                }
                DataType::Map => {
                    if let (Some(key), Some(value)) = (branch.key_descriptor(), branch.value_descriptor()) {
                        insert_all(&mut ordinals.map_key, key.data_type(), ordinal);
                        insert_all(&mut ordinals.map_value, value.data_type(), ordinal);
                    }
                }
                _ => (),
            }
        }

        ordinals
    }

    pub fn is_empty(&self) -> bool {
        self.scalar.is_empty() && self.array.is_empty() && self.map_key.is_empty() && self.map_value.is_empty()
    }

    pub fn scalar(&self) -> &BTreeMap<ValueClass, usize> {
        &self.scalar
    }

    pub fn array(&self) -> &BTreeMap<ValueClass, usize> {
        &self.array
    }

    pub fn map_key(&self) -> &BTreeMap<ValueClass, usize> {
        &self.map_key
    }

    pub fn map_value(&self) -> &BTreeMap<ValueClass, usize> {
        &self.map_value
    }

    /// Find the branch ordinal for a runtime value.
    ///
    /// `branches` must be the branches the tables were built from, they're
    /// consulted when a map's key and value point at different branches.
    pub fn resolve(&self, branches: &[ColumnDescriptor], value: &Value) -> Option<usize> {
        match value {
            Value::Null => None,
            Value::Scalar(scalar) => self.scalar.get(&scalar.value_class()).copied(),
            Value::Array(array) => self.array.get(&array.element_class).copied(),
            Value::List(items) => {
                let mut current = items.first()?;
                while let Value::List(inner) = current {
                    current = inner.first()?;
                }
                let class = match current {
                    Value::Scalar(scalar) => scalar.value_class(),
                    Value::Array(array) => array.element_class,
                    _ => return None,
                };
                self.array.get(&class).copied()
            }
            Value::Map(entries) => {
                let (key, value) = entries.iter().find(|(_, v)| !v.is_null())?;
                let key_ordinal = key.scalar_class().and_then(|c| self.map_key.get(&c).copied());
                let value_class = value.scalar_class();
                let value_ordinal = value_class.and_then(|c| self.map_value.get(&c).copied());

                match (key_ordinal, value_ordinal) {
                    (k, v) if k == v => k,
                    (Some(k), Some(v)) => {
                        let key_branch_accepts = branches
                            .get(k)
                            .and_then(|b| b.value_descriptor())
                            .zip(value_class)
                            .is_some_and(|(d, class)| d.data_type().value_classes().contains(&class));
                        if key_branch_accepts {
                            Some(k)
                        } else {
                            Some(v)
                        }
                    }
                    _ => None,
                }
            }
        }
    }
}

fn insert_all(map: &mut BTreeMap<ValueClass, usize>, datatype: DataType, ordinal: usize) {
    for class in datatype.value_classes() {
        map.insert(*class, ordinal);
    }
}
