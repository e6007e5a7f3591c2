//! Field name → value extraction table.
//!
//! Built once per engine from the native schema and the active dynamic
//! definitions. Native names shadow dynamic fields of the same name; names
//! missing from the table resolve to [`FieldValue::Null`].

use std::collections::HashMap;

use tally_core::{ClientRecord, CustomFieldDefinition, FieldValue};

use crate::catalog::{FieldCatalog, NATIVE_FIELDS};

type NativeExtractor = fn(&ClientRecord) -> FieldValue;

#[derive(Clone)]
enum Accessor {
    Native(NativeExtractor),
    Dynamic,
}

impl std::fmt::Debug for Accessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Accessor::Native(_) => "Native",
            Accessor::Dynamic => "Dynamic",
        })
    }
}

fn native_extractor(name: &str) -> Option<NativeExtractor> {
    let extractor: NativeExtractor = match name {
        "id" => |r: &ClientRecord| FieldValue::Text(r.id.to_string()),
        "name" => |r: &ClientRecord| FieldValue::Text(r.name.clone()),
        "notes" => |r: &ClientRecord| FieldValue::from(r.notes.clone()),
        "date_of_birth" => |r: &ClientRecord| {
            r.date_of_birth.map(FieldValue::from_date).unwrap_or(FieldValue::Null)
        },
        "phone" => |r: &ClientRecord| FieldValue::from(r.phone.clone()),
        "email" => |r: &ClientRecord| FieldValue::from(r.email.clone()),
        "created_at" => |r: &ClientRecord| FieldValue::Timestamp(r.created_at),
        "updated_at" => |r: &ClientRecord| FieldValue::Timestamp(r.updated_at),
        _ => return None,
    };
    Some(extractor)
}

/// Explicit accessor table for native and dynamic client fields.
#[derive(Debug, Clone)]
pub struct FieldAccessors {
    table: HashMap<String, Accessor>,
}

impl Default for FieldAccessors {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl FieldAccessors {
    /// Table over the native attributes plus every active definition.
    pub fn new(definitions: &[CustomFieldDefinition]) -> Self {
        let mut table = HashMap::new();

        for (name, _, _) in NATIVE_FIELDS {
            if let Some(extract) = native_extractor(name) {
                table.insert(name.to_owned(), Accessor::Native(extract));
            }
        }

        for def in definitions.iter().filter(|d| d.active) {
            table.entry(def.name.clone()).or_insert(Accessor::Dynamic);
        }

        Self { table }
    }

    pub fn from_catalog(catalog: &FieldCatalog<'_>) -> Self {
        Self::new(&catalog.active_definitions())
    }

    /// Resolve `field` on `record`. Unknown fields and missing dynamic
    /// values are `Null`.
    pub fn resolve(&self, record: &ClientRecord, field: &str) -> FieldValue {
        match self.table.get(field) {
            Some(Accessor::Native(extract)) => extract(record),
            Some(Accessor::Dynamic) => record
                .custom_field(field)
                .cloned()
                .unwrap_or(FieldValue::Null),
            None => FieldValue::Null,
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.table.contains_key(field)
    }
}
