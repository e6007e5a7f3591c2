//! Queryable field catalog: native client attributes followed by the
//! active user-defined fields.

use serde::{Deserialize, Serialize};
use tracing::warn;

use tally_core::{CustomFieldDefinition, CustomFieldType, TallyError};

/// Semantic type of a queryable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    Number,
    Date,
    Boolean,
    Enumerated,
}

impl From<CustomFieldType> for FieldKind {
    fn from(t: CustomFieldType) -> Self {
        match t {
            CustomFieldType::Number | CustomFieldType::Decimal | CustomFieldType::Currency => {
                FieldKind::Number
            }
            CustomFieldType::Date | CustomFieldType::DateTime => FieldKind::Date,
            CustomFieldType::Checkbox => FieldKind::Boolean,
            CustomFieldType::Dropdown | CustomFieldType::MultiSelect => FieldKind::Enumerated,
            CustomFieldType::Text
            | CustomFieldType::TextArea
            | CustomFieldType::Email
            | CustomFieldType::Phone
            | CustomFieldType::Url => FieldKind::Text,
        }
    }
}

/// A field that can be selected, filtered, grouped or ordered on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    /// True for the fixed client attributes.
    pub native: bool,
}

impl FieldDescriptor {
    fn native(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_owned(),
            label: label.to_owned(),
            kind,
            native: true,
        }
    }
}

/// Native attribute names, in catalog order.
pub const NATIVE_FIELDS: [(&str, &str, FieldKind); 8] = [
    ("id", "Client ID", FieldKind::Text),
    ("name", "Name", FieldKind::Text),
    ("notes", "Notes", FieldKind::Text),
    ("date_of_birth", "Date of Birth", FieldKind::Date),
    ("phone", "Phone", FieldKind::Text),
    ("email", "Email", FieldKind::Text),
    ("created_at", "Created", FieldKind::Date),
    ("updated_at", "Updated", FieldKind::Date),
];

/// Supplier of user-defined field definitions.
pub trait FieldDefinitionSource {
    fn field_definitions(&self) -> Result<Vec<CustomFieldDefinition>, TallyError>;
}

impl FieldDefinitionSource for Vec<CustomFieldDefinition> {
    fn field_definitions(&self) -> Result<Vec<CustomFieldDefinition>, TallyError> {
        Ok(self.clone())
    }
}

/// Lists queryable fields from a definition source.
pub struct FieldCatalog<'a> {
    source: &'a dyn FieldDefinitionSource,
}

impl<'a> FieldCatalog<'a> {
    pub fn new(source: &'a dyn FieldDefinitionSource) -> Self {
        Self { source }
    }

    /// Active dynamic definitions. Failures are logged and yield an empty list.
    pub fn active_definitions(&self) -> Vec<CustomFieldDefinition> {
        match self.source.field_definitions() {
            Ok(defs) => defs.into_iter().filter(|d| d.active).collect(),
            Err(e) => {
                warn!(error = %e, "failed to load custom field definitions; using native fields only");
                Vec::new()
            }
        }
    }

    /// Native descriptors followed by every active dynamic field.
    pub fn list_fields(&self) -> Vec<FieldDescriptor> {
        let mut fields: Vec<FieldDescriptor> = NATIVE_FIELDS
            .iter()
            .map(|(name, label, kind)| FieldDescriptor::native(name, label, *kind))
            .collect();

        fields.extend(self.active_definitions().into_iter().map(|d| FieldDescriptor {
            kind: d.field_type.into(),
            name: d.name,
            label: d.label,
            native: false,
        }));

        fields
    }
}
