use serde::{Deserialize, Serialize};

/// Declared type of a user-defined client field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomFieldType {
    Text,
    TextArea,
    Email,
    Phone,
    Url,
    Number,
    Decimal,
    Currency,
    Date,
    DateTime,
    Checkbox,
    Dropdown,
    MultiSelect,
}

/// Definition of a user-configurable field, as stored by the custom field
/// collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomFieldDefinition {
    pub name: String,
    pub label: String,
    pub field_type: CustomFieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default = "default_true")]
    pub active: bool,
    /// Allowed choices for dropdown and multi-select fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl CustomFieldDefinition {
    pub fn new(name: impl Into<String>, label: impl Into<String>, field_type: CustomFieldType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            field_type,
            required: false,
            active: true,
            options: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}
