use serde::{Deserialize, Serialize};

/// The presentation/validation kind of a form field.
///
/// `Time` and `File` are recognized field types but have no dedicated
/// `ASK_*` action or validation strategy of their own — they fall through to
/// the context-validated (`ASK_TEXT`-style) acceptance path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Dropdown,
    Checkbox,
    Date,
    DateTime,
    Location,
    Time,
    File,
}

impl FieldType {
    /// Parse a field-type token as it appears in form markdown
    /// (e.g. a `Field Summary` table cell or a `Type: dropdown` line).
    pub fn parse(token: &str) -> Option<Self> {
        let normalized = token.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "text" | "string" => Some(FieldType::Text),
            "dropdown" | "select" | "choice" => Some(FieldType::Dropdown),
            "checkbox" | "multiselect" | "multi_select" => Some(FieldType::Checkbox),
            "date" => Some(FieldType::Date),
            "datetime" | "date_time" => Some(FieldType::DateTime),
            "location" | "geo" => Some(FieldType::Location),
            "time" => Some(FieldType::Time),
            "file" | "upload" | "attachment" => Some(FieldType::File),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Dropdown => "dropdown",
            FieldType::Checkbox => "checkbox",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
            FieldType::Location => "location",
            FieldType::Time => "time",
            FieldType::File => "file",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
