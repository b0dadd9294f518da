use std::collections::HashMap;

use formpilot_core::FieldType;
use tracing::warn;

/// The result of parsing a form-definition markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedForm {
    pub title: String,
    pub required_fields: Vec<String>,
    pub field_types: HashMap<String, FieldType>,
    /// Maps a field identifier to the tool that supplies its options, parsed
    /// from the `Tool Calls` section. Used by the prompt builder's
    /// next-step hint and the "empty dropdown options" guard to know which
    /// `TOOL_CALL` should precede a given `ASK_*`.
    pub field_tools: HashMap<String, String>,
}

/// Parse `form_context_md` into the form title, the ordered list of required
/// field identifiers, and the complete field-type map.
///
/// Looks for a `Field Summary` section containing a markdown table with
/// columns (in any order, matched by header name): `Field` / `Field ID`,
/// `Type`, and `Required`. A field is required when its `Required` cell
/// reads `yes`, `true`, `required`, or `✓` (case-insensitive); absent a
/// `Required` column, every row with a recognized type is treated as
/// required (the common case: a form's field summary only lists the fields
/// it actually needs from the user).
pub fn parse_form(form_context_md: &str) -> ParsedForm {
    let title = extract_title(form_context_md);
    let (required_fields, field_types) = extract_fields(form_context_md);
    let field_tools = extract_field_tools(form_context_md);
    ParsedForm {
        title,
        required_fields,
        field_types,
        field_tools,
    }
}

/// Parse the `Tool Calls` section's table into a `field_id -> tool_name` map.
fn extract_field_tools(md: &str) -> HashMap<String, String> {
    let Some(section) = crate::condense::find_section(md, "Tool Calls") else {
        return HashMap::new();
    };

    let rows = table_rows(&section);
    let Some(header) = rows.first() else {
        return HashMap::new();
    };

    let idx_of = |names: &[&str]| -> Option<usize> {
        header.iter().position(|h| {
            let h = h.to_ascii_lowercase();
            names.iter().any(|n| h == *n)
        })
    };

    let Some(field_idx) = idx_of(&["field", "field id", "field_id"]) else {
        return HashMap::new();
    };
    let Some(tool_idx) = idx_of(&["tool", "tool name", "tool_name"]) else {
        return HashMap::new();
    };

    let mut map = HashMap::new();
    for row in rows.iter().skip(1) {
        let (Some(field_id), Some(tool_name)) = (row.get(field_idx), row.get(tool_idx)) else {
            continue;
        };
        if field_id.is_empty() || tool_name.is_empty() {
            continue;
        }
        map.insert(field_id.clone(), tool_name.clone());
    }
    map
}

/// Parse every `|`-delimited row of a markdown section into cell vectors,
/// skipping the `---` separator row.
fn table_rows(section: &str) -> Vec<Vec<String>> {
    section
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            if !trimmed.starts_with('|') {
                return None;
            }
            let cells: Vec<String> = trimmed
                .trim_matches('|')
                .split('|')
                .map(|c| c.trim().to_string())
                .collect();
            if cells.iter().all(|c| c.chars().all(|ch| ch == '-' || ch == ':')) {
                return None;
            }
            Some(cells)
        })
        .collect()
}

/// The text of the first top-level (`# `) heading, or a generic fallback.
fn extract_title(md: &str) -> String {
    for line in md.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("# ") {
            return rest.trim().to_string();
        }
    }
    "Form".to_string()
}

/// Find the `Field Summary` section and parse its markdown table.
fn extract_fields(md: &str) -> (Vec<String>, HashMap<String, FieldType>) {
    let section = match crate::condense::find_section(md, "Field Summary") {
        Some(s) => s,
        None => {
            warn!("form_context_md has no 'Field Summary' section; no fields extracted");
            return (Vec::new(), HashMap::new());
        }
    };

    let rows = table_rows(&section);

    if rows.is_empty() {
        return (Vec::new(), HashMap::new());
    }

    let header = &rows[0];
    let idx_of = |names: &[&str]| -> Option<usize> {
        header.iter().position(|h| {
            let h = h.to_ascii_lowercase();
            names.iter().any(|n| h == *n)
        })
    };

    let field_idx = idx_of(&["field", "field id", "field_id", "id"]);
    let type_idx = idx_of(&["type", "field type"]);
    let required_idx = idx_of(&["required", "required?"]);

    let Some(field_idx) = field_idx else {
        warn!("Field Summary table has no Field/Field ID column");
        return (Vec::new(), HashMap::new());
    };

    let mut required_fields = Vec::new();
    let mut field_types = HashMap::new();

    for row in rows.iter().skip(1) {
        let Some(field_id) = row.get(field_idx).map(|s| s.trim()) else {
            continue;
        };
        if field_id.is_empty() {
            continue;
        }

        let field_type = type_idx
            .and_then(|i| row.get(i))
            .and_then(|t| FieldType::parse(t))
            .unwrap_or(FieldType::Text);

        let is_required = match required_idx {
            Some(i) => row
                .get(i)
                .map(|v| is_truthy(v))
                .unwrap_or(true),
            None => true,
        };

        field_types.insert(field_id.to_string(), field_type);
        if is_required {
            required_fields.push(field_id.to_string());
        }
    }

    (required_fields, field_types)
}

fn is_truthy(cell: &str) -> bool {
    matches!(
        cell.trim().to_ascii_lowercase().as_str(),
        "yes" | "true" | "required" | "✓" | "x"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEAVE_FORM: &str = r#"# Annual Leave Request

## Form Overview
A short form for requesting leave.

## Field Summary
| Field ID | Label | Type | Required |
|---|---|---|---|
| leave_type | Leave Type | dropdown | yes |
| start_date | Start Date | date | yes |
| end_date | End Date | date | yes |
| notes | Notes | text | no |

## Chat Agent Instructions
Be concise.
"#;

    #[test]
    fn extracts_title() {
        assert_eq!(extract_title(LEAVE_FORM), "Annual Leave Request");
    }

    #[test]
    fn extracts_required_fields_in_order() {
        let parsed = parse_form(LEAVE_FORM);
        assert_eq!(
            parsed.required_fields,
            vec!["leave_type", "start_date", "end_date"]
        );
        assert_eq!(parsed.field_types.len(), 4);
        assert_eq!(parsed.field_types["start_date"], FieldType::Date);
        assert_eq!(parsed.field_types["leave_type"], FieldType::Dropdown);
    }

    #[test]
    fn no_field_summary_yields_empty() {
        let parsed = parse_form("# Just a title\n\nNo table here.");
        assert!(parsed.required_fields.is_empty());
        assert!(parsed.field_types.is_empty());
    }

    #[test]
    fn missing_title_falls_back() {
        assert_eq!(extract_title("no heading at all"), "Form");
    }

    #[test]
    fn zero_required_fields_form() {
        let md = "# Empty Form\n\n## Field Summary\n| Field ID | Type | Required |\n|---|---|---|\n";
        let parsed = parse_form(md);
        assert!(parsed.required_fields.is_empty());
    }

    #[test]
    fn extracts_field_tools() {
        let md = "# Injury Report\n\n## Tool Calls\n| Field ID | Tool Name |\n|---|---|\n| establishment | get_establishments |\n\n## Field Summary\n| Field ID | Type | Required |\n|---|---|---|\n| establishment | dropdown | yes |\n";
        let parsed = parse_form(md);
        assert_eq!(
            parsed.field_tools.get("establishment"),
            Some(&"get_establishments".to_string())
        );
    }
}
