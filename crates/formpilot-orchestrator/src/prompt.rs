//! Prompt construction. The catalog/rules/examples are fixed constants
//! rather than built up inline so prompt tests can diff against them
//! directly.

use std::collections::HashMap;

use formpilot_core::Action;
use formpilot_sessions::Session;

pub const IDENTITY_AND_CONTRACT: &str = "You are a JSON-only API. Every response must be a single JSON object matching exactly one of the nine action shapes below; no prose outside the JSON object.";

pub const ACTION_CATALOG: &str = r#"Action shapes (the "action" key selects one; every other key is required unless marked optional):
- MESSAGE {text}
- ASK_TEXT {field_id, label, message?, accepted?}
- ASK_DROPDOWN {field_id, label, options[], message?, accepted?}
- ASK_CHECKBOX {field_id, label, options[], message?, accepted?}
- ASK_DATE {field_id, label, message?, accepted?}
- ASK_DATETIME {field_id, label, message?, accepted?}
- ASK_LOCATION {field_id, label, message?, accepted?}
- TOOL_CALL {tool_name, tool_args, message?}
- FORM_COMPLETE {data, message?}

`accepted` is {field_id, value}: when the user's reply answers a different field than the one you're about to ask next, bundle it here instead of emitting a bare MESSAGE first."#;

pub const RULES: &str = r#"Rules:
- Ask exactly one field per turn.
- Never re-ask a field already present in the current answer set.
- Never fabricate a value you were not given.
- For fields that need external data, emit TOOL_CALL first; only emit the matching ASK_* action once tool results have come back on a later turn.
- Use `accepted` on an ASK_* action only for a field other than the one it asks; never duplicate the action's own field_id there."#;

pub const CONTEXT_VALIDATION_EXAMPLES: &str = r#"Context-validation examples (for a field just asked with ASK_TEXT):
- Accept: the user answered "I broke my arm lifting boxes" for injury_description. That is a real answer — move on to the next missing field.
- Reject: the user answered "qwerty" for injury_description. That is gibberish — re-ask the same field_id."#;

/// Build the `conversation` node's system prompt.
pub fn build_conversation_prompt(session: &Session, field_tools: &HashMap<String, String>) -> String {
    let form_reference = formpilot_forms::condense(&session.form_context_md);
    let missing = session.missing_fields();
    let answers_json = serde_json::to_string(&session.answers).unwrap_or_else(|_| "{}".to_string());
    let next_step_hint = build_next_step_hint(&missing, field_tools);

    format!(
        "{identity}\n\n{catalog}\n\n{rules}\n\n{examples}\n\n## Form reference data\n{form_reference}\n\n## Current state\nAnswers so far: {answers_json}\nStill missing (in order): {missing:?}\n{hint}",
        identity = IDENTITY_AND_CONTRACT,
        catalog = ACTION_CATALOG,
        rules = RULES,
        examples = CONTEXT_VALIDATION_EXAMPLES,
        hint = next_step_hint,
    )
}

fn build_next_step_hint(missing: &[String], field_tools: &HashMap<String, String>) -> String {
    match missing.first() {
        None => "Next step: every required field is answered — emit FORM_COMPLETE.".to_string(),
        Some(next) => match field_tools.get(next) {
            Some(tool) => format!(
                "Next step: ask `{next}`, but first emit TOOL_CALL for `{tool}` to fetch its options — do not emit ASK_* for `{next}` until tool results have been returned."
            ),
            None => format!("Next step: ask `{next}` next (no preceding TOOL_CALL required)."),
        },
    }
}

/// Build the `extraction` node's system prompt — a stripped-down version of
/// the conversation prompt.
pub fn build_extraction_prompt(session: &Session) -> String {
    let field_list: Vec<String> = session
        .required_fields
        .iter()
        .map(|f| {
            let ty = session
                .field_types
                .get(f)
                .map(|t| t.as_str())
                .unwrap_or("text");
            format!("- {f}: {ty}")
        })
        .collect();

    format!(
        "{identity}\n\nExtract as many of the following required fields as the user's message explicitly states. \
Do not guess or infer values the user did not state. Output dates as YYYY-MM-DD and datetimes as \
YYYY-MM-DDTHH:MM:SS. Omit any field you are not confident about.\n\nRequired fields:\n{fields}\n\n\
Respond with a single JSON object: {{\"intent\":\"multi_answer\",\"answers\":{{field_id: value, ...}},\"message\":\"...\"}}. \
If the user's message is itself better answered with one of the nine action shapes directly (for example, it asks a \
question unrelated to the form), respond with that action object instead.",
        identity = IDENTITY_AND_CONTRACT,
        fields = field_list.join("\n"),
    )
}

/// Render an `Action` to the JSON text stored verbatim in conversation
/// history.
pub fn action_to_history_json(action: &Action) -> String {
    serde_json::to_string(action).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;

    fn session_with(required: Vec<&str>) -> Session {
        Session::new(
            "s1".into(),
            "# Form".into(),
            required.into_iter().map(String::from).collect(),
            Map::new(),
        )
    }

    #[test]
    fn hint_names_next_missing_field() {
        let session = session_with(vec!["a", "b"]);
        let prompt = build_conversation_prompt(&session, &Map::new());
        assert!(prompt.contains("ask `a` next"));
    }

    #[test]
    fn hint_requires_tool_call_first_when_mapped() {
        let session = session_with(vec!["establishment"]);
        let mut tools = Map::new();
        tools.insert("establishment".to_string(), "get_establishments".to_string());
        let prompt = build_conversation_prompt(&session, &tools);
        assert!(prompt.contains("TOOL_CALL for `get_establishments`"));
    }

    #[test]
    fn hint_says_form_complete_when_nothing_missing() {
        let session = session_with(vec![]);
        let prompt = build_conversation_prompt(&session, &Map::new());
        assert!(prompt.contains("emit FORM_COMPLETE"));
    }

    #[test]
    fn extraction_prompt_lists_required_fields_and_types() {
        let mut session = session_with(vec!["start_date"]);
        session.field_types.insert("start_date".into(), formpilot_core::FieldType::Date);
        let prompt = build_extraction_prompt(&session);
        assert!(prompt.contains("start_date: date"));
        assert!(prompt.contains("multi_answer"));
    }
}
