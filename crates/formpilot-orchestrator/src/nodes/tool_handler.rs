//! Tool_handler node. Tool results never touch `answers` directly; they
//! only feed the LLM a hint to present via `ASK_DROPDOWN`.

use formpilot_sessions::{HistoryEntry, Session};
use serde_json::Value;
use tracing::warn;

use crate::turn::ToolResult;

const HINT_PATHS: &[&[&str]] = &[
    &["name", "english"],
    &["name"],
    &["value", "english"],
    &["value"],
    &["label"],
    &["title"],
    &["text"],
    &["description"],
];

pub fn run(session: &mut Session, tool_results: &[ToolResult]) {
    for result in tool_results {
        if session.pending_tool_name.as_deref() != Some(result.tool_name.as_str()) {
            warn!(tool_name = %result.tool_name, "tool result for unexpected tool; ignoring");
            continue;
        }

        let hints = collect_hints(&result.result);
        let options_hint = serde_json::to_string(&hints).unwrap_or_else(|_| "[]".to_string());
        let result_json = serde_json::to_string(&result.result).unwrap_or_else(|_| "{}".to_string());

        session.conversation_history.push(HistoryEntry::system(format!(
            "Tool {} returned: {}. Usable options: {}. Present these to the user via ASK_DROPDOWN.",
            result.tool_name, result_json, options_hint,
        )));

        session.pending_tool_name = None;
    }
}

fn resolve_path<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = value;
    for key in path {
        cur = cur.as_object()?.get(*key)?;
    }
    Some(cur)
}

fn pick_hint(value: &Value) -> Option<String> {
    HINT_PATHS.iter().find_map(|path| resolve_path(value, path)?.as_str().map(str::to_string))
}

fn collect_hints(value: &Value) -> Vec<String> {
    let mut out = Vec::new();
    collect_hints_into(value, &mut out);
    out
}

fn collect_hints_into(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_hints_into(item, out);
            }
        }
        Value::Object(map) => {
            if let Some(hint) = pick_hint(value) {
                out.push(hint);
            } else {
                for nested in map.values() {
                    collect_hints_into(nested, out);
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn session_awaiting(tool: &str) -> Session {
        let mut session = Session::new("s1".into(), "# Form".into(), vec!["establishment".into()], HashMap::new());
        session.pending_tool_name = Some(tool.to_string());
        session
    }

    #[test]
    fn extracts_nested_english_names() {
        let mut session = session_awaiting("get_establishments");
        let results = vec![ToolResult {
            tool_name: "get_establishments".into(),
            tool_args: None,
            result: json!({"establishments": [{"name": {"english": "Riyadh Tech"}}]}),
        }];
        run(&mut session, &results);

        assert!(session.pending_tool_name.is_none());
        let last = session.conversation_history.last().unwrap();
        assert!(last.content.contains("Riyadh Tech"));
    }

    #[test]
    fn mismatched_tool_name_is_ignored() {
        let mut session = session_awaiting("get_establishments");
        let results = vec![ToolResult {
            tool_name: "get_departments".into(),
            tool_args: None,
            result: json!({}),
        }];
        run(&mut session, &results);

        assert!(session.pending_tool_name.is_some());
        assert!(session.conversation_history.is_empty());
    }
}
