//! Graph driver. One turn = one traversal from `START` to `END`, chosen by
//! the routing rule evaluated once at turn start.

use std::collections::HashMap;

use formpilot_core::Action;
use formpilot_llm::LlmClient;
use formpilot_sessions::{HistoryEntry, Session};

use crate::guards::Guard;
use crate::nodes::{conversation, extraction, finalize, greeting, tool_handler, validate_input};
use crate::nodes::extraction::ExtractionOutcome;
use crate::turn::TurnInput;

/// The collaborators a turn needs beyond `Session` itself — held by the
/// caller (the transport adapter) and threaded through unchanged.
pub struct TurnDeps<'a> {
    pub llm: &'a dyn LlmClient,
    pub field_tools: &'a HashMap<String, String>,
    pub guards: &'a [Box<dyn Guard>],
}

/// Run exactly one turn, mutating `session` in place and returning the
/// emitted action.
pub async fn run_turn(session: &mut Session, input: TurnInput, deps: &TurnDeps<'_>) -> Action {
    session.touch();

    let is_greeting_turn = session.conversation_history.is_empty() && input.user_message.is_empty();
    if is_greeting_turn {
        return greeting::run(session);
    }

    let mut user_message_added = false;

    if !input.tool_results.is_empty() {
        record_user_message(session, &input.user_message, &mut user_message_added);
        tool_handler::run(session, &input.tool_results);
        let action = conversation::run(session, deps.llm, deps.field_tools, deps.guards).await;
        return finalize::run(session, action);
    }

    if session.pending_field_id.is_some() && !input.user_message.is_empty() {
        record_user_message(session, &input.user_message, &mut user_message_added);
        validate_input::run(session, &input.user_message);
        let action = conversation::run(session, deps.llm, deps.field_tools, deps.guards).await;
        return finalize::run(session, action);
    }

    if !session.initial_extraction_done && !input.user_message.is_empty() {
        record_user_message(session, &input.user_message, &mut user_message_added);
        return match extraction::run(session, &input.user_message, deps.llm).await {
            ExtractionOutcome::DirectAction(action) => finalize::run(session, action),
            ExtractionOutcome::Complete => {
                let action = Action::FormComplete { data: session.answers.clone(), message: None };
                finalize::run(session, action)
            }
            ExtractionOutcome::NeedsConversation => {
                let action = conversation::run(session, deps.llm, deps.field_tools, deps.guards).await;
                finalize::run(session, action)
            }
        };
    }

    record_user_message(session, &input.user_message, &mut user_message_added);
    let action = conversation::run(session, deps.llm, deps.field_tools, deps.guards).await;
    finalize::run(session, action)
}

fn record_user_message(session: &mut Session, user_message: &str, added: &mut bool) {
    if !user_message.is_empty() && !*added {
        session.conversation_history.push(HistoryEntry::user(user_message.to_string()));
        *added = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guards::default_guards;
    use crate::turn::ToolResult;
    use formpilot_llm::StubLlmClient;

    fn leave_form() -> &'static str {
        "# Annual Leave Request\n\n## Field Summary\n| Field ID | Type | Required |\n|---|---|---|\n\
| leave_type | dropdown | yes |\n| start_date | date | yes |\n| end_date | date | yes |\n"
    }

    fn leave_session() -> Session {
        let parsed = formpilot_forms::parse_form(leave_form());
        Session::new("s1".into(), leave_form().into(), parsed.required_fields, parsed.field_types)
    }

    #[tokio::test]
    async fn empty_message_on_new_session_greets() {
        let mut session = leave_session();
        let stub = StubLlmClient::new(vec![]);
        let guards = default_guards();
        let deps = TurnDeps { llm: &stub, field_tools: &HashMap::new(), guards: &guards };

        let action = run_turn(&mut session, TurnInput::message(""), &deps).await;

        assert_eq!(action.kind(), "MESSAGE");
        assert!(session.answers.is_empty());
        assert!(!session.initial_extraction_done);
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn bulk_extraction_complete_emits_form_complete() {
        let mut session = leave_session();
        session.conversation_history.push(HistoryEntry::assistant("greeting"));
        let stub = StubLlmClient::new(vec![
            r#"{"intent":"multi_answer","answers":{"leave_type":"Annual","start_date":"2026-03-01","end_date":"2026-03-10"}}"#.to_string(),
        ]);
        let guards = default_guards();
        let deps = TurnDeps { llm: &stub, field_tools: &HashMap::new(), guards: &guards };

        let action = run_turn(&mut session, TurnInput::message("Annual leave from 2026-03-01 to 2026-03-10"), &deps).await;

        let Action::FormComplete { data, .. } = action else { panic!("expected FORM_COMPLETE") };
        assert_eq!(data["leave_type"], serde_json::json!("Annual"));
        assert_eq!(data["end_date"], serde_json::json!("2026-03-10"));
    }

    #[tokio::test]
    async fn bulk_extraction_partial_then_conversation_asks_next_field() {
        let mut session = leave_session();
        session.conversation_history.push(HistoryEntry::assistant("greeting"));
        let stub = StubLlmClient::new(vec![
            r#"{"intent":"multi_answer","answers":{"leave_type":"Annual","start_date":"2026-03-01"}}"#.to_string(),
            r#"{"action":"ASK_DATE","field_id":"end_date","label":"End Date"}"#.to_string(),
        ]);
        let guards = default_guards();
        let deps = TurnDeps { llm: &stub, field_tools: &HashMap::new(), guards: &guards };

        let action = run_turn(&mut session, TurnInput::message("Annual leave starting 2026-03-01"), &deps).await;

        assert_eq!(action.kind(), "ASK_DATE");
        assert_eq!(action.field_id(), Some("end_date"));
        assert_eq!(session.answers.len(), 2);
    }

    #[tokio::test]
    async fn invalid_date_answer_reasks_same_field() {
        let mut session = leave_session();
        session.answers.insert("leave_type".into(), serde_json::json!("Annual"));
        session.answers.insert("start_date".into(), serde_json::json!("2026-03-01"));
        session.initial_extraction_done = true;
        session.pending_field_id = Some("end_date".into());
        session.pending_action_type = Some("ASK_DATE".into());

        let stub = StubLlmClient::new(vec![r#"{"action":"ASK_DATE","field_id":"end_date","label":"End Date"}"#.to_string()]);
        let guards = default_guards();
        let deps = TurnDeps { llm: &stub, field_tools: &HashMap::new(), guards: &guards };

        let action = run_turn(&mut session, TurnInput::message("asdf"), &deps).await;

        assert_eq!(action.field_id(), Some("end_date"));
        assert_eq!(session.answers.len(), 2);
    }

    #[tokio::test]
    async fn tool_results_route_through_tool_handler() {
        let parsed = formpilot_forms::parse_form(
            "# Injury Report\n\n## Tool Calls\n| Field ID | Tool Name |\n|---|---|\n| establishment | get_establishments |\n\n\
## Field Summary\n| Field ID | Type | Required |\n|---|---|---|\n| establishment | dropdown | yes |\n",
        );
        let mut session = Session::new(
            "s1".into(),
            "# Injury Report".into(),
            parsed.required_fields.clone(),
            parsed.field_types.clone(),
        );
        session.initial_extraction_done = true;
        session.pending_tool_name = Some("get_establishments".into());

        let stub = StubLlmClient::new(vec![
            r#"{"action":"ASK_DROPDOWN","field_id":"establishment","label":"Establishment","options":["Riyadh Tech"]}"#.to_string(),
        ]);
        let guards = default_guards();
        let deps = TurnDeps { llm: &stub, field_tools: &parsed.field_tools, guards: &guards };

        let results = vec![ToolResult {
            tool_name: "get_establishments".into(),
            tool_args: None,
            result: serde_json::json!({"establishments": [{"name": {"english": "Riyadh Tech"}}]}),
        }];

        let action = run_turn(&mut session, TurnInput::tool_results(results), &deps).await;

        assert_eq!(action.kind(), "ASK_DROPDOWN");
        assert_eq!(action.options(), Some(&["Riyadh Tech".to_string()][..]));
        assert!(session.pending_tool_name.is_none());
    }

    #[tokio::test]
    async fn text_rejection_leaves_answers_unchanged() {
        let parsed = formpilot_forms::parse_form(
            "# Injury Report\n\n## Field Summary\n| Field ID | Type | Required |\n|---|---|---|\n\
| injury_description | text | yes |\n",
        );
        let mut session = Session::new("s1".into(), "# Injury Report".into(), parsed.required_fields, parsed.field_types);
        session.initial_extraction_done = true;
        session.pending_field_id = Some("injury_description".into());
        session.pending_action_type = Some("ASK_TEXT".into());

        let stub = StubLlmClient::new(vec![
            r#"{"action":"ASK_TEXT","field_id":"injury_description","label":"Describe the injury"}"#.to_string(),
        ]);
        let guards = default_guards();
        let deps = TurnDeps { llm: &stub, field_tools: &HashMap::new(), guards: &guards };

        let action = run_turn(&mut session, TurnInput::message("qwerty"), &deps).await;

        assert_eq!(action.kind(), "ASK_TEXT");
        assert!(session.answers.is_empty());
        assert!(session.pending_text_value.is_none());
    }

    #[tokio::test]
    async fn zero_required_fields_completes_on_first_non_greeting_turn() {
        let mut session = Session::new("s1".into(), "# Empty Form".into(), vec![], HashMap::new());
        session.conversation_history.push(HistoryEntry::assistant("greeting"));
        let stub = StubLlmClient::new(vec![r#"{"action":"FORM_COMPLETE","data":{}}"#.to_string()]);
        let guards = default_guards();
        let deps = TurnDeps { llm: &stub, field_tools: &HashMap::new(), guards: &guards };

        let action = run_turn(&mut session, TurnInput::message("let's go"), &deps).await;

        assert_eq!(action.kind(), "FORM_COMPLETE");
    }
}
