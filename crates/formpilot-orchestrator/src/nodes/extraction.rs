//! Extraction node. Runs at most once per session; never fails the turn.

use formpilot_core::{Action, FieldType};
use formpilot_llm::{ChatMessage, ChatRole, LlmClient};
use formpilot_sessions::Session;
use serde_json::Value;
use tracing::warn;

use crate::{date, json_extract, prompt};

pub enum ExtractionOutcome {
    /// The LLM's reply was itself one of the nine action shapes, not a
    /// `multi_answer` envelope — treat as a pre-empted turn.
    DirectAction(Action),
    /// Extraction filled every required field; `finalize` should emit
    /// `FORM_COMPLETE` without a `conversation` round trip.
    Complete,
    /// Zero or partial answers extracted; ask for the rest via `conversation`.
    NeedsConversation,
}

pub async fn run(session: &mut Session, user_message: &str, llm: &dyn LlmClient) -> ExtractionOutcome {
    session.initial_extraction_done = true;

    let system_prompt = prompt::build_extraction_prompt(session);
    let history = vec![ChatMessage { role: ChatRole::User, content: user_message.to_string() }];

    let text = match llm.complete(&system_prompt, &history).await {
        Ok(text) => text,
        Err(err) => {
            warn!(error = %err, "llm transport error in extraction node");
            return terminal_outcome(session);
        }
    };

    let Some(value) = json_extract::extract_json(&text) else {
        return terminal_outcome(session);
    };

    if value.get("intent").and_then(Value::as_str) == Some("multi_answer") {
        if let Some(answers) = value.get("answers").and_then(Value::as_object) {
            for (field_id, raw) in answers {
                if !session.required_fields.contains(field_id) {
                    continue;
                }
                if let Some(accepted) = accept_value(session, field_id, raw) {
                    session.answers.insert(field_id.clone(), accepted);
                }
            }
        }
        return terminal_outcome(session);
    }

    match serde_json::from_value::<Action>(value) {
        Ok(action) => ExtractionOutcome::DirectAction(action),
        Err(_) => terminal_outcome(session),
    }
}

fn accept_value(session: &Session, field_id: &str, raw: &Value) -> Option<Value> {
    match session.field_types.get(field_id) {
        Some(FieldType::Date) => raw.as_str().and_then(date::validate_date).map(Value::String),
        Some(FieldType::DateTime) => raw.as_str().and_then(date::validate_datetime).map(Value::String),
        _ => Some(raw.clone()),
    }
}

fn terminal_outcome(session: &Session) -> ExtractionOutcome {
    if session.all_required_present() {
        ExtractionOutcome::Complete
    } else {
        ExtractionOutcome::NeedsConversation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formpilot_llm::StubLlmClient;

    fn session_with(fields: Vec<(&str, FieldType)>) -> Session {
        let required = fields.iter().map(|(id, _)| id.to_string()).collect();
        let types = fields.into_iter().map(|(id, ty)| (id.to_string(), ty)).collect();
        Session::new("s1".into(), "# Form".into(), required, types)
    }

    #[tokio::test]
    async fn drops_unparseable_date_silently() {
        let mut session = session_with(vec![("start_date", FieldType::Date)]);
        let stub = StubLlmClient::new(vec![
            r#"{"intent":"multi_answer","answers":{"start_date":"asdf"}}"#.to_string(),
        ]);
        let outcome = run(&mut session, "whenever works", &stub).await;
        assert!(session.answers.is_empty());
        assert!(matches!(outcome, ExtractionOutcome::NeedsConversation));
    }

    #[tokio::test]
    async fn complete_when_all_fields_extracted() {
        let mut session = session_with(vec![("leave_type", FieldType::Dropdown), ("start_date", FieldType::Date)]);
        let stub = StubLlmClient::new(vec![
            r#"{"intent":"multi_answer","answers":{"leave_type":"Annual","start_date":"2026-03-01"}}"#.to_string(),
        ]);
        let outcome = run(&mut session, "Annual leave starting 2026-03-01", &stub).await;
        assert!(matches!(outcome, ExtractionOutcome::Complete));
        assert_eq!(session.answers["start_date"], Value::String("2026-03-01".to_string()));
    }

    #[tokio::test]
    async fn non_json_reply_extracts_nothing() {
        let mut session = session_with(vec![("leave_type", FieldType::Dropdown)]);
        let stub = StubLlmClient::new(vec!["sorry, I don't understand".to_string()]);
        let outcome = run(&mut session, "huh", &stub).await;
        assert!(session.answers.is_empty());
        assert!(matches!(outcome, ExtractionOutcome::NeedsConversation));
    }

    #[tokio::test]
    async fn ignores_fields_not_in_the_form() {
        let mut session = session_with(vec![("leave_type", FieldType::Dropdown)]);
        let stub = StubLlmClient::new(vec![
            r#"{"intent":"multi_answer","answers":{"leave_type":"Annual","unrelated":"x"}}"#.to_string(),
        ]);
        let _ = run(&mut session, "Annual leave", &stub).await;
        assert!(!session.answers.contains_key("unrelated"));
    }
}
