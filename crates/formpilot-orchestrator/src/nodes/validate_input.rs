//! Validate_input node. Runs only when a prior turn emitted an `ASK_*` and
//! the current message answers it.

use formpilot_sessions::{HistoryEntry, Session};
use serde_json::Value;

use crate::date;

pub fn run(session: &mut Session, user_message: &str) {
    let Some(field_id) = session.pending_field_id.clone() else { return };
    let Some(action_type) = session.pending_action_type.clone() else { return };

    match action_type.as_str() {
        "ASK_DATE" => match date::validate_date(user_message) {
            Some(normalized) => {
                session.answers.insert(field_id, Value::String(normalized));
                session.clear_pending_ask();
            }
            None => retry_message(session, &field_id, "date"),
        },
        "ASK_DATETIME" => match date::validate_datetime(user_message) {
            Some(normalized) => {
                session.answers.insert(field_id, Value::String(normalized));
                session.clear_pending_ask();
            }
            None => retry_message(session, &field_id, "date and time"),
        },
        "ASK_DROPDOWN" => {
            session.answers.insert(field_id, Value::String(user_message.trim().to_string()));
            session.clear_pending_ask();
        }
        "ASK_CHECKBOX" => {
            let selected: Vec<Value> = user_message
                .split(',')
                .map(|s| Value::String(s.trim().to_string()))
                .filter(|v| v.as_str().map(|s| !s.is_empty()).unwrap_or(false))
                .collect();
            session.answers.insert(field_id, Value::Array(selected));
            session.clear_pending_ask();
        }
        "ASK_LOCATION" => {
            let stored = serde_json::from_str::<Value>(user_message)
                .ok()
                .and_then(|v| date::validate_location(&v).map(|(lat, lng)| serde_json::json!({"lat": lat, "lng": lng})))
                .unwrap_or_else(|| Value::String(user_message.trim().to_string()));
            session.answers.insert(field_id, stored);
            session.clear_pending_ask();
        }
        "ASK_TEXT" => {
            session.pending_text_value = Some(user_message.to_string());
            session.pending_text_field_id = Some(field_id.clone());
            session.conversation_history.push(HistoryEntry::system(format!(
                "VALIDATE this answer for {field_id}: {user_message}. If irrelevant or gibberish, re-ask the same field; otherwise move to the next field."
            )));
        }
        _ => {}
    }
}

fn retry_message(session: &mut Session, field_id: &str, kind: &str) {
    session.conversation_history.push(HistoryEntry::system(format!(
        "The previous answer for {field_id} could not be parsed as a {kind}; ask again briefly."
    )));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn pending_date_session() -> Session {
        let mut session = Session::new("s1".into(), "# Form".into(), vec!["end_date".into()], HashMap::new());
        session.pending_field_id = Some("end_date".into());
        session.pending_action_type = Some("ASK_DATE".into());
        session
    }

    #[test]
    fn valid_date_is_stored_and_clears_pending() {
        let mut session = pending_date_session();
        run(&mut session, "2026-03-10");
        assert_eq!(session.answers["end_date"], Value::String("2026-03-10".to_string()));
        assert!(session.pending_field_id.is_none());
    }

    #[test]
    fn invalid_date_leaves_answers_untouched() {
        let mut session = pending_date_session();
        run(&mut session, "asdf");
        assert!(!session.answers.contains_key("end_date"));
        assert!(session.pending_field_id.is_some());
        assert!(session.conversation_history.iter().any(|h| h.content.contains("could not be parsed")));
    }

    #[test]
    fn ask_text_latches_pending_value_without_storing() {
        let mut session = Session::new("s1".into(), "# Form".into(), vec!["injury_description".into()], HashMap::new());
        session.pending_field_id = Some("injury_description".into());
        session.pending_action_type = Some("ASK_TEXT".into());

        run(&mut session, "qwerty");

        assert!(!session.answers.contains_key("injury_description"));
        assert_eq!(session.pending_text_value.as_deref(), Some("qwerty"));
        assert_eq!(session.pending_text_field_id.as_deref(), Some("injury_description"));
    }
}
