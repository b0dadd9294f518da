//! Finalize node. Runs last on every non-greeting path.

use formpilot_core::Action;
use formpilot_sessions::{HistoryEntry, Session};

use crate::prompt;

pub fn run(session: &mut Session, action: Action) -> Action {
    let mut action = action;

    if let Some(pending_value) = session.pending_text_value.take() {
        let pending_field = session.pending_text_field_id.take().expect("pending_text_* set together");
        let rejected = matches!(&action, Action::AskText { field_id, .. } if *field_id == pending_field);
        if !rejected {
            session.answers.insert(pending_field, serde_json::Value::String(pending_value));
        }
    }

    if let Some(accepted) = action.accepted() {
        session.answers.insert(accepted.field_id.clone(), accepted.value.clone());
    }

    match &action {
        Action::AskText { field_id, .. }
        | Action::AskDropdown { field_id, .. }
        | Action::AskCheckbox { field_id, .. }
        | Action::AskDate { field_id, .. }
        | Action::AskDatetime { field_id, .. }
        | Action::AskLocation { field_id, .. } => {
            session.pending_field_id = Some(field_id.clone());
            session.pending_action_type = Some(action.kind().to_string());
        }
        Action::ToolCall { tool_name, .. } => {
            session.pending_tool_name = Some(tool_name.clone());
            session.clear_pending_ask();
        }
        Action::Message { .. } => {
            session.clear_pending_ask();
        }
        Action::FormComplete { .. } => {
            session.clear_pending_ask();
            if let Action::FormComplete { data, .. } = &mut action {
                *data = session.answers.clone();
            }
        }
    }

    session.conversation_history.push(HistoryEntry::assistant(prompt::action_to_history_json(&action)));
    session.turn_count += 1;
    action
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn session() -> Session {
        Session::new("s1".into(), "# Form".into(), vec!["injury_description".into()], HashMap::new())
    }

    #[test]
    fn accepts_pending_text_when_action_moves_on() {
        let mut session = session();
        session.pending_text_value = Some("I broke my arm".into());
        session.pending_text_field_id = Some("injury_description".into());

        let action = run(&mut session, Action::Message { text: "Got it.".into() });

        assert_eq!(action.kind(), "MESSAGE");
        assert_eq!(session.answers["injury_description"], serde_json::json!("I broke my arm"));
        assert!(session.pending_text_value.is_none());
    }

    #[test]
    fn rejects_pending_text_when_reasked() {
        let mut session = session();
        session.pending_text_value = Some("qwerty".into());
        session.pending_text_field_id = Some("injury_description".into());

        run(
            &mut session,
            Action::AskText { field_id: "injury_description".into(), label: "Describe the injury".into(), message: None, accepted: None },
        );

        assert!(!session.answers.contains_key("injury_description"));
        assert!(session.pending_text_value.is_none());
    }

    #[test]
    fn form_complete_snapshots_answers() {
        let mut session = session();
        session.answers.insert("injury_description".into(), serde_json::json!("broken arm"));

        let action = run(
            &mut session,
            Action::FormComplete { data: HashMap::new(), message: None },
        );

        let Action::FormComplete { data, .. } = action else { panic!("expected FORM_COMPLETE") };
        assert_eq!(data["injury_description"], serde_json::json!("broken arm"));
    }

    #[test]
    fn ask_sets_pending_fields() {
        let mut session = session();
        run(
            &mut session,
            Action::AskDate { field_id: "start_date".into(), label: "Start Date".into(), message: None, accepted: None },
        );
        assert_eq!(session.pending_field_id.as_deref(), Some("start_date"));
        assert_eq!(session.pending_action_type.as_deref(), Some("ASK_DATE"));
    }

    #[test]
    fn bundled_accepted_value_merges_into_answers() {
        let mut session = session();
        let action = run(
            &mut session,
            Action::AskDate {
                field_id: "end_date".into(),
                label: "End Date".into(),
                message: Some("Got it, you broke your arm.".into()),
                accepted: Some(formpilot_core::AcceptedValue {
                    field_id: "injury_description".into(),
                    value: serde_json::json!("broke my arm"),
                }),
            },
        );
        assert_eq!(session.answers["injury_description"], serde_json::json!("broke my arm"));
        assert_eq!(session.pending_field_id.as_deref(), Some("end_date"));
        assert_eq!(action.kind(), "ASK_DATE");
    }
}
