//! Greeting node. Terminal leaf: the only node that never routes on to
//! `conversation`/`finalize`.

use std::collections::HashMap;

use formpilot_core::Action;
use formpilot_sessions::Session;

pub fn run(session: &Session) -> Action {
    let parsed = formpilot_forms::parse_form(&session.form_context_md);
    let summary = summarize_fields(session);
    Action::Message {
        text: format!(
            "Welcome! Let's fill out the \"{title}\" form together. I'll need {summary}. \
Whenever you're ready, tell me what you'd like to submit.",
            title = parsed.title,
        ),
    }
}

fn summarize_fields(session: &Session) -> String {
    let total = session.required_fields.len();
    if total == 0 {
        return "no additional details".to_string();
    }

    let mut counts: HashMap<&str, u32> = HashMap::new();
    for field in &session.required_fields {
        let ty = session.field_types.get(field).map(|t| t.as_str()).unwrap_or("text");
        *counts.entry(ty).or_insert(0) += 1;
    }

    let mut parts: Vec<String> = counts
        .into_iter()
        .map(|(ty, n)| if n == 1 { format!("1 {ty} field") } else { format!("{n} {ty} fields") })
        .collect();
    parts.sort();

    let plural = if total == 1 { "item" } else { "items" };
    format!("about {total} {plural} — {}", parts.join(", "))
}
