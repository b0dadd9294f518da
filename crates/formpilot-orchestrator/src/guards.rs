//! Output guards that judge a candidate `Action` against session state.
//! Unparseable JSON and unknown action kinds short-circuit before an
//! `Action` even exists, so those checks live inline in
//! `nodes::conversation`'s retry loop instead of here.

use std::collections::HashMap;

use formpilot_core::Action;
use serde_json::Value;

/// Everything a guard needs to judge one candidate `Action`, borrowed fresh
/// for each retry attempt rather than threaded through `Session` directly.
pub struct GuardContext<'a> {
    pub answers: &'a HashMap<String, Value>,
    pub missing_fields: &'a [String],
    pub field_tools: &'a HashMap<String, String>,
}

impl<'a> GuardContext<'a> {
    fn next_field(&self) -> &str {
        self.missing_fields.first().map(|s| s.as_str()).unwrap_or("(none)")
    }
}

/// Returns `Some(corrective message)` when the guard fires, `None` when the
/// candidate action passes.
pub trait Guard: Send + Sync {
    fn check(&self, action: &Action, ctx: &GuardContext) -> Option<String>;
}

pub fn default_guards() -> Vec<Box<dyn Guard>> {
    vec![
        Box::new(ReAskAnsweredField),
        Box::new(MessageWhileFieldsMissing),
        Box::new(EmptyDropdownOptions),
        Box::new(PrematureCompletion),
    ]
}

pub struct ReAskAnsweredField;

impl Guard for ReAskAnsweredField {
    fn check(&self, action: &Action, ctx: &GuardContext) -> Option<String> {
        let field_id = action.field_id()?;
        let value = ctx.answers.get(field_id)?;
        Some(format!(
            "Field `{field_id}` is already answered with `{value}`; ask the next missing field: `{}`.",
            ctx.next_field()
        ))
    }
}

pub struct MessageWhileFieldsMissing;

impl Guard for MessageWhileFieldsMissing {
    fn check(&self, action: &Action, ctx: &GuardContext) -> Option<String> {
        if matches!(action, Action::Message { .. }) && !ctx.missing_fields.is_empty() {
            Some(format!("Use the correct `ASK_*` action for `{}`, not MESSAGE.", ctx.next_field()))
        } else {
            None
        }
    }
}

pub struct EmptyDropdownOptions;

impl Guard for EmptyDropdownOptions {
    fn check(&self, action: &Action, ctx: &GuardContext) -> Option<String> {
        let Action::AskDropdown { field_id, options, .. } = action else {
            return None;
        };
        if !options.is_empty() {
            return None;
        }
        let tool = ctx
            .field_tools
            .get(field_id)
            .map(|s| s.as_str())
            .unwrap_or("the appropriate tool");
        Some(format!("Emit `TOOL_CALL` for `{tool}` first; do not ask a dropdown with empty options."))
    }
}

pub struct PrematureCompletion;

impl Guard for PrematureCompletion {
    fn check(&self, action: &Action, ctx: &GuardContext) -> Option<String> {
        if !matches!(action, Action::FormComplete { .. }) || ctx.missing_fields.is_empty() {
            return None;
        }
        Some(format!(
            "Required fields still missing: `{}`; ask `{}`.",
            ctx.missing_fields.join(", "),
            ctx.next_field()
        ))
    }
}
