use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One of the nine structured UI actions the orchestrator can emit.
///
/// `#[serde(tag = "action")]` puts the kind under the `"action"` key on the
/// wire (e.g. `{"action":"ASK_TEXT","field_id":"leave_type",...}`); every
/// other key is `snake_case`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Action {
    #[serde(rename = "MESSAGE")]
    Message { text: String },

    #[serde(rename = "ASK_TEXT")]
    AskText {
        field_id: String,
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        /// Some intents answer one field and, in the same breath, ask the
        /// next one. When present, finalize merges this into `answers`
        /// before recording `field_id` as the newly pending ask.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        accepted: Option<AcceptedValue>,
    },

    #[serde(rename = "ASK_DROPDOWN")]
    AskDropdown {
        field_id: String,
        label: String,
        options: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        accepted: Option<AcceptedValue>,
    },

    #[serde(rename = "ASK_CHECKBOX")]
    AskCheckbox {
        field_id: String,
        label: String,
        options: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        accepted: Option<AcceptedValue>,
    },

    #[serde(rename = "ASK_DATE")]
    AskDate {
        field_id: String,
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        accepted: Option<AcceptedValue>,
    },

    #[serde(rename = "ASK_DATETIME")]
    AskDatetime {
        field_id: String,
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        accepted: Option<AcceptedValue>,
    },

    #[serde(rename = "ASK_LOCATION")]
    AskLocation {
        field_id: String,
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        accepted: Option<AcceptedValue>,
    },

    #[serde(rename = "TOOL_CALL")]
    ToolCall {
        tool_name: String,
        tool_args: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    #[serde(rename = "FORM_COMPLETE")]
    FormComplete {
        data: HashMap<String, Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

/// A `{field_id, value}` pair an `ASK_*` action bundles alongside its
/// follow-up question, e.g. "Got it, Annual — and what date does it start?"
/// answers `leave_type` while asking `start_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptedValue {
    pub field_id: String,
    pub value: Value,
}

impl Action {
    /// The wire-format kind string, e.g. `"ASK_DATE"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Message { .. } => "MESSAGE",
            Action::AskText { .. } => "ASK_TEXT",
            Action::AskDropdown { .. } => "ASK_DROPDOWN",
            Action::AskCheckbox { .. } => "ASK_CHECKBOX",
            Action::AskDate { .. } => "ASK_DATE",
            Action::AskDatetime { .. } => "ASK_DATETIME",
            Action::AskLocation { .. } => "ASK_LOCATION",
            Action::ToolCall { .. } => "TOOL_CALL",
            Action::FormComplete { .. } => "FORM_COMPLETE",
        }
    }

    /// The nine allowed kind strings, for guard error messages.
    pub const ALL_KINDS: &'static [&'static str] = &[
        "MESSAGE",
        "ASK_TEXT",
        "ASK_DROPDOWN",
        "ASK_CHECKBOX",
        "ASK_DATE",
        "ASK_DATETIME",
        "ASK_LOCATION",
        "TOOL_CALL",
        "FORM_COMPLETE",
    ];

    pub fn is_ask(&self) -> bool {
        self.field_id().is_some()
    }

    /// `field_id` carried by any `ASK_*` variant; `None` otherwise.
    pub fn field_id(&self) -> Option<&str> {
        match self {
            Action::AskText { field_id, .. }
            | Action::AskDropdown { field_id, .. }
            | Action::AskCheckbox { field_id, .. }
            | Action::AskDate { field_id, .. }
            | Action::AskDatetime { field_id, .. }
            | Action::AskLocation { field_id, .. } => Some(field_id),
            _ => None,
        }
    }

    /// The presented dropdown/checkbox options, if this is one of those kinds.
    pub fn options(&self) -> Option<&[String]> {
        match self {
            Action::AskDropdown { options, .. } | Action::AskCheckbox { options, .. } => {
                Some(options)
            }
            _ => None,
        }
    }

    pub fn tool_name(&self) -> Option<&str> {
        match self {
            Action::ToolCall { tool_name, .. } => Some(tool_name),
            _ => None,
        }
    }

    /// The bundled `{field_id, value}` pair carried alongside an `ASK_*`
    /// follow-up question, if the LLM supplied one.
    pub fn accepted(&self) -> Option<&AcceptedValue> {
        match self {
            Action::AskText { accepted, .. }
            | Action::AskDropdown { accepted, .. }
            | Action::AskCheckbox { accepted, .. }
            | Action::AskDate { accepted, .. }
            | Action::AskDatetime { accepted, .. }
            | Action::AskLocation { accepted, .. } => accepted.as_ref(),
            _ => None,
        }
    }
}
