use serde::{Deserialize, Deserializer, Serialize};

use crate::tracker::identity::IdBranch;

pub const DEFAULT_MESSAGE: &str = "Your unsaved changes will be lost.";
pub const DEFAULT_FIELDS: &str = "input,select,textarea,fileupload";
pub const DEFAULT_FORM: &str = "form";
pub const DEFAULT_CHANGE_EVENTS: &str = "change,keyup,paste";

/// Options recognized by activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Warning shown by the navigation guard
    #[serde(default = "default_message")]
    pub message: String,

    /// Selector of the controls tracked by default
    #[serde(default = "default_fields")]
    pub fields: String,

    /// Selector of the form(s) whose submit arms suppression
    #[serde(default = "default_form")]
    pub form: String,

    /// Underlying events that count as a "changed" notification. Accepts a
    /// list or a comma-separated string.
    #[serde(
        default = "default_change_events",
        deserialize_with = "deserialize_events"
    )]
    pub change_events: Vec<String>,

    /// Also watch matching fields added after activation
    #[serde(default = "default_true")]
    pub live: bool,

    #[serde(default)]
    pub id_branch: IdBranch,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            message: default_message(),
            fields: default_fields(),
            form: default_form(),
            change_events: default_change_events(),
            live: true,
            id_branch: IdBranch::default(),
        }
    }
}

impl Settings {
    /// Split a comma-separated event list, dropping blanks.
    pub fn parse_events(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn events_string(&self) -> String {
        self.change_events.join(",")
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = fields.into();
        self
    }

    pub fn with_form(mut self, form: impl Into<String>) -> Self {
        self.form = form.into();
        self
    }

    pub fn with_id_branch(mut self, id_branch: IdBranch) -> Self {
        self.id_branch = id_branch;
        self
    }
}

fn default_message() -> String { DEFAULT_MESSAGE.to_string() }
fn default_fields() -> String { DEFAULT_FIELDS.to_string() }
fn default_form() -> String { DEFAULT_FORM.to_string() }
fn default_change_events() -> Vec<String> { Settings::parse_events(DEFAULT_CHANGE_EVENTS) }
fn default_true() -> bool { true }

fn deserialize_events<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Events {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Events::deserialize(deserializer)? {
        Events::List(list) => Settings::parse_events(&list.join(",")),
        Events::Joined(joined) => Settings::parse_events(&joined),
    })
}
