use serde::{Deserialize, Serialize};

use crate::page::simulated::Element;
use crate::tracker::error::ErrorKind;
use crate::tracker::identity::ChangeKey;
use crate::tracker::settings::Settings;

/// A scripted page session: the page to build, optional activation
/// settings, and the steps to replay against it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    /// Human-readable name for this scenario
    pub name: String,

    /// Activation settings; the configured defaults apply when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,

    #[serde(default)]
    pub page: PageSpec,

    /// Ordered list of steps to execute
    pub steps: Vec<ScenarioStep>,
}

/// Initial content of the simulated page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageSpec {
    /// Form controls, referenced by steps through their position
    #[serde(default)]
    pub fields: Vec<ElementSpec>,

    /// Forms, referenced by position
    #[serde(default)]
    pub forms: Vec<FormSpec>,

    /// Whether the field-change event source is present
    #[serde(default = "default_true")]
    pub event_source: bool,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            forms: Vec::new(),
            event_source: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ElementSpec {
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default)]
    pub value: String,
}

impl ElementSpec {
    pub fn to_element(&self) -> Element {
        let mut element = Element::new(&self.tag).with_value(&self.value);
        element.name = self.name.clone();
        element.id = self.id.clone();
        element.input_type = self.input_type.clone();
        element.classes = self.classes.clone();
        element
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FormSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
}

impl FormSpec {
    pub fn to_element(&self) -> Element {
        let mut element = Element::new("form");
        element.name = self.name.clone();
        element.id = self.id.clone();
        element.classes = self.classes.clone();
        element
    }
}

/// A single step in a scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Activate on the fields matching `selector`
    Activate {
        selector: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expect_error: Option<ErrorKind>,
    },

    /// Activate on the settings' default field selector
    ActivateDefault {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expect_error: Option<ErrorKind>,
    },

    /// User edit of a field's value
    Input {
        field: usize,
        #[serde(default = "default_event")]
        event: String,
        value: String,
    },

    /// Emit "changed" for a field directly
    TriggerChange { field: usize },

    /// Emit "reverted" for a field directly
    TriggerRevert { field: usize },

    /// Raise a key by hand; a null key is the empty key
    RaiseChange {
        #[serde(default)]
        key: Option<ChangeKey>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expect_error: Option<ErrorKind>,
    },

    ClearChange {
        #[serde(default)]
        key: Option<ChangeKey>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expect_error: Option<ErrorKind>,
    },

    ClearAll,

    SetSuppressed { value: bool },

    /// Submit the form at this position
    Submit {
        #[serde(default)]
        form: usize,
    },

    /// Append a field to the page after load
    AddField { field: ElementSpec },

    /// Query the navigation guard and remember its answer
    Navigate,

    /// Run assertions against the tracker state
    Assert { assertions: Vec<AssertionSpec> },
}

impl ScenarioStep {
    pub fn label(&self) -> &'static str {
        match self {
            ScenarioStep::Activate { .. } => "activate",
            ScenarioStep::ActivateDefault { .. } => "activate_default",
            ScenarioStep::Input { .. } => "input",
            ScenarioStep::TriggerChange { .. } => "trigger_change",
            ScenarioStep::TriggerRevert { .. } => "trigger_revert",
            ScenarioStep::RaiseChange { .. } => "raise_change",
            ScenarioStep::ClearChange { .. } => "clear_change",
            ScenarioStep::ClearAll => "clear_all",
            ScenarioStep::SetSuppressed { .. } => "set_suppressed",
            ScenarioStep::Submit { .. } => "submit",
            ScenarioStep::AddField { .. } => "add_field",
            ScenarioStep::Navigate => "navigate",
            ScenarioStep::Assert { .. } => "assert",
        }
    }
}

/// A single assertion to evaluate against the tracker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssertionSpec {
    HasChanges { expected: bool },

    Suppressed { expected: bool },

    Activated { expected: bool },

    /// Query the navigation guard now. Consumes suppression.
    NavigationWarning {
        #[serde(default)]
        expected: Option<String>,
    },

    /// Answer recorded by the most recent `navigate` step
    LastNavigation {
        #[serde(default)]
        expected: Option<String>,
    },

    /// Raised keys, in any order
    DirtyKeys { expected: Vec<ChangeKey> },

    /// Most recent fallible step failed with this kind
    FailsWith { expected: ErrorKind },
}

/// Result of evaluating a single assertion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssertionResult {
    /// Which step this assertion belongs to (0-indexed)
    pub step_index: usize,

    pub spec: AssertionSpec,

    pub passed: bool,

    /// Actual value found (for debugging failed assertions)
    pub actual: Option<String>,

    /// Human-readable failure message
    pub message: Option<String>,
}

/// Result of running a complete scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,

    /// Whether all steps and assertions passed
    pub passed: bool,

    pub steps_run: usize,

    pub assertion_results: Vec<AssertionResult>,

    /// Error message if the scenario aborted (not an assertion failure)
    pub error: Option<String>,
}

fn default_true() -> bool { true }
fn default_tag() -> String { "input".to_string() }
fn default_event() -> String { "change".to_string() }
