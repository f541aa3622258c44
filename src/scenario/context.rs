use crate::page::host::NodeId;
use crate::scenario::scenario_model::AssertionResult;
use crate::tracker::error::ErrorKind;

/// Execution state of a running scenario.
#[derive(Debug, Clone)]
pub struct ScenarioContext {
    /// Page handles of declared and added fields, by position
    pub field_nodes: Vec<NodeId>,

    /// Page handles of forms, by position
    pub form_nodes: Vec<NodeId>,

    /// Guard answer of the last `navigate` step; `None` before any
    pub last_navigation: Option<Option<String>>,

    /// Error kind of the last fallible step, `None` if it succeeded
    pub last_error: Option<ErrorKind>,

    pub assertion_results: Vec<AssertionResult>,
}

impl ScenarioContext {
    pub fn new() -> Self {
        ScenarioContext {
            field_nodes: Vec::new(),
            form_nodes: Vec::new(),
            last_navigation: None,
            last_error: None,
            assertion_results: Vec::new(),
        }
    }

    pub fn record_assertion(&mut self, result: AssertionResult) {
        self.assertion_results.push(result);
    }

    pub fn record_assertions(&mut self, results: Vec<AssertionResult>) {
        self.assertion_results.extend(results);
    }

    pub fn field(&self, position: usize) -> Option<NodeId> {
        self.field_nodes.get(position).copied()
    }

    pub fn form(&self, position: usize) -> Option<NodeId> {
        self.form_nodes.get(position).copied()
    }

    pub fn all_passed(&self) -> bool {
        self.assertion_results.iter().all(|r| r.passed)
    }
}

impl Default for ScenarioContext {
    fn default() -> Self {
        Self::new()
    }
}
