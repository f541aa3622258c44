use thiserror::Error;

use crate::page::host::PageHost;
use crate::page::simulated::{PageError, SimulatedPage};
use crate::scenario::context::ScenarioContext;
use crate::scenario::scenario_model::{
    AssertionResult, AssertionSpec, PageSpec, Scenario, ScenarioResult, ScenarioStep,
};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;
use crate::tracker::error::{ErrorKind, TrackerError, TrackerResult};
use crate::tracker::identity::ChangeKey;
use crate::tracker::settings::Settings;
use crate::tracker::tracker::SafetyNet;

#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error(transparent)]
    Page(#[from] PageError),

    #[error("no field at position {0}")]
    UnknownField(usize),

    #[error("no form at position {0}")]
    UnknownForm(usize),
}

/// Replays a [`Scenario`] against a fresh tracker and simulated page.
pub struct ScenarioRunner;

impl ScenarioRunner {
    /// Run a complete scenario.
    ///
    /// `defaults` applies when the scenario carries no settings of its own.
    pub fn run(scenario: &Scenario, defaults: &Settings, tracer: &TraceLogger) -> ScenarioResult {
        let settings = scenario.settings.as_ref().unwrap_or(defaults);
        let net = SafetyNet::new();
        let mut ctx = ScenarioContext::new();
        let mut page = Self::build_page(&scenario.page, &mut ctx);

        log::debug!("running scenario '{}' ({} steps)", scenario.name, scenario.steps.len());

        for (i, step) in scenario.steps.iter().enumerate() {
            let outcome = Self::execute_step(step, i, settings, &net, &mut page, &mut ctx);

            let event = TraceEvent::now(&scenario.name, i, step.label())
                .with_state(net.has_changes(), net.suppressed());
            let event = match (&outcome, step) {
                (Err(e), _) => event.with_outcome(e),
                (Ok(()), ScenarioStep::Navigate) => event
                    .with_outcome("ok")
                    .with_warning(ctx.last_navigation.as_ref().and_then(|w| w.as_deref())),
                (Ok(()), _) => event.with_outcome("ok"),
            };
            tracer.log(&event);

            if let Err(e) = outcome {
                log::warn!("scenario '{}' aborted at step {}: {}", scenario.name, i, e);
                return ScenarioResult {
                    scenario_name: scenario.name.clone(),
                    passed: false,
                    steps_run: i + 1,
                    assertion_results: ctx.assertion_results,
                    error: Some(format!("Step {} ({}) failed: {}", i, step.label(), e)),
                };
            }
        }

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            passed: ctx.all_passed(),
            steps_run: scenario.steps.len(),
            assertion_results: ctx.assertion_results,
            error: None,
        }
    }

    /// Fields first, then forms, in declaration order.
    fn build_page(spec: &PageSpec, ctx: &mut ScenarioContext) -> SimulatedPage {
        let mut page = SimulatedPage::new();
        page.set_event_source_available(spec.event_source);
        for field in &spec.fields {
            ctx.field_nodes.push(page.add_element(field.to_element()));
        }
        for form in &spec.forms {
            ctx.form_nodes.push(page.add_element(form.to_element()));
        }
        page
    }

    fn execute_step(
        step: &ScenarioStep,
        step_index: usize,
        settings: &Settings,
        net: &SafetyNet,
        page: &mut SimulatedPage,
        ctx: &mut ScenarioContext,
    ) -> Result<(), StepError> {
        match step {
            ScenarioStep::Activate {
                selector,
                expect_error,
            } => {
                let selection = page.select(selector);
                let outcome = net.activate(selection, settings, page);
                Self::settle(outcome, *expect_error, step_index, ctx)
            }

            ScenarioStep::ActivateDefault { expect_error } => {
                let outcome = net.activate_default(settings, page);
                Self::settle(outcome, *expect_error, step_index, ctx)
            }

            ScenarioStep::Input {
                field,
                event,
                value,
            } => {
                let node = ctx.field(*field).ok_or(StepError::UnknownField(*field))?;
                page.input(node, event, value)?;
                Ok(())
            }

            ScenarioStep::TriggerChange { field } => {
                let node = ctx.field(*field).ok_or(StepError::UnknownField(*field))?;
                page.trigger_changed(node)?;
                Ok(())
            }

            ScenarioStep::TriggerRevert { field } => {
                let node = ctx.field(*field).ok_or(StepError::UnknownField(*field))?;
                page.trigger_reverted(node)?;
                Ok(())
            }

            ScenarioStep::RaiseChange { key, expect_error } => {
                let outcome = net.raise_change(Self::key_or_empty(key));
                Self::settle(outcome, *expect_error, step_index, ctx)
            }

            ScenarioStep::ClearChange { key, expect_error } => {
                let outcome = net.clear_change(Self::key_or_empty(key));
                Self::settle(outcome, *expect_error, step_index, ctx)
            }

            ScenarioStep::ClearAll => {
                net.clear_all_changes();
                Ok(())
            }

            ScenarioStep::SetSuppressed { value } => {
                net.set_suppressed(*value);
                Ok(())
            }

            ScenarioStep::Submit { form } => {
                let node = ctx.form(*form).ok_or(StepError::UnknownForm(*form))?;
                let ran = page.submit(node)?;
                log::debug!("submit of form {} ran {} handler(s)", form, ran);
                Ok(())
            }

            ScenarioStep::AddField { field } => {
                let node = page.add_element(field.to_element());
                ctx.field_nodes.push(node);
                Ok(())
            }

            ScenarioStep::Navigate => {
                ctx.last_navigation = Some(page.navigate_away());
                Ok(())
            }

            ScenarioStep::Assert { assertions } => {
                let results = assertions
                    .iter()
                    .map(|spec| Self::evaluate_one(spec, step_index, net, page, ctx))
                    .collect();
                ctx.record_assertions(results);
                Ok(())
            }
        }
    }

    fn key_or_empty(key: &Option<ChangeKey>) -> ChangeKey {
        key.clone().unwrap_or_else(|| ChangeKey::Name(String::new()))
    }

    /// Apply a fallible tracker outcome. An expected error becomes a
    /// recorded assertion; an unexpected one aborts the scenario.
    fn settle<T>(
        outcome: TrackerResult<T>,
        expect_error: Option<ErrorKind>,
        step_index: usize,
        ctx: &mut ScenarioContext,
    ) -> Result<(), StepError> {
        let actual = match (outcome, expect_error) {
            (Ok(_), None) => {
                ctx.last_error = None;
                return Ok(());
            }
            (Err(e), None) => {
                ctx.last_error = Some(e.kind());
                return Err(e.into());
            }
            (outcome, Some(_)) => outcome.err().map(|e| e.kind()),
        };

        ctx.last_error = actual;
        if let Some(expected) = expect_error {
            let spec = AssertionSpec::FailsWith { expected };
            ctx.record_assertion(Self::fails_with_result(spec, expected, actual, step_index));
        }
        Ok(())
    }

    fn evaluate_one(
        spec: &AssertionSpec,
        step_index: usize,
        net: &SafetyNet,
        page: &mut SimulatedPage,
        ctx: &ScenarioContext,
    ) -> AssertionResult {
        match spec {
            AssertionSpec::HasChanges { expected } => {
                Self::compare(spec, step_index, *expected, net.has_changes(), "has_changes")
            }

            AssertionSpec::Suppressed { expected } => {
                Self::compare(spec, step_index, *expected, net.suppressed(), "suppressed")
            }

            AssertionSpec::Activated { expected } => {
                Self::compare(spec, step_index, *expected, net.is_activated(), "activated")
            }

            AssertionSpec::NavigationWarning { expected } => {
                let actual = page.navigate_away();
                Self::compare(spec, step_index, expected.clone(), actual, "navigation warning")
            }

            AssertionSpec::LastNavigation { expected } => match &ctx.last_navigation {
                Some(actual) => Self::compare(
                    spec,
                    step_index,
                    expected.clone(),
                    actual.clone(),
                    "last navigation warning",
                ),
                None => AssertionResult {
                    step_index,
                    spec: spec.clone(),
                    passed: false,
                    actual: None,
                    message: Some("no navigate step has run yet".to_string()),
                },
            },

            AssertionSpec::DirtyKeys { expected } => {
                let mut expected = expected.clone();
                expected.sort();
                expected.dedup();
                Self::compare(spec, step_index, expected, net.dirty_keys(), "dirty keys")
            }

            AssertionSpec::FailsWith { expected } => {
                Self::fails_with_result(spec.clone(), *expected, ctx.last_error, step_index)
            }
        }
    }

    fn compare<T: PartialEq + std::fmt::Debug>(
        spec: &AssertionSpec,
        step_index: usize,
        expected: T,
        actual: T,
        what: &str,
    ) -> AssertionResult {
        let passed = expected == actual;
        AssertionResult {
            step_index,
            spec: spec.clone(),
            passed,
            actual: Some(format!("{:?}", actual)),
            message: if passed {
                None
            } else {
                Some(format!("{} is {:?} but expected {:?}", what, actual, expected))
            },
        }
    }

    fn fails_with_result(
        spec: AssertionSpec,
        expected: ErrorKind,
        actual: Option<ErrorKind>,
        step_index: usize,
    ) -> AssertionResult {
        let passed = actual == Some(expected);
        let actual_text = match actual {
            Some(kind) => format!("{:?}", kind),
            None => "succeeded".to_string(),
        };
        AssertionResult {
            step_index,
            spec,
            passed,
            message: if passed {
                None
            } else {
                Some(format!("expected {:?} error, got {}", expected, actual_text))
            },
            actual: Some(actual_text),
        }
    }
}
