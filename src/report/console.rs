use crate::report::report_model::{Outcome, SuiteReport};
use crate::scenario::scenario_model::AssertionSpec;

// ============================================================================
// Console reporter
// ============================================================================

/// Format a suite report for terminal output.
///
/// ```text
/// === Scenarios: CLI Run ===
///
/// ✓ PASS   Edit then revert (6 steps, 3 assertions)
/// ✗ FAIL   Submit suppresses warning (4 steps, 1 assertions)
///     [FAIL] Step 3: NavigationWarning — navigation warning is Some("...") but expected None
/// ! ABORT  Hand-raised keys (1 steps, 0 assertions)
///     [ERROR] Step 0 (raise_change) failed: key is required when raising a change
///
/// === Results: 1 passed, 1 failed, 1 aborted (3 total, 4 assertions) ===
/// ```
pub fn format_console_report(report: &SuiteReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Scenarios: {} ===\n\n", report.suite_name));

    for result in &report.results {
        let assertion_count = result.assertion_results.len();
        let marker = match Outcome::of(result) {
            Outcome::Passed => "\u{2713} PASS ",
            Outcome::Failed => "\u{2717} FAIL ",
            Outcome::Aborted => "! ABORT",
        };

        out.push_str(&format!(
            "{}  {} ({} steps, {} assertions)\n",
            marker, result.scenario_name, result.steps_run, assertion_count
        ));

        if let Some(ref error) = result.error {
            out.push_str(&format!("    [ERROR] {}\n", error));
        }

        if !result.passed {
            for ar in result.assertion_results.iter().filter(|ar| !ar.passed) {
                let detail = ar.message.as_deref().unwrap_or("assertion failed");
                out.push_str(&format!(
                    "    [FAIL] Step {}: {} \u{2014} {}\n",
                    ar.step_index,
                    assertion_name(&ar.spec),
                    detail
                ));
            }
        }
    }

    out.push_str(&format!(
        "\n=== Results: {} passed, {} failed, {} aborted ({} total, {} assertions)",
        report.passed, report.failed, report.aborted, report.total, report.assertions
    ));

    if let Some(ms) = report.duration_ms {
        out.push_str(&format!(" in {:.1}s", ms as f64 / 1000.0));
    }

    out.push_str(" ===\n");

    out
}

fn assertion_name(spec: &AssertionSpec) -> &'static str {
    match spec {
        AssertionSpec::HasChanges { .. } => "HasChanges",
        AssertionSpec::Suppressed { .. } => "Suppressed",
        AssertionSpec::Activated { .. } => "Activated",
        AssertionSpec::NavigationWarning { .. } => "NavigationWarning",
        AssertionSpec::LastNavigation { .. } => "LastNavigation",
        AssertionSpec::DirtyKeys { .. } => "DirtyKeys",
        AssertionSpec::FailsWith { .. } => "FailsWith",
    }
}
