use crate::report::report_model::{Outcome, SuiteReport};
use crate::scenario::scenario_model::ScenarioResult;

const CLASSNAME: &str = "safetynet";

/// Generate a JUnit XML report for CI systems.
///
/// Failing assertions map to `<failure>`, aborted scenarios to `<error>`:
///
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <testsuite name="..." tests="3" failures="1" errors="1" time="0.004">
///   <testcase name="Edit then revert" classname="safetynet" />
///   <testcase name="Submit suppresses warning" classname="safetynet">
///     <failure message="1 assertion(s) failed" type="AssertionFailure">Step 3: ...</failure>
///   </testcase>
///   <testcase name="Hand-raised keys" classname="safetynet">
///     <error message="Step 0 (raise_change) failed: ..." type="ScenarioAborted" />
///   </testcase>
/// </testsuite>
/// ```
pub fn generate_junit_xml(report: &SuiteReport) -> String {
    let time_attr = report
        .duration_ms
        .map(|ms| format!(" time=\"{:.3}\"", ms as f64 / 1000.0))
        .unwrap_or_default();

    let cases: String = report.results.iter().map(testcase).collect();

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuite name=\"{name}\" tests=\"{tests}\" failures=\"{failures}\" errors=\"{errors}\"{time}>\n{cases}</testsuite>\n",
        name = escape_xml(&report.suite_name),
        tests = report.total,
        failures = report.failed,
        errors = report.aborted,
        time = time_attr,
        cases = cases,
    )
}

fn testcase(result: &ScenarioResult) -> String {
    let name = escape_xml(&result.scenario_name);
    let failures: Vec<String> = result
        .assertion_results
        .iter()
        .filter(|ar| !ar.passed)
        .map(|ar| {
            let msg = ar.message.as_deref().unwrap_or("assertion failed");
            format!("Step {}: {}", ar.step_index, msg)
        })
        .collect();

    let body = match (Outcome::of(result), &result.error) {
        (Outcome::Aborted, Some(error)) if failures.is_empty() => format!(
            "    <error message=\"{}\" type=\"ScenarioAborted\" />\n",
            escape_xml(error)
        ),
        (Outcome::Aborted, Some(error)) => format!(
            "    <error message=\"{}\" type=\"ScenarioAborted\">{}</error>\n",
            escape_xml(error),
            escape_xml(&failures.join("\n"))
        ),
        (Outcome::Failed, _) => format!(
            "    <failure message=\"{} assertion(s) failed\" type=\"AssertionFailure\">{}</failure>\n",
            failures.len(),
            escape_xml(&failures.join("\n"))
        ),
        _ => return format!("  <testcase name=\"{}\" classname=\"{}\" />\n", name, CLASSNAME),
    };

    format!(
        "  <testcase name=\"{}\" classname=\"{}\">\n{}  </testcase>\n",
        name, CLASSNAME, body
    )
}

pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
