use crate::cli::config::{AppConfig, SettingsOverrides};
use crate::report::console::format_console_report;
use crate::report::junit::generate_junit_xml;
use crate::report::report_model::SuiteReport;
use crate::scenario::runner::ScenarioRunner;
use crate::scenario::scenario_model::Scenario;
use crate::trace::logger::TraceLogger;

// ============================================================================
// run subcommand
// ============================================================================

/// Replay scenarios and return whether all passed.
pub fn cmd_run(
    scenario_path: &str,
    format: Option<&str>,
    output: Option<&str>,
    trace: Option<&str>,
    config: &AppConfig,
) -> Result<bool, Box<dyn std::error::Error>> {
    let scenarios = load_scenarios(scenario_path)?;

    if scenarios.is_empty() {
        log::warn!("no scenarios found at: {}", scenario_path);
        return Ok(true);
    }

    log::info!("running {} scenario(s)", scenarios.len());

    let tracer = match trace {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    };
    let start = std::time::Instant::now();

    let results = scenarios
        .iter()
        .map(|scenario| {
            log::info!("  running: {}", scenario.name);
            ScenarioRunner::run(scenario, &config.defaults, &tracer)
        })
        .collect();

    let duration = start.elapsed().as_millis();
    let report = SuiteReport::from_results("CLI Run", results).with_duration(duration);
    let all_passed = report.all_passed();

    let format = format.unwrap_or(config.run.format.as_str());
    let output_content = match format {
        "junit" => generate_junit_xml(&report),
        _ => format_console_report(&report),
    };

    match output.or(config.run.output.as_deref()) {
        Some(path) => std::fs::write(path, &output_content)?,
        None => print!("{}", output_content),
    }

    Ok(all_passed)
}

/// Load scenarios from a single YAML file or a directory of YAML files.
pub fn load_scenarios(path: &str) -> Result<Vec<Scenario>, Box<dyn std::error::Error>> {
    let metadata = std::fs::metadata(path)?;
    if metadata.is_dir() {
        let mut scenarios = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let p = entry?.path();
            if p.extension().is_some_and(|e| e == "yaml" || e == "yml") {
                let content = std::fs::read_to_string(&p)?;
                let scenario: Scenario = serde_yaml::from_str(&content)?;
                scenarios.push(scenario);
            }
        }
        // Sort by name for deterministic order
        scenarios.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(scenarios)
    } else {
        let content = std::fs::read_to_string(path)?;
        let scenario: Scenario = serde_yaml::from_str(&content)?;
        Ok(vec![scenario])
    }
}

// ============================================================================
// defaults subcommand
// ============================================================================

/// Effective settings as YAML: flags over the config file over built-ins.
pub fn cmd_defaults(
    overrides: &SettingsOverrides,
    config: &AppConfig,
) -> Result<String, Box<dyn std::error::Error>> {
    let settings = overrides.apply(config.defaults.clone());
    Ok(serde_yaml::to_string(&settings)?)
}
