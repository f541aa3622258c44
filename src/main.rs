use clap::Parser;
use safetynet::cli::commands::{cmd_defaults, cmd_run};
use safetynet::cli::config::{Cli, Commands, load_config, log_level};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v when set
    env_logger::Builder::new()
        .filter_level(log_level(cli.verbose))
        .parse_default_env()
        .init();

    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Run {
            scenario,
            format,
            output,
            trace,
        } => {
            let all_passed = cmd_run(
                &scenario,
                format.as_deref(),
                output.as_deref(),
                trace.as_deref(),
                &config,
            )?;
            if !all_passed {
                std::process::exit(1);
            }
        }
        Commands::Defaults { overrides } => {
            print!("{}", cmd_defaults(&overrides, &config)?);
        }
    }

    Ok(())
}
