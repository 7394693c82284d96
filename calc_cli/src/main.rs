//! # Calcolo CLI
//!
//! Evaluates any calculator from the terminal:
//!
//! ```text
//! calcolo run cable-sizing power=22 length=80 installation=b1
//! calcolo run pressure value=2,5 unit=bar target=psi --json
//! calcolo list
//! calcolo units pressure
//! ```

mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::debug;

use calcolo_core::calculations::{evaluate_domain, CalculationResult, Domain};
use calcolo_core::settings::{EngineSettings, DEFAULT_SETTINGS_FILE};
use calcolo_core::units::tables;
use calcolo_core::{CalcError, RawInputs};

#[derive(Parser)]
#[command(name = "calcolo")]
#[command(about = "Engineering calculators: cables, short-circuit, seismic, foundations, beams", long_about = None)]
struct Cli {
    /// Settings file (default: ./calcolo.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log to stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a calculator
    Run {
        /// Calculator name (e.g. "cable-sizing")
        domain: String,

        /// Form fields as key=value (decimal comma accepted)
        inputs: Vec<String>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List available calculators
    List,

    /// List unit tables, or the units of one table
    Units {
        /// Table name (e.g. "pressure")
        table: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(logging::level_for_verbosity(cli.verbose)) {
        eprintln!("Warning: logger not installed: {}", e);
    }

    let result = match cli.command {
        Commands::Run { domain, inputs, json } => run(&domain, &inputs, json, cli.config.as_deref()),
        Commands::List => {
            list_domains();
            Ok(true)
        }
        Commands::Units { table } => list_units(table.as_deref()).map(|_| true),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        // Inputs outside the valid domain: reported, not an error
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Some(calc) = e.downcast_ref::<CalcError>() {
                if let Ok(json) = serde_json::to_string_pretty(calc) {
                    eprintln!("{}", json);
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn load_settings(config: Option<&std::path::Path>) -> Result<EngineSettings, CalcError> {
    match config {
        Some(path) => EngineSettings::load(path),
        None => EngineSettings::load_or_default(DEFAULT_SETTINGS_FILE),
    }
}

fn parse_inputs(assignments: &[String]) -> Result<RawInputs, String> {
    let mut raw = RawInputs::new();
    for text in assignments {
        let (key, value) = RawInputs::parse_assignment(text)
            .ok_or_else(|| format!("expected key=value, got '{}'", text))?;
        raw.insert(key, value);
    }
    Ok(raw)
}

/// Returns `Ok(false)` when the calculator rejects the inputs.
fn run(
    domain: &str,
    assignments: &[String],
    json: bool,
    config: Option<&std::path::Path>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let domain: Domain = domain.parse()?;
    let settings = load_settings(config)?;
    let raw = parse_inputs(assignments)?;
    debug!("running {} with {} fields", domain, raw.len());

    let Some(result) = evaluate_domain(domain, &raw, &settings)? else {
        eprintln!("{}: impossibile calcolare con i dati inseriti.", domain.title());
        return Ok(false);
    };

    if json {
        println!("{}", result.to_json()?);
    } else {
        print_result(domain, &result);
    }
    Ok(true)
}

fn print_result(domain: Domain, result: &CalculationResult) {
    println!("{}", domain.title());
    println!("{}", "═".repeat(domain.title().chars().count()));

    let width = result
        .summary_rows()
        .iter()
        .map(|row| row.label.chars().count())
        .max()
        .unwrap_or(0);
    for row in result.summary_rows() {
        let pad = width - row.label.chars().count();
        println!("  {}{}  {}", row.label, " ".repeat(pad), row.value);
    }

    if result.has_warnings() {
        println!();
        println!("Avvisi:");
        for warning in result.warnings() {
            println!("  ! {}", warning);
        }
    }
}

fn list_domains() {
    for domain in Domain::ALL {
        println!("{:<20} {}", domain.as_str().replace('_', "-"), domain.title());
    }
}

fn list_units(table: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let all = tables::all();
    match table {
        None => {
            for t in all {
                println!("{:<10} default {:<6} {}", t.name(), t.default_unit(), t.ids().join(", "));
            }
        }
        Some(name) => {
            let wanted = name.trim().to_lowercase();
            let t = all
                .into_iter()
                .find(|t| t.name() == wanted)
                .ok_or_else(|| format!("unknown unit table '{}'", name))?;
            for unit in t.iter() {
                println!("{:<8} {:<8} {:<32} {}", unit.id, unit.symbol, unit.label, unit.factor_to_canonical);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inputs() {
        let raw = parse_inputs(&["power=22".to_string(), "cos_phi = 0,85".to_string()]).unwrap();
        assert_eq!(raw.get("power"), Some("22"));
        assert_eq!(raw.get("cos_phi"), Some("0,85"));
        assert!(parse_inputs(&["power".to_string()]).is_err());
    }

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from(["calcolo", "-vv", "run", "roi", "investment=5000", "--json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Run { domain, inputs, json } => {
                assert_eq!(domain, "roi");
                assert_eq!(inputs, vec!["investment=5000".to_string()]);
                assert!(json);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_missing_config_is_an_error() {
        let err = load_settings(Some(std::path::Path::new("/nonexistent/calcolo.toml"))).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }
}
