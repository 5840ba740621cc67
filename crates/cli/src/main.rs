// fibernet CLI - network inventories, field measurements, link budgets, plan-vs-built

mod budget;
mod compare;
mod exit_codes;
mod measurements;
mod network;
mod util;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use fibernet_config::{ConfigError, Settings};

use exit_codes::{EXIT_ERROR, EXIT_INVALID_PARAMS, EXIT_IO, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "fnet")]
#[command(about = "Fiber access network analysis: KML inventories, OPM/ATP tables, link budgets, plan vs built")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Settings file to use instead of <config dir>/fibernet/settings.json
    #[arg(long, global = true, env = "FNET_SETTINGS")]
    settings: Option<PathBuf>,

    /// Log more on stderr (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a KML network export: inventory, statistics, per-cable link budget
    #[command(after_help = "\
Examples:
  fnet network cluster-a.kml
  fnet network cluster-a.kml --json
  fnet network cluster-a.kml --wavelength 1310nm --json")]
    Network {
        /// KML document
        file: PathBuf,

        #[command(flatten)]
        params: budget::ParamArgs,

        /// Output JSON to stdout instead of a human summary
        #[arg(long)]
        json: bool,
    },

    /// Parse an OPM or ATP measurement table
    #[command(after_help = "\
Examples:
  fnet measurements opm-2024-03.csv --kind opm
  fnet measurements odp-acceptance.csv --kind atp --json")]
    Measurements {
        /// Delimited table with a header row
        file: PathBuf,

        /// Table layout
        #[arg(long, value_enum)]
        kind: measurements::MeasurementKind,

        /// Output JSON to stdout instead of a human summary
        #[arg(long)]
        json: bool,
    },

    /// Optical link-budget calculations
    #[command(subcommand)]
    Budget(budget::BudgetCommands),

    /// Compare an as-planned document against an as-built one
    #[command(after_help = "\
Examples:
  fnet compare planned.kml built.kml
  fnet compare planned.kml built.kml --opm opm.csv --json
  fnet compare planned.kml built.kml --tolerance trunk.toml --output report.json")]
    Compare {
        /// As-planned KML document
        planned: PathBuf,

        /// As-built KML document
        built: PathBuf,

        /// OPM table; readings attach to cables by Cable ID
        #[arg(long)]
        opm: Option<PathBuf>,

        /// TOML file with a [tolerance] table (overrides settings)
        #[arg(long)]
        tolerance: Option<PathBuf>,

        /// Output JSON to stdout instead of a human summary
        #[arg(long)]
        json: bool,

        /// Write JSON report to file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show the effective settings
    #[command(after_help = "\
Examples:
  fnet config
  fnet config --path")]
    Config {
        /// Print the settings file location only
        #[arg(long)]
        path: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("GIT_COMMIT_HASH"),
        ")",
        "\nengine:  fibernet-engine ",
        env!("CARGO_PKG_VERSION"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = load_settings(cli.settings.as_deref()).and_then(|settings| {
        init_logging(&settings.log_level, cli.verbose, cli.quiet);
        log::debug!("fnet {} (settings log level {})", env!("CARGO_PKG_VERSION"), settings.log_level);
        run(cli.command, &settings, cli.settings.as_deref())
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn run(command: Commands, settings: &Settings, settings_path: Option<&Path>) -> Result<(), CliError> {
    match command {
        Commands::Network { file, params, json } => network::cmd_network(file, &params, json, settings),
        Commands::Measurements { file, kind, json } => measurements::cmd_measurements(file, kind, json),
        Commands::Budget(cmd) => budget::cmd_budget(cmd, settings),
        Commands::Compare { planned, built, opm, tolerance, json, output } => {
            compare::cmd_compare(planned, built, opm, tolerance, json, output, settings)
        }
        Commands::Config { path } => cmd_config(path, settings, settings_path),
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    match path {
        Some(path) => Settings::load_from(path).map_err(|e| match e {
            ConfigError::Io { .. } => CliError::io(e.to_string()),
            ConfigError::Parse { .. } => CliError::parse(e.to_string())
                .with_hint("settings files are JSON; lines starting with // are comments"),
        }),
        None => Ok(Settings::load()),
    }
}

/// `RUST_LOG` wins; otherwise the settings level, adjusted by -v / -q.
fn init_logging(level: &str, verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => level,
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Also installs the `log` bridge, so library records reach stderr.
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("warning: logging disabled: {e}");
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INVALID_PARAMS, message: msg.into(), hint: None }
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// config
// ============================================================================

fn cmd_config(path_only: bool, settings: &Settings, explicit: Option<&Path>) -> Result<(), CliError> {
    let location = explicit
        .map(|p| p.display().to_string())
        .unwrap_or_else(Settings::config_path_display);

    if path_only {
        println!("{location}");
        return Ok(());
    }

    eprintln!("settings: {location}");
    util::print_json(settings)
}
