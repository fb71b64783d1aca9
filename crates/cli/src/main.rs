// cpumark CLI - benchmark mark lookup for free-text CPU descriptions

mod calibrate;
mod exit_codes;
mod info;
mod lookup;
mod reference;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use cpumark_matcher::{MarkError, MarksConfig};

use exit_codes::{mark_exit_code, EXIT_CONFIG, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "cpumark")]
#[command(about = "Find the benchmark mark of a CPU from its description")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Config file (TOML). Defaults to <config dir>/cpumark/config.toml when present
    #[arg(long, global = true, env = "CPUMARK_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Report progress on stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Report every cascade decision on stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up the mark of one CPU
    #[command(after_help = "\
Examples:
  cpumark lookup 'Intel(R) Core(TM) i7-7500U CPU @ 2.70GHz'
  cpumark lookup 'AMD Ryzen 7 5800H with Radeon Graphics' --json
  cpumark lookup 'Intel Core i5-3380M' --cpuscsv marksdata/cpumarks-2024.csv")]
    Lookup {
        /// CPU description, as reported by the OS or firmware
        cpu: String,

        /// Reference marks file (overrides the config file)
        #[arg(long, env = "CPUMARK_CSV", value_name = "FILE")]
        cpuscsv: Option<PathBuf>,

        /// Print the lookup report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score the matcher against historically observed marks
    #[command(after_help = "\
Examples:
  cpumark calibrate
  cpumark calibrate --history our_cpunames_and_marks.json --threshold 5
  cpumark calibrate --json --fail-on-miss")]
    Calibrate {
        /// Reference marks file (overrides the config file)
        #[arg(long, env = "CPUMARK_CSV", value_name = "FILE")]
        cpuscsv: Option<PathBuf>,

        /// JSON file of observed marks: {"<cpu>": [[mark, "source"], ...]}
        #[arg(long, value_name = "FILE")]
        history: Option<PathBuf>,

        /// Accepted gap between predicted and observed mean, in percent
        #[arg(long, value_name = "PCT")]
        threshold: Option<f64>,

        /// Print the full calibration result as JSON
        #[arg(long)]
        json: bool,

        /// Exit non-zero when any name is unmatched or off threshold
        #[arg(long)]
        fail_on_miss: bool,
    },

    /// Describe the reference marks file in use
    #[command(after_help = "\
Examples:
  cpumark info
  cpumark info --marksdata-dir /srv/cpumarks/marksdata --pretty")]
    Info {
        /// Directory holding cpumarks.csv (usually a symlink to a dated file)
        #[arg(long, value_name = "DIR")]
        marksdata_dir: Option<PathBuf>,

        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Build the index and report what was kept and skipped
    #[command(after_help = "\
Examples:
  cpumark validate
  cpumark validate --cpuscsv marksdata/cpumarks-2024.csv")]
    Validate {
        /// Reference marks file (overrides the config file)
        #[arg(long, env = "CPUMARK_CSV", value_name = "FILE")]
        cpuscsv: Option<PathBuf>,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nmatcher: cpumark-matcher ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nmatcher: cpumark-matcher ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn init_logging(verbose: bool, debug: bool) {
    let level = if debug {
        log::LevelFilter::Debug
    } else if verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    // RUST_LOG, when set, wins over the flags
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Lookup { cpu, cpuscsv, json } => lookup::cmd_lookup(&config, cpu, cpuscsv, json),
        Commands::Calibrate {
            cpuscsv,
            history,
            threshold,
            json,
            fail_on_miss,
        } => calibrate::cmd_calibrate(&config, cpuscsv, history, threshold, json, fail_on_miss),
        Commands::Info { marksdata_dir, pretty } => info::cmd_info(&config, marksdata_dir, pretty),
        Commands::Validate { cpuscsv } => reference::cmd_validate(&config, cpuscsv),
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

// ============================================================================
// Config discovery
// ============================================================================

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("cpumark").join("config.toml"))
        .filter(|path| path.is_file())
}

/// `--config` / `$CPUMARK_CONFIG`, else the per-user file, else defaults.
fn load_config(explicit: Option<&Path>) -> Result<MarksConfig, CliError> {
    let Some(path) = explicit.map(Path::to_path_buf).or_else(default_config_path) else {
        log::debug!("no config file, using defaults");
        return Ok(MarksConfig::default());
    };
    log::info!("reading config {}", path.display());

    let text = std::fs::read_to_string(&path).map_err(|e| CliError {
        code: EXIT_CONFIG,
        message: format!("cannot read config {}: {e}", path.display()),
        hint: Some("check --config or the CPUMARK_CONFIG environment variable".to_string()),
    })?;
    let config = MarksConfig::from_toml(&text)
        .map_err(|e| CliError::from(e).with_hint(format!("in {}", path.display())))?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(config.resolve_paths(base_dir))
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<MarkError> for CliError {
    fn from(err: MarkError) -> Self {
        let hint = match &err {
            MarkError::MissingColumn { .. } => {
                Some("is this a cpumarks CSV? check --cpuscsv and reference.delimiter".to_string())
            }
            _ => None,
        };
        Self { code: mark_exit_code(&err), message: err.to_string(), hint }
    }
}
