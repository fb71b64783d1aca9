//! `cpumark calibrate`: replay historical marks through the matcher.

use std::path::PathBuf;

use cpumark_matcher::{evaluate, History, MarksConfig, MatchTier};

use crate::exit_codes::EXIT_CALIBRATION_MISS;
use crate::reference;
use crate::CliError;

pub fn cmd_calibrate(
    config: &MarksConfig,
    cpuscsv: Option<PathBuf>,
    history: Option<PathBuf>,
    threshold: Option<f64>,
    json_output: bool,
    fail_on_miss: bool,
) -> Result<(), CliError> {
    let threshold = threshold.unwrap_or(config.calibration.threshold);
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(CliError::usage(format!(
            "--threshold must be a non-negative percentage, got {threshold}"
        )));
    }

    let history_path = history.unwrap_or_else(|| config.calibration.history.clone());
    let history_str = reference::read_file(&history_path)
        .map_err(|e| e.with_hint("pass --history FILE or set calibration.history in the config"))?;
    let history = History::from_json(&history_str)?;

    let reference = reference::load(config, cpuscsv)?;
    let calibration = evaluate(&history, reference.assessor.index()?, threshold);

    if json_output {
        let json_str = serde_json::to_string_pretty(&calibration)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    } else {
        let s = &calibration.summary;
        println!(
            "{} names: {} matched, {} unmatched; {} within {}%, {} off ({} weird)",
            s.names, s.hits, s.misses, s.correct, calibration.threshold, s.incorrect, s.weird,
        );
        for tier in MatchTier::ALL {
            let count = calibration.tiers.get(&tier).copied().unwrap_or(0);
            println!("  {:<22} {count}", tier.as_str());
        }
        for missed in &calibration.missed {
            println!("unmatched: \"{}\"", missed.name);
        }
        for d in &calibration.deviations {
            println!(
                "off: \"{}\" predicted {} ({}), observed mean {} ({:.2}% gap)",
                d.name, d.predicted, d.tier, d.mean, d.gap_mean_pct,
            );
        }
    }

    let s = &calibration.summary;
    if fail_on_miss && (s.misses > 0 || s.incorrect > 0) {
        return Err(CliError {
            code: EXIT_CALIBRATION_MISS,
            message: format!("{} unmatched, {} outside threshold", s.misses, s.incorrect),
            hint: None,
        });
    }
    Ok(())
}
