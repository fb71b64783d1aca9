//! `cpumark lookup`: mark of a single CPU description.

use std::path::PathBuf;

use cpumark_matcher::{MarksConfig, QueryReport};

use crate::exit_codes::EXIT_NO_MATCH;
use crate::reference;
use crate::CliError;

pub fn cmd_lookup(
    config: &MarksConfig,
    cpu: String,
    cpuscsv: Option<PathBuf>,
    json_output: bool,
) -> Result<(), CliError> {
    let result = run_lookup(config, &cpu, cpuscsv);

    if json_output {
        // stdout stays one JSON value even when the lookup cannot run
        return match result {
            Ok(report) => print_json(&report),
            Err(err) => {
                println!("{}", serde_json::json!({ "error": true, "message": err.message }));
                Err(err)
            }
        };
    }

    let report = result?;
    println!(
        "\"{}\" has a mark of {} ({}, {}, \"{}\")",
        report.cpustr, report.mark, report.hint, report.linenum, report.line
    );
    if report.error {
        for detail in &report.details {
            eprintln!("  {detail}");
        }
        return Err(CliError {
            code: EXIT_NO_MATCH,
            message: format!("no reference CPU matches \"{}\"", report.cpustr),
            hint: Some("run with --debug for the cascade trace, or --json for a report".to_string()),
        });
    }
    Ok(())
}

fn run_lookup(
    config: &MarksConfig,
    cpu: &str,
    cpuscsv: Option<PathBuf>,
) -> Result<QueryReport, CliError> {
    if cpu.trim().is_empty() {
        return Err(CliError::usage("CPU description must not be empty"));
    }

    let reference = reference::load(config, cpuscsv)?;
    let result = reference.assessor.assess(cpu)?;
    log::debug!(
        "\"{cpu}\" -> {} via {} (line {})",
        result.mark,
        result.tier,
        result.source_line
    );
    if result.is_match() && !result.tier.is_simple() {
        log::info!(
            "\"{cpu}\" matched \"{}\" by tokens only ({})",
            result.matched_name,
            result.tier
        );
    }
    Ok(QueryReport::new(cpu, &result, &reference.basename()))
}

fn print_json(report: &QueryReport) -> Result<(), CliError> {
    let json_str = serde_json::to_string(report)
        .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
    println!("{json_str}");
    Ok(())
}
