//! Reference file loading shared by the commands, and `cpumark validate`.

use std::path::{Path, PathBuf};

use cpumark_matcher::loader::read_reference_csv;
use cpumark_matcher::{Assessor, MarksConfig};

use crate::CliError;

/// A built assessor and the file it was built from.
pub struct LoadedReference {
    pub path: PathBuf,
    pub assessor: Assessor,
}

impl LoadedReference {
    /// File name as reported in lookup output.
    pub fn basename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// `--cpuscsv` wins over the config file.
pub fn reference_path(config: &MarksConfig, cpuscsv: Option<PathBuf>) -> PathBuf {
    cpuscsv.unwrap_or_else(|| config.reference.file.clone())
}

/// Read the reference CSV and build the index.
pub fn load(config: &MarksConfig, cpuscsv: Option<PathBuf>) -> Result<LoadedReference, CliError> {
    let path = reference_path(config, cpuscsv);
    let delimiter = config.delimiter()?;

    log::info!("loading reference marks from {}", path.display());
    let data = read_file(&path)
        .map_err(|e| e.with_hint("pass --cpuscsv FILE or set reference.file in the config"))?;
    let table = read_reference_csv(&data, delimiter)?;

    let assessor = Assessor::new();
    assessor.init(&table)?;
    Ok(LoadedReference { path, assessor })
}

pub fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display())))
}

// ============================================================================
// validate
// ============================================================================

pub fn cmd_validate(config: &MarksConfig, cpuscsv: Option<PathBuf>) -> Result<(), CliError> {
    let reference = load(config, cpuscsv)?;
    let index = reference.assessor.index()?;
    let report = index.report();

    let json_str = serde_json::to_string_pretty(report)
        .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
    println!("{json_str}");

    eprintln!(
        "{}: {} CPUs indexed from {} rows ({} non-vendor, {} malformed, {} duplicate names)",
        reference.path.display(),
        index.len(),
        report.rows_read,
        report.rows_skipped_vendor,
        report.rows_skipped_malformed,
        report.duplicates.len(),
    );
    Ok(())
}
