//! `cpumark info`: which reference file is in use, and how fresh it is.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use cpumark_matcher::MarksConfig;
use serde::Serialize;

use crate::CliError;

/// Reference files are published as `cpumarks.csv`, usually a symlink to a
/// dated download.
const REFERENCE_LINK_NAME: &str = "cpumarks.csv";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceInfo {
    pub project_version: String,
    pub csv_symlink: String,
    pub csv_target: Option<String>,
    pub csv_file: Option<String>,
    pub csv_basename: Option<String>,
    pub csv_modified_time: Option<i64>,
    pub csv_modified_iso: Option<String>,
    pub total_cpus: Option<usize>,
}

impl ReferenceInfo {
    fn empty(probe: &Path) -> Self {
        Self {
            project_version: env!("CARGO_PKG_VERSION").to_string(),
            csv_symlink: probe.display().to_string(),
            csv_target: None,
            csv_file: None,
            csv_basename: None,
            csv_modified_time: None,
            csv_modified_iso: None,
            total_cpus: None,
        }
    }
}

/// Describe the file at `probe`, following one level of symlink. Fields stay
/// `None` for whatever cannot be determined; a missing file is not an error.
pub fn reference_info(probe: &Path) -> ReferenceInfo {
    let mut info = ReferenceInfo::empty(probe);

    let Ok(meta) = fs::symlink_metadata(probe) else {
        log::info!("no reference file at {}", probe.display());
        return info;
    };

    let csv_file: PathBuf = if meta.file_type().is_symlink() {
        let Ok(target) = fs::read_link(probe) else {
            return info;
        };
        let target_str = target.display().to_string();
        info.csv_target = Some(target_str.clone());
        info.csv_basename = Some(target_str);
        probe.parent().unwrap_or_else(|| Path::new("")).join(target)
    } else if meta.is_file() {
        info.csv_basename = probe.file_name().map(|n| n.to_string_lossy().into_owned());
        probe.to_path_buf()
    } else {
        return info;
    };
    info.csv_file = Some(csv_file.display().to_string());

    match fs::metadata(&csv_file).and_then(|m| m.modified()) {
        Ok(modified) => {
            let local: DateTime<Local> = modified.into();
            info.csv_modified_time = Some(local.timestamp());
            info.csv_modified_iso = Some(local.format("%Y-%m-%d %H:%M:%S").to_string());
            // header excluded
            info.total_cpus = fs::read_to_string(&csv_file)
                .ok()
                .map(|data| data.lines().count().saturating_sub(1));
        }
        Err(e) => log::warn!("cannot stat {}: {e}", csv_file.display()),
    }

    info
}

pub fn cmd_info(
    config: &MarksConfig,
    marksdata_dir: Option<PathBuf>,
    pretty: bool,
) -> Result<(), CliError> {
    let probe = match marksdata_dir {
        Some(dir) => dir.join(REFERENCE_LINK_NAME),
        None => config.reference.file.clone(),
    };
    let info = reference_info(&probe);

    let json_str = if pretty {
        serde_json::to_string_pretty(&info)
    } else {
        serde_json::to_string(&info)
    }
    .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
    println!("{json_str}");
    Ok(())
}
