//! CLI Exit Code Registry
//!
//! Single source of truth for `cpumark` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | Usage error (bad args, bad flag value)               |
//! | 3    | Lookup found no match (human output only)            |
//! | 4    | Reference file has no usable name or mark column     |
//! | 5    | I/O error reading an input file                      |
//! | 6    | Config file unreadable or invalid                    |
//! | 7    | Calibration history is not valid JSON of the right shape |
//! | 8    | Calibration found misses (with `--fail-on-miss`)     |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into [`mark_exit_code`] or the command that raises it

use cpumark_matcher::MarkError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// `lookup` could not resolve the CPU. In `--json` mode the report's
/// `error` field carries this instead and the exit code stays 0.
pub const EXIT_NO_MATCH: u8 = 3;

/// Reference file lacks a name or mark column under any known alias.
pub const EXIT_SCHEMA: u8 = 4;

/// Cannot read the reference file or the history file.
pub const EXIT_IO: u8 = 5;

/// Config file parse or validation error.
pub const EXIT_CONFIG: u8 = 6;

/// Calibration history malformed.
pub const EXIT_HISTORY: u8 = 7;

/// `calibrate --fail-on-miss` saw unmatched names or out-of-threshold marks.
pub const EXIT_CALIBRATION_MISS: u8 = 8;

/// Map an engine error to its exit code.
pub fn mark_exit_code(err: &MarkError) -> u8 {
    match err {
        MarkError::MissingColumn { .. } => EXIT_SCHEMA,
        MarkError::Io(_) => EXIT_IO,
        MarkError::ConfigParse(_) | MarkError::ConfigValidation(_) => EXIT_CONFIG,
        MarkError::HistoryParse(_) => EXIT_HISTORY,
        MarkError::NotBuilt => EXIT_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_NO_MATCH,
            EXIT_SCHEMA,
            EXIT_IO,
            EXIT_CONFIG,
            EXIT_HISTORY,
            EXIT_CALIBRATION_MISS,
        ];
        let unique: std::collections::HashSet<u8> = codes.iter().copied().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn engine_errors_map_to_specific_codes() {
        assert_eq!(mark_exit_code(&MarkError::Io("x".into())), EXIT_IO);
        assert_eq!(mark_exit_code(&MarkError::ConfigParse("x".into())), EXIT_CONFIG);
        assert_eq!(mark_exit_code(&MarkError::HistoryParse("x".into())), EXIT_HISTORY);
        assert_eq!(
            mark_exit_code(&MarkError::MissingColumn {
                field: "name",
                aliases: &["name"],
            }),
            EXIT_SCHEMA
        );
    }
}
