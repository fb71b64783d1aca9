use std::sync::{Mutex, OnceLock};

use crate::cascade::match_query;
use crate::error::MarkError;
use crate::index::ReferenceIndex;
use crate::model::{MatchResult, ReferenceTable};

/// Build-once holder for a [`ReferenceIndex`], shareable across threads.
///
/// `init` runs the build at most once; concurrent callers wait for it and
/// later calls return the index already built. Queries are plain reads.
#[derive(Debug, Default)]
pub struct Assessor {
    index: OnceLock<ReferenceIndex>,
    build_lock: Mutex<()>,
}

impl Assessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from `table` unless it is already built.
    pub fn init(&self, table: &ReferenceTable) -> Result<&ReferenceIndex, MarkError> {
        if let Some(index) = self.index.get() {
            return Ok(index);
        }
        // a poisoned lock only means another builder panicked; the cell is still empty
        let _guard = self.build_lock.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(index) = self.index.get() {
            return Ok(index);
        }
        let built = ReferenceIndex::build(table)?;
        let report = built.report();
        log::info!(
            "indexed {} of {} reference rows ({} non-vendor, {} malformed, {} duplicate names)",
            report.rows_indexed,
            report.rows_read,
            report.rows_skipped_vendor,
            report.rows_skipped_malformed,
            report.duplicates.len(),
        );
        Ok(self.index.get_or_init(|| built))
    }

    pub fn is_built(&self) -> bool {
        self.index.get().is_some()
    }

    pub fn index(&self) -> Result<&ReferenceIndex, MarkError> {
        self.index.get().ok_or(MarkError::NotBuilt)
    }

    /// Look up the mark of `cpu`. Fails only if the index was never built;
    /// an unmatched CPU is an `Ok` result with tier `FAILED`.
    pub fn assess(&self, cpu: &str) -> Result<MatchResult, MarkError> {
        Ok(match_query(cpu, self.index()?))
    }
}

impl From<ReferenceIndex> for Assessor {
    fn from(index: ReferenceIndex) -> Self {
        let assessor = Self::new();
        let _ = assessor.index.set(index);
        assessor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MatchTier, RawRow};

    fn table(rows: &[(&str, &str)]) -> ReferenceTable {
        ReferenceTable {
            headers: vec!["NAME".into(), "CPUMARK".into()],
            rows: rows
                .iter()
                .enumerate()
                .map(|(i, (name, mark))| RawRow {
                    line: i + 2,
                    cells: vec![name.to_string(), mark.to_string()],
                })
                .collect(),
        }
    }

    #[test]
    fn query_before_build_is_a_state_error() {
        let assessor = Assessor::new();
        assert!(!assessor.is_built());
        let err = assessor.assess("Intel Core i3").unwrap_err();
        assert!(matches!(err, MarkError::NotBuilt));
    }

    #[test]
    fn second_init_is_a_no_op() {
        let assessor = Assessor::new();
        let first = table(&[("Intel Core i3-8100 @ 3.60GHz", "6100")]);
        let second = table(&[("Intel Core i3-8100 @ 3.60GHz", "9999")]);
        assessor.init(&first).unwrap();
        assessor.init(&second).unwrap();
        let r = assessor.assess("Intel Core i3-8100").unwrap();
        assert_eq!((r.tier, r.mark), (MatchTier::Simple0, 6100));
    }

    #[test]
    fn failed_build_leaves_assessor_unbuilt() {
        let assessor = Assessor::new();
        let bad = ReferenceTable {
            headers: vec!["model".into()],
            rows: Vec::new(),
        };
        assert!(assessor.init(&bad).is_err());
        assert!(!assessor.is_built());
        assessor.init(&table(&[("AMD Ryzen 5 3600", "17800")])).unwrap();
        assert!(assessor.is_built());
    }

    #[test]
    fn concurrent_init_builds_once() {
        let assessor = Assessor::new();
        let t = table(&[("AMD Ryzen 5 3600", "17800")]);
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| assessor.init(&t).unwrap().len());
            }
        });
        assert_eq!(assessor.index().unwrap().len(), 1);
        assert_eq!(assessor.assess("AMD Ryzen 5 3600").unwrap().mark, 17800);
    }

    #[test]
    fn from_prebuilt_index() {
        let index = ReferenceIndex::build(&table(&[("AMD Ryzen 5 3600", "17800")])).unwrap();
        let assessor = Assessor::from(index);
        assert!(assessor.is_built());
    }
}
