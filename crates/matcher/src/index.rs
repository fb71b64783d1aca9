use std::collections::{BTreeSet, HashMap};

use crate::error::MarkError;
use crate::model::{BuildReport, MarkRecord, RawRow, ReferenceTable};
use crate::normalize::{has_vendor, strip_clock};
use crate::schema::{resolve_columns, ColumnMap};
use crate::tokenize::tokenize;

/// A reference record with its precomputed token set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub record: MarkRecord,
    pub tokens: BTreeSet<String>,
}

/// Lookup structures over the vendor-qualified reference rows.
///
/// Built once, read-only afterwards. `entries` keeps the order in which names
/// were first seen; the name-keyed maps point into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceIndex {
    entries: Vec<IndexEntry>,
    exact: HashMap<String, usize>,
    no_frequency: HashMap<String, usize>,
    report: BuildReport,
}

impl ReferenceIndex {
    /// Build the index from raw reference rows.
    ///
    /// Fails only when the table has no recognizable name or mark column.
    /// Rows that are not Intel/AMD are dropped; rows with an unusable mark are
    /// logged and skipped.
    pub fn build(table: &ReferenceTable) -> Result<Self, MarkError> {
        let columns = resolve_columns(&table.headers)?;

        let mut records: Vec<MarkRecord> = Vec::new();
        let mut exact: HashMap<String, usize> = HashMap::new();
        let mut report = BuildReport::default();

        for row in &table.rows {
            report.rows_read += 1;
            let Some(record) = parse_row(row, columns, &mut report) else {
                continue;
            };

            let existing = exact.get(&record.canonical_name).copied();
            match existing {
                Some(pos) => {
                    let previous = &records[pos];
                    log::warn!(
                        "duplicate name \"{}\": line {} (mark {}) replaces line {} (mark {})",
                        record.canonical_name,
                        record.source_line,
                        record.mark,
                        previous.source_line,
                        previous.mark,
                    );
                    if !report.duplicates.contains(&record.canonical_name) {
                        report.duplicates.push(record.canonical_name.clone());
                    }
                    records[pos] = record;
                }
                None => {
                    exact.insert(record.canonical_name.clone(), records.len());
                    records.push(record);
                }
            }
            report.rows_indexed += 1;
        }

        Ok(Self::derive(records, exact, report))
    }

    /// Derive the clock-less and token-set views from the exact index.
    fn derive(records: Vec<MarkRecord>, exact: HashMap<String, usize>, report: BuildReport) -> Self {
        let mut no_frequency = HashMap::new();
        for (pos, record) in records.iter().enumerate() {
            if record.canonical_name.contains('@') {
                no_frequency.insert(strip_clock(&record.canonical_name).to_string(), pos);
            }
        }

        let entries = records
            .into_iter()
            .map(|record| IndexEntry {
                tokens: tokenize(&record.canonical_name),
                record,
            })
            .collect();

        Self {
            entries,
            exact,
            no_frequency,
            report,
        }
    }

    pub fn get_exact(&self, name: &str) -> Option<&MarkRecord> {
        self.exact.get(name).map(|&pos| &self.entries[pos].record)
    }

    /// Lookup by name without its "@ clock" suffix.
    pub fn get_no_frequency(&self, name: &str) -> Option<&MarkRecord> {
        self.no_frequency
            .get(name)
            .map(|&pos| &self.entries[pos].record)
    }

    /// All entries, in first-seen order.
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn no_frequency_len(&self) -> usize {
        self.no_frequency.len()
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }
}

/// `None` when the row is skipped. Non-vendor rows are dropped quietly,
/// malformed ones with a warning.
fn parse_row(row: &RawRow, columns: ColumnMap, report: &mut BuildReport) -> Option<MarkRecord> {
    let Some(name) = row.cells.get(columns.name) else {
        log::warn!("line {}: no name cell, row skipped", row.line);
        report.rows_skipped_malformed += 1;
        return None;
    };
    if !has_vendor(name) {
        report.rows_skipped_vendor += 1;
        return None;
    }

    let raw_mark = row.cells.get(columns.mark).map(String::as_str).unwrap_or("");
    match parse_mark(raw_mark) {
        Some(mark) => Some(MarkRecord {
            canonical_name: name.clone(),
            mark,
            source_line: row.line,
        }),
        None => {
            log::warn!(
                "line {}: cannot parse mark '{raw_mark}' for \"{name}\", row skipped",
                row.line
            );
            report.rows_skipped_malformed += 1;
            None
        }
    }
}

/// Marks are positive integers, possibly written with thousands separators.
fn parse_mark(raw: &str) -> Option<u32> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    cleaned.parse::<u32>().ok().filter(|m| *m > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[(&str, &str)]) -> ReferenceTable {
        ReferenceTable {
            headers: vec!["name".into(), "cpumark".into()],
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
    fn exact_and_no_frequency_views() {
        let index = ReferenceIndex::build(&table(&[
            ("Intel Core i5-3380M @ 2.90GHz", "4212"),
            ("AMD Ryzen 5 3600", "17800"),
        ]))
        .unwrap();

        assert_eq!(index.len(), 2);
        let rec = index.get_exact("Intel Core i5-3380M @ 2.90GHz").unwrap();
        assert_eq!((rec.mark, rec.source_line), (4212, 2));
        assert_eq!(index.get_no_frequency("Intel Core i5-3380M").unwrap().mark, 4212);
        // only '@' names get a clock-less key
        assert_eq!(index.no_frequency_len(), 1);
        assert!(index.get_no_frequency("AMD Ryzen 5 3600").is_none());
    }

    #[test]
    fn token_sets_follow_canonical_names() {
        let index = ReferenceIndex::build(&table(&[("AMD Ryzen 5 3600X", "18000")])).unwrap();
        let entry = index.entries().next().unwrap();
        let expected: BTreeSet<String> =
            ["AMD", "Ryzen", "5", "3600", "X"].iter().map(|s| s.to_string()).collect();
        assert_eq!(entry.tokens, expected);
    }

    #[test]
    fn non_vendor_rows_dropped() {
        let index = ReferenceIndex::build(&table(&[
            ("Apple M1 8 Core 3200 MHz", "14500"),
            ("ARM Cortex-A72 4 Core 1500 MHz", "1300"),
            ("Intel Xeon E5-2680 v4 @ 2.40GHz", "17500"),
        ]))
        .unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.report().rows_skipped_vendor, 2);
        assert_eq!(index.report().rows_read, 3);
    }

    #[test]
    fn malformed_marks_skipped() {
        let index = ReferenceIndex::build(&table(&[
            ("Intel Pentium 4 2.00GHz", "NA"),
            ("Intel Pentium 4 2.40GHz", "0"),
            ("Intel Core i9-9900K @ 3.60GHz", "18,900"),
        ]))
        .unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.report().rows_skipped_malformed, 2);
        assert_eq!(index.get_exact("Intel Core i9-9900K @ 3.60GHz").unwrap().mark, 18900);
    }

    #[test]
    fn short_row_skipped() {
        let mut t = table(&[("Intel Core i3-8100 @ 3.60GHz", "6100")]);
        t.rows.push(RawRow {
            line: 3,
            cells: vec!["Intel Core i3-9100 @ 3.60GHz".into()],
        });
        let index = ReferenceIndex::build(&t).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.report().rows_skipped_malformed, 1);
    }

    #[test]
    fn duplicate_names_last_wins_and_reported() {
        let index = ReferenceIndex::build(&table(&[
            ("Intel Core i7-4790 @ 3.60GHz", "7200"),
            ("AMD FX-8350 Eight-Core", "5900"),
            ("Intel Core i7-4790 @ 3.60GHz", "7230"),
        ]))
        .unwrap();
        let rec = index.get_exact("Intel Core i7-4790 @ 3.60GHz").unwrap();
        assert_eq!((rec.mark, rec.source_line), (7230, 4));
        assert_eq!(index.report().duplicates, vec!["Intel Core i7-4790 @ 3.60GHz"]);
        // position of first insertion is kept
        let first = index.entries().next().unwrap();
        assert_eq!(first.record.canonical_name, "Intel Core i7-4790 @ 3.60GHz");
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn missing_column_is_fatal_even_without_rows() {
        let t = ReferenceTable {
            headers: vec!["CPUNAME".into(), "score".into()],
            rows: Vec::new(),
        };
        let err = ReferenceIndex::build(&t).unwrap_err();
        assert!(matches!(err, MarkError::MissingColumn { field: "mark", .. }));
    }

    #[test]
    fn rebuild_is_identical() {
        let t = table(&[
            ("Intel Core i5-3380M @ 2.90GHz", "4212"),
            ("Intel Core i5-3380M @ 2.90GHz", "4215"),
            ("AMD Ryzen 5 3600", "17800"),
        ]);
        assert_eq!(ReferenceIndex::build(&t).unwrap(), ReferenceIndex::build(&t).unwrap());
    }
}
