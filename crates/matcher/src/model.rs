use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One data row of the reference file, cells in header order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// Physical line in the reference file (the header is line 1).
    pub line: usize,
    pub cells: Vec<String>,
}

/// Reference rows as read from disk, before any column negotiation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

// ---------------------------------------------------------------------------
// Index records
// ---------------------------------------------------------------------------

/// A reference CPU and its benchmark mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkRecord {
    pub canonical_name: String,
    pub mark: u32,
    pub source_line: usize,
}

/// What happened to the rows while an index was built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub rows_read: usize,
    pub rows_indexed: usize,
    pub rows_skipped_vendor: usize,
    pub rows_skipped_malformed: usize,
    /// Names seen more than once; the last occurrence's mark was kept.
    pub duplicates: Vec<String>,
}

// ---------------------------------------------------------------------------
// Match tiers
// ---------------------------------------------------------------------------

/// How a match was obtained, in cascade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum MatchTier {
    #[serde(rename = "FAILED")]
    Failed,
    #[serde(rename = "SIMPLE_0")]
    Simple0,
    #[serde(rename = "SIMPLE_1")]
    Simple1,
    #[serde(rename = "SIMPLE_2")]
    Simple2,
    #[serde(rename = "SIMPLE_3")]
    Simple3,
    #[serde(rename = "CLEVER_1")]
    Clever1,
    #[serde(rename = "CLEVER_2")]
    Clever2,
    #[serde(rename = "CLEVER_3_EXACT_SUBSET")]
    Clever3ExactSubset,
    #[serde(rename = "CLEVER_3_TOKENEQUAL")]
    Clever3TokenEqual,
    #[serde(rename = "DESPERATE_MODELCODE")]
    DesperateModelCode,
}

impl MatchTier {
    pub const ALL: [MatchTier; 10] = [
        Self::Failed,
        Self::Simple0,
        Self::Simple1,
        Self::Simple2,
        Self::Simple3,
        Self::Clever1,
        Self::Clever2,
        Self::Clever3ExactSubset,
        Self::Clever3TokenEqual,
        Self::DesperateModelCode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Failed => "FAILED",
            Self::Simple0 => "SIMPLE_0",
            Self::Simple1 => "SIMPLE_1",
            Self::Simple2 => "SIMPLE_2",
            Self::Simple3 => "SIMPLE_3",
            Self::Clever1 => "CLEVER_1",
            Self::Clever2 => "CLEVER_2",
            Self::Clever3ExactSubset => "CLEVER_3_EXACT_SUBSET",
            Self::Clever3TokenEqual => "CLEVER_3_TOKENEQUAL",
            Self::DesperateModelCode => "DESPERATE_MODELCODE",
        }
    }

    /// Exact-string tiers, as opposed to token-based ones.
    pub fn is_simple(&self) -> bool {
        matches!(
            self,
            Self::Simple0 | Self::Simple1 | Self::Simple2 | Self::Simple3
        )
    }
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub mark: u32,
    pub tier: MatchTier,
    pub matched_name: String,
    pub source_line: usize,
    /// Token set and candidate lists; empty unless the tier is `Failed`.
    pub diagnostics: Vec<String>,
}

impl MatchResult {
    pub fn hit(tier: MatchTier, record: &MarkRecord) -> Self {
        Self {
            mark: record.mark,
            tier,
            matched_name: record.canonical_name.clone(),
            source_line: record.source_line,
            diagnostics: Vec::new(),
        }
    }

    pub fn failed(diagnostics: Vec<String>) -> Self {
        Self {
            mark: 0,
            tier: MatchTier::Failed,
            matched_name: String::new(),
            source_line: 0,
            diagnostics,
        }
    }

    pub fn is_match(&self) -> bool {
        self.tier != MatchTier::Failed
    }
}

/// Wire shape of a single lookup (`cpumark lookup --json`).
///
/// Numbers are string-encoded; existing consumers parse them that way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryReport {
    pub error: bool,
    pub mark: String,
    pub cpustr: String,
    pub hint: String,
    pub cpuscsv: String,
    pub linenum: String,
    pub line: String,
    pub details: Vec<String>,
}

impl QueryReport {
    pub fn new(query: &str, result: &MatchResult, cpuscsv: &str) -> Self {
        Self {
            error: !result.is_match(),
            mark: result.mark.to_string(),
            cpustr: query.to_string(),
            hint: result.tier.to_string(),
            cpuscsv: cpuscsv.to_string(),
            linenum: result.source_line.to_string(),
            line: result.matched_name.clone(),
            details: result.diagnostics.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_serializes_with_cascade_names() {
        let json = serde_json::to_string(&MatchTier::Clever3TokenEqual).unwrap();
        assert_eq!(json, "\"CLEVER_3_TOKENEQUAL\"");
        for tier in MatchTier::ALL {
            let json = serde_json::to_string(&tier).unwrap();
            assert_eq!(json, format!("\"{}\"", tier.as_str()));
        }
    }

    #[test]
    fn tiers_order_by_cascade_position() {
        let mut sorted = MatchTier::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, MatchTier::ALL.to_vec());
        assert!(MatchTier::Failed < MatchTier::Simple0);
        assert!(MatchTier::Clever2 < MatchTier::DesperateModelCode);
    }

    #[test]
    fn report_for_failed_lookup() {
        let result = MatchResult::failed(vec!["trace".into()]);
        let report = QueryReport::new("Mystery CPU", &result, "cpumarks.csv");
        assert!(report.error);
        assert_eq!(report.mark, "0");
        assert_eq!(report.hint, "FAILED");
        assert_eq!(report.linenum, "0");
        assert_eq!(report.line, "");
        assert_eq!(report.details, vec!["trace"]);
    }

    #[test]
    fn report_for_hit() {
        let record = MarkRecord {
            canonical_name: "Intel Core i7-7500U @ 2.70GHz".into(),
            mark: 3641,
            source_line: 12,
        };
        let result = MatchResult::hit(MatchTier::Simple0, &record);
        let report = QueryReport::new("Intel Core i7-7500U", &result, "cpumarks.csv");
        assert!(!report.error);
        assert_eq!(report.mark, "3641");
        assert_eq!(report.hint, "SIMPLE_0");
        assert_eq!(report.linenum, "12");
        assert_eq!(report.line, "Intel Core i7-7500U @ 2.70GHz");
        assert!(report.details.is_empty());
    }
}
