//! Replays independently collected marks through the cascade and scores it.

use std::collections::BTreeMap;

use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};

use crate::cascade::match_query;
use crate::error::MarkError;
use crate::index::ReferenceIndex;
use crate::model::MatchTier;

/// Default accepted gap between predicted and observed marks, in percent.
pub const DEFAULT_THRESHOLD: f64 = 3.0;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One mark observed for a CPU, and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub mark: f64,
    pub source: String,
}

/// Serialized as `[mark, source]`, the shape it is read from.
impl Serialize for Observation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        if self.mark.fract() == 0.0 && self.mark.abs() < i64::MAX as f64 {
            tuple.serialize_element(&(self.mark as i64))?;
        } else {
            tuple.serialize_element(&self.mark)?;
        }
        tuple.serialize_element(&self.source)?;
        tuple.end()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMark {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
struct RawObservation(RawMark, String);

/// Historical marks per CPU name, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    pub entries: Vec<(String, Vec<Observation>)>,
}

impl History {
    /// Parse `{"<cpu>": [[mark, "source"], ...], ...}`. Marks may be numbers or
    /// numeric strings.
    pub fn from_json(input: &str) -> Result<Self, MarkError> {
        let map: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(input).map_err(|e| MarkError::HistoryParse(e.to_string()))?;

        let mut entries = Vec::with_capacity(map.len());
        for (name, value) in map {
            let raw: Vec<RawObservation> = serde_json::from_value(value)
                .map_err(|e| MarkError::HistoryParse(format!("\"{name}\": {e}")))?;
            let mut observations = Vec::with_capacity(raw.len());
            for RawObservation(mark, source) in raw {
                let mark = match mark {
                    RawMark::Number(n) => n,
                    RawMark::Text(s) => s.trim().replace(',', "").parse().map_err(|_| {
                        MarkError::HistoryParse(format!("\"{name}\": mark '{s}' is not a number"))
                    })?,
                };
                observations.push(Observation { mark, source });
            }
            entries.push((name, observations));
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CalibrationSummary {
    pub names: usize,
    pub hits: usize,
    pub misses: usize,
    pub correct: usize,
    pub incorrect: usize,
    /// Within threshold of the mean but not of the min or the max.
    pub weird: usize,
}

/// A name the cascade could not resolve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissedName {
    pub name: String,
    pub observations: Vec<Observation>,
}

/// A resolved name whose mark is off the observed mean by more than the threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deviation {
    pub name: String,
    pub predicted: u32,
    pub tier: MatchTier,
    pub matched_name: String,
    pub mean: i64,
    pub min: i64,
    pub max: i64,
    pub gap_mean_pct: f64,
    pub gap_min_pct: f64,
    pub gap_max_pct: f64,
    pub std_dev: f64,
    pub std_dev_pct: f64,
    /// Observed mark -> the sources that reported it.
    pub sources: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calibration {
    pub threshold: f64,
    pub summary: CalibrationSummary,
    pub tiers: BTreeMap<MatchTier, usize>,
    pub missed: Vec<MissedName>,
    pub deviations: Vec<Deviation>,
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Spread of the observed marks for one name.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkStats {
    /// Arithmetic mean, truncated to an integer.
    pub mean: i64,
    pub min: i64,
    pub max: i64,
    /// Population standard deviation around the truncated mean.
    pub std_dev: f64,
}

impl MarkStats {
    /// `None` for an empty list.
    pub fn from_marks(marks: &[f64]) -> Option<Self> {
        if marks.is_empty() {
            return None;
        }
        let n = marks.len() as f64;
        let mean = (marks.iter().sum::<f64>() / n) as i64;
        let min = marks.iter().copied().fold(f64::INFINITY, f64::min) as i64;
        let max = marks.iter().copied().fold(f64::NEG_INFINITY, f64::max) as i64;
        let variance = marks
            .iter()
            .map(|m| (m - mean as f64).powi(2))
            .sum::<f64>()
            / n;
        Some(Self {
            mean,
            min,
            max,
            std_dev: variance.sqrt(),
        })
    }
}

/// Absolute gap of `predicted` from `reference`, in percent of `reference`.
pub fn gap_pct(predicted: u32, reference: i64) -> f64 {
    if reference == 0 {
        return f64::INFINITY;
    }
    (100.0 * (predicted as f64 - reference as f64) / reference as f64).abs()
}

fn mark_label(mark: f64) -> String {
    if mark.fract() == 0.0 {
        format!("{mark:.0}")
    } else {
        mark.to_string()
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Run every historical name through the cascade and compare the predicted
/// mark with what was observed. `threshold` is a percentage.
pub fn evaluate(history: &History, index: &ReferenceIndex, threshold: f64) -> Calibration {
    log::info!("calibrating against {} names (threshold {threshold}%)", history.len());

    let mut tiers: BTreeMap<MatchTier, usize> = MatchTier::ALL.iter().map(|t| (*t, 0)).collect();
    let mut summary = CalibrationSummary {
        names: history.len(),
        ..CalibrationSummary::default()
    };
    let mut missed = Vec::new();
    let mut deviations = Vec::new();

    for (name, observations) in &history.entries {
        let result = match_query(name, index);
        *tiers.entry(result.tier).or_insert(0) += 1;

        if !matches!(result.tier, MatchTier::Simple0 | MatchTier::Simple1) {
            log::debug!(
                "\"{name}\" has a mark of {} ({}, {}, \"{}\")",
                result.mark,
                result.tier,
                result.source_line,
                result.matched_name
            );
        }

        if !result.is_match() {
            log::info!("no match for \"{name}\": {:?}", result.diagnostics);
            summary.misses += 1;
            missed.push(MissedName {
                name: name.clone(),
                observations: observations.clone(),
            });
            continue;
        }
        summary.hits += 1;

        let marks: Vec<f64> = observations.iter().map(|o| o.mark).collect();
        let Some(stats) = MarkStats::from_marks(&marks) else {
            log::warn!("\"{name}\" has no observed marks, not scored");
            continue;
        };

        let gap_mean = gap_pct(result.mark, stats.mean);
        let gap_min = gap_pct(result.mark, stats.min);
        let gap_max = gap_pct(result.mark, stats.max);

        if gap_mean <= threshold && !(gap_min <= threshold && gap_max <= threshold) {
            summary.weird += 1;
        }

        if gap_mean <= threshold {
            summary.correct += 1;
            continue;
        }
        summary.incorrect += 1;

        let mut sources: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for o in observations {
            sources.entry(mark_label(o.mark)).or_default().push(o.source.clone());
        }
        let std_dev_pct = if stats.mean == 0 {
            f64::INFINITY
        } else {
            100.0 * stats.std_dev / stats.mean as f64
        };

        log::warn!(
            "\"{name}\" has a mark of {}\n  this is a {gap_mean:.2}% gap v/s {} average (sd = {:.2} [{std_dev_pct:.2}%])\n  {gap_min:.2}%, {gap_max:.2}% gap v/s min = {}, max = {}\n  data set: {sources:?}",
            result.mark,
            stats.mean,
            stats.std_dev,
            stats.min,
            stats.max,
        );

        deviations.push(Deviation {
            name: name.clone(),
            predicted: result.mark,
            tier: result.tier,
            matched_name: result.matched_name,
            mean: stats.mean,
            min: stats.min,
            max: stats.max,
            gap_mean_pct: gap_mean,
            gap_min_pct: gap_min,
            gap_max_pct: gap_max,
            std_dev: stats.std_dev,
            std_dev_pct,
            sources,
        });
    }

    Calibration {
        threshold,
        summary,
        tiers,
        missed,
        deviations,
    }
}
