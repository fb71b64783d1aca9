//! The match cascade: exact lookups first, then token-set strategies of
//! decreasing strictness. A strategy only answers when it has exactly one
//! candidate; anything else falls through to the next one.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::index::{IndexEntry, ReferenceIndex};
use crate::model::{MatchResult, MatchTier};
use crate::normalize::{cut_amd_with, normalize_base, strip_clock, strip_markers};
use crate::tokenize::{join_tokens, tokenize};

/// Shared-token threshold for CLEVER_2. AMD names carry fewer tokens.
fn overlap_threshold(query: &str) -> usize {
    if query.contains("AMD") {
        3
    } else {
        4
    }
}

/// Match a free-text CPU description against the index.
pub fn match_query(query: &str, index: &ReferenceIndex) -> MatchResult {
    if let Some(record) = index.get_no_frequency(query) {
        return MatchResult::hit(MatchTier::Simple0, record);
    }

    // A verbatim reference name is its own best match.
    let base = normalize_base(query);
    if let Some(record) = index.get_exact(query).or_else(|| index.get_exact(&base)) {
        return MatchResult::hit(MatchTier::Simple1, record);
    }

    let trimmed = cut_amd_with(&base);
    if trimmed != base {
        if let Some(record) = index.get_exact(trimmed) {
            return MatchResult::hit(MatchTier::Simple2, record);
        }
    }
    if let Some(record) = index.get_no_frequency(trimmed) {
        return MatchResult::hit(MatchTier::Simple3, record);
    }

    let stripped = strip_markers(query);
    let wanted = tokenize(&stripped);

    let clever_1: Vec<&IndexEntry> = index
        .entries()
        .filter(|e| e.tokens.is_subset(&wanted))
        .collect();
    if let [only] = clever_1.as_slice() {
        return MatchResult::hit(MatchTier::Clever1, &only.record);
    }

    let threshold = overlap_threshold(&stripped);
    let clever_2: Vec<&IndexEntry> = index
        .entries()
        .filter(|e| e.tokens.intersection(&wanted).count() >= threshold)
        .collect();
    if let [only] = clever_2.as_slice() {
        return MatchResult::hit(MatchTier::Clever2, &only.record);
    }

    let clever_3: Vec<&IndexEntry> = clever_2
        .iter()
        .copied()
        .filter(|e| is_strict_superset(&e.tokens, &wanted))
        .collect();
    if let [only] = clever_3.as_slice() {
        return MatchResult::hit(MatchTier::Clever3ExactSubset, &only.record);
    }
    if let Some(entry) = clever_3
        .iter()
        .find(|e| tokenize(strip_clock(&e.record.canonical_name)) == wanted)
    {
        return MatchResult::hit(MatchTier::Clever3TokenEqual, &entry.record);
    }

    let code = model_code(&stripped);
    let desperate: Vec<&IndexEntry> = match code {
        Some(code) => index.entries().filter(|e| e.tokens.contains(code)).collect(),
        None => Vec::new(),
    };
    if let [only] = desperate.as_slice() {
        return MatchResult::hit(MatchTier::DesperateModelCode, &only.record);
    }

    MatchResult::failed(vec![
        format!("\"{stripped}\" ==> {{{}}}", join_tokens(&wanted)),
        candidate_list(&clever_1),
        candidate_list(&clever_2),
        candidate_list(&clever_3),
        candidate_list(&desperate),
    ])
}

fn is_strict_superset(tokens: &BTreeSet<String>, wanted: &BTreeSet<String>) -> bool {
    tokens.len() > wanted.len() && tokens.is_superset(wanted)
}

/// Last "uppercase letter + 1 to 4 digits" code in the text, e.g. `T4500` in
/// "Pentium T4500".
pub fn model_code(text: &str) -> Option<&str> {
    static MODEL_CODE: OnceLock<Regex> = OnceLock::new();
    let re = MODEL_CODE.get_or_init(|| Regex::new(r"^.*([A-Z][0-9]{1,4})").expect("valid regex"));
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn candidate_list(entries: &[&IndexEntry]) -> String {
    let names: Vec<&str> = entries
        .iter()
        .map(|e| e.record.canonical_name.as_str())
        .collect();
    format!("{names:?}")
}
