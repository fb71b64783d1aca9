//! Column negotiation for reference files from different sources.

use crate::error::MarkError;

/// Accepted spellings of the CPU name column, in priority order.
pub const NAME_ALIASES: &[&str] = &["name", "NAME", "CPUNAME"];

/// Accepted spellings of the mark column, in priority order.
pub const MARK_ALIASES: &[&str] = &["cpumark", "CPUMARK"];

/// Header positions of the columns the index needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub name: usize,
    pub mark: usize,
}

/// Resolve the name and mark columns once for the whole table.
pub fn resolve_columns(headers: &[String]) -> Result<ColumnMap, MarkError> {
    Ok(ColumnMap {
        name: resolve(headers, "name", NAME_ALIASES)?,
        mark: resolve(headers, "mark", MARK_ALIASES)?,
    })
}

/// Exact spellings win over case-insensitive ones; within each pass the
/// alias order decides.
fn resolve(
    headers: &[String],
    field: &'static str,
    aliases: &'static [&'static str],
) -> Result<usize, MarkError> {
    let exact = aliases
        .iter()
        .find_map(|alias| headers.iter().position(|h| h.trim() == *alias));
    let folded = || {
        aliases.iter().find_map(|alias| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(alias))
        })
    };
    exact
        .or_else(folded)
        .ok_or(MarkError::MissingColumn { field, aliases })
}
