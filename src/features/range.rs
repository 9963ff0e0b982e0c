//! Season range filtering

use crate::TeamGameRecord;

/// Keep records whose season falls in `[start_year, end_year]`.
///
/// An inverted range simply matches nothing.
pub fn filter_seasons(
    records: &[TeamGameRecord],
    start_year: i32,
    end_year: i32,
) -> Vec<TeamGameRecord> {
    records
        .iter()
        .filter(|r| (start_year..=end_year).contains(&r.season_year))
        .cloned()
        .collect()
}
