//! Matchup extraction and aggregation
//!
//! Turns a snapshot of per-team rows into head-to-head games and their
//! outcome statistics.

pub mod matchup;
pub mod range;
pub mod team_stats;

pub use matchup::{MalformedGame, MalformedReason, MatchupResolver, MatchupSet};
pub use range::filter_seasons;
pub use team_stats::AggregateSummary;
