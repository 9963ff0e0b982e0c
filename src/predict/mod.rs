//! Queries, recommendations and reports
//!
//! Run head-to-head queries and turn their statistics into betting calls.

pub mod analyzer;
pub mod recommend;
pub mod report;

pub use analyzer::{MatchupAnalyzer, MatchupQuery, MatchupReport, QueryOutcome};
pub use recommend::Recommendation;
