//! Query entry point
//!
//! Runs the range filter, matchup resolver, aggregator and recommendation
//! engine over an immutable snapshot of team-game records.

use crate::features::matchup::{MatchupResolver, MatchupSet};
use crate::features::range::filter_seasons;
use crate::features::team_stats::AggregateSummary;
use crate::predict::recommend::Recommendation;
use crate::{HoopsError, Result, TeamCode, TeamGameRecord};
use serde::{Deserialize, Serialize};

/// Parameters for one head-to-head query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupQuery {
    pub team_a: TeamCode,
    pub team_b: TeamCode,
    pub start_year: i32,
    pub end_year: i32,
    pub line: f64,
}

impl MatchupQuery {
    /// Build a validated query. Team codes are case-normalised.
    ///
    /// An inverted year range is accepted; it just matches no records.
    pub fn new(team_a: &str, team_b: &str, start_year: i32, end_year: i32, line: f64) -> Result<Self> {
        let team_a = TeamCode::new(team_a);
        let team_b = TeamCode::new(team_b);

        if team_a.is_empty() || team_b.is_empty() {
            return Err(HoopsError::InvalidQuery(
                "both team abbreviations are required".to_string(),
            ));
        }
        if team_a == team_b {
            return Err(HoopsError::InvalidQuery(format!(
                "a team cannot be matched against itself ({})",
                team_a
            )));
        }
        if !line.is_finite() {
            return Err(HoopsError::InvalidQuery(format!(
                "over/under line must be a finite number, got {}",
                line
            )));
        }

        Ok(MatchupQuery {
            team_a,
            team_b,
            start_year,
            end_year,
            line,
        })
    }
}

/// Everything produced for a successful query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupReport {
    pub query: MatchupQuery,
    pub matchups: MatchupSet,
    pub summary: AggregateSummary,
    pub recommendation: Recommendation,
}

/// Result of a query that did not fail outright
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryOutcome {
    Report(Box<MatchupReport>),
    /// No records at all in the requested seasons
    EmptyRange { start_year: i32, end_year: i32 },
    /// The teams share game ids, but every one of those games was malformed
    NoValidMatchups { malformed_games: usize },
}

/// Answers head-to-head queries over a loaded record set
pub struct MatchupAnalyzer {
    records: Vec<TeamGameRecord>,
    resolver: MatchupResolver,
}

impl MatchupAnalyzer {
    pub fn new(records: Vec<TeamGameRecord>) -> Self {
        MatchupAnalyzer {
            records,
            resolver: MatchupResolver::default(),
        }
    }

    pub fn with_resolver(mut self, resolver: MatchupResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn records(&self) -> &[TeamGameRecord] {
        &self.records
    }

    /// Run a query.
    ///
    /// Returns [`HoopsError::NoMatchupsFound`] when the two teams never met in
    /// the requested seasons.
    pub fn analyze(&self, query: &MatchupQuery) -> Result<QueryOutcome> {
        let in_range = filter_seasons(&self.records, query.start_year, query.end_year);
        if in_range.is_empty() {
            log::warn!(
                "No team data from {} to {}",
                query.start_year,
                query.end_year
            );
            return Ok(QueryOutcome::EmptyRange {
                start_year: query.start_year,
                end_year: query.end_year,
            });
        }
        log::debug!(
            "{} of {} records fall in {}-{}",
            in_range.len(),
            self.records.len(),
            query.start_year,
            query.end_year
        );

        let matchups = self
            .resolver
            .resolve(&in_range, &query.team_a, &query.team_b, query.line)?;

        if matchups.is_empty() {
            return Ok(QueryOutcome::NoValidMatchups {
                malformed_games: matchups.malformed.len(),
            });
        }

        let summary = AggregateSummary::from_matchups(&matchups);
        let recommendation =
            Recommendation::from_summary(&summary, &query.team_a, &query.team_b, query.line);

        log::info!(
            "{} vs {}: {} games, over probability {:.3}",
            query.team_a,
            query.team_b,
            summary.total_games,
            summary.prob_over
        );

        Ok(QueryOutcome::Report(Box::new(MatchupReport {
            query: query.clone(),
            matchups,
            summary,
            recommendation,
        })))
    }
}
