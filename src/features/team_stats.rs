//! Head-to-head outcome statistics
//!
//! Reduces a matchup set to counts and probabilities in a single pass.

use crate::features::matchup::MatchupSet;
use crate::{Location, OverUnder};
use serde::{Deserialize, Serialize};

/// Aggregate outcome statistics for one query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateSummary {
    /// Games that survived resolution
    pub total_games: usize,
    /// Games whose combined score beat the line
    pub over_count: usize,
    /// `over_count / total_games`, 0.0 when there are no games
    pub prob_over: f64,
    pub team_a_wins: usize,
    pub team_b_wins: usize,
    pub home_wins_team_a: usize,
    pub away_wins_team_a: usize,
    pub home_wins_team_b: usize,
    pub away_wins_team_b: usize,
    /// Shared game ids rejected by the resolver
    pub malformed_games: usize,
}

impl AggregateSummary {
    pub fn from_matchups(set: &MatchupSet) -> Self {
        let mut summary = AggregateSummary {
            malformed_games: set.malformed.len(),
            ..Default::default()
        };

        for game in &set.games {
            summary.total_games += 1;
            if game.over_under == OverUnder::Over {
                summary.over_count += 1;
            }

            // Location is from team A's side, so team B was home when A was away
            let a_won = game.winner == set.team_a;
            match (a_won, game.location) {
                (true, Location::Home) => {
                    summary.team_a_wins += 1;
                    summary.home_wins_team_a += 1;
                }
                (true, Location::Away) => {
                    summary.team_a_wins += 1;
                    summary.away_wins_team_a += 1;
                }
                (false, Location::Home) => {
                    summary.team_b_wins += 1;
                    summary.away_wins_team_b += 1;
                }
                (false, Location::Away) => {
                    summary.team_b_wins += 1;
                    summary.home_wins_team_b += 1;
                }
            }
        }

        summary.prob_over = ratio(summary.over_count, summary.total_games);
        summary
    }

    pub fn under_count(&self) -> usize {
        self.total_games - self.over_count
    }

    /// Team A win ratio (0-1)
    pub fn win_rate_a(&self) -> f64 {
        ratio(self.team_a_wins, self.total_games)
    }

    /// Team B win ratio (0-1)
    pub fn win_rate_b(&self) -> f64 {
        ratio(self.team_b_wins, self.total_games)
    }

    /// Team A win rate minus team B win rate, as one division over the win
    /// difference
    pub fn win_rate_edge(&self) -> f64 {
        if self.total_games == 0 {
            return 0.0;
        }
        (self.team_a_wins as f64 - self.team_b_wins as f64) / self.total_games as f64
    }
}

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}
