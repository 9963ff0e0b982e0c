//! Betting recommendations from head-to-head statistics
//!
//! Fixed thresholds map the over probability and the win-rate edge to a pick
//! and a confidence tier. The boundaries are exact: 0.6 is a moderate Over,
//! 0.5 is neutral, an edge of 0.10 is moderate and 0.05 is no advantage.

use crate::features::team_stats::AggregateSummary;
use crate::TeamCode;
use serde::{Deserialize, Serialize};
use std::fmt;

const OVER_STRONG: f64 = 0.6;
const UNDER_STRONG: f64 = 0.4;
const NEUTRAL: f64 = 0.5;
const EDGE_HIGH: f64 = 0.10;
const EDGE_MODERATE: f64 = 0.05;

/// Confidence tier attached to a pick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    Strong,
    High,
    Moderate,
    Low,
    NoClearTrend,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Strong => write!(f, "strong"),
            Confidence::High => write!(f, "high"),
            Confidence::Moderate => write!(f, "moderate"),
            Confidence::Low => write!(f, "low"),
            Confidence::NoClearTrend => write!(f, "no clear trend"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TotalPick {
    Over,
    Under,
    Neutral,
}

impl fmt::Display for TotalPick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TotalPick::Over => write!(f, "Over"),
            TotalPick::Under => write!(f, "Under"),
            TotalPick::Neutral => write!(f, "Neutral"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinnerPick {
    Team(TeamCode),
    NoClearAdvantage,
}

impl fmt::Display for WinnerPick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WinnerPick::Team(team) => write!(f, "{}", team),
            WinnerPick::NoClearAdvantage => write!(f, "no clear advantage"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverUnderCall {
    pub pick: TotalPick,
    pub confidence: Confidence,
    pub prob_over: f64,
    pub line: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinnerCall {
    pub pick: WinnerPick,
    pub confidence: Confidence,
    /// Team A win rate minus team B win rate
    pub edge: f64,
}

/// Both calls for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub over_under: OverUnderCall,
    pub winner: WinnerCall,
}

impl Recommendation {
    pub fn from_summary(
        summary: &AggregateSummary,
        team_a: &TeamCode,
        team_b: &TeamCode,
        line: f64,
    ) -> Self {
        Recommendation {
            over_under: recommend_over_under(summary.prob_over, line),
            winner: recommend_winner(summary.win_rate_edge(), team_a, team_b),
        }
    }
}

/// Classify an over probability. Anything that fits no band, including
/// exactly 0.5 and NaN, is neutral.
pub fn recommend_over_under(prob_over: f64, line: f64) -> OverUnderCall {
    let (pick, confidence) = if prob_over > OVER_STRONG {
        (TotalPick::Over, Confidence::Strong)
    } else if prob_over > NEUTRAL {
        (TotalPick::Over, Confidence::Moderate)
    } else if prob_over < UNDER_STRONG {
        (TotalPick::Under, Confidence::Strong)
    } else if prob_over < NEUTRAL {
        (TotalPick::Under, Confidence::Moderate)
    } else {
        (TotalPick::Neutral, Confidence::NoClearTrend)
    };

    OverUnderCall {
        pick,
        confidence,
        prob_over,
        line,
    }
}

/// Classify the win-rate edge of team A over team B
pub fn recommend_winner(edge: f64, team_a: &TeamCode, team_b: &TeamCode) -> WinnerCall {
    let (pick, confidence) = if edge > EDGE_HIGH {
        (WinnerPick::Team(team_a.clone()), Confidence::High)
    } else if edge < -EDGE_HIGH {
        (WinnerPick::Team(team_b.clone()), Confidence::High)
    } else if edge > EDGE_MODERATE {
        (WinnerPick::Team(team_a.clone()), Confidence::Moderate)
    } else if edge < -EDGE_MODERATE {
        (WinnerPick::Team(team_b.clone()), Confidence::Moderate)
    } else {
        (WinnerPick::NoClearAdvantage, Confidence::Low)
    };

    WinnerCall {
        pick,
        confidence,
        edge,
    }
}
