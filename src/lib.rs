//! Head-to-head NBA matchup statistics
//!
//! Joins per-team box-score rows into per-game matchups between two teams and
//! derives over/under and win-side trends for betting research.

pub mod data;
pub mod features;
pub mod predict;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Short team code such as `CLE` or `GSW`, always upper-case
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamCode(String);

impl TeamCode {
    pub fn new(code: &str) -> Self {
        TeamCode(code.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TeamCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TeamCode {
    fn from(code: &str) -> Self {
        TeamCode::new(code)
    }
}

/// Win/loss outcome for one team in one game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Win,
    Loss,
}

impl GameResult {
    /// Parse the `W` / `L` column used by box-score exports
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "W" => Some(GameResult::Win),
            "L" => Some(GameResult::Loss),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            GameResult::Win => "W",
            GameResult::Loss => "L",
        }
    }
}

/// Where the first-named team played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    Home,
    Away,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Home => write!(f, "Home"),
            Location::Away => write!(f, "Away"),
        }
    }
}

/// Combined score relative to a betting line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverUnder {
    Over,
    Under,
}

impl OverUnder {
    /// Strictly above the line is Over; landing exactly on it counts as Under
    pub fn classify(total_points: u32, line: f64) -> Self {
        if f64::from(total_points) > line {
            OverUnder::Over
        } else {
            OverUnder::Under
        }
    }
}

impl fmt::Display for OverUnder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverUnder::Over => write!(f, "Over"),
            OverUnder::Under => write!(f, "Under"),
        }
    }
}

/// One team's line in one game, as delivered by the loader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamGameRecord {
    pub game_id: String,
    pub season_year: i32,
    pub team: TeamCode,
    pub points: u32,
    pub result: GameResult,
    /// e.g. `CLE vs. GSW` at home, `CLE @ GSW` on the road
    pub matchup_label: String,
    pub game_date: Option<NaiveDate>,
}

impl TeamGameRecord {
    pub fn is_home(&self, home_marker: &str) -> bool {
        self.matchup_label.contains(home_marker)
    }

    pub fn won(&self) -> bool {
        self.result == GameResult::Win
    }
}

/// One game between the two queried teams, joined from both teams' rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupRecord {
    pub game_id: String,
    pub season_year: i32,
    pub game_date: Option<NaiveDate>,
    pub team_a_points: u32,
    pub team_b_points: u32,
    pub total_points: u32,
    pub winner: TeamCode,
    /// Relative to the first-named team
    pub location: Location,
    pub over_under: OverUnder,
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum HoopsError {
    #[error("Scraper failed: {0}")]
    Scraper(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("No games found between {team_a} and {team_b}")]
    NoMatchupsFound { team_a: TeamCode, team_b: TeamCode },
}

pub type Result<T> = std::result::Result<T, HoopsError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub scraper: ScraperConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Team-totals CSV parts, concatenated in order
    pub team_totals: Vec<String>,
    pub output_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// `{season}` is substituted
    pub schedule_url: String,
    /// `{date}` and `{game_id}` are substituted
    pub boxscore_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub request_delay_ms: u64,
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Token in a matchup label marking the home side
    pub home_marker: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data: DataConfig {
                team_totals: vec!["data/regular_season_totals_2010_2024.csv".to_string()],
                output_dir: "data".to_string(),
            },
            scraper: ScraperConfig {
                schedule_url: "https://data.nba.net/prod/v2/{season}/schedule.json".to_string(),
                boxscore_url: "https://data.nba.net/prod/v1/{date}/{game_id}_boxscore.json"
                    .to_string(),
                user_agent: "hoops/0.1".to_string(),
                timeout_secs: 30,
                request_delay_ms: 600,
                max_attempts: 3,
            },
            analysis: AnalysisConfig {
                home_marker: "vs.".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HoopsError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| HoopsError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| HoopsError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
