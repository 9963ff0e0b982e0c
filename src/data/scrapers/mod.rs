//! Box-score scrapers for NBA game data

pub mod nba_data;

use crate::data::loader::save_team_games;
use crate::{Result, TeamGameRecord};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

/// One player's line from a single game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerBoxScore {
    pub game_id: String,
    pub game_date: String,
    pub season_year: i32,
    pub team: String,
    pub team_id: String,
    pub player_id: String,
    pub player_name: String,
    pub minutes: String,
    pub points: u32,
    pub rebounds: u32,
    pub assists: u32,
    pub steals: u32,
    pub blocks: u32,
    pub fouls: u32,
    pub turnovers: u32,
    pub fgm: u32,
    pub fga: u32,
    pub fg_pct: f64,
    pub tpm: u32,
    pub tpa: u32,
    pub fg3_pct: f64,
    pub ftm: u32,
    pub fta: u32,
    pub ft_pct: f64,
    pub plus_minus: i32,
}

/// Everything fetched for one season
#[derive(Debug, Clone, Default)]
pub struct SeasonBoxScores {
    pub season: i32,
    pub team_games: Vec<TeamGameRecord>,
    pub players: Vec<PlayerBoxScore>,
    /// Scheduled games with no usable box score
    pub skipped_games: usize,
}

/// Trait for all box-score sources
pub trait BoxScoreSource {
    /// Human-readable name of the source
    fn name(&self) -> &str;

    /// Fetch team and player rows for every regular-season game of a season
    fn fetch_season(&self, season: i32) -> Result<SeasonBoxScores>;
}

/// Delay before retry number `attempt + 1`: 100 ms doubled per attempt
fn backoff_delay(attempt: u32) -> std::time::Duration {
    std::time::Duration::from_millis(100u64.saturating_mul(2u64.saturating_pow(attempt)))
}

/// Retry a scraper operation with exponential backoff
pub fn with_retry<T, F>(mut operation: F, max_attempts: u32) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;
    loop {
        match operation() {
            Ok(result) => return Ok(result),
            Err(e) if attempt + 1 < max_attempts => {
                log::warn!("Attempt {} failed: {}", attempt + 1, e);
                std::thread::sleep(backoff_delay(attempt));
                attempt += 1;
            }
            Err(e) => {
                log::warn!("Attempt {} failed: {}", attempt + 1, e);
                return Err(e);
            }
        }
    }
}

/// Write player rows as CSV, creating parent directories
pub fn save_player_box_scores<P: AsRef<Path>>(path: P, players: &[PlayerBoxScore]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut csv = csv::Writer::from_writer(File::create(path)?);
    for player in players {
        csv.serialize(player)?;
    }
    csv.flush()?;
    Ok(())
}

/// Write a season's team and player CSVs into `output_dir`
pub fn save_season(data: &SeasonBoxScores, output_dir: &Path) -> Result<(PathBuf, PathBuf)> {
    let team_path = output_dir.join(format!("team_games_{}.csv", data.season));
    let player_path = output_dir.join(format!("player_box_scores_{}.csv", data.season));

    save_team_games(&team_path, &data.team_games)?;
    save_player_box_scores(&player_path, &data.players)?;

    log::info!(
        "Saved {} and {}",
        team_path.display(),
        player_path.display()
    );
    Ok((team_path, player_path))
}
