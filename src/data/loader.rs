//! Team-totals CSV loading and writing
//!
//! Reads box-score exports with one row per team per game. Headers follow the
//! stats.nba.com team game log (`GAME_ID`, `SEASON_YEAR`, `TEAM_ABBREVIATION`,
//! `PTS`, `WL`, `MATCHUP`, `GAME_DATE`); camelCase and lower-case variants
//! are accepted too. Rows that cannot be normalised are skipped with a warning.

use crate::{GameResult, Result, TeamCode, TeamGameRecord};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Deserialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::OnceLock;

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y%m%d", "%b %d, %Y", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

#[derive(Debug, Deserialize)]
struct RawTeamRow {
    #[serde(rename = "GAME_ID", alias = "gameId", alias = "game_id", default)]
    game_id: Option<String>,
    #[serde(rename = "SEASON_YEAR", alias = "seasonYear", alias = "season_year", default)]
    season_year: Option<String>,
    #[serde(
        rename = "TEAM_ABBREVIATION",
        alias = "teamTricode",
        alias = "team_abbreviation",
        default
    )]
    team: Option<String>,
    #[serde(rename = "PTS", alias = "points", alias = "pts", default)]
    points: Option<String>,
    #[serde(rename = "WL", alias = "wl", default)]
    result: Option<String>,
    #[serde(rename = "MATCHUP", alias = "matchup", default)]
    matchup: Option<String>,
    #[serde(rename = "GAME_DATE", alias = "gameDate", alias = "game_date", default)]
    game_date: Option<String>,
}

/// Row counts from one load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub rows_read: usize,
    pub rows_skipped: usize,
}

/// Leading four-digit year of a season label: `2019-20` and `2019.0` both give 2019
pub fn normalize_season(raw: &str) -> Option<i32> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern =
        PATTERN.get_or_init(|| Regex::new(r"^\s*(\d{4})").expect("valid season pattern"));
    pattern
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Parse the date formats seen in box-score exports; anything else is `None`
pub fn parse_game_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn parse_points(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    raw.parse::<u32>().ok().or_else(|| {
        let value: f64 = raw.parse().ok()?;
        (value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX)).then_some(value as u32)
    })
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn normalize_row(raw: &RawTeamRow) -> std::result::Result<TeamGameRecord, &'static str> {
    let game_id = non_empty(&raw.game_id).ok_or("missing game id")?;
    let season_year = non_empty(&raw.season_year)
        .and_then(normalize_season)
        .ok_or("bad season year")?;
    let team = non_empty(&raw.team).ok_or("missing team abbreviation")?;
    let points = non_empty(&raw.points)
        .and_then(parse_points)
        .ok_or("bad points")?;
    let result = non_empty(&raw.result)
        .and_then(GameResult::from_code)
        .ok_or("bad W/L")?;
    let matchup_label = non_empty(&raw.matchup).ok_or("missing matchup")?;

    Ok(TeamGameRecord {
        game_id: game_id.to_string(),
        season_year,
        team: TeamCode::new(team),
        points,
        result,
        matchup_label: matchup_label.to_string(),
        game_date: raw.game_date.as_deref().and_then(parse_game_date),
    })
}

/// Read team-game rows from any CSV source
pub fn read_team_games<R: Read>(reader: R) -> Result<(Vec<TeamGameRecord>, LoadStats)> {
    let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut records = Vec::new();
    let mut stats = LoadStats::default();

    for (i, row) in csv.deserialize::<RawTeamRow>().enumerate() {
        stats.rows_read += 1;
        // +2: header line and 1-based numbering
        let line = i + 2;
        let raw = match row {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Skipping unreadable line {}: {}", line, e);
                stats.rows_skipped += 1;
                continue;
            }
        };
        match normalize_row(&raw) {
            Ok(record) => records.push(record),
            Err(reason) => {
                log::warn!("Skipping line {}: {}", line, reason);
                stats.rows_skipped += 1;
            }
        }
    }

    Ok((records, stats))
}

/// Load and concatenate several team-totals CSV parts
pub fn load_team_games<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<TeamGameRecord>> {
    let mut all_records = Vec::new();

    for path in paths {
        let path = path.as_ref();
        log::info!("Loading team totals from {}", path.display());
        let (records, stats) = read_team_games(File::open(path)?)?;
        log::info!(
            "  {} rows loaded, {} skipped",
            records.len(),
            stats.rows_skipped
        );
        all_records.extend(records);
    }

    log::info!("Loaded {} team-game rows", all_records.len());
    Ok(all_records)
}

/// Write team-game rows in the same schema the loader reads
pub fn write_team_games<W: Write>(writer: W, records: &[TeamGameRecord]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "GAME_ID",
        "SEASON_YEAR",
        "TEAM_ABBREVIATION",
        "PTS",
        "WL",
        "MATCHUP",
        "GAME_DATE",
    ])?;

    for record in records {
        csv.write_record([
            record.game_id.clone(),
            record.season_year.to_string(),
            record.team.to_string(),
            record.points.to_string(),
            record.result.code().to_string(),
            record.matchup_label.clone(),
            record
                .game_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

/// Write team-game rows to a file, creating parent directories
pub fn save_team_games<P: AsRef<Path>>(path: P, records: &[TeamGameRecord]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    write_team_games(File::create(path)?, records)
}
