//! data.nba.net scraper
//!
//! Fetches a season schedule, then one box score per regular-season game.
//! Each box score yields two team rows in the team-totals schema and one row
//! per active player.

use super::{with_retry, BoxScoreSource, PlayerBoxScore, SeasonBoxScores};
use crate::data::loader::parse_game_date;
use crate::{GameResult, HoopsError, Result, ScraperConfig, TeamCode, TeamGameRecord};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

const REGULAR_SEASON_STAGE: u8 = 2;

#[derive(Debug, Deserialize)]
struct ScheduleFeed {
    league: League,
}

#[derive(Debug, Deserialize)]
struct League {
    #[serde(default)]
    standard: Vec<ScheduleEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleEntry {
    game_id: String,
    #[serde(default)]
    season_stage_id: Option<u8>,
    #[serde(default)]
    start_date_eastern: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoxScoreFeed {
    basic_game_data: BasicGameData,
    #[serde(default)]
    stats: Option<GameStats>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BasicGameData {
    h_team: FeedTeam,
    v_team: FeedTeam,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedTeam {
    #[serde(default)]
    team_id: Value,
    tri_code: String,
    #[serde(default)]
    score: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameStats {
    #[serde(default)]
    active_players: Vec<FeedPlayer>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FeedPlayer {
    person_id: Value,
    first_name: String,
    #[serde(alias = "familyName")]
    last_name: String,
    team_id: Value,
    min: String,
    points: Value,
    tot_reb: Value,
    assists: Value,
    steals: Value,
    blocks: Value,
    p_fouls: Value,
    turnovers: Value,
    fgm: Value,
    fga: Value,
    fgp: Value,
    tpm: Value,
    tpa: Value,
    tpp: Value,
    ftm: Value,
    fta: Value,
    ftp: Value,
    plus_minus: Value,
}

/// A regular-season game from the schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledGame {
    pub game_id: String,
    /// `YYYYMMDD`, as used in box-score URLs
    pub date: String,
}

/// Rows extracted from one box score
#[derive(Debug, Clone, Default)]
pub struct GameBoxScore {
    /// Home row then away row; empty when the score is missing or tied
    pub team_games: Vec<TeamGameRecord>,
    pub players: Vec<PlayerBoxScore>,
}

// The feed mixes quoted and bare numbers
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn stat_u32(value: &Value) -> u32 {
    value_text(value).parse().unwrap_or(0)
}

fn stat_i32(value: &Value) -> i32 {
    value_text(value).parse().unwrap_or(0)
}

fn stat_f64(value: &Value) -> f64 {
    value_text(value).parse().unwrap_or(0.0)
}

/// Regular-season games from a schedule document
pub fn parse_schedule(json: &str) -> Result<Vec<ScheduledGame>> {
    let feed: ScheduleFeed = serde_json::from_str(json)?;

    Ok(feed
        .league
        .standard
        .into_iter()
        .filter(|entry| entry.season_stage_id == Some(REGULAR_SEASON_STAGE))
        .filter_map(|entry| match entry.start_date_eastern {
            Some(date) if !date.trim().is_empty() => Some(ScheduledGame {
                game_id: entry.game_id,
                date: date.trim().to_string(),
            }),
            _ => {
                log::debug!("Schedule entry {} has no date", entry.game_id);
                None
            }
        })
        .collect())
}

/// Team and player rows from a box-score document.
///
/// Returns `None` when the game has no player stats (postponed or cancelled).
pub fn parse_boxscore(json: &str, game: &ScheduledGame, season: i32) -> Result<Option<GameBoxScore>> {
    let feed: BoxScoreFeed = serde_json::from_str(json)?;
    let players = feed.stats.map(|s| s.active_players).unwrap_or_default();
    if players.is_empty() {
        return Ok(None);
    }

    let home = &feed.basic_game_data.h_team;
    let away = &feed.basic_game_data.v_team;
    let game_date = parse_game_date(&game.date);
    let date_text = game_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| game.date.clone());

    let team_games = match (
        value_text(&home.score).parse::<u32>(),
        value_text(&away.score).parse::<u32>(),
    ) {
        (Ok(home_pts), Ok(away_pts)) if home_pts != away_pts => {
            let home_code = TeamCode::new(&home.tri_code);
            let away_code = TeamCode::new(&away.tri_code);
            let row = |team: &TeamCode, points: u32, won: bool, label: String| TeamGameRecord {
                game_id: game.game_id.clone(),
                season_year: season,
                team: team.clone(),
                points,
                result: if won { GameResult::Win } else { GameResult::Loss },
                matchup_label: label,
                game_date,
            };
            vec![
                row(
                    &home_code,
                    home_pts,
                    home_pts > away_pts,
                    format!("{} vs. {}", home_code, away_code),
                ),
                row(
                    &away_code,
                    away_pts,
                    away_pts > home_pts,
                    format!("{} @ {}", away_code, home_code),
                ),
            ]
        }
        _ => {
            log::warn!(
                "Game {} has no decisive score ({:?} - {:?}), team rows skipped",
                game.game_id,
                home.score,
                away.score
            );
            Vec::new()
        }
    };

    let tri_codes: HashMap<String, String> = [home, away]
        .iter()
        .map(|t| (value_text(&t.team_id), t.tri_code.trim().to_uppercase()))
        .collect();

    let players = players
        .into_iter()
        .map(|p| PlayerBoxScore {
            game_id: game.game_id.clone(),
            game_date: date_text.clone(),
            season_year: season,
            team: tri_codes
                .get(&value_text(&p.team_id))
                .cloned()
                .unwrap_or_default(),
            team_id: value_text(&p.team_id),
            player_id: value_text(&p.person_id),
            player_name: format!("{} {}", p.first_name.trim(), p.last_name.trim())
                .trim()
                .to_string(),
            minutes: p.min.trim().to_string(),
            points: stat_u32(&p.points),
            rebounds: stat_u32(&p.tot_reb),
            assists: stat_u32(&p.assists),
            steals: stat_u32(&p.steals),
            blocks: stat_u32(&p.blocks),
            fouls: stat_u32(&p.p_fouls),
            turnovers: stat_u32(&p.turnovers),
            fgm: stat_u32(&p.fgm),
            fga: stat_u32(&p.fga),
            fg_pct: stat_f64(&p.fgp),
            tpm: stat_u32(&p.tpm),
            tpa: stat_u32(&p.tpa),
            fg3_pct: stat_f64(&p.tpp),
            ftm: stat_u32(&p.ftm),
            fta: stat_u32(&p.fta),
            ft_pct: stat_f64(&p.ftp),
            plus_minus: stat_i32(&p.plus_minus),
        })
        .collect();

    Ok(Some(GameBoxScore {
        team_games,
        players,
    }))
}

/// Scraper for the data.nba.net JSON feeds
pub struct NbaDataScraper {
    client: reqwest::blocking::Client,
    config: ScraperConfig,
}

impl NbaDataScraper {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(NbaDataScraper {
            client,
            config: config.clone(),
        })
    }

    pub fn schedule_url(&self, season: i32) -> String {
        self.config
            .schedule_url
            .replace("{season}", &season.to_string())
    }

    pub fn boxscore_url(&self, game: &ScheduledGame) -> String {
        self.config
            .boxscore_url
            .replace("{date}", &game.date)
            .replace("{game_id}", &game.game_id)
    }

    fn get_text(&self, url: &str) -> Result<String> {
        with_retry(
            || {
                let response = self.client.get(url).send()?.error_for_status()?;
                Ok(response.text()?)
            },
            self.config.max_attempts,
        )
    }

    fn pause(&self) {
        std::thread::sleep(Duration::from_millis(self.config.request_delay_ms));
    }

    /// Fetch the regular-season schedule
    pub fn fetch_schedule(&self, season: i32) -> Result<Vec<ScheduledGame>> {
        let url = self.schedule_url(season);
        log::info!("Fetching {} schedule from {}", season, url);
        let games = parse_schedule(&self.get_text(&url)?)?;
        log::info!("Found {} regular-season games", games.len());
        Ok(games)
    }

    /// Fetch and parse one box score
    pub fn fetch_boxscore(&self, game: &ScheduledGame, season: i32) -> Result<Option<GameBoxScore>> {
        let json = self.get_text(&self.boxscore_url(game))?;
        parse_boxscore(&json, game, season)
    }
}

impl BoxScoreSource for NbaDataScraper {
    fn name(&self) -> &str {
        "data.nba.net"
    }

    fn fetch_season(&self, season: i32) -> Result<SeasonBoxScores> {
        let schedule = self.fetch_schedule(season)?;
        if schedule.is_empty() {
            return Err(HoopsError::Scraper(format!(
                "no regular-season games in the {} schedule",
                season
            )));
        }

        let mut data = SeasonBoxScores {
            season,
            ..Default::default()
        };

        for (i, game) in schedule.iter().enumerate() {
            self.pause();
            match self.fetch_boxscore(game, season) {
                Ok(Some(box_score)) => {
                    if box_score.team_games.is_empty() {
                        data.skipped_games += 1;
                    }
                    data.team_games.extend(box_score.team_games);
                    data.players.extend(box_score.players);
                }
                Ok(None) => {
                    log::debug!("No stats for game {}", game.game_id);
                    data.skipped_games += 1;
                }
                Err(e) => {
                    log::warn!("Failed to fetch game {}: {}", game.game_id, e);
                    data.skipped_games += 1;
                }
            }

            if (i + 1) % 100 == 0 {
                log::info!("  {}/{} games processed", i + 1, schedule.len());
            }
        }

        log::info!(
            "Season {}: {} team rows, {} player rows, {} games skipped",
            season,
            data.team_games.len(),
            data.players.len(),
            data.skipped_games
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SCHEDULE: &str = r#"{
        "league": {
            "standard": [
                {"gameId": "0011900001", "seasonStageId": 1, "startDateEastern": "20191004"},
                {"gameId": "0021900001", "seasonStageId": 2, "startDateEastern": "20191022"},
                {"gameId": "0021900002", "seasonStageId": 2, "startDateEastern": "20191022"},
                {"gameId": "0021900003", "seasonStageId": 2},
                {"gameId": "0041900101", "seasonStageId": 4, "startDateEastern": "20200817"}
            ]
        }
    }"#;

    const BOXSCORE: &str = r#"{
        "basicGameData": {
            "gameId": "0021900001",
            "hTeam": {"teamId": "1610612761", "triCode": "TOR", "score": "130"},
            "vTeam": {"teamId": "1610612740", "triCode": "NOP", "score": "122"}
        },
        "stats": {
            "activePlayers": [
                {"personId": "202695", "firstName": "Kawhi", "lastName": "Leonard",
                 "teamId": "1610612761", "min": "34:12", "points": "22", "totReb": "5",
                 "assists": "3", "steals": "1", "blocks": "0", "pFouls": "2",
                 "turnovers": "1", "fgm": "8", "fga": "17", "fgp": "47.1",
                 "tpm": "2", "tpa": "6", "tpp": "33.3", "ftm": "4", "fta": "5",
                 "ftp": "80.0", "plusMinus": "+5"},
                {"personId": 1629627, "firstName": "Zion", "familyName": "Williamson",
                 "teamId": "1610612740", "min": "30:01", "points": 18, "totReb": 7,
                 "plusMinus": "-8"}
            ]
        }
    }"#;

    fn game() -> ScheduledGame {
        ScheduledGame {
            game_id: "0021900001".to_string(),
            date: "20191022".to_string(),
        }
    }

    #[test]
    fn test_schedule_keeps_regular_season() {
        let games = parse_schedule(SCHEDULE).unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0], game());
        assert_eq!(games[1].game_id, "0021900002");
    }

    #[test]
    fn test_boxscore_team_rows() {
        let box_score = parse_boxscore(BOXSCORE, &game(), 2019).unwrap().unwrap();
        let rows = &box_score.team_games;
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].team, TeamCode::new("TOR"));
        assert_eq!(rows[0].points, 130);
        assert_eq!(rows[0].result, GameResult::Win);
        assert_eq!(rows[0].matchup_label, "TOR vs. NOP");
        assert_eq!(rows[0].season_year, 2019);
        assert_eq!(rows[0].game_date, NaiveDate::from_ymd_opt(2019, 10, 22));

        assert_eq!(rows[1].team, TeamCode::new("NOP"));
        assert_eq!(rows[1].result, GameResult::Loss);
        assert_eq!(rows[1].matchup_label, "NOP @ TOR");
        assert!(!rows[1].is_home("vs."));
    }

    #[test]
    fn test_boxscore_player_rows() {
        let box_score = parse_boxscore(BOXSCORE, &game(), 2019).unwrap().unwrap();
        let players = &box_score.players;
        assert_eq!(players.len(), 2);

        let kawhi = &players[0];
        assert_eq!(kawhi.player_name, "Kawhi Leonard");
        assert_eq!(kawhi.team, "TOR");
        assert_eq!(kawhi.team_id, "1610612761");
        assert_eq!(kawhi.fg_pct, 47.1);
        assert_eq!(kawhi.fg3_pct, 33.3);
        assert_eq!(kawhi.ft_pct, 80.0);
        assert_eq!(kawhi.game_date, "2019-10-22");
        assert_eq!(kawhi.points, 22);
        assert_eq!(kawhi.fouls, 2);
        assert_eq!(kawhi.plus_minus, 5);

        let zion = &players[1];
        assert_eq!(zion.player_id, "1629627");
        assert_eq!(zion.player_name, "Zion Williamson");
        assert_eq!(zion.fg_pct, 0.0);
        assert_eq!(zion.team, "NOP");
        assert_eq!(zion.points, 18);
        assert_eq!(zion.assists, 0);
        assert_eq!(zion.plus_minus, -8);
    }

    #[test]
    fn test_boxscore_without_stats_is_skipped() {
        let json = r#"{
            "basicGameData": {
                "hTeam": {"teamId": "1", "triCode": "TOR", "score": ""},
                "vTeam": {"teamId": "2", "triCode": "NOP", "score": ""}
            }
        }"#;
        assert!(parse_boxscore(json, &game(), 2019).unwrap().is_none());
    }

    #[test]
    fn test_boxscore_tied_score_drops_team_rows() {
        let json = BOXSCORE.replace("\"score\": \"122\"", "\"score\": \"130\"");
        let box_score = parse_boxscore(&json, &game(), 2019).unwrap().unwrap();
        assert!(box_score.team_games.is_empty());
        assert_eq!(box_score.players.len(), 2);
    }

    #[test]
    fn test_url_templates() {
        let scraper = NbaDataScraper::new(&crate::Config::default().scraper).unwrap();
        assert_eq!(
            scraper.schedule_url(2019),
            "https://data.nba.net/prod/v2/2019/schedule.json"
        );
        assert_eq!(
            scraper.boxscore_url(&game()),
            "https://data.nba.net/prod/v1/20191022/0021900001_boxscore.json"
        );
    }
}
