//! Joining per-team rows into head-to-head games
//!
//! Rows are grouped by `game_id`. A game is kept only when its group holds
//! exactly one row for each of the two teams, one win between them, and a
//! single season. Anything else is recorded as malformed and left out.

use crate::{
    HoopsError, Location, MatchupRecord, OverUnder, Result, TeamCode, TeamGameRecord,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

/// Why a shared game id was left out of the matchup set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MalformedReason {
    /// Team codes in the group are not exactly the two queried teams
    UnexpectedTeams(Vec<TeamCode>),
    /// Right teams, wrong number of rows (duplicates)
    RowCount(usize),
    /// Both rows won or both lost
    AmbiguousResult,
    SeasonMismatch(i32, i32),
    /// Combined points do not fit the score type
    PointsOverflow(u32, u32),
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedReason::UnexpectedTeams(teams) => {
                let codes: Vec<&str> = teams.iter().map(|t| t.as_str()).collect();
                write!(f, "unexpected teams [{}]", codes.join(", "))
            }
            MalformedReason::RowCount(n) => write!(f, "{} rows instead of 2", n),
            MalformedReason::AmbiguousResult => write!(f, "no single winner"),
            MalformedReason::SeasonMismatch(a, b) => write!(f, "seasons differ ({} vs {})", a, b),
            MalformedReason::PointsOverflow(a, b) => write!(f, "points {} + {} overflow", a, b),
        }
    }
}

/// A game id the resolver rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedGame {
    pub game_id: String,
    pub reason: MalformedReason,
}

/// All head-to-head games for one query, ordered by game id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupSet {
    pub team_a: TeamCode,
    pub team_b: TeamCode,
    pub line: f64,
    pub games: Vec<MatchupRecord>,
    pub malformed: Vec<MalformedGame>,
}

impl MatchupSet {
    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

/// Finds and joins the games two teams played against each other
#[derive(Debug, Clone)]
pub struct MatchupResolver {
    home_marker: String,
}

impl Default for MatchupResolver {
    fn default() -> Self {
        MatchupResolver {
            home_marker: "vs.".to_string(),
        }
    }
}

impl MatchupResolver {
    /// Build a resolver for labels that mark the home side with `home_marker`.
    ///
    /// A blank marker would match every label, so it is rejected.
    pub fn new(home_marker: &str) -> Result<Self> {
        if home_marker.trim().is_empty() {
            return Err(HoopsError::Config(
                "home marker must not be blank".to_string(),
            ));
        }
        Ok(MatchupResolver {
            home_marker: home_marker.to_string(),
        })
    }

    pub fn home_marker(&self) -> &str {
        &self.home_marker
    }

    /// Resolve every game between `team_a` and `team_b`.
    ///
    /// Fails with [`HoopsError::NoMatchupsFound`] when no game id carries both
    /// teams. Location is reported from `team_a`'s side.
    pub fn resolve(
        &self,
        records: &[TeamGameRecord],
        team_a: &TeamCode,
        team_b: &TeamCode,
        line: f64,
    ) -> Result<MatchupSet> {
        let mut by_game: BTreeMap<&str, Vec<&TeamGameRecord>> = BTreeMap::new();
        for record in records {
            by_game.entry(record.game_id.as_str()).or_default().push(record);
        }

        let games_a = game_ids_for(records, team_a);
        let games_b = game_ids_for(records, team_b);
        let common: BTreeSet<&str> = games_a.intersection(&games_b).copied().collect();

        if common.is_empty() {
            return Err(HoopsError::NoMatchupsFound {
                team_a: team_a.clone(),
                team_b: team_b.clone(),
            });
        }

        let mut games = Vec::with_capacity(common.len());
        let mut malformed = Vec::new();

        for game_id in common {
            let rows = by_game.get(game_id).map(Vec::as_slice).unwrap_or(&[]);
            match self.join_game(rows, team_a, team_b, line) {
                Ok(record) => games.push(record),
                Err(reason) => {
                    log::debug!("Skipping game {}: {}", game_id, reason);
                    malformed.push(MalformedGame {
                        game_id: game_id.to_string(),
                        reason,
                    });
                }
            }
        }

        if !malformed.is_empty() {
            log::info!(
                "Excluded {} malformed game(s) between {} and {}",
                malformed.len(),
                team_a,
                team_b
            );
        }

        Ok(MatchupSet {
            team_a: team_a.clone(),
            team_b: team_b.clone(),
            line,
            games,
            malformed,
        })
    }

    fn join_game(
        &self,
        rows: &[&TeamGameRecord],
        team_a: &TeamCode,
        team_b: &TeamCode,
        line: f64,
    ) -> std::result::Result<MatchupRecord, MalformedReason> {
        let teams: BTreeSet<&TeamCode> = rows.iter().map(|r| &r.team).collect();
        let expected: BTreeSet<&TeamCode> = [team_a, team_b].into_iter().collect();
        if teams != expected {
            return Err(MalformedReason::UnexpectedTeams(
                teams.into_iter().cloned().collect(),
            ));
        }
        if rows.len() != 2 {
            return Err(MalformedReason::RowCount(rows.len()));
        }

        let (row_a, row_b) = if &rows[0].team == team_a {
            (rows[0], rows[1])
        } else {
            (rows[1], rows[0])
        };

        if row_a.season_year != row_b.season_year {
            return Err(MalformedReason::SeasonMismatch(
                row_a.season_year,
                row_b.season_year,
            ));
        }

        let winner = match (row_a.won(), row_b.won()) {
            (true, false) => team_a.clone(),
            (false, true) => team_b.clone(),
            _ => return Err(MalformedReason::AmbiguousResult),
        };

        let total_points = row_a
            .points
            .checked_add(row_b.points)
            .ok_or(MalformedReason::PointsOverflow(row_a.points, row_b.points))?;
        let location = if row_a.is_home(&self.home_marker) {
            Location::Home
        } else {
            Location::Away
        };

        Ok(MatchupRecord {
            game_id: row_a.game_id.clone(),
            season_year: row_a.season_year,
            game_date: row_a.game_date.or(row_b.game_date),
            team_a_points: row_a.points,
            team_b_points: row_b.points,
            total_points,
            winner,
            location,
            over_under: OverUnder::classify(total_points, line),
        })
    }
}

fn game_ids_for<'a>(records: &'a [TeamGameRecord], team: &TeamCode) -> HashSet<&'a str> {
    records
        .iter()
        .filter(|r| &r.team == team)
        .map(|r| r.game_id.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameResult;

    fn make_row(game_id: &str, team: &str, points: u32, won: bool, label: &str) -> TeamGameRecord {
        TeamGameRecord {
            game_id: game_id.to_string(),
            season_year: 2019,
            team: TeamCode::new(team),
            points,
            result: if won { GameResult::Win } else { GameResult::Loss },
            matchup_label: label.to_string(),
            game_date: None,
        }
    }

    fn two_game_fixture() -> Vec<TeamGameRecord> {
        vec![
            make_row("1", "CLE", 110, true, "CLE vs. GSW"),
            make_row("1", "GSW", 105, false, "GSW @ CLE"),
            make_row("2", "CLE", 95, false, "CLE @ GSW"),
            make_row("2", "GSW", 100, true, "GSW vs. CLE"),
        ]
    }

    #[test]
    fn test_resolves_both_games() {
        let resolver = MatchupResolver::default();
        let set = resolver
            .resolve(&two_game_fixture(), &"CLE".into(), &"GSW".into(), 200.5)
            .unwrap();

        assert_eq!(set.len(), 2);
        assert!(set.malformed.is_empty());

        let g1 = &set.games[0];
        assert_eq!(g1.game_id, "1");
        assert_eq!(g1.total_points, 215);
        assert_eq!(g1.winner, TeamCode::new("CLE"));
        assert_eq!(g1.location, Location::Home);
        assert_eq!(g1.over_under, OverUnder::Over);

        let g2 = &set.games[1];
        assert_eq!(g2.total_points, 195);
        assert_eq!(g2.winner, TeamCode::new("GSW"));
        assert_eq!(g2.location, Location::Away);
        assert_eq!(g2.over_under, OverUnder::Under);
    }

    #[test]
    fn test_location_follows_first_team() {
        let resolver = MatchupResolver::default();
        let set = resolver
            .resolve(&two_game_fixture(), &"GSW".into(), &"CLE".into(), 200.5)
            .unwrap();

        assert_eq!(set.games[0].location, Location::Away);
        assert_eq!(set.games[1].location, Location::Home);
        assert_eq!(set.games[0].team_a_points, 105);
    }

    #[test]
    fn test_total_on_line_is_under() {
        let rows = vec![
            make_row("7", "CLE", 100, true, "CLE vs. GSW"),
            make_row("7", "GSW", 100, false, "GSW @ CLE"),
        ];
        let set = MatchupResolver::default()
            .resolve(&rows, &"CLE".into(), &"GSW".into(), 200.0)
            .unwrap();
        assert_eq!(set.games[0].over_under, OverUnder::Under);
    }

    #[test]
    fn test_no_common_games_is_an_error() {
        let rows = vec![
            make_row("1", "CLE", 110, true, "CLE vs. BOS"),
            make_row("1", "BOS", 105, false, "BOS @ CLE"),
            make_row("2", "GSW", 120, true, "GSW vs. LAL"),
            make_row("2", "LAL", 101, false, "LAL @ GSW"),
        ];
        let err = MatchupResolver::default()
            .resolve(&rows, &"CLE".into(), &"GSW".into(), 210.0)
            .unwrap_err();
        assert!(matches!(err, HoopsError::NoMatchupsFound { .. }));

        let err = MatchupResolver::default()
            .resolve(&[], &"CLE".into(), &"GSW".into(), 210.0)
            .unwrap_err();
        assert!(matches!(err, HoopsError::NoMatchupsFound { .. }));
    }

    #[test]
    fn test_third_team_in_group_is_excluded() {
        let mut rows = two_game_fixture();
        rows.push(make_row("1", "BOS", 90, false, "BOS @ CLE"));

        let set = MatchupResolver::default()
            .resolve(&rows, &"CLE".into(), &"GSW".into(), 200.5)
            .unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.games[0].game_id, "2");
        assert_eq!(set.malformed.len(), 1);
        assert_eq!(set.malformed[0].game_id, "1");
        assert!(matches!(
            set.malformed[0].reason,
            MalformedReason::UnexpectedTeams(ref t) if t.len() == 3
        ));
    }

    #[test]
    fn test_duplicate_rows_are_excluded() {
        let mut rows = two_game_fixture();
        rows.push(make_row("2", "GSW", 100, true, "GSW vs. CLE"));

        let set = MatchupResolver::default()
            .resolve(&rows, &"CLE".into(), &"GSW".into(), 200.5)
            .unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.malformed[0].reason, MalformedReason::RowCount(3));
    }

    #[test]
    fn test_inconsistent_rows_are_excluded() {
        let mut rows = vec![
            make_row("1", "CLE", 110, true, "CLE vs. GSW"),
            make_row("1", "GSW", 105, true, "GSW @ CLE"),
            make_row("2", "CLE", 95, false, "CLE @ GSW"),
            make_row("2", "GSW", 100, true, "GSW vs. CLE"),
        ];
        rows[3].season_year = 2020;

        let set = MatchupResolver::default()
            .resolve(&rows, &"CLE".into(), &"GSW".into(), 200.5)
            .unwrap();

        assert!(set.is_empty());
        assert_eq!(set.malformed[0].reason, MalformedReason::AmbiguousResult);
        assert_eq!(
            set.malformed[1].reason,
            MalformedReason::SeasonMismatch(2019, 2020)
        );
    }

    #[test]
    fn test_resolution_ignores_row_order() {
        let resolver = MatchupResolver::default();
        let rows = two_game_fixture();
        let mut reversed = rows.clone();
        reversed.reverse();

        let first = resolver
            .resolve(&rows, &"CLE".into(), &"GSW".into(), 200.5)
            .unwrap();
        let again = resolver
            .resolve(&rows, &"CLE".into(), &"GSW".into(), 200.5)
            .unwrap();
        let shuffled = resolver
            .resolve(&reversed, &"CLE".into(), &"GSW".into(), 200.5)
            .unwrap();

        assert_eq!(first, again);
        assert_eq!(first, shuffled);
    }

    #[test]
    fn test_custom_home_marker() {
        let rows = vec![
            make_row("1", "CLE", 110, true, "CLE home GSW"),
            make_row("1", "GSW", 105, false, "GSW away CLE"),
        ];
        let set = MatchupResolver::new("home")
            .unwrap()
            .resolve(&rows, &"CLE".into(), &"GSW".into(), 200.5)
            .unwrap();
        assert_eq!(set.games[0].location, Location::Home);
    }

    #[test]
    fn test_blank_home_marker_is_rejected() {
        assert!(matches!(MatchupResolver::new(""), Err(HoopsError::Config(_))));
        assert!(matches!(MatchupResolver::new("  "), Err(HoopsError::Config(_))));
        assert_eq!(MatchupResolver::new(" v ").unwrap().home_marker(), " v ");
    }

    #[test]
    fn test_points_overflow_is_excluded() {
        let rows = vec![
            make_row("1", "CLE", u32::MAX, true, "CLE vs. GSW"),
            make_row("1", "GSW", 1, false, "GSW @ CLE"),
            make_row("2", "CLE", 95, false, "CLE @ GSW"),
            make_row("2", "GSW", 100, true, "GSW vs. CLE"),
        ];
        let set = MatchupResolver::default()
            .resolve(&rows, &"CLE".into(), &"GSW".into(), 200.5)
            .unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.games[0].game_id, "2");
        assert_eq!(set.malformed.len(), 1);
        assert_eq!(
            set.malformed[0].reason,
            MalformedReason::PointsOverflow(u32::MAX, 1)
        );
    }
}
