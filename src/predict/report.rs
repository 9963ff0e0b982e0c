//! Rendering of finished matchup reports

use crate::predict::analyzer::MatchupReport;
use crate::predict::recommend::{TotalPick, WinnerPick};
use crate::Result;
use std::io::Write;

/// Format a report as a boxed text summary, optionally with per-game rows
pub fn format_report(report: &MatchupReport, details: bool) -> String {
    let q = &report.query;
    let s = &report.summary;
    let rec = &report.recommendation;

    let over_line = match rec.over_under.pick {
        TotalPick::Neutral => format!(
            "hold: over probability {:.2}, no clear trend",
            rec.over_under.prob_over
        ),
        pick => format!(
            "{} {} ({} confidence, p = {:.2})",
            pick, q.line, rec.over_under.confidence, rec.over_under.prob_over
        ),
    };
    let win_line = match &rec.winner.pick {
        WinnerPick::Team(team) => format!("{} ({} confidence)", team, rec.winner.confidence),
        WinnerPick::NoClearAdvantage => {
            "no clear advantage, consider other factors (low confidence)".to_string()
        }
    };

    let mut out = format!(
        r#"
┌─────────────────────────────────────────────────┐
│  {} vs {}  ({}-{})
├─────────────────────────────────────────────────┤
│  Games analysed:   {}
│  Over {}:       {} (p = {:.3})
│  {} wins:         {} ({:.3})
│  {} wins:         {} ({:.3})
│  {} home / away:  {} / {}
│  {} home / away:  {} / {}
├─────────────────────────────────────────────────┤
│  Total:            {}
│  Winner:           {}
└─────────────────────────────────────────────────┘
"#,
        q.team_a,
        q.team_b,
        q.start_year,
        q.end_year,
        s.total_games,
        q.line,
        s.over_count,
        s.prob_over,
        q.team_a,
        s.team_a_wins,
        s.win_rate_a(),
        q.team_b,
        s.team_b_wins,
        s.win_rate_b(),
        q.team_a,
        s.home_wins_team_a,
        s.away_wins_team_a,
        q.team_b,
        s.home_wins_team_b,
        s.away_wins_team_b,
        over_line,
        win_line,
    );

    if s.malformed_games > 0 {
        out.push_str(&format!(
            "  ({} malformed game(s) excluded)\n",
            s.malformed_games
        ));
    }

    if details {
        out.push_str(&format!(
            "\n  {:<12} {:>6} {:>8} {:>6} {:>6} {:>5}\n",
            "GAME_ID", "YEAR", "TOTAL", "O/U", "WINNER", "LOC"
        ));
        for game in &report.matchups.games {
            out.push_str(&format!(
                "  {:<12} {:>6} {:>8} {:>6} {:>6} {:>5}\n",
                game.game_id,
                game.season_year,
                game.total_points,
                game.over_under.to_string(),
                game.winner.as_str(),
                game.location.to_string(),
            ));
        }
    }

    out
}

/// Write the per-game rows of a report as CSV
pub fn write_matchups_csv<W: Write>(report: &MatchupReport, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "game_id",
        "season_year",
        "game_date",
        "team_a_points",
        "team_b_points",
        "total_points",
        "over_under",
        "winner",
        "location",
    ])?;

    for game in &report.matchups.games {
        csv.write_record([
            game.game_id.clone(),
            game.season_year.to_string(),
            game.game_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            game.team_a_points.to_string(),
            game.team_b_points.to_string(),
            game.total_points.to_string(),
            game.over_under.to_string(),
            game.winner.to_string(),
            game.location.to_string(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::analyzer::{MatchupAnalyzer, MatchupQuery, QueryOutcome};
    use crate::{GameResult, TeamCode, TeamGameRecord};
    use chrono::NaiveDate;

    fn make_row(game_id: &str, team: &str, points: u32, won: bool, label: &str) -> TeamGameRecord {
        TeamGameRecord {
            game_id: game_id.to_string(),
            season_year: 2019,
            team: TeamCode::new(team),
            points,
            result: if won { GameResult::Win } else { GameResult::Loss },
            matchup_label: label.to_string(),
            game_date: NaiveDate::from_ymd_opt(2019, 11, 5),
        }
    }

    fn report() -> MatchupReport {
        let records = vec![
            make_row("0021900101", "CLE", 110, true, "CLE vs. GSW"),
            make_row("0021900101", "GSW", 105, false, "GSW @ CLE"),
            make_row("0021900202", "CLE", 95, false, "CLE @ GSW"),
            make_row("0021900202", "GSW", 100, true, "GSW vs. CLE"),
        ];
        let query = MatchupQuery::new("CLE", "GSW", 2019, 2019, 200.5).unwrap();
        match MatchupAnalyzer::new(records).analyze(&query).unwrap() {
            QueryOutcome::Report(report) => *report,
            other => panic!("expected a report, got {:?}", other),
        }
    }

    #[test]
    fn test_format_report_summary() {
        let text = format_report(&report(), false);
        assert!(text.contains("CLE vs GSW"));
        assert!(text.contains("Games analysed:   2"));
        assert!(text.contains("no clear trend"));
        assert!(text.contains("no clear advantage"));
        assert!(!text.contains("0021900101"));
    }

    #[test]
    fn test_format_report_details() {
        let text = format_report(&report(), true);
        assert!(text.contains("0021900101"));
        assert!(text.contains("Over"));
        assert!(text.contains("Away"));
    }

    #[test]
    fn test_detail_rows_and_malformed_note() {
        let records = vec![
            make_row("0021900101", "CLE", 110, true, "CLE vs. GSW"),
            make_row("0021900101", "GSW", 105, false, "GSW @ CLE"),
            make_row("0021900202", "CLE", 95, false, "CLE @ GSW"),
            make_row("0021900202", "GSW", 100, true, "GSW vs. CLE"),
            make_row("0021900202", "GSW", 100, true, "GSW vs. CLE"),
        ];
        let query = MatchupQuery::new("CLE", "GSW", 2019, 2019, 200.5).unwrap();
        let report = match MatchupAnalyzer::new(records).analyze(&query).unwrap() {
            QueryOutcome::Report(report) => *report,
            other => panic!("expected a report, got {:?}", other),
        };

        let text = format_report(&report, true);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines.contains(&"  (1 malformed game(s) excluded)"));
        assert!(lines.contains(&"  0021900101     2019      215   Over    CLE  Home"));
        assert!(!text.contains("0021900202"));
        assert!(text.ends_with("Home\n"));
    }

    #[test]
    fn test_matchups_csv() {
        let mut buf = Vec::new();
        write_matchups_csv(&report(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("game_id,season_year"));
        assert_eq!(
            lines[1],
            "0021900101,2019,2019-11-05,110,105,215,Over,CLE,Home"
        );
    }
}
