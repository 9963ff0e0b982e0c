//! NBA head-to-head analysis CLI
//!
//! Fetches box scores and derives over/under and winner trends between two teams.

use clap::{Parser, Subcommand};
use hoops::{Config, Result};

#[derive(Parser)]
#[command(name = "hoops")]
#[command(about = "NBA head-to-head matchup trends for betting research", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Data management commands
    Data {
        #[command(subcommand)]
        action: DataCommands,
    },
    /// Analyse the head-to-head record of two teams
    Analyze {
        /// First team abbreviation (e.g. CLE)
        team_a: String,
        /// Second team abbreviation (e.g. GSW)
        team_b: String,
        /// First season year, inclusive
        #[arg(long = "from")]
        start_year: i32,
        /// Last season year, inclusive
        #[arg(long = "to")]
        end_year: i32,
        /// Over/under line for combined points
        #[arg(long)]
        line: f64,
        /// Print every matchup game
        #[arg(long)]
        details: bool,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
        /// Team totals CSV files (defaults to the configured files)
        #[arg(long)]
        input: Vec<String>,
    },
    /// Initialize a new project with default config
    Init,
}

#[derive(Subcommand)]
enum DataCommands {
    /// Fetch box scores for one season
    Sync {
        /// Season start year (e.g. 2019 for 2019-20)
        #[arg(long)]
        season: i32,
        /// Output directory (defaults to the configured one)
        #[arg(long)]
        output: Option<String>,
    },
    /// Show what the team totals files contain
    Status {
        /// Team totals CSV files (defaults to the configured files)
        #[arg(long)]
        input: Vec<String>,
    },
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use table, json, or csv.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let result = match cli.command {
        Commands::Data { action } => match action {
            DataCommands::Sync { season, output } => commands::data_sync(&config, season, output),
            DataCommands::Status { input } => commands::data_status(&config, input),
        },
        Commands::Analyze {
            team_a,
            team_b,
            start_year,
            end_year,
            line,
            details,
            format,
            input,
        } => commands::analyze(
            &config, &team_a, &team_b, start_year, end_year, line, details, format, input,
        ),
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use hoops::data::scrapers::nba_data::NbaDataScraper;
    use hoops::data::scrapers::{save_season, BoxScoreSource};
    use hoops::data::load_team_games;
    use hoops::features::MatchupResolver;
    use hoops::predict::report::{format_report, write_matchups_csv};
    use hoops::predict::{MatchupAnalyzer, MatchupQuery, QueryOutcome};
    use std::collections::{BTreeSet, HashSet};
    use std::path::Path;

    fn input_paths(config: &Config, input: Vec<String>) -> Vec<String> {
        if input.is_empty() {
            config.data.team_totals.clone()
        } else {
            input
        }
    }

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all(&config.data.output_dir)?;
        println!("Created {}/ directory", config.data.output_dir);

        println!("\nNext steps:");
        println!("  1. Edit {} to customize settings", config_path);
        println!("  2. Run 'hoops data sync --season 2019' to fetch box scores");
        println!("  3. Run 'hoops analyze CLE GSW --from 2015 --to 2019 --line 220.5'");

        Ok(())
    }

    pub fn data_sync(config: &Config, season: i32, output: Option<String>) -> Result<()> {
        let output_dir = output.unwrap_or_else(|| config.data.output_dir.clone());
        let scraper = NbaDataScraper::new(&config.scraper)?;

        println!("Syncing {}-{} season from {}...", season, season + 1, scraper.name());
        let data = scraper.fetch_season(season)?;

        if data.team_games.is_empty() && data.players.is_empty() {
            println!("No box scores found for {}.", season);
            return Ok(());
        }

        let (team_path, player_path) = save_season(&data, Path::new(&output_dir))?;
        println!(
            "Stored {} team rows in {}",
            data.team_games.len(),
            team_path.display()
        );
        println!(
            "Stored {} player rows in {}",
            data.players.len(),
            player_path.display()
        );
        if data.skipped_games > 0 {
            println!("Skipped {} games without a usable box score", data.skipped_games);
        }

        Ok(())
    }

    pub fn data_status(config: &Config, input: Vec<String>) -> Result<()> {
        let paths = input_paths(config, input);
        let records = load_team_games(&paths)?;

        let teams: BTreeSet<&str> = records.iter().map(|r| r.team.as_str()).collect();
        let games: HashSet<&str> = records.iter().map(|r| r.game_id.as_str()).collect();
        let first_season = records.iter().map(|r| r.season_year).min();
        let last_season = records.iter().map(|r| r.season_year).max();

        println!("Team Totals Status");
        println!("───────────────────────────────");
        for path in &paths {
            println!("  File:     {}", path);
        }
        println!("  Rows:     {}", records.len());
        println!("  Games:    {}", games.len());
        println!("  Teams:    {}", teams.len());
        if let (Some(first), Some(last)) = (first_season, last_season) {
            println!("  Seasons:  {} to {}", first, last);
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn analyze(
        config: &Config,
        team_a: &str,
        team_b: &str,
        start_year: i32,
        end_year: i32,
        line: f64,
        details: bool,
        format: OutputFormat,
        input: Vec<String>,
    ) -> Result<()> {
        let query = MatchupQuery::new(team_a, team_b, start_year, end_year, line)?;
        let records = load_team_games(&input_paths(config, input))?;

        let analyzer = MatchupAnalyzer::new(records)
            .with_resolver(MatchupResolver::new(&config.analysis.home_marker)?);

        let report = match analyzer.analyze(&query)? {
            QueryOutcome::Report(report) => report,
            QueryOutcome::EmptyRange {
                start_year,
                end_year,
            } => {
                println!("No team data from {} to {}.", start_year, end_year);
                return Ok(());
            }
            QueryOutcome::NoValidMatchups { malformed_games } => {
                println!(
                    "{} and {} share {} game(s), but none had usable box scores.",
                    query.team_a, query.team_b, malformed_games
                );
                return Ok(());
            }
        };

        match format {
            OutputFormat::Table => {
                print!("{}", format_report(&report, details));
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            OutputFormat::Csv => {
                write_matchups_csv(&report, std::io::stdout().lock())?;
            }
        }

        Ok(())
    }
}
