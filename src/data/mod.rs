//! Data ingestion
//!
//! Team-totals CSV loading and box-score scrapers that produce those files.

pub mod loader;
pub mod scrapers;

pub use loader::{load_team_games, read_team_games, save_team_games, LoadStats};
pub use scrapers::{BoxScoreSource, SeasonBoxScores};
