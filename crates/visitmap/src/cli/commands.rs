//! CLI command definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use crate::geo::Coordinate;
use crate::navigation::TravelMode;

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// School name
    #[arg(short, long)]
    pub name: String,

    /// Street address
    #[arg(short, long)]
    pub address: String,

    /// Latitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lng: f64,

    /// Optional note
    #[arg(long)]
    pub notes: Option<String>,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only count visits from this year
    #[arg(short, long)]
    pub year: Option<i32>,

    /// Sort by distance from this point (LAT,LNG)
    #[arg(long, value_name = "LAT,LNG", value_parser = parse_coordinate, allow_hyphen_values = true)]
    pub near: Option<Coordinate>,

    /// Only show schools within this many meters of --near
    #[arg(long, requires = "near")]
    pub radius: Option<f64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// School id
    pub id: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Visit command arguments.
#[derive(Debug, Args)]
pub struct VisitCommand {
    /// School id
    pub id: String,

    /// Visit date (YYYY-MM-DD), defaults to today
    #[arg(short, long, value_parser = parse_visit_date)]
    pub date: Option<NaiveDate>,
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Show a single year (0 for all time)
    #[arg(short, long)]
    pub year: Option<i32>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Bounds command arguments.
#[derive(Debug, Args)]
pub struct BoundsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Navigate command arguments.
#[derive(Debug, Args)]
pub struct NavigateCommand {
    /// School id
    pub id: String,

    /// Walking directions instead of driving
    #[arg(short, long)]
    pub walk: bool,
}

impl NavigateCommand {
    /// The requested travel mode.
    #[must_use]
    pub fn mode(&self) -> TravelMode {
        if self.walk {
            TravelMode::Walking
        } else {
            TravelMode::Driving
        }
    }
}

/// Distance command arguments.
#[derive(Debug, Args)]
pub struct DistanceCommand {
    /// First point (LAT,LNG)
    #[arg(value_parser = parse_coordinate, allow_hyphen_values = true)]
    pub from: Coordinate,

    /// Second point (LAT,LNG)
    #[arg(value_parser = parse_coordinate, allow_hyphen_values = true)]
    pub to: Coordinate,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Import command arguments.
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// JSON file in the browser export format
    pub file: PathBuf,

    /// Replace existing records without asking
    #[arg(short, long)]
    pub yes: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One school per line
    Plain,
    /// Aligned columns
    #[default]
    Table,
    /// JSON output
    Json,
}

fn parse_coordinate(s: &str) -> Result<Coordinate, String> {
    s.parse().map_err(|e: crate::Error| e.to_string())
}

fn parse_visit_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        crate::Error::InvalidDate {
            input: s.to_string(),
        }
        .to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(
            parse_coordinate("40.1,116.6").unwrap(),
            Coordinate::new(40.1, 116.6)
        );
        assert!(parse_coordinate("40.1").is_err());
    }

    #[test]
    fn test_parse_visit_date() {
        assert_eq!(
            parse_visit_date("2025-03-01").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
        let err = parse_visit_date("03/01/2025").unwrap_err();
        assert!(err.contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_navigate_mode() {
        let cmd = NavigateCommand {
            id: "x".to_string(),
            walk: true,
        };
        assert_eq!(cmd.mode(), TravelMode::Walking);

        let cmd = NavigateCommand {
            id: "x".to_string(),
            walk: false,
        };
        assert_eq!(cmd.mode(), TravelMode::Driving);
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }
}
