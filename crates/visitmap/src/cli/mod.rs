//! Command-line interface for visitmap.
//!
//! This module provides the CLI structure for the `visitmap` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, BoundsCommand, ConfigCommand, DistanceCommand, ExportCommand, ImportCommand,
    ListCommand, NavigateCommand, OutputFormat, ShowCommand, StatsCommand, StatusCommand,
    VisitCommand,
};

use crate::logging::Verbosity;

/// visitmap - Keep track of school visits
///
/// Record the schools you visit, toggle visits by date, and see how many
/// schools you reached each year.
#[derive(Debug, Parser)]
#[command(name = "visitmap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the database (overrides configuration)
    #[arg(long, global = true, value_name = "FILE")]
    pub database: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a school
    Add(AddCommand),

    /// List schools
    List(ListCommand),

    /// Show one school with its visits
    Show(ShowCommand),

    /// Toggle a visit to a school (today unless --date is given)
    Visit(VisitCommand),

    /// Show visit statistics per year
    Stats(StatsCommand),

    /// Show store status (counts, visit range, database size)
    Status(StatusCommand),

    /// Show the map center and zoom that fit all schools
    Bounds(BoundsCommand),

    /// Print a navigation link to a school
    Navigate(NavigateCommand),

    /// Compute the distance between two points
    Distance(DistanceCommand),

    /// Export all schools as JSON
    Export(ExportCommand),

    /// Replace all schools with a JSON export
    Import(ImportCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "visitmap");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        let cli = Cli::try_parse_from(["visitmap", "-q", "stats"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Quiet);

        let cli = Cli::try_parse_from(["visitmap", "-vv", "stats"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Debug);
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "visitmap",
            "add",
            "--name",
            "Lakeside",
            "--address",
            "5 Lake Rd",
            "--lat",
            "40.1",
            "--lng",
            "116.6",
        ])
        .unwrap();
        match cli.command {
            Command::Add(add) => {
                assert_eq!(add.name, "Lakeside");
                assert!((add.lat - 40.1).abs() < f64::EPSILON);
                assert!(add.notes.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_add_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "visitmap", "add", "-n", "Sur", "-a", "1 Calle", "--lat", "-33.45", "--lng",
            "-70.66",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Add(ref a) if a.lat < 0.0 && a.lng < 0.0));
    }

    #[test]
    fn test_parse_list_near_with_radius() {
        let cli = Cli::try_parse_from([
            "visitmap", "list", "--near", "40.1,116.6", "--radius", "500", "-f", "json",
        ])
        .unwrap();
        match cli.command {
            Command::List(list) => {
                assert!(list.near.is_some());
                assert_eq!(list.radius, Some(500.0));
                assert_eq!(list.format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_radius_requires_near() {
        assert!(Cli::try_parse_from(["visitmap", "list", "--radius", "500"]).is_err());
    }

    #[test]
    fn test_parse_visit_with_date() {
        let cli = Cli::try_parse_from(["visitmap", "visit", "abc", "--date", "2025-03-01"]).unwrap();
        match cli.command {
            Command::Visit(visit) => {
                assert_eq!(visit.id, "abc");
                assert_eq!(visit.date.unwrap().to_string(), "2025-03-01");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_visit_rejects_bad_date() {
        assert!(Cli::try_parse_from(["visitmap", "visit", "abc", "--date", "tomorrow"]).is_err());
    }

    #[test]
    fn test_parse_distance() {
        let cli = Cli::try_parse_from(["visitmap", "distance", "40,116", "-33.9,151.2"]).unwrap();
        assert!(matches!(cli.command, Command::Distance(_)));
    }

    #[test]
    fn test_parse_with_database() {
        let cli = Cli::try_parse_from(["visitmap", "--database", "/tmp/v.db", "list"]).unwrap();
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/v.db")));
    }

    #[test]
    fn test_parse_status() {
        let cli = Cli::try_parse_from(["visitmap", "status", "--json"]).unwrap();
        assert!(matches!(cli.command, Command::Status(StatusCommand { json: true })));
    }

    #[test]
    fn test_parse_config_show() {
        let cli = Cli::try_parse_from(["visitmap", "config", "show", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Show { json: true })
        ));
    }
}
