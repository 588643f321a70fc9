//! `visitmap` - CLI for recording school visits
//!
//! This binary manages the local school store and prints statistics, distances
//! and navigation links.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use chrono::{NaiveDate, Utc};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use visitmap::cli::{
    AddCommand, BoundsCommand, Cli, Command, ConfigCommand, DistanceCommand, ExportCommand,
    ImportCommand, ListCommand, NavigateCommand, OutputFormat, ShowCommand, StatsCommand,
    StatusCommand, VisitCommand,
};
use visitmap::geo::{self, format_distance, is_within_radius, sort_by_distance};
use visitmap::navigation::NavigationProvider;
use visitmap::stats::{self, YearlyStats};
use visitmap::{init_logging, Config, Coordinate, School, Storage};

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() -> CliResult {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone())?;

    let open_storage = || {
        let path = cli
            .database
            .clone()
            .unwrap_or_else(|| config.database_path());
        Storage::open(path)
    };

    match cli.command {
        Command::Add(cmd) => handle_add(&open_storage()?, &cmd),
        Command::List(cmd) => handle_list(&open_storage()?, &cmd),
        Command::Show(cmd) => handle_show(&open_storage()?, &cmd),
        Command::Visit(cmd) => handle_visit(&open_storage()?, &cmd),
        Command::Stats(cmd) => handle_stats(&open_storage()?, &config, &cmd),
        Command::Status(cmd) => handle_status(&open_storage()?, &cmd),
        Command::Bounds(cmd) => handle_bounds(&open_storage()?, &config, &cmd),
        Command::Navigate(cmd) => handle_navigate(&open_storage()?, &config, &cmd),
        Command::Distance(cmd) => {
            handle_distance(&cmd);
            Ok(())
        }
        Command::Export(cmd) => handle_export(&open_storage()?, &cmd),
        Command::Import(cmd) => handle_import(&open_storage()?, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn handle_add(storage: &Storage, cmd: &AddCommand) -> CliResult {
    let position = Coordinate::checked(cmd.lat, cmd.lng)?;
    let school = School::new(
        cmd.name.trim(),
        cmd.address.trim(),
        position,
        cmd.notes.clone(),
    );

    match storage.insert(&school)? {
        Some(id) => println!("Added {} ({id})", school.name),
        None => println!("{} is already recorded ({})", school.name, school.id),
    }
    Ok(())
}

/// A school as printed by `list`, with its distance when sorting by proximity.
#[derive(Serialize)]
struct ListedSchool {
    #[serde(flatten)]
    school: School,
    #[serde(skip_serializing_if = "Option::is_none")]
    distance: Option<f64>,
}

fn handle_list(storage: &Storage, cmd: &ListCommand) -> CliResult {
    let mut schools = storage.list()?;
    if let Some(year) = cmd.year {
        schools = stats::filter_by_year(&schools, year);
    }

    let listed: Vec<ListedSchool> = match cmd.near {
        Some(origin) => sort_by_distance(schools, origin.lat, origin.lng)
            .into_iter()
            .filter(|entry| {
                cmd.radius.map_or(true, |radius| {
                    is_within_radius(origin.lat, origin.lng, entry.item.lat, entry.item.lng, radius)
                })
            })
            .map(|entry| ListedSchool {
                school: entry.item,
                distance: Some(entry.distance),
            })
            .collect(),
        None => schools
            .into_iter()
            .map(|school| ListedSchool {
                school,
                distance: None,
            })
            .collect(),
    };

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listed)?),
        OutputFormat::Plain => {
            for entry in &listed {
                let s = &entry.school;
                match entry.distance {
                    Some(d) => println!("{}  {}  {}", s.id, s.name, format_distance(d)),
                    None => println!("{}  {}", s.id, s.name),
                }
            }
        }
        OutputFormat::Table => {
            println!(
                "{:<16}  {:<30}  {:>6}  {:<10}  {:>10}",
                "ID", "NAME", "VISITS", "LAST", "DISTANCE"
            );
            for entry in &listed {
                let s = &entry.school;
                let last = s
                    .visit_dates()
                    .last()
                    .map_or_else(|| "-".to_string(), ToString::to_string);
                let distance = entry.distance.map_or_else(|| "-".to_string(), format_distance);
                println!(
                    "{:<16}  {:<30}  {:>6}  {:<10}  {:>10}",
                    s.id,
                    s.name,
                    s.visit_dates().len(),
                    last,
                    distance
                );
            }
        }
    }
    Ok(())
}

fn handle_show(storage: &Storage, cmd: &ShowCommand) -> CliResult {
    let school = storage.require(&cmd.id)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&school)?);
        return Ok(());
    }

    println!("{}", school.name);
    println!("  Id:       {}", school.id);
    println!("  Address:  {}", school.address);
    println!("  Position: {}", school.position());
    if let Some(notes) = &school.notes {
        println!("  Notes:    {notes}");
    }
    if school.visited() {
        println!("  Visits:   {}", school.visit_dates().len());
        for date in school.visit_dates() {
            println!("    {date}");
        }
    } else {
        println!("  Visits:   none");
    }
    Ok(())
}

fn handle_visit(storage: &Storage, cmd: &VisitCommand) -> CliResult {
    let date = cmd.date.unwrap_or_else(|| Utc::now().date_naive());
    let school = storage.toggle_visit(&cmd.id, date)?;

    if school.has_visit_on(date) {
        println!("Recorded visit to {} on {date}", school.name);
    } else {
        println!("Removed visit to {} on {date}", school.name);
    }
    println!("{} visit(s) recorded", school.visit_dates().len());
    Ok(())
}

/// A statistic with its derived figures, as printed by `stats --json`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsReport {
    #[serde(flatten)]
    stats: YearlyStats,
    average_visits: f64,
    completion_rate: usize,
}

impl From<YearlyStats> for StatsReport {
    fn from(stats: YearlyStats) -> Self {
        Self {
            stats,
            average_visits: stats.average_visits(),
            completion_rate: stats.completion_rate(),
        }
    }
}

fn handle_stats(storage: &Storage, config: &Config, cmd: &StatsCommand) -> CliResult {
    let schools = storage.list()?;
    let all = stats::yearly_stats(&schools, &config.stats.tracked_years);

    let selected: Vec<YearlyStats> = match cmd.year {
        Some(year) => vec![stats::find(&all, year)
            .copied()
            .unwrap_or_else(|| stats::for_year(&schools, year))],
        None => all,
    };

    if cmd.json {
        let report: Vec<StatsReport> = selected.into_iter().map(StatsReport::from).collect();
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{:<10}  {:>12}  {:>8}  {:>8}  {:>6}",
        "PERIOD", "VISITED", "VISITS", "AVG", "DONE"
    );
    for s in &selected {
        println!(
            "{:<10}  {:>12}  {:>8}  {:>8.1}  {:>5}%",
            s.label(),
            format!("{}/{}", s.visited, s.total),
            s.total_visits,
            s.average_visits(),
            s.completion_rate()
        );
    }
    Ok(())
}

fn handle_status(storage: &Storage, cmd: &StatusCommand) -> CliResult {
    let stats = storage.stats()?;

    if cmd.json {
        let status = serde_json::json!({
            "database_path": storage.path(),
            "schools": stats.total_schools,
            "visits": stats.total_visits,
            "first_visit": stats.first_visit,
            "last_visit": stats.last_visit,
            "db_size_bytes": stats.db_size_bytes,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let or_dash =
        |date: Option<NaiveDate>| date.map_or_else(|| "-".to_string(), |d| d.to_string());
    println!("visitmap status");
    println!("---------------");
    println!("Database:      {}", storage.path().display());
    println!("Schools:       {}", stats.total_schools);
    println!("Visits:        {}", stats.total_visits);
    println!("First visit:   {}", or_dash(stats.first_visit));
    println!("Last visit:    {}", or_dash(stats.last_visit));
    println!("Size:          {} bytes", stats.db_size_bytes);
    Ok(())
}

fn handle_bounds(storage: &Storage, config: &Config, cmd: &BoundsCommand) -> CliResult {
    let schools = storage.list()?;
    let view = geo::bounds_with_default(&schools, config.default_view());

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("Center: {}", view.center);
        println!("Zoom:   {}", view.zoom);
    }
    Ok(())
}

fn handle_navigate(storage: &Storage, config: &Config, cmd: &NavigateCommand) -> CliResult {
    let school = storage.require(&cmd.id)?;
    let navigator = config.navigator();
    info!(
        "Building {} link to {} via {}",
        cmd.mode(),
        school.name,
        navigator.name()
    );
    println!(
        "{}",
        navigator.url(school.position(), &school.name, cmd.mode())
    );
    Ok(())
}

fn handle_distance(cmd: &DistanceCommand) {
    let meters = cmd.from.distance_to(&cmd.to);
    println!("{} ({meters:.1} m)", format_distance(meters));
}

fn handle_export(storage: &Storage, cmd: &ExportCommand) -> CliResult {
    let json = storage.export_json()?;
    match &cmd.output {
        Some(path) => {
            std::fs::write(path, json)?;
            info!("Exported schools to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn handle_import(storage: &Storage, cmd: &ImportCommand) -> CliResult {
    let json = std::fs::read_to_string(&cmd.file)?;
    let imported = storage.import_json(&json, cmd.yes)?;
    println!("Imported {imported} school(s) from {}", cmd.file.display());
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> CliResult {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:  {}", config.database_path().display());
                println!();
                println!("[Stats]");
                println!("  Tracked years:  {:?}", config.stats.tracked_years);
                println!();
                println!("[Map]");
                println!("  Default view:   {}", config.default_view().center);
                println!("  Default zoom:   {}", config.map.default_zoom);
                println!();
                println!("[Navigation]");
                println!("  Source:         {}", config.navigation.source);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
