//! Storage layer for visitmap.
//!
//! School records live in a local `SQLite` database. The store can also read
//! and write the JSON array format the browser version kept in local storage
//! under [`STORAGE_KEY`].

pub mod migrations;
pub mod schema;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::geo::Coordinate;
use crate::school::School;

/// Key under which the browser version stored its school list.
pub const STORAGE_KEY: &str = "schoolAttendanceData";

/// Format of visit dates in the database and in JSON.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Persistent store for school records and their visits.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

/// A row of the `schools` table, before its visits are attached.
struct SchoolRow {
    id: String,
    name: String,
    address: String,
    lat: f64,
    lng: f64,
    notes: Option<String>,
}

impl SchoolRow {
    fn into_school(self, visit_dates: Vec<NaiveDate>) -> School {
        School::restore(
            self.id,
            self.name,
            self.address,
            Coordinate::new(self.lat, self.lng),
            visit_dates,
            self.notes,
        )
    }
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add a school along with any visits it already has.
    ///
    /// Returns the school's id, or `None` if a school with the same id is
    /// already stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert(&self, school: &School) -> Result<Option<String>> {
        if self.exists(&school.id)? {
            debug!("Skipping duplicate school {}", school.id);
            return Ok(None);
        }

        let tx = self.conn.unchecked_transaction()?;
        write_school(&tx, school)?;
        tx.commit()?;

        debug!("Inserted school {} ({})", school.id, school.name);
        Ok(Some(school.id.clone()))
    }

    fn exists(&self, id: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM schools WHERE id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Get a school by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, id: &str) -> Result<Option<School>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, address, lat, lng, notes FROM schools WHERE id = ?1",
                [id],
                row_to_school,
            )
            .optional()?;

        match row {
            Some(row) => {
                let dates = self.visit_dates(id)?;
                Ok(Some(row.into_school(dates)))
            }
            None => Ok(None),
        }
    }

    /// Get a school by its id, failing if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchoolNotFound`] for an unknown id, or an error if
    /// the database operation fails.
    pub fn require(&self, id: &str) -> Result<School> {
        self.get(id)?.ok_or_else(|| Error::school_not_found(id))
    }

    fn visit_dates(&self, id: &str) -> Result<Vec<NaiveDate>> {
        let mut stmt = self
            .conn
            .prepare("SELECT visit_date FROM visits WHERE school_id = ?1 ORDER BY visit_date")?;
        let raw = stmt
            .query_map([id], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(raw.iter().filter_map(|s| parse_date(id, s)).collect())
    }

    /// All schools, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list(&self) -> Result<Vec<School>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, address, lat, lng, notes FROM schools ORDER BY name, id",
        )?;
        let rows = stmt
            .query_map([], row_to_school)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut stmt = self
            .conn
            .prepare("SELECT school_id, visit_date FROM visits ORDER BY school_id, visit_date")?;
        let mut visits: HashMap<String, Vec<NaiveDate>> = HashMap::new();
        for pair in stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })? {
            let (school_id, raw) = pair?;
            if let Some(date) = parse_date(&school_id, &raw) {
                visits.entry(school_id).or_default().push(date);
            }
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let dates = visits.remove(&row.id).unwrap_or_default();
                row.into_school(dates)
            })
            .collect())
    }

    /// Toggle the visit on `date` for the given school and persist it.
    ///
    /// Returns the updated school.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchoolNotFound`] for an unknown id, or an error if
    /// the database operation fails.
    pub fn toggle_visit(&self, id: &str, date: NaiveDate) -> Result<School> {
        let mut school = self.require(id)?;
        let date_str = date.format(DATE_FORMAT).to_string();

        if school.toggle_visit(date) {
            self.conn.execute(
                "INSERT OR IGNORE INTO visits (school_id, visit_date) VALUES (?1, ?2)",
                params![id, date_str],
            )?;
            info!("Recorded visit to {} on {}", school.name, date_str);
        } else {
            self.conn.execute(
                "DELETE FROM visits WHERE school_id = ?1 AND visit_date = ?2",
                params![id, date_str],
            )?;
            info!("Removed visit to {} on {}", school.name, date_str);
        }

        Ok(school)
    }

    /// Count stored schools.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM schools", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Count stored visits across all schools.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn visit_count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM visits", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Replace every stored record with `schools`, atomically.
    ///
    /// Returns the number of schools written.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails, including when two
    /// schools share an id. Nothing is changed in that case.
    pub fn replace_all(&self, schools: &[School]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM visits", [])?;
        tx.execute("DELETE FROM schools", [])?;
        for school in schools {
            write_school(&tx, school)?;
        }
        tx.commit()?;

        info!("Replaced store contents with {} schools", schools.len());
        Ok(schools.len())
    }

    /// Serialize all schools as the browser's JSON array format.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or serializing fails.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.list()?)?)
    }

    /// Replace all schools with those in a JSON array in the browser format.
    ///
    /// A store that already holds schools is only replaced when `overwrite`
    /// is set. Records whose `visited` flag disagrees with their visit dates
    /// are corrected. Returns the number of schools imported.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReplaceRefused`] if the store is not empty and
    /// `overwrite` is false, or an error if the JSON is malformed or the
    /// database operation fails.
    pub fn import_json(&self, json: &str, overwrite: bool) -> Result<usize> {
        let existing = self.count()?;
        if existing > 0 && !overwrite {
            return Err(Error::ReplaceRefused { existing });
        }
        let schools: Vec<School> = serde_json::from_str(json)?;
        self.replace_all(&schools)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let total_schools = self.count()?;
        let total_visits = self.visit_count()?;

        let (first, last): (Option<String>, Option<String>) = self.conn.query_row(
            "SELECT MIN(visit_date), MAX(visit_date) FROM visits",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_schools,
            total_visits,
            first_visit: first.and_then(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok()),
            last_visit: last.and_then(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok()),
            db_size_bytes,
        })
    }
}

fn write_school(conn: &Connection, school: &School) -> Result<()> {
    conn.execute(
        r"
        INSERT INTO schools (id, name, address, lat, lng, notes)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ",
        params![
            school.id,
            school.name,
            school.address,
            school.lat,
            school.lng,
            school.notes,
        ],
    )?;

    let mut stmt =
        conn.prepare_cached("INSERT INTO visits (school_id, visit_date) VALUES (?1, ?2)")?;
    for date in school.visit_dates() {
        stmt.execute(params![school.id, date.format(DATE_FORMAT).to_string()])?;
    }
    Ok(())
}

fn row_to_school(row: &rusqlite::Row) -> rusqlite::Result<SchoolRow> {
    Ok(SchoolRow {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        lat: row.get(3)?,
        lng: row.get(4)?,
        notes: row.get(5)?,
    })
}

fn parse_date(school_id: &str, raw: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            warn!("Ignoring malformed visit date {raw:?} for school {school_id}");
            None
        }
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of schools stored.
    pub total_schools: i64,
    /// Number of visits stored.
    pub total_visits: i64,
    /// Earliest recorded visit.
    pub first_visit: Option<NaiveDate>,
    /// Latest recorded visit.
    pub last_visit: Option<NaiveDate>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
