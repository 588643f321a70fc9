//! `SQLite` schema definitions for visitmap.

/// SQL statement to create the schools table.
pub const CREATE_SCHOOLS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS schools (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    address TEXT NOT NULL,
    lat REAL NOT NULL,
    lng REAL NOT NULL,
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create the visits table.
///
/// One row per school per calendar day; the primary key collapses repeat
/// visits on the same day.
pub const CREATE_VISITS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS visits (
    school_id TEXT NOT NULL REFERENCES schools(id),
    visit_date TEXT NOT NULL,
    PRIMARY KEY (school_id, visit_date)
)
";

/// SQL statement to create an index on `visit_date` for range queries.
pub const CREATE_VISIT_DATE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_visits_date ON visits(visit_date)
";

/// SQL statement to create an index on school name for listing.
pub const CREATE_NAME_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_schools_name ON schools(name)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_SCHOOLS_TABLE,
    CREATE_VISITS_TABLE,
    CREATE_VISIT_DATE_INDEX,
    CREATE_NAME_INDEX,
    CREATE_METADATA_TABLE,
];
