//! School records and visit bookkeeping.
//!
//! A [`School`] owns its list of visit dates. The `visited` flag is never set
//! directly: it always mirrors whether the date list is non-empty, including
//! for records read back from JSON.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::geo::{Coordinate, Located};

/// Number of hex characters kept from the BLAKE3 digest for school ids.
const ID_LEN: usize = 16;

/// A school that can be visited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SchoolRecord")]
pub struct School {
    /// Unique identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Street address.
    pub address: String,

    /// Latitude in degrees.
    pub lat: f64,

    /// Longitude in degrees.
    pub lng: f64,

    visited: bool,

    visit_dates: Vec<NaiveDate>,

    /// Free-text note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// The on-disk JSON shape, accepted as-is and normalized into a [`School`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchoolRecord {
    id: String,
    name: String,
    address: String,
    lat: f64,
    lng: f64,
    #[serde(default)]
    visited: bool,
    #[serde(default)]
    visit_dates: Vec<NaiveDate>,
    #[serde(default)]
    notes: Option<String>,
}

impl From<SchoolRecord> for School {
    fn from(record: SchoolRecord) -> Self {
        let school = Self::restore(
            record.id,
            record.name,
            record.address,
            Coordinate::new(record.lat, record.lng),
            record.visit_dates,
            record.notes,
        );
        if school.visited != record.visited {
            warn!(
                "School {} had visited={} with {} visit dates, normalizing",
                school.id,
                record.visited,
                school.visit_dates.len()
            );
        }
        school
    }
}

impl School {
    /// Create a new, unvisited school.
    ///
    /// The id is derived from the name, address and position, so adding the
    /// same school twice yields the same id.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        position: Coordinate,
        notes: Option<String>,
    ) -> Self {
        let name = name.into();
        let address = address.into();
        let id = Self::compute_id(&name, &address, position);
        Self {
            id,
            name,
            address,
            lat: position.lat,
            lng: position.lng,
            visited: false,
            visit_dates: Vec::new(),
            notes: notes.filter(|n| !n.trim().is_empty()),
        }
    }

    /// Rebuild a school from stored parts.
    ///
    /// Visit dates are sorted and deduplicated and `visited` is derived from
    /// them.
    #[must_use]
    pub fn restore(
        id: String,
        name: String,
        address: String,
        position: Coordinate,
        mut visit_dates: Vec<NaiveDate>,
        notes: Option<String>,
    ) -> Self {
        visit_dates.sort_unstable();
        visit_dates.dedup();
        Self {
            id,
            name,
            address,
            lat: position.lat,
            lng: position.lng,
            visited: !visit_dates.is_empty(),
            visit_dates,
            notes,
        }
    }

    /// Compute the id for a school with the given identity.
    #[must_use]
    pub fn compute_id(name: &str, address: &str, position: Coordinate) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(name.trim().as_bytes());
        hasher.update(&[0]);
        hasher.update(address.trim().as_bytes());
        hasher.update(&[0]);
        hasher.update(&position.lat.to_le_bytes());
        hasher.update(&position.lng.to_le_bytes());
        let mut hex = hasher.finalize().to_hex().to_string();
        hex.truncate(ID_LEN);
        hex
    }

    /// Whether the school has at least one recorded visit.
    #[must_use]
    pub fn visited(&self) -> bool {
        self.visited
    }

    /// Recorded visit dates, ascending.
    #[must_use]
    pub fn visit_dates(&self) -> &[NaiveDate] {
        &self.visit_dates
    }

    /// The school's position.
    #[must_use]
    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }

    /// Whether a visit is recorded on `date`.
    #[must_use]
    pub fn has_visit_on(&self, date: NaiveDate) -> bool {
        self.visit_dates.binary_search(&date).is_ok()
    }

    /// Number of visits recorded in `year`.
    #[must_use]
    pub fn visits_in_year(&self, year: i32) -> usize {
        self.visit_dates.iter().filter(|d| d.year() == year).count()
    }

    /// Whether at least one visit is recorded in `year`.
    #[must_use]
    pub fn visited_in_year(&self, year: i32) -> bool {
        self.visit_dates.iter().any(|d| d.year() == year)
    }

    /// Toggle the visit on `date`.
    ///
    /// Removes the date if it is already recorded, otherwise records it.
    /// Returns `true` if a visit was added.
    pub fn toggle_visit(&mut self, date: NaiveDate) -> bool {
        let added = match self.visit_dates.binary_search(&date) {
            Ok(pos) => {
                self.visit_dates.remove(pos);
                false
            }
            Err(pos) => {
                self.visit_dates.insert(pos, date);
                true
            }
        };
        self.visited = !self.visit_dates.is_empty();
        added
    }

    /// A copy of this school that only sees visits from `year`.
    #[must_use]
    pub fn for_year(&self, year: i32) -> Self {
        let visit_dates: Vec<NaiveDate> = self
            .visit_dates
            .iter()
            .copied()
            .filter(|d| d.year() == year)
            .collect();
        Self {
            visited: !visit_dates.is_empty(),
            visit_dates,
            ..self.clone()
        }
    }
}

impl Located for School {
    fn lat(&self) -> f64 {
        self.lat
    }

    fn lng(&self) -> f64 {
        self.lng
    }
}
