//! Visit statistics per year.
//!
//! Statistics are always recomputed from the full list of schools; nothing is
//! cached or stored.

use serde::Serialize;

use crate::school::School;

/// Year value that denotes the all-time statistic.
pub const ALL_TIME: i32 = 0;

/// Visit counts for one year, or for all time when `year` is [`ALL_TIME`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyStats {
    /// The year, or 0 for all time.
    pub year: i32,
    /// Schools with at least one visit in the period.
    pub visited: usize,
    /// Total number of schools.
    pub total: usize,
    /// Number of visits recorded in the period.
    pub total_visits: usize,
}

impl YearlyStats {
    /// Whether this entry covers all time.
    #[must_use]
    pub fn is_all_time(&self) -> bool {
        self.year == ALL_TIME
    }

    /// Average visits per visited school, 0 when nothing was visited.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_visits(&self) -> f64 {
        if self.visited == 0 {
            0.0
        } else {
            self.total_visits as f64 / self.visited as f64
        }
    }

    /// Share of schools visited, as a percentage rounded half up.
    /// 0 when there are no schools.
    #[must_use]
    pub fn completion_rate(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            (self.visited * 200 + self.total) / (self.total * 2)
        }
    }

    /// Label used in reports.
    #[must_use]
    pub fn label(&self) -> String {
        if self.is_all_time() {
            "All time".to_string()
        } else {
            self.year.to_string()
        }
    }
}

/// Statistics over the whole visit history.
#[must_use]
pub fn all_time(schools: &[School]) -> YearlyStats {
    YearlyStats {
        year: ALL_TIME,
        visited: schools.iter().filter(|s| s.visited()).count(),
        total: schools.len(),
        total_visits: schools.iter().map(|s| s.visit_dates().len()).sum(),
    }
}

/// Statistics for one calendar year. [`ALL_TIME`] gives [`all_time`].
#[must_use]
pub fn for_year(schools: &[School], year: i32) -> YearlyStats {
    if year == ALL_TIME {
        return all_time(schools);
    }
    YearlyStats {
        year,
        visited: schools.iter().filter(|s| s.visited_in_year(year)).count(),
        total: schools.len(),
        total_visits: schools.iter().map(|s| s.visits_in_year(year)).sum(),
    }
}

/// The all-time statistic followed by one entry per tracked year, in the
/// order given.
#[must_use]
pub fn yearly_stats(schools: &[School], years: &[i32]) -> Vec<YearlyStats> {
    std::iter::once(all_time(schools))
        .chain(years.iter().map(|&year| for_year(schools, year)))
        .collect()
}

/// Find the entry for `year` in a list produced by [`yearly_stats`].
#[must_use]
pub fn find(stats: &[YearlyStats], year: i32) -> Option<&YearlyStats> {
    stats.iter().find(|s| s.year == year)
}

/// The schools as seen from `year`: each keeps only the visit dates in that
/// year. [`ALL_TIME`] returns the list unchanged.
#[must_use]
pub fn filter_by_year(schools: &[School], year: i32) -> Vec<School> {
    if year == ALL_TIME {
        return schools.to_vec();
    }
    schools.iter().map(|s| s.for_year(year)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;

    fn school(name: &str, dates: &[&str]) -> School {
        let mut s = School::new(name, "addr", Coordinate::new(40.0, 116.0), None);
        for d in dates {
            s.toggle_visit(d.parse().unwrap());
        }
        s
    }

    fn sample() -> Vec<School> {
        vec![
            school("A", &["2025-03-01", "2026-01-01"]),
            school("B", &["2025-05-01"]),
        ]
    }

    #[test]
    fn test_yearly_stats_order_and_counts() {
        let stats = yearly_stats(&sample(), &[2025, 2026]);
        assert_eq!(stats.len(), 3);

        assert_eq!(
            stats[0],
            YearlyStats {
                year: 0,
                visited: 2,
                total: 2,
                total_visits: 3
            }
        );
        assert_eq!(
            stats[1],
            YearlyStats {
                year: 2025,
                visited: 2,
                total: 2,
                total_visits: 2
            }
        );
        assert_eq!(
            stats[2],
            YearlyStats {
                year: 2026,
                visited: 1,
                total: 2,
                total_visits: 1
            }
        );
    }

    #[test]
    fn test_unvisited_schools_count_toward_total() {
        let mut schools = sample();
        schools.push(school("C", &[]));

        let stats = all_time(&schools);
        assert_eq!(stats.visited, 2);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completion_rate(), 67);
    }

    #[test]
    fn test_empty_list() {
        let stats = yearly_stats(&[], &[2025]);
        assert_eq!(stats.len(), 2);
        for s in &stats {
            assert_eq!(s.visited, 0);
            assert_eq!(s.total, 0);
            assert_eq!(s.total_visits, 0);
            assert_eq!(s.average_visits(), 0.0);
            assert_eq!(s.completion_rate(), 0);
        }
    }

    #[test]
    fn test_average_visits() {
        let stats = all_time(&sample());
        assert!((stats.average_visits() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_completion_rate_rounds_half_up() {
        let stats = YearlyStats {
            year: 2025,
            visited: 1,
            total: 8,
            total_visits: 1,
        };
        assert_eq!(stats.completion_rate(), 13);

        let stats = YearlyStats {
            year: 2025,
            visited: 1,
            total: 3,
            total_visits: 1,
        };
        assert_eq!(stats.completion_rate(), 33);

        let stats = YearlyStats {
            year: 2025,
            visited: 4,
            total: 4,
            total_visits: 9,
        };
        assert_eq!(stats.completion_rate(), 100);
    }

    #[test]
    fn test_untracked_year() {
        let stats = for_year(&sample(), 2024);
        assert_eq!(stats.visited, 0);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.total_visits, 0);
    }

    #[test]
    fn test_for_year_all_time() {
        assert_eq!(for_year(&sample(), ALL_TIME), all_time(&sample()));
    }

    #[test]
    fn test_find() {
        let stats = yearly_stats(&sample(), &[2025, 2026]);
        assert_eq!(find(&stats, 2026).map(|s| s.total_visits), Some(1));
        assert!(find(&stats, 0).unwrap().is_all_time());
        assert!(find(&stats, 2030).is_none());
    }

    #[test]
    fn test_label() {
        assert_eq!(all_time(&[]).label(), "All time");
        assert_eq!(for_year(&[], 2025).label(), "2025");
    }

    #[test]
    fn test_filter_by_year() {
        let filtered = filter_by_year(&sample(), 2026);
        assert_eq!(filtered.len(), 2);
        assert!(filtered[0].visited());
        assert_eq!(filtered[0].visit_dates().len(), 1);
        assert!(!filtered[1].visited());
        assert!(filtered[1].visit_dates().is_empty());

        let everything = filter_by_year(&sample(), ALL_TIME);
        assert_eq!(everything, sample());
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let json = serde_json::to_value(all_time(&sample())).unwrap();
        assert_eq!(json["totalVisits"], 3);
        assert_eq!(json["year"], 0);
    }
}
