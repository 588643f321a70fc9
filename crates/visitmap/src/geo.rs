//! Geographic helpers: great-circle distance, distance formatting, proximity
//! sorting and map bounds.
//!
//! All functions here are pure. Coordinates are WGS84-like degrees and are not
//! validated; non-finite input produces non-finite output.

use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::Error;

/// Mean Earth radius used by the haversine formula, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Zoom level used when there are no points to show.
pub const DEFAULT_ZOOM: u8 = 12;

/// Zoom level used when there is exactly one point to show.
pub const SINGLE_POINT_ZOOM: u8 = 15;

/// Center used when there are no points to show.
pub const DEFAULT_CENTER: Coordinate = Coordinate {
    lat: 40.1283,
    lng: 116.6543,
};

/// Span thresholds (degrees) and the zoom chosen when the span exceeds them.
const ZOOM_LADDER: &[(f64, u8)] = &[(0.1, 10), (0.05, 11), (0.02, 12), (0.01, 13), (0.005, 14)];

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl Coordinate {
    /// Create a coordinate without validation.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Create a coordinate, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCoordinate`] if latitude is outside [-90, 90],
    /// longitude is outside [-180, 180], or either is not finite.
    pub fn checked(lat: f64, lng: f64) -> Result<Self, Error> {
        let input = format!("{lat},{lng}");
        if !lat.is_finite() || !lng.is_finite() {
            return Err(Error::invalid_coordinate(input, "values must be finite"));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(Error::invalid_coordinate(input, "latitude out of range"));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(Error::invalid_coordinate(input, "longitude out of range"));
        }
        Ok(Self { lat, lng })
    }

    /// Distance to another coordinate in meters.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        distance(self.lat, self.lng, other.lat, other.lng)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

/// Parses `"LAT,LNG"`.
impl FromStr for Coordinate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| Error::invalid_coordinate(s, "expected LAT,LNG"))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| Error::invalid_coordinate(s, "latitude is not a number"))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| Error::invalid_coordinate(s, "longitude is not a number"))?;
        Self::checked(lat, lng)
    }
}

/// Anything with a position on the map.
pub trait Located {
    /// Latitude in degrees.
    fn lat(&self) -> f64;
    /// Longitude in degrees.
    fn lng(&self) -> f64;
}

impl Located for Coordinate {
    fn lat(&self) -> f64 {
        self.lat
    }

    fn lng(&self) -> f64 {
        self.lng
    }
}

impl<T: Located + ?Sized> Located for &T {
    fn lat(&self) -> f64 {
        (**self).lat()
    }

    fn lng(&self) -> f64 {
        (**self).lng()
    }
}

/// Great-circle distance between two points in meters (haversine).
#[must_use]
pub fn distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();

    // Rounding can push `a` just past 1 for nearly antipodal points.
    let a = ((d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Human-readable distance: whole meters below 1 km, kilometers to one decimal
/// place otherwise.
///
/// Kilometers are rounded on the exact binary value of `meters / 1000`, so
/// 1150 m (stored as 1.1499...) shows as "1.1公里". Exact ties such as 1.25
/// round up.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        return format!("{:.0}米", meters.round());
    }
    let km = meters / 1000.0;
    // Exact tenths ties are the odd multiples of 0.25; `{:.1}` would round
    // those to even.
    let quarters = km * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 == 1.0 {
        format!("{:.1}公里", (km * 10.0).ceil() / 10.0)
    } else {
        format!("{km:.1}公里")
    }
}

/// Whether two points are at most `radius` meters apart.
#[must_use]
pub fn is_within_radius(lat1: f64, lng1: f64, lat2: f64, lng2: f64, radius: f64) -> bool {
    distance(lat1, lng1, lat2, lng2) <= radius
}

/// An item paired with its distance from some origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithDistance<T> {
    /// The located item.
    #[serde(flatten)]
    pub item: T,
    /// Distance from the origin in meters.
    pub distance: f64,
}

/// Attach the distance from the origin to every point and order them nearest
/// first. Points at equal distance keep their input order.
pub fn sort_by_distance<T, I>(points: I, origin_lat: f64, origin_lng: f64) -> Vec<WithDistance<T>>
where
    T: Located,
    I: IntoIterator<Item = T>,
{
    let mut sorted: Vec<WithDistance<T>> = points
        .into_iter()
        .map(|item| {
            let distance = distance(origin_lat, origin_lng, item.lat(), item.lng());
            WithDistance { item, distance }
        })
        .collect();
    sorted.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    sorted
}

/// A map center and zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapView {
    /// Center of the view, serialized as `[lng, lat]`.
    #[serde(serialize_with = "serialize_lng_lat")]
    pub center: Coordinate,
    /// Map zoom level.
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}

fn serialize_lng_lat<S: Serializer>(c: &Coordinate, s: S) -> Result<S::Ok, S::Error> {
    [c.lng, c.lat].serialize(s)
}

/// Center and zoom that show all the given points.
///
/// With no points the default view is returned.
#[must_use]
pub fn bounds_for_points<T: Located>(points: &[T]) -> MapView {
    bounds_with_default(points, MapView::default())
}

/// Like [`bounds_for_points`], with a caller-supplied view for the empty case.
#[must_use]
pub fn bounds_with_default<T: Located>(points: &[T], empty: MapView) -> MapView {
    match points {
        [] => empty,
        [only] => MapView {
            center: Coordinate::new(only.lat(), only.lng()),
            zoom: SINGLE_POINT_ZOOM,
        },
        [first, rest @ ..] => {
            let init = (first.lat(), first.lat(), first.lng(), first.lng());
            let (min_lat, max_lat, min_lng, max_lng) =
                rest.iter().fold(init, |(min_lat, max_lat, min_lng, max_lng), p| {
                    (
                        min_lat.min(p.lat()),
                        max_lat.max(p.lat()),
                        min_lng.min(p.lng()),
                        max_lng.max(p.lng()),
                    )
                });

            let span = (max_lat - min_lat).max(max_lng - min_lng);
            MapView {
                center: Coordinate::new((min_lat + max_lat) / 2.0, (min_lng + max_lng) / 2.0),
                zoom: zoom_for_span(span),
            }
        }
    }
}

/// Zoom level for a view whose largest side spans `span` degrees.
#[must_use]
pub fn zoom_for_span(span: f64) -> u8 {
    ZOOM_LADDER
        .iter()
        .find(|(threshold, _)| span > *threshold)
        .map_or(SINGLE_POINT_ZOOM, |(_, zoom)| *zoom)
}
