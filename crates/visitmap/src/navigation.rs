//! Turn-by-turn navigation links.
//!
//! The map vendor is hidden behind [`NavigationProvider`]; the rest of the
//! crate only hands over a destination and a name.

use crate::geo::Coordinate;

/// Default `src` parameter sent to the Amap URI API.
pub const DEFAULT_SOURCE: &str = "myapp";

const AMAP_NAVIGATION_URL: &str = "https://uri.amap.com/navigation";

/// How the user intends to travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TravelMode {
    /// By car.
    #[default]
    Driving,
    /// On foot.
    Walking,
}

impl std::fmt::Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Driving => write!(f, "driving"),
            Self::Walking => write!(f, "walking"),
        }
    }
}

/// Builds deep links into an external mapping service.
pub trait NavigationProvider {
    /// The name of the service (for logging/display).
    fn name(&self) -> &'static str;

    /// Link for driving directions to `destination`.
    fn driving_url(&self, destination: Coordinate, name: &str) -> String;

    /// Link for walking directions to `destination`.
    fn walking_url(&self, destination: Coordinate, name: &str) -> String;

    /// Link for the given travel mode.
    fn url(&self, destination: Coordinate, name: &str, mode: TravelMode) -> String {
        match mode {
            TravelMode::Driving => self.driving_url(destination, name),
            TravelMode::Walking => self.walking_url(destination, name),
        }
    }
}

/// Navigation through the Amap (高德地图) URI API.
///
/// Destinations are given as `lng,lat` in the GCJ-02 ("gaode") system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmapNavigator {
    source: String,
}

impl AmapNavigator {
    /// Create a navigator that identifies itself with `source`.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// The `src` parameter sent with each link.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    fn destination(destination: Coordinate, name: &str) -> String {
        format!(
            "{},{},{}",
            destination.lng,
            destination.lat,
            urlencoding::encode(name)
        )
    }
}

impl Default for AmapNavigator {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE)
    }
}

impl NavigationProvider for AmapNavigator {
    fn name(&self) -> &'static str {
        "amap"
    }

    fn driving_url(&self, destination: Coordinate, name: &str) -> String {
        format!(
            "{AMAP_NAVIGATION_URL}?to={}&mode=car&policy=1&src={}&coordinate=gaode&callnative=0",
            Self::destination(destination, name),
            urlencoding::encode(&self.source)
        )
    }

    fn walking_url(&self, destination: Coordinate, name: &str) -> String {
        format!(
            "{AMAP_NAVIGATION_URL}?to={}&mode=walk&src={}&coordinate=gaode&callnative=0",
            Self::destination(destination, name),
            urlencoding::encode(&self.source)
        )
    }
}

/// Driving link through the default provider.
#[must_use]
pub fn navigation_url(lat: f64, lng: f64, name: &str) -> String {
    AmapNavigator::default().driving_url(Coordinate::new(lat, lng), name)
}

/// Walking link through the default provider.
#[must_use]
pub fn walking_navigation_url(lat: f64, lng: f64, name: &str) -> String {
    AmapNavigator::default().walking_url(Coordinate::new(lat, lng), name)
}
