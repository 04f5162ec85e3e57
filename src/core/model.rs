//! Canonical request and result types shared by every stage of the engine
//!
//! Everything here is created per request and immutable once built. Backend
//! payloads never appear in these types; adapters convert into them.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use utoipa::ToSchema;

use crate::core::error::Error;

/// Side length of the normalized display grid
pub const GRID: i32 = 100;

/// Meters in one statute mile
pub const METERS_PER_MILE: f64 = 1609.344;

/// Feet in one statute mile
pub const FEET_PER_MILE: f64 = 5280.0;

/// A WGS84 position in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting anything outside the valid degree ranges
    pub fn new(lat: f64, lng: f64) -> Result<Self, Error> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(Error::InvalidInput(format!(
                "latitude {lat} out of range [-90, 90]"
            )));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(Error::InvalidInput(format!(
                "longitude {lng} out of range [-180, 180]"
            )));
        }
        Ok(Self { lat, lng })
    }
}

impl FromStr for Coordinate {
    type Err = Error;

    /// Parses the `lat,lng` form used by the client and the CLI
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 2 {
            return Err(Error::InvalidInput("invalid lat,lng format".to_string()));
        }
        let lat = parts[0]
            .trim()
            .parse::<f64>()
            .map_err(|e| Error::InvalidInput(format!("invalid latitude: {e}")))?;
        let lng = parts[1]
            .trim()
            .parse::<f64>()
            .map_err(|e| Error::InvalidInput(format!("invalid longitude: {e}")))?;
        Coordinate::new(lat, lng)
    }
}

/// How the traveller moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Walking,
    Biking,
    #[default]
    Auto,
    Transit,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Walking => "walking",
            TransportMode::Biking => "biking",
            TransportMode::Auto => "auto",
            TransportMode::Transit => "transit",
        }
    }
}

impl FromStr for TransportMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "walking" => Ok(TransportMode::Walking),
            "biking" => Ok(TransportMode::Biking),
            "auto" => Ok(TransportMode::Auto),
            "transit" => Ok(TransportMode::Transit),
            _ => Err(Error::InvalidInput(format!(
                "invalid mode '{s}'. Must be one of: walking, biking, auto, transit"
            ))),
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit used for every distance in a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
pub enum DistanceUnit {
    #[default]
    #[serde(rename = "km")]
    Kilometers,
    #[serde(rename = "mi")]
    Miles,
}

impl DistanceUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Miles => "mi",
        }
    }

    /// Convert a backend distance in meters into this unit
    pub fn from_meters(&self, meters: f64) -> f64 {
        match self {
            DistanceUnit::Kilometers => meters / 1000.0,
            DistanceUnit::Miles => meters / METERS_PER_MILE,
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "km" => Ok(DistanceUnit::Kilometers),
            "mi" => Ok(DistanceUnit::Miles),
            _ => Err(Error::InvalidInput(format!(
                "invalid units '{s}'. Must be one of: km, mi"
            ))),
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two-letter ISO country code, always lowercase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryCode(String);

impl CountryCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CountryCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_lowercase();
        if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(CountryCode(code))
        } else {
            Err(Error::InvalidInput(
                "country must be a valid 2-letter ISO code".to_string(),
            ))
        }
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated routing request
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub origin_label: Option<String>,
    pub destination_label: Option<String>,
    pub mode: TransportMode,
    pub units: DistanceUnit,
    pub country: Option<CountryCode>,
}

impl RouteRequest {
    pub fn new(origin: Coordinate, destination: Coordinate) -> Self {
        Self {
            origin,
            destination,
            origin_label: None,
            destination_label: None,
            mode: TransportMode::default(),
            units: DistanceUnit::default(),
            country: None,
        }
    }

    pub fn mode(mut self, mode: TransportMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn units(mut self, units: DistanceUnit) -> Self {
        self.units = units;
        self
    }

    pub fn country(mut self, country: Option<CountryCode>) -> Self {
        self.country = country;
        self
    }

    pub fn labels(mut self, origin: Option<String>, destination: Option<String>) -> Self {
        self.origin_label = origin.filter(|s| !s.is_empty());
        self.destination_label = destination.filter(|s| !s.is_empty());
        self
    }

    /// Copy of this request routed under a different mode
    pub fn with_mode(&self, mode: TransportMode) -> Self {
        Self {
            mode,
            ..self.clone()
        }
    }

    /// Whether step text should use feet and miles
    pub fn is_us_localized(&self) -> bool {
        self.country.as_ref().is_some_and(|c| c.as_str() == "us")
    }
}

/// A position on the normalized display grid, serialized as `[x, y]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathPoint {
    pub x: i32,
    pub y: i32,
}

impl PathPoint {
    pub fn manhattan(&self, other: &PathPoint) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl Serialize for PathPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.x, self.y].serialize(serializer)
    }
}

/// Route shape projected onto the GRID x GRID display grid
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct NormalizedPath {
    #[schema(value_type = Vec<Vec<i32>>)]
    pub points: Vec<PathPoint>,
    pub length: usize,
    pub width: i32,
    pub height: i32,
}

impl NormalizedPath {
    pub fn new(points: Vec<PathPoint>) -> Self {
        Self {
            length: points.len(),
            points,
            width: GRID,
            height: GRID,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl Default for NormalizedPath {
    fn default() -> Self {
        Self::empty()
    }
}

/// Step glyph understood by the client renderer.
///
/// `Icon::None` serializes to the empty token and means "draw nothing"; the
/// client relies on that blank line, so it is a real value and not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Icon {
    #[default]
    None,
    Left,
    Right,
    SlightLeft,
    SlightRight,
    Straight,
    Merge,
    Exit,
    Ferry,
    Building,
    Walk,
    Bus,
    Train,
    Cycle,
    Drive,
}

impl Icon {
    pub fn as_str(&self) -> &'static str {
        match self {
            Icon::None => "",
            Icon::Left => "Left",
            Icon::Right => "Right",
            Icon::SlightLeft => "left",
            Icon::SlightRight => "right",
            Icon::Straight => "Straight",
            Icon::Merge => "Merge",
            Icon::Exit => "Exit",
            Icon::Ferry => "Ferry",
            Icon::Building => "building",
            Icon::Walk => "Walk",
            Icon::Bus => "Bus",
            Icon::Train => "Train",
            Icon::Cycle => "Cycle",
            Icon::Drive => "Drive",
        }
    }
}

impl Serialize for Icon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CanonicalStep {
    /// 1-based position in the route
    pub number: usize,
    pub description: String,
    /// Distance in the response unit
    pub distance: f64,
    #[schema(value_type = String)]
    pub icon: Icon,
}

/// Route endpoint with the caller's label
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Location {
    pub desc: String,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn new(label: Option<&str>, coord: Coordinate) -> Self {
        Self {
            desc: label.unwrap_or_default().to_string(),
            lat: coord.lat,
            lng: coord.lng,
        }
    }
}

/// Canonical route handed to the wire encoder
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RouteResult {
    /// Total duration in seconds
    pub duration: f64,
    /// Total distance in `units`
    pub distance: f64,
    #[schema(value_type = String)]
    pub units: DistanceUnit,
    pub steps: Vec<CanonicalStep>,
    pub path: NormalizedPath,
    /// Mode actually routed, after any fallback
    #[schema(value_type = String)]
    pub mode: TransportMode,
    pub from: Location,
    pub to: Location,
}
