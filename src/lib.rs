//! # Fujinav
//!
//! Geocoding and routing gateway for low-memory retro clients.
//!
//! Requests are forwarded to a Nominatim geocoder, a Valhalla-style router or
//! an OpenTripPlanner-style transit planner. Whatever the backend, the answer
//! comes back as one compact route model: abbreviated step text, a small icon
//! vocabulary and a path squeezed onto a 100x100 grid, encoded as JSON or as a
//! line-oriented plain-text format.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use fujinav::{Config, NavService, RouteRequest, TransportMode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     let service = NavService::new(config.nav)?;
//!
//!     let req = RouteRequest::new("40.7128,-74.0060".parse()?, "40.7306,-73.9866".parse()?)
//!         .mode(TransportMode::Walking);
//!     let route = service.route(&req).await?;
//!     print!("{}", fujinav::wire::encode_route_plain(&route));
//!
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod server;

pub use crate::core::error::{BackendError, Error, Result};
pub use crate::core::model::{
    CanonicalStep, Coordinate, CountryCode, DistanceUnit, Icon, Location, NormalizedPath,
    PathPoint, RouteRequest, RouteResult, TransportMode,
};
pub use crate::core::{geocode::GeocodeResult, wire, Config, NavConfig, NavService};

/// Version string baked in at build time
pub const VERSION: &str = env!("FUJINAV_VERSION");
