//! Backend adapters
//!
//! Each adapter turns a `RouteRequest` into one backend call and converts the
//! backend's payload into the intermediate shapes below. Backend wire structs
//! stay private to the adapter modules.

pub mod direct;
pub mod itinerary;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::core::config::NavConfig;
use crate::core::error::BackendError;
use crate::core::model::{RouteRequest, TransportMode};

/// One maneuver of a direct-routing leg
#[derive(Debug, Clone, PartialEq)]
pub struct DirectManeuver {
    pub maneuver_type: i64,
    pub instruction: String,
    /// Kilometers, as the backend was asked for
    pub length_km: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectLeg {
    pub shape: String,
    pub maneuvers: Vec<DirectManeuver>,
}

/// Direct-routing result: trip summary plus legs in travel order
#[derive(Debug, Clone, PartialEq)]
pub struct DirectTrip {
    /// Seconds
    pub time: f64,
    /// Kilometers
    pub length_km: f64,
    pub legs: Vec<DirectLeg>,
}

/// One leg of a transit itinerary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitLeg {
    /// Backend mode token such as `WALK` or `BUS`
    pub mode: String,
    /// Meters
    pub distance: f64,
    /// Seconds
    pub duration: f64,
    pub from_name: Option<String>,
    pub to_name: Option<String>,
    pub route_short_name: Option<String>,
    pub route_long_name: Option<String>,
    pub agency_name: Option<String>,
    pub intermediate_stops: usize,
    pub geometry: String,
}

/// First itinerary of a transit plan
#[derive(Debug, Clone, PartialEq)]
pub struct TransitItinerary {
    /// Seconds
    pub duration: f64,
    pub legs: Vec<TransitLeg>,
}

/// What any adapter hands to the assembler
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterOutput {
    Direct(DirectTrip),
    Itinerary(TransitItinerary),
}

/// Which adapter serves a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Direct,
    Itinerary,
}

/// Pick the adapter for a request.
///
/// The itinerary backend only handles transit in the configured transit
/// country, and only when its base URL is set. Everything else goes to the
/// direct router.
pub fn select_backend(req: &RouteRequest, config: &NavConfig) -> Backend {
    let transit_country = req
        .country
        .as_ref()
        .is_some_and(|c| c.as_str() == config.transit_country);

    if req.mode == TransportMode::Transit && transit_country && config.transitland_url.is_some() {
        Backend::Itinerary
    } else {
        Backend::Direct
    }
}

/// Run a request through whichever adapter `select_backend` picks
pub async fn route_once(
    client: &Client,
    config: &NavConfig,
    req: &RouteRequest,
) -> Result<AdapterOutput, BackendError> {
    let backend = select_backend(req, config);
    debug!(?backend, mode = %req.mode, "Routing request");

    match backend {
        Backend::Direct => direct::route(client, config, req)
            .await
            .map(AdapterOutput::Direct),
        Backend::Itinerary => itinerary::route(client, config, req)
            .await
            .map(AdapterOutput::Itinerary),
    }
}

/// Error code routers use for "locations are not connected"
pub const NOT_CONNECTED_CODE: i64 = 170;

/// Structured error body shared by both backends
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error_code: i64,
    #[serde(default)]
    error: String,
}

/// Classify a non-success backend answer
pub(crate) fn status_error(backend: &str, status: StatusCode, body: &str) -> BackendError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) if err.error_code == NOT_CONNECTED_CODE => BackendError::NotConnected,
        Ok(err) => {
            warn!(backend, code = err.error_code, message = %err.error, "Backend rejected route");
            BackendError::Rejected {
                code: err.error_code,
                message: err.error,
            }
        }
        Err(_) => {
            warn!(backend, %status, "Backend returned an unstructured error");
            BackendError::ProviderFailure(format!(
                "{backend} returned status {}: {body}",
                status.as_u16()
            ))
        }
    }
}

/// Keep a backend string only if it carries text
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
