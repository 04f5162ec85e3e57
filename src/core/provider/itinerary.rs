//! Multi-leg transit itineraries from an OpenTripPlanner-style plan endpoint
//! (Transitland's `/routing/otp/plan`)

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{non_empty, status_error, TransitItinerary, TransitLeg};
use crate::core::config::NavConfig;
use crate::core::error::BackendError;
use crate::core::model::{Coordinate, RouteRequest};

const BACKEND: &str = "transitland";
const PLAN_PATH: &str = "/routing/otp/plan";

#[derive(Debug, Deserialize)]
struct PlanResponse {
    plan: Plan,
}

#[derive(Debug, Deserialize)]
struct Plan {
    #[serde(default)]
    itineraries: Vec<Itinerary>,
}

#[derive(Debug, Deserialize)]
struct Itinerary {
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    legs: Vec<Leg>,
}

#[derive(Debug, Default, Deserialize)]
struct Place {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LegGeometry {
    #[serde(default)]
    points: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Leg {
    #[serde(default)]
    mode: String,
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    from: Place,
    #[serde(default)]
    to: Place,
    #[serde(default)]
    route_short_name: Option<String>,
    #[serde(default)]
    route_long_name: Option<String>,
    #[serde(default)]
    agency_name: Option<String>,
    #[serde(default)]
    leg_geometry: LegGeometry,
    #[serde(default)]
    intermediate_stops: Option<Vec<serde_json::Value>>,
}

impl From<Leg> for TransitLeg {
    fn from(leg: Leg) -> Self {
        TransitLeg {
            mode: leg.mode,
            distance: leg.distance,
            duration: leg.duration,
            from_name: non_empty(leg.from.name),
            to_name: non_empty(leg.to.name),
            route_short_name: non_empty(leg.route_short_name),
            route_long_name: non_empty(leg.route_long_name),
            agency_name: non_empty(leg.agency_name),
            intermediate_stops: leg.intermediate_stops.map_or(0, |s| s.len()),
            geometry: leg.leg_geometry.points,
        }
    }
}

fn place(c: Coordinate) -> String {
    format!("{:.6},{:.6}", c.lat, c.lng)
}

/// Plan a transit trip departing now
pub async fn route(
    client: &Client,
    config: &NavConfig,
    req: &RouteRequest,
) -> Result<TransitItinerary, BackendError> {
    let base = config.transitland_url.as_deref().ok_or_else(|| {
        BackendError::NotConfigured("transitland_url is not configured".to_string())
    })?;
    let api_key = config.transitland_api_key.as_deref().ok_or_else(|| {
        BackendError::NotConfigured("transitland_api_key is not configured".to_string())
    })?;

    let now = chrono::Local::now();
    let date = now.format("%Y-%m-%d").to_string();
    let time = now.format("%H:%M").to_string();
    let from = place(req.origin);
    let to = place(req.destination);
    let url = format!("{base}{PLAN_PATH}");

    // The key is a secret; keep it out of the log line
    debug!(%url, %from, %to, %date, %time, "Calling itinerary planner");

    let response = client
        .get(&url)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .query(&[
            ("api_key", api_key),
            ("fromPlace", from.as_str()),
            ("toPlace", to.as_str()),
            ("date", date.as_str()),
            ("time", time.as_str()),
        ])
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(status_error(BACKEND, status, &text));
    }

    let parsed: PlanResponse = serde_json::from_str(&text).map_err(|e| {
        BackendError::ProviderFailure(format!("error decoding {BACKEND} response: {e}"))
    })?;

    let itinerary = parsed
        .plan
        .itineraries
        .into_iter()
        .next()
        .ok_or(BackendError::NoItinerary)?;

    Ok(TransitItinerary {
        duration: itinerary.duration,
        legs: itinerary.legs.into_iter().map(TransitLeg::from).collect(),
    })
}
