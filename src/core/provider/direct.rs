//! Turn-by-turn routing through a Valhalla-compatible `/route` endpoint

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{status_error, DirectLeg, DirectManeuver, DirectTrip};
use crate::core::config::NavConfig;
use crate::core::error::BackendError;
use crate::core::model::{Coordinate, RouteRequest, TransportMode};

const BACKEND: &str = "valhalla";

#[derive(Debug, Serialize)]
struct ValhallaLocation {
    lat: f64,
    lon: f64,
    #[serde(rename = "type")]
    kind: &'static str,
}

impl From<Coordinate> for ValhallaLocation {
    fn from(c: Coordinate) -> Self {
        Self {
            lat: c.lat,
            lon: c.lng,
            kind: "break",
        }
    }
}

#[derive(Debug, Serialize)]
struct DisplayNameOptions {
    use_display_name: bool,
}

#[derive(Debug, Serialize)]
struct TransitOptions {
    use_bus: f64,
    use_rail: f64,
    use_transfers: f64,
    transit_start_end_max_distance: u32,
    transit_transfer_max_distance: u32,
}

#[derive(Debug, Default, Serialize)]
struct CostingOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    auto: Option<DisplayNameOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pedestrian: Option<DisplayNameOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bicycle: Option<DisplayNameOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transit: Option<TransitOptions>,
}

#[derive(Debug, Serialize)]
struct DateTime {
    /// 1 = depart at `value`
    #[serde(rename = "type")]
    kind: u8,
    value: String,
}

#[derive(Debug, Serialize)]
struct ValhallaRequest {
    locations: [ValhallaLocation; 2],
    costing: &'static str,
    units: &'static str,
    costing_options: CostingOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_time: Option<DateTime>,
}

#[derive(Debug, Deserialize)]
struct ValhallaResponse {
    trip: Trip,
}

#[derive(Debug, Deserialize)]
struct Trip {
    summary: Summary,
    #[serde(default)]
    legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
struct Summary {
    time: f64,
    length: f64,
}

#[derive(Debug, Deserialize)]
struct Leg {
    #[serde(default)]
    shape: String,
    #[serde(default)]
    maneuvers: Vec<Maneuver>,
}

#[derive(Debug, Deserialize)]
struct Maneuver {
    #[serde(rename = "type", default)]
    kind: i64,
    #[serde(default)]
    instruction: String,
    #[serde(default)]
    length: f64,
}

/// Costing model name for a transport mode
pub fn costing(mode: TransportMode) -> &'static str {
    match mode {
        TransportMode::Walking => "pedestrian",
        TransportMode::Biking => "bicycle",
        TransportMode::Auto => "auto",
        TransportMode::Transit => "transit",
    }
}

fn build_request(req: &RouteRequest) -> ValhallaRequest {
    let (costing_options, date_time) = match req.mode {
        TransportMode::Transit => (
            CostingOptions {
                transit: Some(TransitOptions {
                    use_bus: 1.0,
                    use_rail: 1.0,
                    use_transfers: 1.0,
                    transit_start_end_max_distance: 2000,
                    transit_transfer_max_distance: 500,
                }),
                ..CostingOptions::default()
            },
            Some(DateTime {
                kind: 1,
                value: chrono::Local::now().format("%Y-%m-%dT%H:%M").to_string(),
            }),
        ),
        _ => (
            CostingOptions {
                auto: Some(DisplayNameOptions {
                    use_display_name: false,
                }),
                pedestrian: Some(DisplayNameOptions {
                    use_display_name: false,
                }),
                bicycle: Some(DisplayNameOptions {
                    use_display_name: false,
                }),
                transit: None,
            },
            None,
        ),
    };

    ValhallaRequest {
        locations: [req.origin.into(), req.destination.into()],
        costing: costing(req.mode),
        // Always kilometers; the assembler converts to the caller's unit
        units: "kilometers",
        costing_options,
        date_time,
    }
}

impl From<ValhallaResponse> for DirectTrip {
    fn from(resp: ValhallaResponse) -> Self {
        let legs = resp
            .trip
            .legs
            .into_iter()
            .map(|leg| DirectLeg {
                shape: leg.shape,
                maneuvers: leg
                    .maneuvers
                    .into_iter()
                    .map(|m| DirectManeuver {
                        maneuver_type: m.kind,
                        instruction: m.instruction,
                        length_km: m.length,
                    })
                    .collect(),
            })
            .collect();

        DirectTrip {
            time: resp.trip.summary.time,
            length_km: resp.trip.summary.length,
            legs,
        }
    }
}

/// Ask the direct router for a trip
pub async fn route(
    client: &Client,
    config: &NavConfig,
    req: &RouteRequest,
) -> Result<DirectTrip, BackendError> {
    let body = build_request(req);
    debug!(url = %config.valhalla_url, costing = body.costing, "Calling direct router");

    let response = client
        .post(&config.valhalla_url)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(status_error(BACKEND, status, &text));
    }

    let parsed: ValhallaResponse = serde_json::from_str(&text).map_err(|e| {
        BackendError::ProviderFailure(format!("error decoding {BACKEND} response: {e}"))
    })?;
    Ok(parsed.into())
}
