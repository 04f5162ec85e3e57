//! Response encodings
//!
//! JSON goes through serde on the model types. The plain-text grammar is for
//! clients that can only read lines:
//!
//! ```text
//! <duration>
//! <distance>
//! <step count>
//! <icon>            \ repeated per step
//! <description>     /
//! ```

use serde::Serialize;
use utoipa::ToSchema;

use crate::core::geocode::GeocodeResult;
use crate::core::model::{DistanceUnit, RouteResult, TransportMode, FEET_PER_MILE};

/// JSON error body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// "1hr 5min", "1hr", "12min"
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0);
    let hours = (total / 3600.0).floor() as u64;
    let minutes = ((total - hours as f64 * 3600.0) / 60.0).floor() as u64;

    match (hours, minutes) {
        (0, m) => format!("{m}min"),
        (h, 0) => format!("{h}hr"),
        (h, m) => format!("{h}hr {m}min"),
    }
}

/// Distance already in `units`: below one unit switch to meters or feet,
/// otherwise one decimal
pub fn format_distance(distance: f64, units: DistanceUnit) -> String {
    let (small, per_unit, label) = match units {
        DistanceUnit::Kilometers => ((distance * 1000.0).round(), 1000.0, "m"),
        DistanceUnit::Miles => ((distance * FEET_PER_MILE).round(), FEET_PER_MILE, "ft"),
    };
    // Rounded first: the small unit never reads 1000m or 5280ft
    if small < per_unit {
        format!("{small:.0}{label}")
    } else {
        format!("{distance:.1}{}", units.as_str())
    }
}

/// Fold backend text onto one line; the line grammar breaks on any newline
pub fn single_line(text: &str) -> String {
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Plain-text route body
pub fn encode_route_plain(result: &RouteResult) -> String {
    let mut out = format!(
        "{}\n{}\n{}\n",
        format_duration(result.duration),
        format_distance(result.distance, result.units),
        result.steps.len()
    );

    let last = result.steps.len().saturating_sub(1);
    for (i, step) in result.steps.iter().enumerate() {
        let description = single_line(&step.description);
        if result.mode != TransportMode::Transit && i < last {
            out.push_str(&format!(
                "{}\n{} ({})\n",
                step.icon,
                description,
                format_distance(step.distance, result.units)
            ));
        } else {
            out.push_str(&format!("{}\n{}\n", step.icon, description));
        }
    }
    out
}

/// Plain-text route error: blank duration and distance, zero steps, message
pub fn route_error_plain(message: &str) -> String {
    format!("\n\n0\n{}\n", single_line(message))
}

/// Plain-text geocode body: count, then four lines per candidate
pub fn encode_geocode_plain(results: &[GeocodeResult]) -> String {
    let mut out = format!("{}\n", results.len());
    for r in results {
        out.push_str(&format!(
            "{:.4},{:.4}\n{}\n{}\n{}\n",
            r.lat,
            r.lng,
            single_line(&r.name),
            single_line(&r.address),
            single_line(&r.country)
        ));
    }
    out
}

/// Plain-text geocode error
pub fn geocode_error_plain(message: &str) -> String {
    format!("0\n{}\n", single_line(message))
}
