//! Build the canonical `RouteResult` from adapter output

use crate::core::classify::{abbreviate_instruction, describe_leg, first_step_icon, step_icon};
use crate::core::error::BackendError;
use crate::core::model::{CanonicalStep, Location, NormalizedPath, RouteRequest, RouteResult};
use crate::core::polyline::{decode_and_normalize, PolylineError};
use crate::core::provider::{AdapterOutput, DirectTrip, TransitItinerary};

impl From<PolylineError> for BackendError {
    fn from(err: PolylineError) -> Self {
        BackendError::ProviderFailure(format!("invalid route geometry: {err}"))
    }
}

/// Combine adapter output with the request that produced it.
///
/// `req` must be the request actually routed, so the result reports the
/// post-fallback mode.
pub fn assemble(req: &RouteRequest, output: AdapterOutput) -> Result<RouteResult, BackendError> {
    let (duration, meters, steps, path) = match output {
        AdapterOutput::Direct(trip) => direct_parts(req, trip)?,
        AdapterOutput::Itinerary(itinerary) => itinerary_parts(req, itinerary)?,
    };

    Ok(RouteResult {
        duration,
        distance: req.units.from_meters(meters),
        units: req.units,
        steps,
        path,
        mode: req.mode,
        from: Location::new(req.origin_label.as_deref(), req.origin),
        to: Location::new(req.destination_label.as_deref(), req.destination),
    })
}

type Parts = (f64, f64, Vec<CanonicalStep>, NormalizedPath);

fn direct_parts(req: &RouteRequest, trip: DirectTrip) -> Result<Parts, BackendError> {
    let path = decode_and_normalize(trip.legs.iter().map(|leg| leg.shape.as_str()))?;

    let mut steps = Vec::new();
    for maneuver in trip.legs.iter().flat_map(|leg| &leg.maneuvers) {
        let mut icon = step_icon(maneuver.maneuver_type, None);
        if steps.is_empty() {
            icon = first_step_icon(req.mode).unwrap_or(icon);
        }
        steps.push(CanonicalStep {
            number: steps.len() + 1,
            description: abbreviate_instruction(&maneuver.instruction),
            distance: req.units.from_meters(maneuver.length_km * 1000.0),
            icon,
        });
    }

    Ok((trip.time, trip.length_km * 1000.0, steps, path))
}

fn itinerary_parts(req: &RouteRequest, itinerary: TransitItinerary) -> Result<Parts, BackendError> {
    let path = decode_and_normalize(itinerary.legs.iter().map(|leg| leg.geometry.as_str()))?;
    let us = req.is_us_localized();

    let steps = itinerary
        .legs
        .iter()
        .enumerate()
        .map(|(i, leg)| {
            let (description, icon) = describe_leg(leg, us);
            CanonicalStep {
                number: i + 1,
                description,
                distance: req.units.from_meters(leg.distance),
                icon,
            }
        })
        .collect();
    let meters = itinerary.legs.iter().map(|leg| leg.distance).sum();
    // Plans without a total fall back to the leg durations
    let duration = if itinerary.duration > 0.0 {
        itinerary.duration
    } else {
        itinerary.legs.iter().map(|leg| leg.duration).sum()
    };

    Ok((duration, meters, steps, path))
}
