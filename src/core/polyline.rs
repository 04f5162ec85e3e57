//! Encoded polyline decoding and grid normalization
//!
//! Backends ship route shapes as precision-5 encoded polylines. The client
//! cannot hold geographic coordinates, so the decoded shape is projected onto
//! a GRID x GRID integer grid and thinned until no two kept points are within
//! Manhattan distance 2 of each other.

use thiserror::Error;

use crate::core::model::{Coordinate, NormalizedPath, PathPoint, GRID};

/// Coordinate precision used by both backends
const PRECISION_FACTOR: f64 = 1e5;

/// Seven 5-bit chunks cover any delta between valid coordinates
const MAX_SHIFT: u32 = 35;

/// Points closer than this (inclusive, Manhattan) to a kept point are dropped
const MIN_SPACING: i32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    #[error("encoded polyline ends in the middle of a value at byte {0}")]
    Truncated(usize),

    #[error("invalid polyline character {byte:#04x} at byte {index}")]
    InvalidChar { byte: u8, index: usize },

    #[error("polyline value at byte {0} is too long")]
    Overflow(usize),
}

/// Decode one zigzag varint starting at `*index`
fn decode_value(bytes: &[u8], index: &mut usize) -> Result<i64, PolylineError> {
    let start = *index;
    let mut result: i64 = 0;
    let mut shift = 0u32;

    loop {
        let byte = *bytes.get(*index).ok_or(PolylineError::Truncated(start))?;
        if !(63..=126).contains(&byte) {
            return Err(PolylineError::InvalidChar { byte, index: *index });
        }
        if shift >= MAX_SHIFT {
            return Err(PolylineError::Overflow(start));
        }
        let chunk = (byte - 63) as i64;
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        *index += 1;
        if chunk < 0x20 {
            break;
        }
    }

    if result & 1 != 0 {
        Ok(!(result >> 1))
    } else {
        Ok(result >> 1)
    }
}

/// Decode an encoded polyline into geographic points.
///
/// An empty string is a valid, empty shape.
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;
    let mut points = Vec::new();

    while index < bytes.len() {
        lat += decode_value(bytes, &mut index)?;
        lng += decode_value(bytes, &mut index)?;
        points.push(Coordinate {
            lat: lat as f64 / PRECISION_FACTOR,
            lng: lng as f64 / PRECISION_FACTOR,
        });
    }

    Ok(points)
}

/// Project points onto the display grid and drop near-duplicates
pub fn normalize(points: &[Coordinate]) -> NormalizedPath {
    let Some(first) = points.first() else {
        return NormalizedPath::empty();
    };

    let (mut min_lat, mut max_lat) = (first.lat, first.lat);
    let (mut min_lng, mut max_lng) = (first.lng, first.lng);
    for p in &points[1..] {
        min_lat = min_lat.min(p.lat);
        max_lat = max_lat.max(p.lat);
        min_lng = min_lng.min(p.lng);
        max_lng = max_lng.max(p.lng);
    }

    let mut lat_span = max_lat - min_lat;
    if lat_span == 0.0 {
        lat_span = 1.0;
    }
    let mut lng_span = max_lng - min_lng;
    if lng_span == 0.0 {
        lng_span = 1.0;
    }

    let grid = GRID as f64;
    let mut kept: Vec<PathPoint> = Vec::new();

    for p in points {
        let x = ((p.lng - min_lng) / lng_span * grid).round() as i32;
        let y = ((p.lat - min_lat) / lat_span * grid).round() as i32;
        let candidate = PathPoint {
            x: x.clamp(0, GRID - 1),
            y: y.clamp(0, GRID - 1),
        };

        // Compared against every kept point, not just the last one
        if kept.iter().all(|k| k.manhattan(&candidate) > MIN_SPACING) {
            kept.push(candidate);
        }
    }

    NormalizedPath::new(kept)
}

/// Decode several encoded shapes in travel order and normalize them as one path
pub fn decode_and_normalize<'a, I>(shapes: I) -> Result<NormalizedPath, PolylineError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut points = Vec::new();
    for shape in shapes {
        points.extend(decode(shape)?);
    }
    Ok(normalize(&points))
}
