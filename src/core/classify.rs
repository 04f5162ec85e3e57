//! Step classification: icons and short instruction text
//!
//! All functions here are pure. Unknown codes and modes degrade to a blank or
//! generic icon instead of failing the route.

use crate::core::model::{Icon, TransportMode, FEET_PER_MILE};
use crate::core::provider::TransitLeg;

const FEET_PER_METER: f64 = 3.28084;

const ARRIVAL_PHRASE: &str = "You have arrived at your destination";
const ARRIVAL_SHORT: &str = "Arrive at destination";

/// Applied in order after the arrival phrase is shortened
const ABBREVIATIONS: &[(&str, &str)] = &[
    (" onto ", " on "),
    (" Avenue", " Ave"),
    (" Street", " St"),
    (" Road", " Rd"),
    (" Boulevard", " Blvd"),
    (" Drive", " Dr"),
    (" Court", " Ct"),
    (" Circle", " Cir"),
    (" Highway", " Hwy"),
    (" Parkway", " Pkwy"),
    (" Place", " Pl"),
    (" Square", " Sq"),
    (" Terrace", " Ter"),
    (" Trail", " Trl"),
    (" Turnpike", " Tpke"),
    (" Lane", " Ln"),
    (" North ", " N "),
    (" South ", " S "),
    (" East ", " E "),
    (" West ", " W "),
    (" Northeast ", " NE "),
    (" Northwest ", " NW "),
    (" Southeast ", " SE "),
    (" Southwest ", " SW "),
];

/// Icon for a transit leg mode token, if it is one we draw
pub fn transit_mode_icon(mode: &str) -> Option<Icon> {
    match mode.to_ascii_uppercase().as_str() {
        "BUS" => Some(Icon::Bus),
        "RAIL" | "SUBWAY" | "TRAM" | "TRAIN" => Some(Icon::Train),
        "FERRY" | "BOAT" => Some(Icon::Ferry),
        "WALK" => Some(Icon::Walk),
        _ => None,
    }
}

/// Icon for a direct-routing maneuver type code
pub fn maneuver_icon(code: i64) -> Icon {
    match code {
        1 | 2 | 10 | 11 | 12 => Icon::Right,
        3 | 13 | 14 | 15 | 19 => Icon::Left,
        9 | 23 => Icon::SlightRight,
        16 | 24 => Icon::SlightLeft,
        7 | 8 | 17 | 22 => Icon::Straight,
        25 | 26 | 37 | 38 => Icon::Merge,
        20 | 21 | 27 => Icon::Exit,
        28 | 29 => Icon::Ferry,
        42 | 43 => Icon::Building,
        _ => Icon::None,
    }
}

/// Icon for a step; a recognized transit mode wins over the maneuver code
pub fn step_icon(code: i64, mode: Option<&str>) -> Icon {
    mode.and_then(transit_mode_icon)
        .unwrap_or_else(|| maneuver_icon(code))
}

/// Icon forced onto the first step of a direct route
pub fn first_step_icon(mode: TransportMode) -> Option<Icon> {
    match mode {
        TransportMode::Biking => Some(Icon::Cycle),
        TransportMode::Walking => Some(Icon::Walk),
        TransportMode::Auto => Some(Icon::Drive),
        TransportMode::Transit => None,
    }
}

/// Shorten a backend instruction for a narrow screen
pub fn abbreviate_instruction(instruction: &str) -> String {
    let trimmed = instruction.strip_suffix('.').unwrap_or(instruction);
    let mut text = trimmed.replace(ARRIVAL_PHRASE, ARRIVAL_SHORT);
    for (long, short) in ABBREVIATIONS {
        text = text.replace(long, short);
    }
    text
}

/// Distance phrase used inside itinerary step text
pub fn leg_distance_text(meters: f64, us_localized: bool) -> String {
    if !us_localized {
        return format!("{meters:.0} meters");
    }
    let feet = meters * FEET_PER_METER;
    if feet < 1000.0 {
        format!("{feet:.0} feet")
    } else {
        format!("{:.1} miles", feet / FEET_PER_MILE)
    }
}

/// Description and icon for one itinerary leg
pub fn describe_leg(leg: &TransitLeg, us_localized: bool) -> (String, Icon) {
    match leg.mode.to_ascii_uppercase().as_str() {
        "WALK" => {
            let mut text = format!("Walk {}", leg_distance_text(leg.distance, us_localized));
            if let Some(to) = &leg.to_name {
                text.push_str(&format!(" to {to}"));
            }
            (text, Icon::Walk)
        }
        "BUS" | "RAIL" | "SUBWAY" | "TRAM" | "TRAIN" | "FERRY" | "BOAT" => {
            let mut text = String::from("Take");
            if let Some(short) = &leg.route_short_name {
                text.push_str(&format!(" {short}"));
            }
            if let Some(long) = &leg.route_long_name {
                text.push_str(&format!(" {long}"));
            }
            if let Some(agency) = &leg.agency_name {
                text.push_str(&format!(" operated by {agency}"));
            }
            if let (Some(from), Some(to)) = (&leg.from_name, &leg.to_name) {
                text.push_str(&format!(" from {from} to {to}"));
            }
            if leg.intermediate_stops > 0 {
                text.push_str(&format!(" ({} stops)", leg.intermediate_stops));
            }
            let icon = transit_mode_icon(&leg.mode).unwrap_or(Icon::Straight);
            (text, icon)
        }
        _ => (
            format!(
                "{} for {}",
                leg.mode,
                leg_distance_text(leg.distance, us_localized)
            ),
            Icon::Straight,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maneuver_table() {
        assert_eq!(maneuver_icon(1), Icon::Right);
        assert_eq!(maneuver_icon(15), Icon::Left);
        assert_eq!(maneuver_icon(9), Icon::SlightRight);
        assert_eq!(maneuver_icon(24), Icon::SlightLeft);
        assert_eq!(maneuver_icon(8), Icon::Straight);
        assert_eq!(maneuver_icon(37), Icon::Merge);
        assert_eq!(maneuver_icon(27), Icon::Exit);
        assert_eq!(maneuver_icon(29), Icon::Ferry);
        assert_eq!(maneuver_icon(43), Icon::Building);
        assert_eq!(maneuver_icon(4), Icon::None);
        assert_eq!(maneuver_icon(-1), Icon::None);
        assert_eq!(maneuver_icon(9999), Icon::None);
    }

    #[test]
    fn test_transit_mode_beats_maneuver_code() {
        assert_eq!(step_icon(1, Some("BUS")), Icon::Bus);
        assert_eq!(step_icon(3, Some("bus")), Icon::Bus);
        assert_eq!(step_icon(0, Some("Subway")), Icon::Train);
        assert_eq!(step_icon(0, Some("BOAT")), Icon::Ferry);
        assert_eq!(step_icon(1, Some("CABLE_CAR")), Icon::Right);
        assert_eq!(step_icon(1, None), Icon::Right);
    }

    #[test]
    fn test_first_step_override() {
        assert_eq!(first_step_icon(TransportMode::Biking), Some(Icon::Cycle));
        assert_eq!(first_step_icon(TransportMode::Walking), Some(Icon::Walk));
        assert_eq!(first_step_icon(TransportMode::Auto), Some(Icon::Drive));
        assert_eq!(first_step_icon(TransportMode::Transit), None);
    }

    #[test]
    fn test_abbreviate_instruction() {
        assert_eq!(
            abbreviate_instruction("Turn right onto North Main Street."),
            "Turn right on N Main St"
        );
        assert_eq!(
            abbreviate_instruction("Bear left onto West Lake Boulevard East."),
            "Bear left on W Lake Blvd East"
        );
        assert_eq!(
            abbreviate_instruction("You have arrived at your destination."),
            "Arrive at destination"
        );
        assert_eq!(
            abbreviate_instruction("Drive northeast on Mulholland Drive"),
            "Drive northeast on Mulholland Dr"
        );
        // Only one trailing period goes
        assert_eq!(abbreviate_instruction("Continue.."), "Continue.");
    }

    #[test]
    fn test_leg_distance_text() {
        assert_eq!(leg_distance_text(100.0, true), "328 feet");
        assert_eq!(leg_distance_text(1609.344, true), "1.0 miles");
        assert_eq!(leg_distance_text(450.4, false), "450 meters");
    }

    #[test]
    fn test_describe_walk_leg() {
        let leg = TransitLeg {
            mode: "WALK".into(),
            distance: 100.0,
            to_name: Some("Main St Station".into()),
            ..TransitLeg::default()
        };
        assert_eq!(
            describe_leg(&leg, true),
            ("Walk 328 feet to Main St Station".to_string(), Icon::Walk)
        );

        let bare = TransitLeg { to_name: None, ..leg };
        assert_eq!(describe_leg(&bare, false).0, "Walk 100 meters");
    }

    #[test]
    fn test_describe_transit_leg() {
        let leg = TransitLeg {
            mode: "BUS".into(),
            distance: 3000.0,
            route_short_name: Some("42".into()),
            route_long_name: Some("Crosstown".into()),
            agency_name: Some("Metro".into()),
            from_name: Some("A".into()),
            to_name: Some("B".into()),
            intermediate_stops: 6,
            ..TransitLeg::default()
        };
        assert_eq!(
            describe_leg(&leg, true),
            (
                "Take 42 Crosstown operated by Metro from A to B (6 stops)".to_string(),
                Icon::Bus
            )
        );

        let sparse = TransitLeg {
            mode: "RAIL".into(),
            route_short_name: None,
            agency_name: None,
            to_name: None,
            intermediate_stops: 0,
            ..leg
        };
        assert_eq!(
            describe_leg(&sparse, true),
            ("Take Crosstown".to_string(), Icon::Train)
        );
    }

    #[test]
    fn test_describe_unknown_mode() {
        let leg = TransitLeg {
            mode: "GONDOLA".into(),
            distance: 250.0,
            ..TransitLeg::default()
        };
        assert_eq!(
            describe_leg(&leg, false),
            ("GONDOLA for 250 meters".to_string(), Icon::Straight)
        );
    }
}
