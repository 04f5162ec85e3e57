//! Forward geocoding through Nominatim, with US-style address shortening

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::core::config::NavConfig;
use crate::core::error::{BackendError, Error, Result};

/// Candidates requested per query
const RESULT_LIMIT: &str = "5";

const DIRECTIONS: &[(&str, &str)] = &[
    ("north", "N"),
    ("south", "S"),
    ("east", "E"),
    ("west", "W"),
    ("northeast", "NE"),
    ("northwest", "NW"),
    ("southeast", "SE"),
    ("southwest", "SW"),
];

const STREET_TYPES: &[(&str, &str)] = &[
    ("avenue", "Ave"),
    ("boulevard", "Blvd"),
    ("circle", "Cir"),
    ("court", "Ct"),
    ("drive", "Dr"),
    ("expressway", "Expy"),
    ("heights", "Hts"),
    ("highway", "Hwy"),
    ("junction", "Jct"),
    ("lane", "Ln"),
    ("parkway", "Pkwy"),
    ("place", "Pl"),
    ("plaza", "Plz"),
    ("road", "Rd"),
    ("square", "Sq"),
    ("street", "St"),
    ("terrace", "Ter"),
    ("trail", "Trl"),
    ("turnpike", "Tpke"),
    ("way", "Way"),
];

/// USPS codes
const STATES: &[(&str, &str)] = &[
    ("alabama", "AL"),
    ("alaska", "AK"),
    ("arizona", "AZ"),
    ("arkansas", "AR"),
    ("california", "CA"),
    ("colorado", "CO"),
    ("connecticut", "CT"),
    ("delaware", "DE"),
    ("florida", "FL"),
    ("georgia", "GA"),
    ("hawaii", "HI"),
    ("idaho", "ID"),
    ("illinois", "IL"),
    ("indiana", "IN"),
    ("iowa", "IA"),
    ("kansas", "KS"),
    ("kentucky", "KY"),
    ("louisiana", "LA"),
    ("maine", "ME"),
    ("maryland", "MD"),
    ("massachusetts", "MA"),
    ("michigan", "MI"),
    ("minnesota", "MN"),
    ("mississippi", "MS"),
    ("missouri", "MO"),
    ("montana", "MT"),
    ("nebraska", "NE"),
    ("nevada", "NV"),
    ("new hampshire", "NH"),
    ("new jersey", "NJ"),
    ("new mexico", "NM"),
    ("new york", "NY"),
    ("north carolina", "NC"),
    ("north dakota", "ND"),
    ("ohio", "OH"),
    ("oklahoma", "OK"),
    ("oregon", "OR"),
    ("pennsylvania", "PA"),
    ("rhode island", "RI"),
    ("south carolina", "SC"),
    ("south dakota", "SD"),
    ("tennessee", "TN"),
    ("texas", "TX"),
    ("utah", "UT"),
    ("vermont", "VT"),
    ("virginia", "VA"),
    ("washington", "WA"),
    ("west virginia", "WV"),
    ("wisconsin", "WI"),
    ("wyoming", "WY"),
];

/// One geocoding candidate
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GeocodeResult {
    /// Place name, or the street address when the place has none
    pub name: String,
    /// "street, city, ST zip"
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    /// Relevance score from 0 to 1
    pub importance: f64,
    /// Lowercase ISO country code
    pub country: String,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    #[serde(default)]
    house_number: String,
    #[serde(default)]
    road: String,
    #[serde(default)]
    suburb: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    town: String,
    #[serde(default)]
    village: String,
    #[serde(default)]
    county: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    postcode: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    country_code: String,
}

#[derive(Debug, Default, Deserialize)]
struct NameDetails {
    #[serde(default)]
    name: String,
    #[serde(default)]
    official_name: String,
    #[serde(default)]
    alt_name: String,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    importance: f64,
    #[serde(default)]
    address: Option<NominatimAddress>,
    #[serde(default)]
    namedetails: Option<NameDetails>,
}

fn lookup(table: &[(&str, &'static str)], word: &str) -> Option<&'static str> {
    let lower = word.to_lowercase();
    table.iter().find(|(long, _)| *long == lower).map(|(_, short)| *short)
}

/// Abbreviate a leading compass direction and a trailing street type
pub fn abbreviate_street(street: &str) -> String {
    let mut words: Vec<&str> = street.split_whitespace().collect();
    if words.len() > 1 {
        if let Some(short) = lookup(DIRECTIONS, words[0]) {
            words[0] = short;
        }
        let last = words.len() - 1;
        if let Some(short) = lookup(STREET_TYPES, words[last]) {
            words[last] = short;
        }
    }
    words.join(" ")
}

/// USPS code for a US state name, or the name unchanged
pub fn abbreviate_state(state: &str) -> String {
    lookup(STATES, state)
        .map(String::from)
        .unwrap_or_else(|| state.to_string())
}

fn first_non_empty<'a>(candidates: &[&'a str]) -> &'a str {
    candidates
        .iter()
        .copied()
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

/// Display name and formatted address for one place
fn format_place(addr: &NominatimAddress, names: &NameDetails) -> (String, String) {
    let city = first_non_empty(&[
        addr.city.as_str(),
        addr.town.as_str(),
        addr.village.as_str(),
        addr.suburb.as_str(),
        addr.county.as_str(),
    ]);

    let mut street_parts = Vec::new();
    if !addr.house_number.is_empty() {
        street_parts.push(addr.house_number.clone());
    }
    if !addr.road.is_empty() {
        street_parts.push(abbreviate_street(&addr.road));
    }
    let street = street_parts.join(" ");

    let name = first_non_empty(&[
        names.official_name.as_str(),
        names.name.as_str(),
        names.alt_name.as_str(),
        addr.name.as_str(),
        street.as_str(),
    ])
    .to_string();

    let state_zip = match (addr.state.is_empty(), addr.postcode.is_empty()) {
        (false, false) => format!("{} {}", abbreviate_state(&addr.state), addr.postcode),
        (false, true) => abbreviate_state(&addr.state),
        (true, false) => addr.postcode.clone(),
        (true, true) => String::new(),
    };

    let address = [street.as_str(), city, state_zip.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    (name, address)
}

fn parse_degrees(value: &str, field: &str) -> Result<f64> {
    value.trim().parse::<f64>().map_err(|e| {
        Error::ProviderUnavailable(format!("error parsing {field} '{value}': {e}"))
    })
}

impl NominatimPlace {
    fn into_result(self) -> Result<GeocodeResult> {
        let lat = parse_degrees(&self.lat, "latitude")?;
        let lng = parse_degrees(&self.lon, "longitude")?;
        let addr = self.address.unwrap_or_default();
        let names = self.namedetails.unwrap_or_default();
        let (name, address) = format_place(&addr, &names);

        Ok(GeocodeResult {
            name,
            address,
            lat,
            lng,
            importance: self.importance,
            country: addr.country_code.to_lowercase(),
        })
    }
}

/// Look up candidates for a free-text query
pub async fn geocode(client: &Client, config: &NavConfig, query: &str) -> Result<Vec<GeocodeResult>> {
    let query = query.trim();
    if query.is_empty() {
        return Err(Error::InvalidInput("query cannot be empty".to_string()));
    }

    let url = format!("{}/search", config.nominatim_url);
    debug!(%url, query, "Calling geocoder");

    let response = client
        .get(&url)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .query(&[
            ("q", query),
            ("format", "json"),
            ("limit", RESULT_LIMIT),
            ("addressdetails", "1"),
            ("namedetails", "1"),
        ])
        .send()
        .await
        .map_err(|e| Error::from(BackendError::from(e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::ProviderUnavailable(format!(
            "nominatim returned status {}",
            status.as_u16()
        )));
    }

    let places: Vec<NominatimPlace> = response.json().await.map_err(|e| {
        Error::ProviderUnavailable(format!("error decoding nominatim response: {e}"))
    })?;

    if places.is_empty() {
        return Err(Error::NoResults(query.to_string()));
    }

    let results = places
        .into_iter()
        .map(NominatimPlace::into_result)
        .collect::<Result<Vec<_>>>()?;
    info!(query, count = results.len(), "Geocoded");
    Ok(results)
}
