//! HTTP API handlers with Axum and Utoipa
//!
//! GET endpoints answer in JSON. POST endpoints take a line-oriented body and
//! answer in plain text for clients that cannot parse JSON.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::debug;
use utoipa::{IntoParams, OpenApi};

use crate::core::error::Error;
use crate::core::geocode::GeocodeResult;
use crate::core::model::{
    CanonicalStep, Coordinate, CountryCode, DistanceUnit, Location, NormalizedPath, RouteRequest,
    RouteResult, TransportMode,
};
use crate::core::service::NavService;
use crate::core::wire::{
    encode_geocode_plain, encode_route_plain, geocode_error_plain, route_error_plain, ErrorBody,
};

/// Country assumed for POST clients that send none
const LEGACY_COUNTRY: &str = "us";

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(route_get, route_post, geocode_get, geocode_post, health),
    components(schemas(
        RouteResult,
        CanonicalStep,
        NormalizedPath,
        Location,
        GeocodeResult,
        TransportMode,
        DistanceUnit,
        ErrorBody
    )),
    info(
        title = "Fujinav API",
        description = "Geocoding and routing for low-memory clients"
    )
)]
pub struct ApiDoc;

/// Build the Axum router
pub fn build_router(service: Arc<NavService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/nav/route", get(route_get).post(route_post))
        .route("/nav/geocode", get(geocode_get).post(geocode_post))
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// HTTP status for each error kind
pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::NoResults(_) => StatusCode::NOT_FOUND,
        Error::ProviderUnavailable(_) | Error::ProviderRoutingError(_) => StatusCode::BAD_GATEWAY,
        Error::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn json_error(err: &Error) -> Response {
    (status_for(err), Json(ErrorBody::new(err.to_string()))).into_response()
}

fn plain(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

fn parse_point(value: &str, which: &str) -> Result<Coordinate, Error> {
    value
        .parse::<Coordinate>()
        .map_err(|e| Error::InvalidInput(format!("invalid '{which}' parameter: {e}")))
}

/// Blank means "use the default"
fn parse_or_default<T>(value: Option<&str>) -> Result<T, Error>
where
    T: std::str::FromStr<Err = Error> + Default,
{
    match value.map(str::trim) {
        None | Some("") => Ok(T::default()),
        Some(token) => token.parse(),
    }
}

// ============ Route Endpoints ============

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RouteQuery {
    /// Origin as `lat,lng`
    pub from: Option<String>,
    /// Destination as `lat,lng`
    pub to: Option<String>,
    /// walking, biking, auto or transit (default auto)
    pub mode: Option<String>,
    /// km or mi (default km)
    pub units: Option<String>,
    /// Two-letter country code; `us` switches step text to feet and miles
    pub country: Option<String>,
    /// Label echoed back in `from.desc`
    #[serde(rename = "fromDesc")]
    pub from_desc: Option<String>,
    /// Label echoed back in `to.desc`
    #[serde(rename = "toDesc")]
    pub to_desc: Option<String>,
}

impl RouteQuery {
    pub fn into_request(self) -> Result<RouteRequest, Error> {
        let (Some(from), Some(to)) = (
            self.from.filter(|s| !s.trim().is_empty()),
            self.to.filter(|s| !s.trim().is_empty()),
        ) else {
            return Err(Error::InvalidInput(
                "both 'from' and 'to' parameters are required".to_string(),
            ));
        };

        let country = match self.country.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(code) => Some(code.parse::<CountryCode>()?),
        };

        Ok(RouteRequest::new(parse_point(&from, "from")?, parse_point(&to, "to")?)
            .mode(parse_or_default(self.mode.as_deref())?)
            .units(parse_or_default(self.units.as_deref())?)
            .country(country)
            .labels(self.from_desc, self.to_desc))
    }
}

/// Parse the line-oriented POST body:
/// mode, country, units, from, to, then optional origin and destination labels
pub fn parse_route_lines(body: &str) -> Result<RouteRequest, Error> {
    // Leading blank lines are blank fields, so only the end is trimmed
    let lines: Vec<&str> = body.trim_end().split('\n').map(str::trim).collect();
    if lines.len() < 5 {
        return Err(Error::InvalidInput(
            "request must contain at least 5 lines".to_string(),
        ));
    }

    let mode: TransportMode = parse_or_default(Some(lines[0]))?;
    let units: DistanceUnit = parse_or_default(Some(lines[2]))?;
    let country = lines[1]
        .parse::<CountryCode>()
        .or_else(|_| LEGACY_COUNTRY.parse::<CountryCode>())?;

    let from = lines[3]
        .parse::<Coordinate>()
        .map_err(|_| Error::InvalidInput("invalid 'from' coordinates".to_string()))?;
    let to = lines[4]
        .parse::<Coordinate>()
        .map_err(|_| Error::InvalidInput("invalid 'to' coordinates".to_string()))?;

    let label = |i: usize| lines.get(i).map(|s| s.to_string());

    Ok(RouteRequest::new(from, to)
        .mode(mode)
        .units(units)
        .country(Some(country))
        .labels(label(5), label(6)))
}

/// Calculate a route
#[utoipa::path(
    get,
    path = "/nav/route",
    params(RouteQuery),
    responses(
        (status = 200, description = "Route found", body = RouteResult),
        (status = 400, description = "Bad request", body = ErrorBody),
        (status = 500, description = "Backend not configured", body = ErrorBody),
        (status = 502, description = "Backend failed or found no route", body = ErrorBody),
    ),
    tag = "routing"
)]
async fn route_get(
    State(service): State<Arc<NavService>>,
    Query(query): Query<RouteQuery>,
) -> Response {
    debug!(?query, "Route GET");

    let req = match query.into_request() {
        Ok(req) => req,
        Err(e) => return json_error(&e),
    };

    match service.route(&req).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => json_error(&e),
    }
}

/// Calculate a route, plain-text in and out
#[utoipa::path(
    post,
    path = "/nav/route",
    request_body(
        content = String,
        description = "Lines: mode, country, units, from lat,lng, to lat,lng, [from label], [to label]",
        content_type = "text/plain"
    ),
    responses(
        (status = 200, description = "Duration, distance, step count, then icon and text per step", body = String, content_type = "text/plain"),
        (status = 400, description = "Malformed body; blank duration and distance, 0 steps, message", body = String, content_type = "text/plain"),
        (status = 502, description = "Backend failed or found no route", body = String, content_type = "text/plain"),
    ),
    tag = "routing"
)]
async fn route_post(State(service): State<Arc<NavService>>, body: String) -> Response {
    debug!(%body, "Route POST");

    let result = match parse_route_lines(&body) {
        Ok(req) => service.route(&req).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(route) => plain(StatusCode::OK, encode_route_plain(&route)),
        Err(e) => plain(status_for(&e), route_error_plain(&e.to_string())),
    }
}

// ============ Geocode Endpoints ============

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GeocodeQuery {
    /// Free-text place or address
    pub q: Option<String>,
}

/// Look up places matching a query
#[utoipa::path(
    get,
    path = "/nav/geocode",
    params(GeocodeQuery),
    responses(
        (status = 200, description = "Candidates, best first", body = Vec<GeocodeResult>),
        (status = 400, description = "Missing query", body = ErrorBody),
        (status = 404, description = "Nothing found", body = ErrorBody),
        (status = 502, description = "Geocoder failed", body = ErrorBody),
    ),
    tag = "geocoding"
)]
async fn geocode_get(
    State(service): State<Arc<NavService>>,
    Query(query): Query<GeocodeQuery>,
) -> Response {
    let Some(q) = query.q.filter(|q| !q.trim().is_empty()) else {
        return json_error(&Error::InvalidInput(
            "query parameter 'q' is required".to_string(),
        ));
    };
    debug!(query = %q, "Geocode GET");

    match service.geocode(&q).await {
        Ok(results) => Json(results).into_response(),
        Err(e) => json_error(&e),
    }
}

/// Look up places, plain-text in and out
#[utoipa::path(
    post,
    path = "/nav/geocode",
    request_body(content = String, description = "The query", content_type = "text/plain"),
    responses(
        (status = 200, description = "Count, then lat,lng / name / address / country per candidate", body = String, content_type = "text/plain"),
        (status = 400, description = "Empty body", body = String, content_type = "text/plain"),
        (status = 404, description = "Nothing found", body = String, content_type = "text/plain"),
    ),
    tag = "geocoding"
)]
async fn geocode_post(State(service): State<Arc<NavService>>, body: String) -> Response {
    let query = body.trim();
    debug!(query, "Geocode POST");

    if query.is_empty() {
        let err = Error::InvalidInput("request body cannot be empty".to_string());
        return plain(status_for(&err), geocode_error_plain(&err.to_string()));
    }

    match service.geocode(query).await {
        Ok(results) => plain(StatusCode::OK, encode_geocode_plain(&results)),
        Err(e) => plain(status_for(&e), geocode_error_plain(&e.to_string())),
    }
}

// ============ Health Endpoint ============

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server is healthy"),
    )
)]
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("FUJINAV_VERSION")
    }))
}

async fn openapi() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
