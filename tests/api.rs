//! End-to-end tests: the axum router against mocked backends

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use fujinav::server::build_router;
use fujinav::{NavConfig, NavService};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SHAPE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

struct Backends {
    valhalla: MockServer,
    nominatim: MockServer,
    transitland: MockServer,
}

impl Backends {
    async fn start() -> Self {
        Self {
            valhalla: MockServer::start().await,
            nominatim: MockServer::start().await,
            transitland: MockServer::start().await,
        }
    }

    fn config(&self) -> NavConfig {
        NavConfig {
            nominatim_url: self.nominatim.uri(),
            valhalla_url: format!("{}/route", self.valhalla.uri()),
            transitland_url: Some(self.transitland.uri()),
            transitland_api_key: Some("test-key".into()),
            request_timeout_secs: 5,
            ..NavConfig::default()
        }
    }

    fn app(&self) -> Router {
        app_with(self.config())
    }
}

fn app_with(config: NavConfig) -> Router {
    build_router(Arc::new(NavService::new(config).unwrap()))
}

fn driving_trip() -> Value {
    json!({
        "trip": {
            "summary": {"time": 625.0, "length": 3.2},
            "legs": [{
                "shape": SHAPE,
                "maneuvers": [
                    {"type": 1, "instruction": "Drive north on Main Street.", "length": 1.2},
                    {"type": 10, "instruction": "Turn right onto 5th Avenue.", "length": 2.0},
                    {"type": 4, "instruction": "You have arrived at your destination.", "length": 0.0}
                ]
            }]
        }
    })
}

fn not_connected() -> ResponseTemplate {
    ResponseTemplate::new(400).set_body_json(json!({
        "error_code": 170,
        "error": "Locations are in unconnected regions. Go check/edit the map at osm.org",
        "status_code": 400,
        "status": "Bad Request"
    }))
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "text/plain")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_bad_origin_makes_no_backend_call() {
    let backends = Backends::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(driving_trip()))
        .expect(0)
        .mount(&backends.valhalla)
        .await;

    let (status, body) = send(backends.app(), get("/nav/route?from=abc&to=40.73,-73.98")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("'from'"));

    let (status, body) = send(backends.app(), post("/nav/route", "auto\nus\nkm\nabc\n1,2\n")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "\n\n0\ninvalid 'from' coordinates\n");
}

#[tokio::test]
async fn test_driving_route_json() {
    let backends = Backends::start().await;
    Mock::given(method("POST"))
        .and(path("/route"))
        .and(body_partial_json(json!({"costing": "auto", "units": "kilometers"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(driving_trip()))
        .expect(1)
        .mount(&backends.valhalla)
        .await;

    let (status, body) = send(
        backends.app(),
        get("/nav/route?from=40.7128,-74.0060&to=40.7306,-73.9866&fromDesc=Home&toDesc=Office"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["duration"], 625.0);
    assert!((json["distance"].as_f64().unwrap() - 3.2).abs() < 1e-9);
    assert_eq!(json["units"], "km");
    assert_eq!(json["mode"], "auto");
    assert_eq!(json["steps"].as_array().unwrap().len(), 3);
    assert_eq!(json["steps"][0]["icon"], "Drive");
    assert_eq!(json["steps"][1]["description"], "Turn right on 5th Ave");
    assert_eq!(json["steps"][2]["icon"], "");
    assert_eq!(json["path"]["width"], 100);
    assert_eq!(json["path"]["length"], 3);
    assert_eq!(json["from"]["desc"], "Home");
    assert_eq!(json["to"]["desc"], "Office");
}

#[tokio::test]
async fn test_driving_route_plain() {
    let backends = Backends::start().await;
    Mock::given(method("POST"))
        .and(path("/route"))
        .respond_with(ResponseTemplate::new(200).set_body_json(driving_trip()))
        .expect(1)
        .mount(&backends.valhalla)
        .await;

    let (status, body) = send(
        backends.app(),
        post("/nav/route", "auto\r\nus\r\nkm\r\n40.7128,-74.0060\r\n40.7306,-73.9866\r\n"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(
        lines,
        vec![
            "10min",
            "3.2km",
            "3",
            "Drive",
            "Drive north on Main St (1.2km)",
            "Right",
            "Turn right on 5th Ave (2.0km)",
            "",
            "Arrive at destination",
        ]
    );
}

#[tokio::test]
async fn test_transit_falls_back_to_auto_once() {
    let backends = Backends::start().await;
    Mock::given(method("POST"))
        .and(path("/route"))
        .and(body_partial_json(json!({"costing": "transit"})))
        .respond_with(not_connected())
        .expect(1)
        .mount(&backends.valhalla)
        .await;
    Mock::given(method("POST"))
        .and(path("/route"))
        .and(body_partial_json(json!({"costing": "auto"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(driving_trip()))
        .expect(1)
        .mount(&backends.valhalla)
        .await;

    // Outside the transit country, so the direct router gets the transit request
    let (status, body) = send(
        backends.app(),
        get("/nav/route?from=48.85,2.35&to=48.86,2.29&mode=transit&country=fr"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["mode"], "auto");
    assert_eq!(json["steps"][0]["icon"], "Drive");
}

#[tokio::test]
async fn test_second_not_connected_is_surfaced() {
    let backends = Backends::start().await;
    Mock::given(method("POST"))
        .and(path("/route"))
        .and(body_partial_json(json!({"costing": "transit"})))
        .respond_with(not_connected())
        .expect(1)
        .mount(&backends.valhalla)
        .await;
    Mock::given(method("POST"))
        .and(path("/route"))
        .and(body_partial_json(json!({"costing": "auto"})))
        .respond_with(not_connected())
        .expect(1)
        .mount(&backends.valhalla)
        .await;

    let (status, body) = send(
        backends.app(),
        get("/nav/route?from=48.85,2.35&to=40.71,-74.00&mode=transit&country=fr"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        json["error"],
        "no route found: locations are not connected in the transportation network"
    );
}

#[tokio::test]
async fn test_us_transit_uses_itinerary_planner() {
    let backends = Backends::start().await;
    Mock::given(method("GET"))
        .and(path("/routing/otp/plan"))
        .and(query_param("api_key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "plan": {"itineraries": [{
                "duration": 1500.0,
                "legs": [
                    {
                        "mode": "WALK",
                        "distance": 150.0,
                        "duration": 120.0,
                        "to": {"name": "Powell St"},
                        "legGeometry": {"points": "_p~iF~ps|U"}
                    },
                    {
                        "mode": "BUS",
                        "distance": 5850.0,
                        "duration": 1380.0,
                        "from": {"name": "Powell St"},
                        "to": {"name": "Mission St"},
                        "routeShortName": "14",
                        "routeLongName": "Mission",
                        "agencyName": "Muni",
                        "intermediateStops": [{}, {}, {}],
                        "legGeometry": {"points": "_ulLnnqC"}
                    }
                ]
            }]}
        })))
        .expect(1)
        .mount(&backends.transitland)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(driving_trip()))
        .expect(0)
        .mount(&backends.valhalla)
        .await;

    let (status, body) = send(
        backends.app(),
        post("/nav/route", "transit\nus\nmi\n37.7749,-122.4194\n37.7599,-122.4148\nHome\nWork"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines[0], "25min");
    assert_eq!(lines[1], "3.7mi");
    assert_eq!(lines[2], "2");
    assert_eq!(lines[3], "Walk");
    assert_eq!(lines[4], "Walk 492 feet to Powell St");
    assert_eq!(lines[5], "Bus");
    // Transit routes carry no per-step distance
    assert_eq!(
        lines[6],
        "Take 14 Mission operated by Muni from Powell St to Mission St (3 stops)"
    );
}

#[tokio::test]
async fn test_itinerary_without_api_key_is_configuration_error() {
    let backends = Backends::start().await;
    let config = NavConfig {
        transitland_api_key: None,
        ..backends.config()
    };

    let (status, body) = send(
        app_with(config),
        get("/nav/route?from=37.77,-122.41&to=37.75,-122.41&mode=transit&country=us"),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("transitland_api_key"));
}

#[tokio::test]
async fn test_backend_down_is_bad_gateway() {
    let backends = Backends::start().await;
    Mock::given(method("POST"))
        .and(path("/route"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&backends.valhalla)
        .await;

    let (status, body) = send(
        backends.app(),
        post("/nav/route", "walking\nde\nkm\n52.52,13.40\n52.51,13.38\n"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.starts_with("\n\n0\n"));
    assert!(body.contains("503"));
}

#[tokio::test]
async fn test_multiline_backend_error_keeps_stub_shape() {
    let backends = Backends::start().await;
    Mock::given(method("POST"))
        .and(path("/route"))
        .respond_with(
            ResponseTemplate::new(502).set_body_string("<html>\n<body>Bad Gateway</body>\n</html>\n"),
        )
        .mount(&backends.valhalla)
        .await;

    let (status, body) = send(
        backends.app(),
        post("/nav/route", "auto\nus\nkm\n40.7128,-74.0060\n40.7306,-73.9866\n"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body.lines().count(), 4);
    assert_eq!(
        body,
        "\n\n0\nvalhalla returned status 502: <html> <body>Bad Gateway</body> </html>\n"
    );
}

#[tokio::test]
async fn test_multiline_instruction_keeps_step_pairs() {
    let backends = Backends::start().await;
    Mock::given(method("POST"))
        .and(path("/route"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "trip": {
                "summary": {"time": 60.0, "length": 1.0},
                "legs": [{
                    "shape": SHAPE,
                    "maneuvers": [
                        {"type": 1, "instruction": "Go\nnorth", "length": 1.0}
                    ]
                }]
            }
        })))
        .mount(&backends.valhalla)
        .await;

    let (status, body) = send(
        backends.app(),
        post("/nav/route", "auto\nus\nkm\n40.7128,-74.0060\n40.7306,-73.9866\n"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "1min\n1.0km\n1\nDrive\nGo north\n");
}

#[tokio::test]
async fn test_short_post_body() {
    let backends = Backends::start().await;
    let (status, body) = send(backends.app(), post("/nav/route", "auto\nus\nkm\n")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "\n\n0\nrequest must contain at least 5 lines\n");
}

#[tokio::test]
async fn test_geocode_get_and_post() {
    let backends = Backends::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "empire state building"))
        .and(query_param("addressdetails", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "lat": "40.7484415",
            "lon": "-73.9856644",
            "importance": 0.82,
            "address": {
                "house_number": "350",
                "road": "5th Avenue",
                "city": "New York",
                "state": "New York",
                "postcode": "10118",
                "country_code": "us"
            },
            "namedetails": {"name": "Empire State Building"}
        }])))
        .expect(2)
        .mount(&backends.nominatim)
        .await;

    let (status, body) = send(backends.app(), get("/nav/geocode?q=empire%20state%20building")).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json[0]["name"], "Empire State Building");
    assert_eq!(json[0]["address"], "350 5th Ave, New York, NY 10118");
    assert_eq!(json[0]["country"], "us");

    let (status, body) = send(backends.app(), post("/nav/geocode", "empire state building\r\n")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        "1\n40.7484,-73.9857\nEmpire State Building\n350 5th Ave, New York, NY 10118\nus\n"
    );
}

#[tokio::test]
async fn test_geocode_errors() {
    let backends = Backends::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&backends.nominatim)
        .await;

    let (status, _) = send(backends.app(), get("/nav/geocode")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(backends.app(), post("/nav/geocode", "atlantis")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "0\nno results found for query: atlantis\n");

    let (status, body) = send(backends.app(), post("/nav/geocode", "  ")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "0\nrequest body cannot be empty\n");
}

#[tokio::test]
async fn test_health_docs_and_methods() {
    let backends = Backends::start().await;

    let (status, body) = send(backends.app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());

    let (status, body) = send(backends.app(), get("/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    let doc: Value = serde_json::from_str(&body).unwrap();
    assert!(doc["paths"]["/nav/route"]["get"].is_object());
    assert!(doc["paths"]["/nav/geocode"]["post"].is_object());

    let put = Request::builder()
        .method("PUT")
        .uri("/nav/route")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(backends.app(), put).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}
