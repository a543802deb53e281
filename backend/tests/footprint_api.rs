use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use axum::{
    body::{Body, to_bytes},
    http::Request,
};
use footprint_backend::{
    AppState,
    cache::DistanceCache,
    create_router,
    distance::DistanceService,
    emissions::EmissionsConfig,
    geocoder::{GeocodeError, GeocodedPlace, Geocoder},
    models::{
        AccommodationType, AlternativeScenario, ApiError, Coordinate, DistanceResult,
        EmissionsReport, TransportMode,
    },
};
use hyper::StatusCode;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Resolves a few fixed cities; "offline" simulates an unreachable service.
#[derive(Default)]
struct FixtureGeocoder {
    calls: AtomicUsize,
}

impl Geocoder for FixtureGeocoder {
    async fn geocode(&self, place: &str) -> Result<GeocodedPlace, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (lat, lon, name) = match place.trim().to_lowercase().as_str() {
            "paris" => (48.8566, 2.3522, "Paris, France"),
            "london" => (51.5074, -0.1278, "London, United Kingdom"),
            "madrid" => (40.4168, -3.7038, "Madrid, Spain"),
            "offline" => {
                return Err(GeocodeError::NetworkFailure {
                    attempts: 4,
                    reason: "connection refused".to_string(),
                });
            }
            other => return Err(GeocodeError::NotFound(other.to_string())),
        };
        Ok(GeocodedPlace {
            coordinate: Coordinate::new(lat, lon),
            display_name: name.to_string(),
            country: None,
        })
    }
}

fn test_app() -> (axum::Router, Arc<DistanceService<FixtureGeocoder>>) {
    let distance = Arc::new(DistanceService::new(
        FixtureGeocoder::default(),
        DistanceCache::in_memory(),
    ));
    let state = AppState {
        distance: Arc::clone(&distance),
        emissions: Arc::new(EmissionsConfig::default()),
        trips: None,
    };
    (create_router(state), distance)
}

fn post_json(uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn read_body<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn trip(mode: &str, distance_km: f64, accommodation: &str, nights: u32) -> Value {
    json!({
        "transport": {"mode": mode, "distance_km": distance_km},
        "accommodation": {"type": accommodation, "nights": nights},
        "activities": {"dining": 2, "sightseeing": 1}
    })
}

#[tokio::test]
async fn emissions_endpoint_returns_full_report() {
    let (app, _) = test_app();
    let response = app
        .oneshot(post_json("/api/emissions", &trip("flight", 1_000.0, "hotel", 3)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let report: EmissionsReport = read_body(response).await;
    assert!((report.transport_kg - 255.0).abs() < 1e-9);
    assert!((report.accommodation_kg - 54.0).abs() < 1e-9);
    assert!((report.activities_kg - 10.0).abs() < 1e-9);
    assert_eq!(
        report.total_kg,
        report.transport_kg + report.accommodation_kg + report.activities_kg
    );
    assert!((report.per_day_kg - report.total_kg / 3.0).abs() < 1e-9);
    assert_eq!(report.accommodation_type, AccommodationType::Hotel);
}

#[tokio::test]
async fn emissions_endpoint_rejects_non_positive_distance() {
    let (app, _) = test_app();
    let response = app
        .oneshot(post_json("/api/emissions", &trip("car", 0.0, "hotel", 2)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn zero_emission_trip_is_not_calculable() {
    let (app, _) = test_app();
    let payload = json!({
        "transport": {"mode": "walk", "distance_km": 4.0},
        "accommodation": {"type": "hostel", "nights": 0}
    });
    let response = app
        .oneshot(post_json("/api/emissions", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_mode_is_rejected_by_deserialization() {
    let (app, _) = test_app();
    let response = app
        .oneshot(post_json("/api/emissions", &trip("rocket", 100.0, "hotel", 1)))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn alternative_endpoint_suggests_train_and_eco_resort() {
    let (app, _) = test_app();
    let response = app
        .oneshot(post_json("/api/alternative", &trip("car", 600.0, "luxuryhotel", 4)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let scenario: AlternativeScenario = read_body(response).await;
    assert_eq!(scenario.best_transport_mode, TransportMode::Train);
    assert_eq!(scenario.best_accommodation_type, AccommodationType::EcoResort);
    assert!(scenario.feasible);
    assert!(scenario.savings_kg > 0.0);
}

#[tokio::test]
async fn distance_endpoint_geocodes_once_then_serves_from_cache() {
    let (app, distance) = test_app();
    let payload = json!({"origin": "Paris", "destination": "London", "mode": "train"});

    let response = app
        .clone()
        .oneshot(post_json("/api/distance", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first: DistanceResult = read_body(response).await;
    assert!(first.geodesic_distance_km > 330.0 && first.geodesic_distance_km < 350.0);
    assert!(first.distance_km > first.geodesic_distance_km);
    assert_eq!(first.origin_place, "Paris, France");

    let response = app
        .oneshot(post_json("/api/distance", &payload))
        .await
        .unwrap();
    let second: DistanceResult = read_body(response).await;
    assert_eq!(second, first);
    assert!(distance.cache().get("paris", "london", TransportMode::Train).is_some());
}

#[tokio::test]
async fn unknown_place_returns_not_found_with_hint() {
    let (app, _) = test_app();
    let payload = json!({"origin": "Paris", "destination": "Atlantis", "mode": "car"});
    let response = app
        .oneshot(post_json("/api/distance", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let error: ApiError = read_body(response).await;
    assert!(error.message.contains("City, Country"));
}

#[tokio::test]
async fn unreachable_geocoder_returns_service_unavailable() {
    let (app, _) = test_app();
    let payload = json!({"origin": "offline", "destination": "Madrid", "mode": "bus"});
    let response = app
        .oneshot(post_json("/api/distance", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn trip_routes_are_absent_without_database() {
    let (app, _) = test_app();
    let request = Request::builder()
        .uri("/api/trips")
        .header("x-user-id", "user-1")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
