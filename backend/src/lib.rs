pub mod adjustment;
pub mod cache;
pub mod config;
pub mod credits;
pub mod database;
pub mod distance;
pub mod emissions;
pub mod error;
pub mod geocoder;
pub mod geodesy;
pub mod models;
pub mod optimizer;
pub mod trips_handlers;

use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

use crate::database::TripDatabase;
use crate::distance::DistanceService;
use crate::emissions::{EmissionsConfig, compute_emissions, validate_inputs};
use crate::error::FootprintError;
use crate::geocoder::{GeocodeError, Geocoder, NominatimGeocoder};
use crate::models::{
    AlternativeScenario, ApiError, DistanceRequest, DistanceResult, EmissionsReport, TripInputs,
};
use crate::optimizer::optimize;
use crate::trips_handlers::{TripState, trip_routes};

pub struct AppState<G = NominatimGeocoder> {
    pub distance: Arc<DistanceService<G>>,
    pub emissions: Arc<EmissionsConfig>,
    /// Trip records and credits are only served when a database is configured.
    pub trips: Option<Arc<TripDatabase>>,
}

impl<G> Clone for AppState<G> {
    fn clone(&self) -> Self {
        Self {
            distance: Arc::clone(&self.distance),
            emissions: Arc::clone(&self.emissions),
            trips: self.trips.clone(),
        }
    }
}

pub fn create_router<G>(state: AppState<G>) -> Router
where
    G: Geocoder + 'static,
{
    let trips = state.trips.clone().map(|db| TripState {
        db,
        emissions: Arc::clone(&state.emissions),
    });

    let router = Router::new()
        .route("/api/distance", post(distance_handler::<G>))
        .route("/api/emissions", post(emissions_handler::<G>))
        .route("/api/alternative", post(alternative_handler::<G>))
        .with_state(state);

    match trips {
        Some(trip_state) => router.merge(trip_routes(trip_state)),
        None => router,
    }
}

/// Validate inputs and compute their report, refusing reports with nothing to show.
pub fn calculate_report(
    inputs: &TripInputs,
    config: &EmissionsConfig,
) -> Result<EmissionsReport, FootprintError> {
    validate_inputs(inputs)?;
    let report = compute_emissions(inputs, config);
    if !report.is_calculable() {
        return Err(FootprintError::NotCalculable);
    }
    Ok(report)
}

async fn distance_handler<G: Geocoder>(
    State(state): State<AppState<G>>,
    Json(req): Json<DistanceRequest>,
) -> Result<Json<DistanceResult>, (StatusCode, Json<ApiError>)> {
    state
        .distance
        .estimate(&req.origin, &req.destination, req.mode)
        .await
        .map(Json)
        .map_err(|e| footprint_error_to_api_error(e.into()))
}

async fn emissions_handler<G>(
    State(state): State<AppState<G>>,
    Json(inputs): Json<TripInputs>,
) -> Result<Json<EmissionsReport>, (StatusCode, Json<ApiError>)> {
    calculate_report(&inputs, &state.emissions)
        .map(Json)
        .map_err(footprint_error_to_api_error)
}

async fn alternative_handler<G>(
    State(state): State<AppState<G>>,
    Json(inputs): Json<TripInputs>,
) -> Result<Json<AlternativeScenario>, (StatusCode, Json<ApiError>)> {
    validate_inputs(&inputs).map_err(|e| footprint_error_to_api_error(e.into()))?;
    Ok(Json(optimize(&inputs, &state.emissions)))
}

/// Convert FootprintError to API error response
pub fn footprint_error_to_api_error(err: FootprintError) -> (StatusCode, Json<ApiError>) {
    let status = match &err {
        FootprintError::Geocode(GeocodeError::EmptyQuery) => StatusCode::BAD_REQUEST,
        FootprintError::Geocode(GeocodeError::NotFound(_)) => StatusCode::NOT_FOUND,
        FootprintError::Geocode(GeocodeError::NetworkFailure { .. }) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        FootprintError::InvalidInputs(_) => StatusCode::BAD_REQUEST,
        FootprintError::NotCalculable => StatusCode::UNPROCESSABLE_ENTITY,
        FootprintError::Database(_)
        | FootprintError::Cache(_)
        | FootprintError::Config(_)
        | FootprintError::Client(_)
        | FootprintError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        Json(ApiError {
            message: err.to_string(),
        }),
    )
}
