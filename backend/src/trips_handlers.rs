// Handlers for trip record and credit endpoints
// Identity is supplied by the authentication provider in request headers

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, put},
};
use std::sync::Arc;

use crate::credits::aggregate;
use crate::database::{DatabaseError, TripDatabase, UserIdentity};
use crate::emissions::EmissionsConfig;
use crate::models::{ApiError, TripInputs, TripRecord, UserCreditState};
use crate::{calculate_report, footprint_error_to_api_error};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

#[derive(Clone)]
pub struct TripState {
    pub db: Arc<TripDatabase>,
    pub emissions: Arc<EmissionsConfig>,
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

pub fn trip_routes(state: TripState) -> Router {
    Router::new()
        .route("/api/trips", get(list_trips).post(create_trip))
        .route("/api/trips/:id", put(update_trip).delete(delete_trip))
        .route("/api/credits", get(credits))
        .with_state(state)
}

/// POST /api/trips - Calculate and store a trip
pub async fn create_trip(
    State(state): State<TripState>,
    headers: HeaderMap,
    Json(inputs): Json<TripInputs>,
) -> ApiResult<(StatusCode, Json<TripRecord>)> {
    let user = user_from_headers(&headers)?;
    let report = calculate_report(&inputs, &state.emissions).map_err(footprint_error_to_api_error)?;

    state
        .db
        .create_trip(&user, &inputs, &report)
        .await
        .map(|record| (StatusCode::CREATED, Json(record)))
        .map_err(db_error_to_api_error)
}

/// GET /api/trips - List the caller's trips, newest first
pub async fn list_trips(
    State(state): State<TripState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<TripRecord>>> {
    let user = user_from_headers(&headers)?;
    state
        .db
        .list_trips(&user.user_id)
        .await
        .map(Json)
        .map_err(db_error_to_api_error)
}

/// PUT /api/trips/:id - Recalculate a stored trip with new inputs
pub async fn update_trip(
    State(state): State<TripState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(inputs): Json<TripInputs>,
) -> ApiResult<Json<TripRecord>> {
    let user = user_from_headers(&headers)?;
    let report = calculate_report(&inputs, &state.emissions).map_err(footprint_error_to_api_error)?;

    state
        .db
        .update_trip(id, &user.user_id, &inputs, &report)
        .await
        .map(Json)
        .map_err(db_error_to_api_error)
}

/// DELETE /api/trips/:id
pub async fn delete_trip(
    State(state): State<TripState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let user = user_from_headers(&headers)?;
    state
        .db
        .delete_trip(id, &user.user_id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(db_error_to_api_error)
}

/// GET /api/credits - Credits, level and achievements over all stored trips
pub async fn credits(
    State(state): State<TripState>,
    headers: HeaderMap,
) -> ApiResult<Json<UserCreditState>> {
    let user = user_from_headers(&headers)?;
    let trips = state
        .db
        .list_trips(&user.user_id)
        .await
        .map_err(db_error_to_api_error)?;
    let reports: Vec<_> = trips.into_iter().map(|trip| trip.report).collect();

    Ok(Json(aggregate(&reports, &state.emissions.credits)))
}

pub fn user_from_headers(headers: &HeaderMap) -> ApiResult<UserIdentity> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    let user_id = header(USER_ID_HEADER).ok_or_else(|| {
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiError {
                message: format!("missing {USER_ID_HEADER} header"),
            }),
        )
    })?;

    Ok(UserIdentity {
        user_id,
        email: header(USER_EMAIL_HEADER),
    })
}

fn db_error_to_api_error(err: DatabaseError) -> (StatusCode, Json<ApiError>) {
    let (status, message) = match err {
        DatabaseError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            format!("Trip with ID {} not found", id),
        ),
        DatabaseError::InvalidData(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        DatabaseError::ConnectionError(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("Database connection error: {}", e),
        ),
    };

    (status, Json(ApiError { message }))
}
