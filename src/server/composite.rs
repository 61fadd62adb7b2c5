use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::PathRejection},
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::server::AppState;
use crate::server::response::{ApiError, StoreResultExt};

pub async fn route_students(
    State(state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> impl IntoResponse {
    let Path(route_id) = path.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let students = state
        .composer
        .students_on_route(route_id)
        .await
        .api_err("Failed to list students on route")?;

    Ok::<_, ApiError>(Json(students))
}

pub async fn driver_trips_with_vehicle(
    State(state): State<Arc<AppState>>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> impl IntoResponse {
    let Path((driver_id, vehicle_id)) = path.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let trips = state
        .composer
        .driver_trips_with_vehicle(driver_id, vehicle_id)
        .await
        .api_err("Failed to list driver trips")?;

    Ok::<_, ApiError>(Json(trips))
}

pub fn composite_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/routes/{id}/students", get(route_students))
        .route(
            "/drivers/{id}/trips_with_vehicle/{vehicle_id}",
            get(driver_trips_with_vehicle),
        )
}
