//! Uniform CRUD endpoints shared by every entity collection.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::de::DeserializeOwned;

use crate::repository::{Entity, Repository};
use crate::server::AppState;
use crate::server::dto::{
    AdminFilters, DriverFilters, EnrollmentFilters, Filters, ListParams, RouteFilters,
    StudentFilters, TripFilters, VehicleFilters,
};
use crate::server::response::{ApiError, StoreResultExt};
use crate::types::{Admin, Driver, Enrollment, Route, Student, Trip, Vehicle};

/// An entity exposed as an HTTP collection.
pub trait Resource: Entity {
    /// Collection path, e.g. `/students`.
    const PATH: &'static str;
    /// Key segments appended to [`Self::PATH`]; parameter names match the
    /// fields of `Self::Key`.
    const KEY_PATH: &'static str;

    type Filters: Filters + DeserializeOwned + Send + 'static;
}

impl Resource for Student {
    const PATH: &'static str = "/students";
    const KEY_PATH: &'static str = "/{id}";
    type Filters = StudentFilters;
}

impl Resource for Driver {
    const PATH: &'static str = "/drivers";
    const KEY_PATH: &'static str = "/{id}";
    type Filters = DriverFilters;
}

impl Resource for Vehicle {
    const PATH: &'static str = "/vehicles";
    const KEY_PATH: &'static str = "/{id}";
    type Filters = VehicleFilters;
}

impl Resource for Route {
    const PATH: &'static str = "/routes";
    const KEY_PATH: &'static str = "/{id}";
    type Filters = RouteFilters;
}

impl Resource for Trip {
    const PATH: &'static str = "/trips";
    const KEY_PATH: &'static str = "/{route_id}/{departure_date}/{id}";
    type Filters = TripFilters;
}

impl Resource for Enrollment {
    const PATH: &'static str = "/enrollments";
    const KEY_PATH: &'static str = "/{trip_id}/{student_id}";
    type Filters = EnrollmentFilters;
}

impl Resource for Admin {
    const PATH: &'static str = "/admins";
    const KEY_PATH: &'static str = "/{id}";
    type Filters = AdminFilters;
}

fn repository<E: Entity>(state: &AppState) -> Repository<E> {
    Repository::new(Arc::clone(&state.store))
}

fn key<E: Entity>(path: Result<Path<E::Key>, PathRejection>) -> Result<E::Key, ApiError> {
    path.map(|Path(key)| key)
        .map_err(|e| ApiError::bad_request(e.body_text()))
}

pub async fn create<E: Resource>(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<E::Input>, JsonRejection>,
) -> impl IntoResponse {
    let Json(input) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let entity = repository::<E>(&state)
        .create(input)
        .api_err("Failed to create record")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(entity)))
}

pub async fn list<E: Resource>(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListParams>, QueryRejection>,
    filters: Result<Query<E::Filters>, QueryRejection>,
) -> impl IntoResponse {
    let Query(params) = params.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let Query(filters) = filters.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let records = repository::<E>(&state)
        .list(filters.into_query(), params.limit)
        .api_err("Failed to list records")?;

    Ok::<_, ApiError>(Json(records))
}

pub async fn count<E: Resource>(
    State(state): State<Arc<AppState>>,
    filters: Result<Query<E::Filters>, QueryRejection>,
) -> impl IntoResponse {
    let Query(filters) = filters.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let total = repository::<E>(&state)
        .count(filters.into_query())
        .api_err("Failed to count records")?;

    Ok::<_, ApiError>(Json(total))
}

pub async fn fetch<E: Resource>(
    State(state): State<Arc<AppState>>,
    path: Result<Path<E::Key>, PathRejection>,
) -> impl IntoResponse {
    let key = key::<E>(path)?;

    let entity = repository::<E>(&state)
        .get(&key)
        .api_err("Failed to get record")?;

    Ok::<_, ApiError>(Json(entity))
}

pub async fn update<E: Resource>(
    State(state): State<Arc<AppState>>,
    path: Result<Path<E::Key>, PathRejection>,
    payload: Result<Json<E::Patch>, JsonRejection>,
) -> impl IntoResponse {
    let key = key::<E>(path)?;
    let repo = repository::<E>(&state);

    // A missing record is reported before anything about the body.
    repo.get(&key).api_err("Failed to update record")?;
    let Json(patch) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let entity = repo.update(&key, patch).api_err("Failed to update record")?;

    Ok::<_, ApiError>(Json(entity))
}

pub async fn remove<E: Resource>(
    State(state): State<Arc<AppState>>,
    path: Result<Path<E::Key>, PathRejection>,
) -> impl IntoResponse {
    let key = key::<E>(path)?;

    repository::<E>(&state)
        .delete(&key)
        .api_err("Failed to delete record")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

/// Collection, count and keyed routes for one entity, with and without a
/// trailing slash.
pub fn resource_routes<E: Resource>() -> Router<Arc<AppState>> {
    let base = E::PATH;
    let keyed = format!("{base}{}", E::KEY_PATH);

    Router::new()
        .route(base, get(list::<E>).post(create::<E>))
        .route(&format!("{base}/"), get(list::<E>).post(create::<E>))
        .route(&format!("{base}/count"), get(count::<E>))
        .route(&format!("{base}/count/"), get(count::<E>))
        .route(
            &keyed,
            get(fetch::<E>).put(update::<E>).delete(remove::<E>),
        )
}
