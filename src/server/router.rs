use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Router, routing::get};

use super::composite::composite_routes;
use super::resources::resource_routes;
use crate::composer::Composer;
use crate::store::Store;
use crate::types::{Admin, Driver, Enrollment, Route, Student, Trip, Vehicle};

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub composer: Composer,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            composer: Composer::new(Arc::clone(&store)),
            store,
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(resource_routes::<Student>())
        .merge(resource_routes::<Driver>())
        .merge(resource_routes::<Vehicle>())
        .merge(resource_routes::<Route>())
        .merge(resource_routes::<Trip>())
        .merge(resource_routes::<Enrollment>())
        .merge(resource_routes::<Admin>())
        .merge(composite_routes())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
