use crate::state::AppState;
use crate::{api, logging};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub fn build_http_app(state: AppState) -> Router {
    // The dashboard is served from a different origin; keep CORS open.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(api::system::health))
        .route("/sensor-data", post(api::readings::ingest_reading))
        .route("/all-data", get(api::readings::list_readings))
        .route("/alerts", get(api::alerts::list_active))
        .route("/alerts/history", get(api::alerts::list_history))
        .route("/alerts/stats", get(api::alerts::alert_stats))
        .with_state(state)
        .layer(cors)
        .layer(middleware::from_fn(logging::request_logging))
}
