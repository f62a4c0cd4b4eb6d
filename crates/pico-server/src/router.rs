use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{self, AppState};

/// Build the axum router with all silo endpoints.
///
/// Sites are public documents, so cross-origin reads are open.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::list_sites))
        .route("/stat/:key", get(handlers::site_stat))
        .route("/:key", get(handlers::get_site).post(handlers::post_site))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
