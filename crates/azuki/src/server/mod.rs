use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::server::endpoints::{course, status};
use crate::types::AppState;

mod endpoints;
mod export;
mod types;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let course_router = Router::new()
        .route("/search", post(course::post_search))
        .route("/csv", post(course::post_csv))
        .route("/facet", post(course::post_facet));

    Router::new()
        .route("/health", get(status::get_health))
        .nest("/course", course_router)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
