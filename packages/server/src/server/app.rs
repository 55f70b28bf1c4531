//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domains::matching::engine::MatchingService;
use crate::kernel::ServerDeps;
use crate::server::routes::{
    create_session, delete_session, end_circle, get_circle, get_circle_token, get_session,
    health_handler, join_matching, leave_matching, matching_status, report_circle,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
    pub matching: Arc<MatchingService>,
}

/// Build the Axum application router
pub fn build_app(deps: Arc<ServerDeps>, matching: Arc<MatchingService>) -> Router {
    let state = AppState { deps, matching };

    // CORS configuration - the mobile clients call from arbitrary origins
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        // Sessions
        .route("/api/sessions/create", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        // Matching queue
        .route("/api/matching/join", post(join_matching))
        .route("/api/matching/leave", delete(leave_matching))
        .route("/api/matching/status/:session_id", get(matching_status))
        // Circles
        .route("/api/circles/:id", get(get_circle))
        .route("/api/circles/:id/token", get(get_circle_token))
        .route("/api/circles/:id/report", post(report_circle))
        .route("/api/circles/:id/end", post(end_circle))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
