// src/routes.rs

use axum::{
    Json, Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::{
    docs::ApiDoc,
    handlers::{analytics, attempt, practice},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Public routes: submission, today's practice set, student progress.
/// * Admin routes: analytics overview and attempt listings behind JWT + role check.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let student_routes = Router::new()
        .route("/attempts", post(attempt::submit_attempt))
        .route("/practice/today", get(practice::get_todays_set))
        .route("/progress", get(attempt::get_progress));

    let admin_routes = Router::new()
        .route("/analytics/overview", get(analytics::get_overview))
        .route("/attempts", get(analytics::list_attempts))
        .route("/attempts/{id}", get(analytics::get_attempt))
        // Layers run outside in: auth first, then the admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .nest("/api", student_routes)
        .nest("/api/admin", admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
