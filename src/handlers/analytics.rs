// src/handlers/analytics.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    config::DEFAULT_PAGE_SIZE,
    error::AppError,
    models::{
        analytics::{AnalyticsSnapshot, AttemptPage},
        attempt::{AttemptFilter, AttemptListParams, AttemptRecord, OverviewParams},
    },
    services::analytics::AnalyticsService,
    store::PgAttemptStore,
};

/// Platform-wide statistics and the top-10 ranking.
/// Admin only.
#[utoipa::path(
    get,
    path = "/api/admin/analytics/overview",
    params(OverviewParams),
    responses(
        (status = 200, description = "Overview snapshot", body = AnalyticsSnapshot),
        (status = 400, description = "End date before start date")
    ),
    security(("bearer" = [])),
    tag = "Analytics"
)]
pub async fn get_overview(
    State(pool): State<PgPool>,
    Query(params): Query<OverviewParams>,
) -> Result<impl IntoResponse, AppError> {
    let filter = AttemptFilter::from(params);
    // Reject malformed ranges before touching the pool
    filter.validate()?;

    let store = PgAttemptStore::new(pool);
    let snapshot = AnalyticsService::new(&store).overview(&filter).await?;

    Ok(Json(snapshot))
}

/// Paginated attempt listing, most recent first.
/// Admin only.
#[utoipa::path(
    get,
    path = "/api/admin/attempts",
    params(AttemptListParams),
    responses(
        (status = 200, description = "One page of attempts", body = AttemptPage),
        (status = 400, description = "Bad page arguments or date range")
    ),
    security(("bearer" = [])),
    tag = "Analytics"
)]
pub async fn list_attempts(
    State(pool): State<PgPool>,
    Query(params): Query<AttemptListParams>,
) -> Result<impl IntoResponse, AppError> {
    let filter = params.filter();
    filter.validate()?;
    let page = params.page.unwrap_or(1);
    let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

    let store = PgAttemptStore::new(pool);
    let page = AnalyticsService::new(&store)
        .list(&filter, page, page_size)
        .await?;

    Ok(Json(page))
}

/// One attempt with its per-question outcomes.
/// Admin only.
#[utoipa::path(
    get,
    path = "/api/admin/attempts/{id}",
    params(("id" = i64, Path, description = "Attempt ID")),
    responses(
        (status = 200, description = "Attempt with answers", body = AttemptRecord),
        (status = 404, description = "No such attempt")
    ),
    security(("bearer" = [])),
    tag = "Analytics"
)]
pub async fn get_attempt(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let store = PgAttemptStore::new(pool);
    let record = AnalyticsService::new(&store).attempt(id).await?;

    Ok(Json(record))
}
