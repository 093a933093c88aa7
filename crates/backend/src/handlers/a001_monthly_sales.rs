use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    Json,
};
use sales_contracts::domain::a001_monthly_sales::{
    FilterOptions, MonthlySalesDto, SalesRecord, SalesRecordId, SalesTableResponse,
};

use crate::domain::a001_monthly_sales::filter::{self, FilterPolicy, RawFilterParams};
use crate::domain::a001_monthly_sales::service;
use crate::shared::error::SalesResult;
use crate::shared::query::QueryParams;
use crate::shared::state::AppState;
use crate::system::auth::extractor::CurrentUser;

/// GET /api/sales/filter-options
pub async fn filter_options(State(state): State<AppState>) -> SalesResult<Json<FilterOptions>> {
    Ok(Json(service::filter_options(&state.db).await?))
}

/// GET /api/sales/table
pub async fn table(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> SalesResult<Json<SalesTableResponse>> {
    list(&state, query, state.config.pagination.table_page_size).await
}

/// GET /api/sales/manage
pub async fn manage(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> SalesResult<Json<SalesTableResponse>> {
    list(&state, query, state.config.pagination.manage_page_size).await
}

async fn list(
    state: &AppState,
    query: Option<String>,
    page_size: u64,
) -> SalesResult<Json<SalesTableResponse>> {
    let params = QueryParams::parse(query.as_deref());
    let filter = filter::resolve(&RawFilterParams::from_query(&params), FilterPolicy::Strict)?;
    let response = service::list_table(&state.db, filter, params.first("page"), page_size).await?;
    Ok(Json(response))
}

/// GET /api/sales/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> SalesResult<Json<SalesRecord>> {
    Ok(Json(service::get_by_id(&state.db, SalesRecordId(id)).await?))
}

/// POST /api/sales
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(dto): Json<MonthlySalesDto>,
) -> SalesResult<(StatusCode, Json<SalesRecord>)> {
    let record = service::create(&state.db, dto).await?;
    tracing::info!("Sales record {} added by {}", record.id, claims.username);
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /api/sales/:id
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<i64>,
    Json(dto): Json<MonthlySalesDto>,
) -> SalesResult<Json<SalesRecord>> {
    let record = service::update(&state.db, SalesRecordId(id), dto).await?;
    tracing::info!("Sales record {} edited by {}", record.id, claims.username);
    Ok(Json(record))
}

/// DELETE /api/sales/:id
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<i64>,
) -> SalesResult<StatusCode> {
    service::delete(&state.db, SalesRecordId(id)).await?;
    tracing::info!("Sales record {} deleted by {}", id, claims.username);
    Ok(StatusCode::NO_CONTENT)
}
