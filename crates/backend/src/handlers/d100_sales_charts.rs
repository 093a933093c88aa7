use axum::{
    extract::{RawQuery, State},
    Json,
};
use sales_contracts::dashboards::d100_sales_charts::{ChartPayload, ChartType};

use crate::dashboards::d100_sales_charts::service;
use crate::domain::a001_monthly_sales::filter::{self, FilterPolicy, RawFilterParams};
use crate::shared::error::{SalesError, SalesResult};
use crate::shared::query::QueryParams;
use crate::shared::state::AppState;

/// GET /api/chart-data?type=line|bar|pie&year=&products[]=
///
/// Без параметра `type` строится линейная диаграмма.
pub async fn chart_data(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> SalesResult<Json<ChartPayload>> {
    let params = QueryParams::parse(query.as_deref());

    let chart_type = match params.first("type") {
        None => ChartType::default(),
        Some(raw) => raw
            .parse::<ChartType>()
            .map_err(|e| SalesError::InvalidChartType(e.0))?,
    };

    let filter = filter::resolve(&RawFilterParams::from_query(&params), FilterPolicy::Lenient)?;
    let payload = service::get_chart_data(&state.db, chart_type, &filter).await?;
    Ok(Json(payload))
}
