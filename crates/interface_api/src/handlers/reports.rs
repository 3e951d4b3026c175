//! Report handlers

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Datelike, Utc};

use domain_reporting::{monthly_series, summarize, MonthlySeries, ReportFilter, ReportSummary};

use crate::dto::report::*;
use crate::{error::ApiError, AppState};

/// Booking summary for a month, a year, a calendar month or everything
pub async fn summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<ReportSummary>, ApiError> {
    let filter = ReportFilter::new(params.month, params.year)?;
    let invoices = state.billing.list_invoices(&filter.to_query()).await?;
    Ok(Json(summarize(&invoices, &filter)))
}

/// Twelve monthly points for a year, the current one by default
pub async fn monthly(
    State(state): State<AppState>,
    Query(params): Query<MonthlyParams>,
) -> Result<Json<MonthlySeries>, ApiError> {
    let year = params.year.unwrap_or_else(|| Utc::now().year());
    let filter = ReportFilter::for_year(year)?;
    let invoices = state.billing.list_invoices(&filter.to_query()).await?;
    Ok(Json(monthly_series(&invoices, Some(year))?))
}
