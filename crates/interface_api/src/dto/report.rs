//! Report DTOs
//!
//! Summaries and series are returned as the reporting crate serializes
//! them; only the query parameters live here.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct SummaryParams {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MonthlyParams {
    pub year: Option<i32>,
}
