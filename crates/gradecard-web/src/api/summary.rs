use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use gradecard_core::{cumulative_gpa, CumulativeGpa};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_summary))
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    identifier: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub identifier: String,
    pub entries: usize,
    pub cgpa: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

impl SummaryResponse {
    pub fn new(identifier: String, entries: usize, cumulative: CumulativeGpa) -> Self {
        Self {
            identifier,
            entries,
            cgpa: cumulative.value(),
            reason: match cumulative {
                CumulativeGpa::Weighted(_) => None,
                CumulativeGpa::InsufficientData => Some("insufficient data"),
            },
        }
    }
}

/// Credit-weighted cumulative GPA over every stored record for one student.
async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryResponse>, (StatusCode, String)> {
    let entries = state
        .storage
        .weighted_entries(&query.identifier)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let count = entries.len();
    let cumulative = cumulative_gpa(entries);

    Ok(Json(SummaryResponse::new(query.identifier, count, cumulative)))
}
