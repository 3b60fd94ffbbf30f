use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use gradecard_core::CardRecord;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_records))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    identifier: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub id: Uuid,
    pub file: String,
    pub identifier: String,
    pub semester: Option<String>,
    pub exam: String,
    pub sgpa: Option<f64>,
    pub credits: Option<f64>,
    pub created_at: String,
}

impl From<CardRecord> for RecordResponse {
    fn from(record: CardRecord) -> Self {
        Self {
            id: record.id,
            exam: record.exam_label(),
            file: record.file_name,
            identifier: record.identifier,
            semester: record.grades.semester,
            sgpa: record.grades.sgpa,
            credits: record.grades.total_credits,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

async fn list_records(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<RecordResponse>>, (StatusCode, String)> {
    let records = state
        .storage
        .list(query.identifier.as_deref())
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(records.into_iter().map(RecordResponse::from).collect()))
}
