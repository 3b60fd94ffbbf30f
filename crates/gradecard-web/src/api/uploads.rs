use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use gradecard_core::{RejectReason, Upload};
use serde::Serialize;

use super::records::RecordResponse;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(process_uploads))
}

#[derive(Debug, Serialize)]
pub struct RejectedFile {
    pub file: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub identifier: String,
    pub accepted: Vec<RecordResponse>,
    pub rejected: Vec<RejectedFile>,
    pub processed: usize,
    pub duplicates: usize,
    pub cgpa: Option<f64>,
}

/// Accepts a multipart form with one `identifier` field and any number of
/// `file` parts, processes them as a batch, and reports per-file outcomes
/// plus the batch's weighted GPA. A bad file rejects that file, never the
/// whole batch.
async fn process_uploads(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, (StatusCode, String)> {
    let mut identifier: Option<String> = None;
    let mut files: Vec<Upload> = Vec::new();
    let mut rejected: Vec<RejectedFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("identifier") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
                identifier = Some(value.trim().to_string());
            }
            Some("file") => {
                let file_name = field
                    .file_name()
                    .unwrap_or("unnamed.pdf")
                    .to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

                if content_type.as_deref() == Some("application/pdf") {
                    files.push(Upload::new(file_name, data.to_vec()));
                } else {
                    rejected.push(RejectedFile {
                        file: file_name,
                        reason: RejectReason::InvalidType.to_string(),
                    });
                }
            }
            _ => {}
        }
    }

    let identifier = identifier
        .filter(|value| !value.is_empty())
        .ok_or((StatusCode::BAD_REQUEST, "identifier is required".to_string()))?;

    let outcome = state.pipeline.process_batch(&identifier, files).await;

    let duplicates = outcome.duplicate_count();
    let cgpa = outcome.cumulative().value();

    rejected.extend(outcome.rejected.into_iter().map(|(file, reason)| {
        RejectedFile {
            file,
            reason: reason.to_string(),
        }
    }));

    let accepted: Vec<RecordResponse> = outcome
        .accepted
        .into_iter()
        .map(RecordResponse::from)
        .collect();

    Ok(Json(UploadResponse {
        identifier,
        processed: accepted.len(),
        accepted,
        rejected,
        duplicates,
        cgpa,
    }))
}
