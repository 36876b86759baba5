//! Axum route handlers for the Insight API.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::BATCH_MAX_ROWS_LIMIT;
use crate::errors::AppError;
use crate::insight::batch::{ingest_csv, run_batch};
use crate::insight::export::{write_results_csv, EXPORT_FILE_NAME};
use crate::insight::invoker::ask_insight;
use crate::insight::models::{BatchRow, ProspectRecord, SenderProfile, TONE_PRESETS};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct InsightRequest {
    #[serde(flatten)]
    pub prospect: ProspectRecord,
    #[serde(default)]
    pub sender: SenderProfile,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub csv_text: String,
    pub max_rows: Option<usize>,
    #[serde(default)]
    pub sender: SenderProfile,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub processed: usize,
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<BatchRow>,
}

#[derive(Debug, Serialize)]
pub struct SenderDefaultsResponse {
    pub sender: SenderProfile,
    pub tone_presets: &'static [&'static str],
    pub batch_max_rows: usize,
    pub batch_max_rows_limit: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum BatchFormat {
    #[default]
    Json,
    Csv,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/sender/defaults
///
/// Default outreach identity and the tone presets the UI offers.
pub async fn handle_sender_defaults(State(state): State<AppState>) -> Json<SenderDefaultsResponse> {
    Json(SenderDefaultsResponse {
        sender: SenderProfile::default(),
        tone_presets: TONE_PRESETS,
        batch_max_rows: state.config.batch_max_rows,
        batch_max_rows_limit: BATCH_MAX_ROWS_LIMIT,
    })
}

/// POST /api/v1/insights
///
/// Single mode: one prospect in, the canonical insight JSON out.
/// Fields reach the prompt verbatim, blank or not.
pub async fn handle_generate_insight(
    State(state): State<AppState>,
    Json(request): Json<InsightRequest>,
) -> Result<Response, AppError> {
    let prospect = &request.prospect;
    let body = ask_insight(
        state.llm.as_ref(),
        &prospect.company_name,
        &prospect.industry,
        &prospect.notes,
        &request.sender,
    )
    .await?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// POST /api/v1/insights/batch
///
/// Batch mode from pasted CSV text. Returns rows in input order.
pub async fn handle_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, AppError> {
    let rows = process_pasted(&state, &request).await?;
    Ok(Json(batch_response(rows)))
}

/// POST /api/v1/insights/batch/export
///
/// Same as `/batch`, but answers with the results as a CSV download.
pub async fn handle_batch_export(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<Response, AppError> {
    let rows = process_pasted(&state, &request).await?;
    csv_response(&rows)
}

/// POST /api/v1/insights/batch/upload
///
/// Batch mode from an uploaded CSV file. Multipart fields:
/// `file` (required), `sender_company`, `sender_service`, `sender_tone`,
/// `max_rows`, and `format` (`json` | `csv`).
pub async fn handle_batch_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut file: Option<bytes::Bytes> = None;
    let mut sender = SenderProfile::default();
    let mut max_rows: Option<usize> = None;
    let mut format = BatchFormat::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            file = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?,
            );
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read field '{name}': {e}")))?;
        let value = value.trim();
        match name.as_str() {
            "sender_company" if !value.is_empty() => sender.company = value.to_string(),
            "sender_service" if !value.is_empty() => sender.service_offered = value.to_string(),
            "sender_tone" if !value.is_empty() => sender.tone = value.to_string(),
            "max_rows" if !value.is_empty() => {
                max_rows = Some(value.parse().map_err(|_| {
                    AppError::Validation(format!("max_rows must be a positive integer, got '{value}'"))
                })?)
            }
            "format" => format = parse_format(value)?,
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::Validation("file field is required".to_string()))?;
    let records = ingest_csv(&file, state.config.resolve_max_rows(max_rows))?;
    let rows = run_batch(state.llm.as_ref(), &sender, records).await?;

    match format {
        BatchFormat::Json => Ok(Json(batch_response(rows)).into_response()),
        BatchFormat::Csv => csv_response(&rows),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn process_pasted(state: &AppState, request: &BatchRequest) -> Result<Vec<BatchRow>, AppError> {
    let csv_text = request.csv_text.trim();
    if csv_text.is_empty() {
        return Err(AppError::Validation("csv_text cannot be empty".to_string()));
    }

    let records = ingest_csv(csv_text.as_bytes(), state.config.resolve_max_rows(request.max_rows))?;
    Ok(run_batch(state.llm.as_ref(), &request.sender, records).await?)
}

fn batch_response(rows: Vec<BatchRow>) -> BatchResponse {
    BatchResponse {
        processed: rows.len(),
        generated_at: Utc::now(),
        rows,
    }
}

fn csv_response(rows: &[BatchRow]) -> Result<Response, AppError> {
    let body = write_results_csv(rows).map_err(|e| AppError::Internal(e.into()))?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        body,
    )
        .into_response())
}

fn parse_format(value: &str) -> Result<BatchFormat, AppError> {
    match value.to_ascii_lowercase().as_str() {
        "" | "json" => Ok(BatchFormat::Json),
        "csv" => Ok(BatchFormat::Csv),
        other => Err(AppError::Validation(format!(
            "format must be 'json' or 'csv', got '{other}'"
        ))),
    }
}
