//! `POST /convert`: request intake, validation and the worker pool

use crate::api::error::{Result, ServiceError};
use crate::convert::convert;
use crate::error::{ConvertError, RenderError};
use crate::state::AppState;
use crate::types::RenderedDocument;
use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request, State, multipart::MultipartError},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use tokio::time::Instant;

/// Multipart field carrying the message
pub const UPLOAD_FIELD: &str = "file";

/// Required suffix for uploaded files
pub const REQUIRED_EXTENSION: &str = ".eml";

/// Convert one message to PDF.
///
/// Accepts the raw message as the request body, or a `multipart/form-data`
/// upload with the message in the `file` field.
pub async fn convert_email(State(state): State<AppState>, request: Request) -> Result<Response> {
    let deadline = Instant::now() + state.config.server.request_timeout();

    let engine_status = state.engine.status();
    if !engine_status.is_available() {
        return Err(ServiceError::EngineUnavailable(
            engine_status.detail().to_string(),
        ));
    }

    let raw = if is_multipart(request.headers()) {
        read_upload(&state, request).await?
    } else {
        read_raw_body(&state, request).await?
    };

    tracing::info!("Conversion request ({} bytes)", raw.len());

    let document = run_conversion(&state, raw, deadline).await?;
    Ok(pdf_response(document))
}

/// Check the uploaded filename before reading any content
pub fn validate_filename(filename: &str) -> Result<()> {
    if filename.trim().is_empty() {
        return Err(ServiceError::Validation("No file selected".into()));
    }

    if !filename.to_lowercase().ends_with(REQUIRED_EXTENSION) {
        return Err(ServiceError::Validation(format!(
            "Invalid file type: only {REQUIRED_EXTENSION} files are accepted"
        )));
    }

    Ok(())
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_lowercase().starts_with("multipart/form-data"))
}

async fn read_upload(state: &AppState, request: Request) -> Result<Bytes> {
    let limit_mb = state.config.server.max_request_size_mb;
    let field_error = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServiceError::PayloadTooLarge(limit_mb)
        } else {
            ServiceError::Validation(format!("Malformed upload: {}", e.body_text()))
        }
    };

    let mut multipart = Multipart::from_request(request, state)
        .await
        .map_err(|e| ServiceError::Validation(format!("Malformed upload: {}", e.body_text())))?;

    while let Some(field) = multipart.next_field().await.map_err(field_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        validate_filename(&filename)?;

        let content = field.bytes().await.map_err(field_error)?;
        if content.is_empty() {
            return Err(ServiceError::Validation(format!(
                "Uploaded file '{filename}' is empty"
            )));
        }

        tracing::debug!("Received upload '{}' ({} bytes)", filename, content.len());
        return Ok(content);
    }

    Err(ServiceError::Validation(format!(
        "No file part in the request; expected a '{UPLOAD_FIELD}' field"
    )))
}

async fn read_raw_body(state: &AppState, request: Request) -> Result<Bytes> {
    let server = &state.config.server;
    let limit = server.max_request_bytes();

    let declared = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(ServiceError::PayloadTooLarge(server.max_request_size_mb));
    }

    // Bodies without a declared length are cut off by the router's body limit
    let body = Bytes::from_request(request, state).await.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServiceError::PayloadTooLarge(server.max_request_size_mb)
        } else {
            ServiceError::Validation(format!("Failed to read request body: {}", e.body_text()))
        }
    })?;

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ServiceError::Validation(
            "Request body is empty; send the raw message or upload a .eml file".into(),
        ));
    }

    Ok(body)
}

/// Run the blocking pipeline on the worker pool, bounded by `deadline`.
///
/// The deadline covers the wait for a worker as well as the engine run. The
/// permit travels with the blocking task, and the engine is killed at the
/// deadline, so a timed-out conversion frees its worker promptly.
async fn run_conversion(
    state: &AppState,
    raw: Bytes,
    deadline: Instant,
) -> Result<RenderedDocument> {
    let timeout_secs = state.config.server.request_timeout_secs;

    let permit = tokio::time::timeout_at(deadline, state.workers.clone().acquire_owned())
        .await
        .map_err(|_| {
            tracing::warn!("No conversion worker freed up before the deadline");
            ServiceError::Timeout(timeout_secs)
        })?
        .map_err(|_| ServiceError::Internal("conversion worker pool is closed".into()))?;

    let engine = state.engine.clone();
    let stylesheet = state.stylesheet.clone();
    let engine_deadline = deadline.into_std();
    let task = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        convert(&raw, &stylesheet, engine.as_ref(), Some(engine_deadline))
    });

    match tokio::time::timeout_at(deadline, task).await {
        Ok(Ok(Ok(document))) => Ok(document),
        Ok(Ok(Err(ConvertError::Render(RenderError::TimedOut)))) | Err(_) => {
            Err(ServiceError::Timeout(timeout_secs))
        }
        Ok(Ok(Err(e))) => Err(e.into()),
        Ok(Err(e)) => Err(ServiceError::Internal(format!("conversion task failed: {e}"))),
    }
}

fn pdf_response(document: RenderedDocument) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", document.filename);

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    )
        .into_response()
}
