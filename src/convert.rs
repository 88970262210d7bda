//! End-to-end conversion: raw bytes in, PDF out

use crate::engine::PdfEngine;
use crate::error::ConvertError;
use crate::filename::pdf_filename;
use crate::parser::extract;
use crate::render::render;
use crate::types::RenderedDocument;
use chrono::Utc;
use std::time::Instant;
use tracing::info;

/// Convert one message. Synchronous and blocking for the whole engine run,
/// which is cut short at `deadline` when one is given.
pub fn convert(
    raw: &[u8],
    stylesheet: &str,
    engine: &dyn PdfEngine,
    deadline: Option<Instant>,
) -> Result<RenderedDocument, ConvertError> {
    let message = extract(raw)?;
    let bytes = render(&message.metadata, &message.body, stylesheet, engine, deadline)?;
    let filename = pdf_filename(&message.metadata.subject, Utc::now());

    info!(
        "Converted '{}' ({} body) into {} ({} bytes)",
        message.metadata.subject,
        message.body.source,
        filename,
        bytes.len()
    );

    Ok(RenderedDocument { bytes, filename })
}
