//! Template merge and engine invocation

use crate::engine::{EngineConfig, EngineStatus, PdfEngine};
use crate::error::RenderError;
use crate::template::{DEFAULT_STYLESHEET, assemble_document};
use crate::types::{MessageMetadata, RenderableBody};
use std::time::Instant;
use tracing::debug;

/// `@page` rule matching the engine's page settings
#[must_use]
pub fn page_rule(config: &EngineConfig) -> String {
    format!(
        "@page {{ size: {}; margin: {}mm; }}\n",
        config.page_size, config.margin_mm
    )
}

/// Built-in stylesheet, the page rule, then any operator-supplied CSS
#[must_use]
pub fn build_stylesheet(config: &EngineConfig, extra: Option<&str>) -> String {
    let mut css = page_rule(config);
    css.push_str(DEFAULT_STYLESHEET);
    if let Some(extra) = extra {
        css.push('\n');
        css.push_str(extra);
    }
    css
}

/// Merge metadata and body into the document template and render it
pub fn render(
    metadata: &MessageMetadata,
    body: &RenderableBody,
    stylesheet: &str,
    engine: &dyn PdfEngine,
    deadline: Option<Instant>,
) -> Result<Vec<u8>, RenderError> {
    if let EngineStatus::Unavailable { reason } = engine.status() {
        return Err(RenderError::EngineUnavailable(reason.clone()));
    }

    let markup = assemble_document(metadata, body.as_str(), stylesheet);
    debug!("Assembled {} bytes of markup for '{}'", markup.len(), metadata.subject);

    let pdf = engine.render_pdf(&markup, deadline)?;
    if pdf.is_empty() {
        return Err(RenderError::InvalidOutput("engine returned no bytes".into()));
    }

    Ok(pdf)
}
