//! Message parsing and body extraction

use crate::error::{ParseError, Result};
use crate::selection::select_body;
use crate::types::{
    ExtractedMessage, MessageMetadata, MessagePart, NO_SUBJECT, ParsedMessage, UNKNOWN_DATE,
    UNKNOWN_RECIPIENT, UNKNOWN_SENDER,
};
use mailparse::{DispositionType, MailHeader, ParsedMail};
use tracing::{debug, warn};

/// Parse raw message bytes into metadata and an ordered list of leaf parts
pub fn parse_message(raw: &[u8]) -> Result<ParsedMessage> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Err(ParseError::Empty);
    }

    let parsed = mailparse::parse_mail(raw).map_err(|e| ParseError::Structure(e.to_string()))?;

    if parsed.headers.is_empty() {
        return Err(ParseError::Structure("no header fields found".into()));
    }

    let metadata = extract_metadata(&parsed.headers);
    let mut parts = Vec::new();
    collect_parts(&parsed, &mut parts);

    debug!(
        "Parsed message '{}' from {} ({} parts)",
        metadata.subject,
        metadata.sender,
        parts.len()
    );

    Ok(ParsedMessage { metadata, parts })
}

/// Parse raw message bytes and pick the body to render.
///
/// Fails only when the bytes are not a message at all. A message without any
/// displayable part still succeeds, with the placeholder body.
pub fn extract(raw: &[u8]) -> Result<ExtractedMessage> {
    let ParsedMessage { metadata, parts } = parse_message(raw)?;
    let body = select_body(&parts);

    debug!("Selected {} body ({} bytes)", body.source, body.markup.len());

    Ok(ExtractedMessage { metadata, body })
}

fn extract_metadata(headers: &[MailHeader]) -> MessageMetadata {
    MessageMetadata {
        sender: header_or(headers, "from", UNKNOWN_SENDER),
        recipient: header_or(headers, "to", UNKNOWN_RECIPIENT),
        subject: header_or(headers, "subject", NO_SUBJECT),
        date: header_or(headers, "date", UNKNOWN_DATE),
    }
}

fn header_or(headers: &[MailHeader], name: &str, default: &str) -> String {
    headers
        .iter()
        .find(|h| h.get_key().to_lowercase() == name)
        .map(MailHeader::get_value)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Depth-first walk collecting leaves in document order
fn collect_parts(parsed: &ParsedMail, parts: &mut Vec<MessagePart>) {
    if parsed.subparts.is_empty() {
        parts.push(to_part(parsed));
    } else {
        for sub in &parsed.subparts {
            collect_parts(sub, parts);
        }
    }
}

fn to_part(parsed: &ParsedMail) -> MessagePart {
    let content_type = parsed.ctype.mimetype.to_lowercase();
    let disposition = parsed.get_content_disposition();
    let is_attachment = disposition.disposition == DispositionType::Attachment;
    let filename = disposition
        .params
        .get("filename")
        .or_else(|| parsed.ctype.params.get("name"))
        .cloned();

    MessagePart {
        content: decode_text(parsed, &content_type),
        content_type,
        is_attachment,
        filename,
    }
}

/// Decode a text part; anything else, or a part that fails to decode, yields `None`
fn decode_text(parsed: &ParsedMail, content_type: &str) -> Option<String> {
    if !content_type.starts_with("text/") {
        return None;
    }

    match parsed.get_body() {
        Ok(body) => Some(body),
        Err(e) => {
            warn!("Skipping undecodable {} part: {}", content_type, e);
            None
        }
    }
}
