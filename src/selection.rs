//! Body selection policy
//!
//! The first inline `text/html` part wins. Failing that, the first inline
//! `text/plain` part is escaped and wrapped in `<pre>`. Attachments, blank
//! parts and parts that failed to decode are never candidates. When nothing qualifies the
//! placeholder body is used, so selection itself cannot fail.

use crate::template::escape_html;
use crate::types::{BodySource, MessagePart, RenderableBody};

/// Markup substituted when no part is usable
pub const PLACEHOLDER_BODY: &str = "<p>(No content)</p>";

/// Candidate content types, highest priority first
const PRIORITY: [(&str, BodySource); 2] = [
    ("text/html", BodySource::Html),
    ("text/plain", BodySource::PlainText),
];

/// Pick the body to render from leaf parts in document order
#[must_use]
pub fn select_body(parts: &[MessagePart]) -> RenderableBody {
    PRIORITY
        .iter()
        .find_map(|(mimetype, source)| {
            first_inline(parts, mimetype).map(|content| RenderableBody {
                markup: to_markup(content, *source),
                source: *source,
            })
        })
        .unwrap_or_else(placeholder)
}

/// The placeholder body
#[must_use]
pub fn placeholder() -> RenderableBody {
    RenderableBody {
        markup: PLACEHOLDER_BODY.to_string(),
        source: BodySource::Placeholder,
    }
}

/// Wrap plain text so line breaks and spacing survive rendering
#[must_use]
pub fn wrap_plain_text(text: &str) -> String {
    format!("<pre>{}</pre>", escape_html(text))
}

fn first_inline<'a>(parts: &'a [MessagePart], mimetype: &str) -> Option<&'a str> {
    parts
        .iter()
        .filter(|p| !p.is_attachment && p.is_type(mimetype))
        .find_map(|p| p.content.as_deref().filter(|c| !c.trim().is_empty()))
}

fn to_markup(content: &str, source: BodySource) -> String {
    match source {
        BodySource::PlainText => wrap_plain_text(content),
        BodySource::Html | BodySource::Placeholder => content.to_string(),
    }
}
