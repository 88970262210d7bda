//! Document template assembly

use crate::types::MessageMetadata;
use std::fmt::Write;

/// Built-in stylesheet.
///
/// Body markup comes from third-party HTML mail, so images, tables and
/// preformatted blocks are clamped to the page width.
pub const DEFAULT_STYLESHEET: &str = r"
body {
    font-family: Arial, Helvetica, sans-serif;
    font-size: 12px;
    line-height: 1.4;
    color: #222;
    margin: 0;
    padding: 0;
}
.email-header {
    border-bottom: 1px solid #aaa;
    margin-bottom: 20px;
    padding-bottom: 8px;
}
.email-header p {
    margin: 4px 0;
    word-wrap: break-word;
    overflow-wrap: break-word;
}
.email-content {
    width: 100%;
    overflow-wrap: break-word;
    word-wrap: break-word;
}
.email-content img {
    max-width: 100% !important;
    height: auto !important;
}
.email-content table {
    max-width: 100% !important;
    width: auto !important;
    border-collapse: collapse;
    table-layout: auto;
    overflow: hidden;
}
.email-content td,
.email-content th {
    border: none !important;
    overflow: hidden;
    word-wrap: break-word;
}
.email-content pre {
    white-space: pre-wrap;
    word-wrap: break-word;
    font-family: 'Courier New', Courier, monospace;
    font-size: 11px;
}
";

/// Escape the five markup-significant characters
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Build a self-contained HTML document: metadata block above the body.
///
/// Header values are escaped; `body` is embedded verbatim.
#[must_use]
pub fn assemble_document(metadata: &MessageMetadata, body: &str, stylesheet: &str) -> String {
    let mut html = String::with_capacity(body.len() + stylesheet.len() + 1024);

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape_html(&metadata.subject));
    let _ = writeln!(html, "<style>{stylesheet}</style>");
    html.push_str("</head>\n<body>\n<div class=\"email-header\">\n");

    for (label, value) in [
        ("From", &metadata.sender),
        ("To", &metadata.recipient),
        ("Date", &metadata.date),
        ("Subject", &metadata.subject),
    ] {
        let _ = writeln!(html, "<p><b>{label}:</b> {}</p>", escape_html(value));
    }

    html.push_str("</div>\n<div class=\"email-content\">\n");
    html.push_str(body);
    html.push_str("\n</div>\n</body>\n</html>\n");

    html
}
