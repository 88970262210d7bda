// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
#![allow(clippy::significant_drop_tightening)]

//! Email to PDF conversion
//!
//! Turns a single RFC 5322 message into a printable PDF: the message is
//! parsed, a displayable body is chosen (HTML first, then plain text, then a
//! placeholder), the headers and body are merged into a styled document, and
//! an external HTML-to-PDF engine renders it in memory.
//!
//! The pipeline is exposed both as a library and as a small HTTP service.
//!
//! # Example
//!
//! ```rust
//! use eml2pdf::{BodySource, extract};
//!
//! let raw = b"From: a@x.com\r\nTo: b@x.com\r\nSubject: Test\r\n\r\nhello world";
//! let message = extract(raw).unwrap();
//!
//! assert_eq!(message.metadata.subject, "Test");
//! assert_eq!(message.body.source, BodySource::PlainText);
//! assert_eq!(message.body.markup, "<pre>hello world</pre>");
//! ```

pub mod api;
pub mod config;
mod convert;
pub mod engine;
mod error;
pub mod filename;
mod parser;
mod render;
mod selection;
pub mod server;
pub mod state;
mod template;
mod types;

pub use convert::convert;
pub use engine::{CommandEngine, EngineConfig, EngineKind, EngineStatus, PDF_MAGIC, PdfEngine};
pub use error::{ConvertError, ParseError, RenderError, Result};
pub use parser::{extract, parse_message};
pub use render::{build_stylesheet, page_rule, render};
pub use selection::{PLACEHOLDER_BODY, placeholder, select_body, wrap_plain_text};
pub use template::{DEFAULT_STYLESHEET, assemble_document, escape_html};
pub use types::*;
