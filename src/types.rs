//! Core types flowing through the conversion pipeline

use std::fmt;

pub const UNKNOWN_SENDER: &str = "Unknown Sender";
pub const UNKNOWN_RECIPIENT: &str = "Unknown Recipient";
pub const NO_SUBJECT: &str = "No Subject";
pub const UNKNOWN_DATE: &str = "Unknown Date";

/// The four header fields shown above the body.
///
/// Values are the decoded header text, passed through verbatim. Nothing here
/// is validated as an address or a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageMetadata {
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub date: String,
}

impl Default for MessageMetadata {
    fn default() -> Self {
        Self {
            sender: UNKNOWN_SENDER.to_string(),
            recipient: UNKNOWN_RECIPIENT.to_string(),
            subject: NO_SUBJECT.to_string(),
            date: UNKNOWN_DATE.to_string(),
        }
    }
}

/// One leaf of the MIME tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePart {
    /// Lowercased mime type, e.g. `text/html`
    pub content_type: String,

    /// True when `Content-Disposition: attachment`
    pub is_attachment: bool,

    /// Attachment filename, if the part declares one
    pub filename: Option<String>,

    /// Decoded text; `None` when transfer encoding or charset decoding failed
    pub content: Option<String>,
}

impl MessagePart {
    /// An inline part with decoded content
    pub fn inline(content_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            is_attachment: false,
            filename: None,
            content: Some(content.into()),
        }
    }

    /// An attachment part with decoded content
    pub fn attachment(
        content_type: impl Into<String>,
        filename: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            content_type: content_type.into(),
            is_attachment: true,
            filename: Some(filename.into()),
            content: Some(content.into()),
        }
    }

    #[must_use]
    pub fn is_type(&self, mimetype: &str) -> bool {
        self.content_type == mimetype
    }
}

/// A message reduced to what the renderer needs
#[derive(Debug, Clone)]
pub struct ParsedMessage {
    pub metadata: MessageMetadata,

    /// Leaf parts in document order
    pub parts: Vec<MessagePart>,
}

/// Where the chosen body came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodySource {
    Html,
    PlainText,
    Placeholder,
}

impl fmt::Display for BodySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Html => write!(f, "html"),
            Self::PlainText => write!(f, "plain text"),
            Self::Placeholder => write!(f, "placeholder"),
        }
    }
}

/// Document markup chosen as the message body. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderableBody {
    pub markup: String,
    pub source: BodySource,
}

impl RenderableBody {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.markup
    }
}

/// Metadata plus body, ready for the renderer
#[derive(Debug, Clone)]
pub struct ExtractedMessage {
    pub metadata: MessageMetadata,
    pub body: RenderableBody,
}

/// A rendered PDF and the filename suggested to the client
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub filename: String,
}

impl RenderedDocument {
    #[must_use]
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
