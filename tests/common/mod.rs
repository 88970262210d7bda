#![allow(dead_code)]

use eml2pdf::{EngineStatus, PdfEngine, RenderError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Deterministic engine: wraps the markup in a PDF header and trailer.
/// It ignores deadlines, like an engine that has hung.
pub struct FakeEngine {
    status: EngineStatus,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeEngine {
    pub fn available() -> Self {
        Self {
            status: EngineStatus::Available {
                version: "fake 1.0".into(),
            },
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            status: EngineStatus::Unavailable {
                reason: "wkhtmltopdf could not be executed: not found".into(),
            },
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::available()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PdfEngine for FakeEngine {
    fn name(&self) -> String {
        "fake".to_string()
    }

    fn status(&self) -> &EngineStatus {
        &self.status
    }

    fn render_pdf(&self, markup: &str, _deadline: Option<Instant>) -> Result<Vec<u8>, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        let mut pdf = b"%PDF-1.4\n".to_vec();
        pdf.extend_from_slice(markup.as_bytes());
        pdf.extend_from_slice(b"\n%%EOF\n");
        Ok(pdf)
    }
}

pub const PLAIN_MESSAGE: &[u8] = b"From: a@x.com\r\n\
    To: b@x.com\r\n\
    Subject: Test\r\n\
    Date: Thu, 01 Jan 2025 12:00:00 +0000\r\n\
    \r\n\
    hello world";
