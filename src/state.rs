//! State shared across request handlers

use crate::config::Config;
use crate::engine::PdfEngine;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Read-only state shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Probed once at startup
    pub engine: Arc<dyn PdfEngine>,

    /// Full stylesheet, including the page rule and any extra CSS
    pub stylesheet: Arc<str>,

    /// One permit per conversion worker
    pub workers: Arc<Semaphore>,

    pub config: Arc<Config>,
}

impl AppState {
    #[must_use]
    pub fn new(engine: Arc<dyn PdfEngine>, stylesheet: String, config: Config) -> Self {
        let workers = Arc::new(Semaphore::new(
            config.server.max_concurrent_conversions.max(1),
        ));

        Self {
            engine,
            stylesheet: Arc::from(stylesheet),
            workers,
            config: Arc::new(config),
        }
    }
}
