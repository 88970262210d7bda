use anyhow::Context;
use clap::{Parser, Subcommand};
use eml2pdf::{
    CommandEngine, PdfEngine, build_stylesheet, config::Config, server, state::AppState,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "eml2pdf", version, about = "Convert email messages to PDF")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP conversion service (default)
    Serve,

    /// Convert a single .eml file on disk
    Convert {
        /// Message to convert
        input: PathBuf,

        /// Where to write the PDF; defaults to a name derived from the subject
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::load().context("Failed to load configuration")?;

    let extra_css = config
        .extra_stylesheet()
        .context("Failed to read extra stylesheet")?;
    let stylesheet = build_stylesheet(&config.engine, extra_css.as_deref());

    // Probed once; the status is fixed for the life of the process
    let engine = CommandEngine::detect(config.engine.clone());

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            if !engine.status().is_available() {
                tracing::warn!(
                    "Starting in degraded mode: conversions will fail until the engine is installed"
                );
            }
            let state = AppState::new(Arc::new(engine), stylesheet, config);
            server::serve(state).await?;
        }
        Command::Convert { input, output } => {
            let raw = std::fs::read(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let deadline = Instant::now() + config.server.request_timeout();
            let document = tokio::task::spawn_blocking(move || {
                eml2pdf::convert(&raw, &stylesheet, &engine, Some(deadline))
            })
            .await??;

            let output = output.unwrap_or_else(|| PathBuf::from(&document.filename));
            std::fs::write(&output, &document.bytes)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            tracing::info!("PDF written to {} ({} bytes)", output.display(), document.len());
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,eml2pdf=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
