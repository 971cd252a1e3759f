//! Command-line interface and HTTP service for Cloudgram.
//!
//! The `cloudgram` binary renders diagrams from the command line or serves
//! them over HTTP, optionally with a language model assistant in front.

pub mod assistant;
pub mod config;
pub mod http;

mod args;
mod error;

pub use args::{Args, Command};
pub use error::ServerError;

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use log::{debug, info, warn};

use cloudgram::{CloudgramError, Renderer, spec::DiagramSpec};

use assistant::LlmAssistant;
use config::Settings;
use http::AppState;

/// Run the Cloudgram CLI application
///
/// Loads the settings, builds the renderer and dispatches the subcommand.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `ServerError` for:
/// - Settings loading errors
/// - Invalid or unreadable specification files
/// - Rendering and file I/O errors
/// - Address binding errors
pub fn run(args: &Args) -> Result<(), ServerError> {
    let mut settings = config::load_settings(args.config.as_ref())?;
    if let Some(output_dir) = &args.output_dir {
        settings = settings.with_output_directory(output_dir);
    }

    let renderer = Renderer::new(settings.render().clone())?;

    match args.command() {
        Command::Serve { listen } => {
            if let Some(listen) = listen {
                settings = settings.with_listen(listen);
            }
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(serve(settings, renderer))
        }
        Command::Render { spec } => {
            let path = render_file(&renderer, &spec)?;
            println!("{}", path.display());
            Ok(())
        }
        Command::Sketch { description } => {
            let path = renderer.classify_and_render(&description)?;
            println!("{}", path.display());
            Ok(())
        }
        Command::Prune => {
            let report = renderer.sweep()?;
            for path in report.removed() {
                println!("removed {}", path.display());
            }
            println!(
                "{} removed, {} kept in {}",
                report.removed().len(),
                report.retained(),
                renderer.output_dir().display()
            );
            Ok(())
        }
    }
}

fn render_file(renderer: &Renderer, path: &Path) -> Result<PathBuf, ServerError> {
    info!(spec_path:? = path; "Rendering specification file");
    let source = fs::read_to_string(path)?;
    let spec: DiagramSpec = serde_json::from_str(&source)?;
    Ok(renderer.render(&spec)?)
}

async fn serve(settings: Settings, renderer: Renderer) -> Result<(), ServerError> {
    let addr = settings.server().listen_addr()?;
    let renderer = Arc::new(renderer);

    sweep_output(Arc::clone(&renderer)).await;
    if let Some(interval) = settings.server().sweep_interval() {
        let renderer = Arc::clone(&renderer);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately; startup already swept.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                sweep_output(Arc::clone(&renderer)).await;
            }
        });
    }

    let mut state = AppState::new(Arc::clone(&renderer));
    if settings.assistant().is_enabled() {
        let assistant = LlmAssistant::new(settings.assistant().providers().to_vec(), renderer);
        info!(assistant:? = assistant; "Assistant enabled");
        state = state.with_assistant(assistant);
    } else {
        info!("No assistant providers configured, assistant disabled");
    }

    http::serve(addr, state).await
}

async fn sweep_output(renderer: Arc<Renderer>) {
    match run_blocking(move || Ok(renderer.sweep()?)).await {
        Ok(report) => debug!(
            removed = report.removed().len(),
            retained = report.retained();
            "Swept output directory"
        ),
        Err(err) => warn!(err:% = err; "Failed to sweep output directory"),
    }
}

/// Runs blocking library work on Tokio's blocking pool.
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T, ServerError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, CloudgramError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| ServerError::Task(err.to_string()))?
        .map_err(ServerError::from)
}
