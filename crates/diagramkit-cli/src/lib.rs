//! DiagramKit CLI library
//!
//! Loads a saved diagram and exports it as PNG, SVG or normalized JSON.

mod args;
pub mod config;

pub use args::{Args, Command, ExportArgs, Format};
pub use config::CliConfig;

use diagramkit_core::{ElementStore, ImportError};
use diagramkit_render::{ExportError, ExportScope, export_png, export_svg};
use log::{info, warn};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to import diagram: {0}")]
    Import(#[from] ImportError),
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
    #[error("Failed to serialize diagram: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Run the parsed command.
pub fn run(args: &Args) -> Result<PathBuf, CliError> {
    match &args.command {
        Command::Export(export) => run_export(export),
    }
}

/// Export one diagram and return the path written.
pub fn run_export(args: &ExportArgs) -> Result<PathBuf, CliError> {
    info!(
        "Processing diagram {} as {:?}",
        args.input.display(),
        args.format
    );
    let config = config::load_config(args.config.as_deref())?;

    let json = fs::read_to_string(&args.input)?;
    let mut store = ElementStore::new();
    store.import_from_json(&json)?;

    let scope = export_scope(&store, args);
    let bytes = match args.format {
        Format::Png => export_png(&store, &scope, &config.renderer)?,
        Format::Svg => export_svg(&store, &scope, &config.renderer)?.into_bytes(),
        Format::Json => {
            if scope != ExportScope::All {
                warn!("--selection-only is ignored for JSON export");
            }
            store.export_to_json()?.into_bytes()
        }
    };

    let output = args.output_path();
    fs::write(&output, &bytes)?;
    info!("Wrote {} bytes to {}", bytes.len(), output.display());
    Ok(output)
}

/// Scope from `--selection-only`. Unknown ids are skipped with a warning; a
/// list that matches nothing exports nothing.
fn export_scope(store: &ElementStore, args: &ExportArgs) -> ExportScope {
    if args.selection_only.is_empty() {
        return ExportScope::All;
    }
    for id in &args.selection_only {
        if !store.contains(*id) {
            warn!("Unknown element id {id}");
        }
    }
    ExportScope::Elements(args.selection_only.clone())
}
