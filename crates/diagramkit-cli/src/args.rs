//! Command-line argument definitions for the diagramkit CLI.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use uuid::Uuid;

/// Command-line arguments for the diagramkit tool
#[derive(Parser, Debug)]
#[command(name = "diagramkit", author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Export a saved diagram as PNG, SVG or normalized JSON
    Export(ExportArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ExportArgs {
    /// Path to the input diagram (JSON)
    pub input: PathBuf,

    #[arg(short, long, value_enum, default_value_t = Format::Png)]
    pub format: Format,

    /// Export only these element ids (comma-separated), with their group
    /// children and frame members
    #[arg(long, value_delimiter = ',')]
    pub selection_only: Vec<Uuid>,

    /// Output path. Defaults to the input path with the format's extension
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Png,
    Svg,
    Json,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Format::Png => "png",
            Format::Svg => "svg",
            Format::Json => "json",
        }
    }
}

impl ExportArgs {
    /// Where the export is written.
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => self.input.with_extension(self.format.extension()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export_with_selection() {
        let id = Uuid::new_v4();
        let other = Uuid::new_v4();
        let args = Args::try_parse_from([
            "diagramkit".to_string(),
            "export".to_string(),
            "board.json".to_string(),
            "--format".to_string(),
            "svg".to_string(),
            "--selection-only".to_string(),
            format!("{id},{other}"),
        ])
        .unwrap();
        let Command::Export(export) = args.command;
        assert_eq!(export.format, Format::Svg);
        assert_eq!(export.selection_only, vec![id, other]);
        assert_eq!(export.output_path(), PathBuf::from("board.svg"));
        assert_eq!(args.log_level, "warn");
    }

    #[test]
    fn test_rejects_malformed_ids() {
        let parsed = Args::try_parse_from([
            "diagramkit",
            "export",
            "board.json",
            "--selection-only",
            "not-a-uuid",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_explicit_output_wins() {
        let args =
            Args::try_parse_from(["diagramkit", "export", "in.json", "-o", "out/diagram.png"])
                .unwrap();
        let Command::Export(export) = args.command;
        assert_eq!(export.format, Format::Png);
        assert_eq!(export.output_path(), PathBuf::from("out/diagram.png"));
    }
}
