//! CLI argument parsing via clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// A `:root { ... }` block of custom properties.
    Css,
    /// The theme record as JSON.
    Json,
}

/// Derive theme colors from an image.
#[derive(Debug, Parser)]
#[command(name = "backdrop", version)]
pub struct Args {
    /// Image path, `file://` URI, http(s) URL, or a directory holding cover art.
    pub source: String,

    /// Output format.
    #[arg(short = 'f', long = "format", value_enum, default_value_t = Format::Css)]
    pub format: Format,

    /// JSON file overriding extraction settings.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Give up after this many milliseconds and report no palette.
    #[arg(long = "timeout-ms", value_name = "MS")]
    pub timeout_ms: Option<u64>,
}
