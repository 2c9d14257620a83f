//! Command-line configuration.
//!
//! Every option can also be supplied through a `STATDASH_*` environment variable.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::web::DEFAULT_MAX_UPLOAD_BYTES;

/// Statdash - CSV upload & summary statistics dashboard
///
/// Serves a page that summarizes an uploaded CSV file (or the bundled
/// sample) and the same summary as JSON under /api/data.
///
/// Examples:
///   statdash
///   statdash --bind 0.0.0.0:8080 --upload-dir /var/lib/statdash/uploads
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:5000", env = "STATDASH_BIND")]
    pub bind: SocketAddr,

    /// Directory that receives uploaded CSV files
    #[arg(
        long,
        default_value = "uploads",
        value_name = "DIR",
        env = "STATDASH_UPLOAD_DIR"
    )]
    pub upload_dir: PathBuf,

    /// CSV file shown when no upload has been made
    #[arg(
        long,
        default_value = "data/sample_data.csv",
        value_name = "FILE",
        env = "STATDASH_SAMPLE_FILE"
    )]
    pub sample_file: PathBuf,

    /// Maximum request body size in bytes
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_UPLOAD_BYTES,
        value_name = "BYTES",
        env = "STATDASH_MAX_UPLOAD_BYTES"
    )]
    pub max_upload_bytes: usize,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_upload_bytes == 0 {
            return Err("--max-upload-bytes must be greater than zero".to_string());
        }
        if self.upload_dir.as_os_str().is_empty() {
            return Err("--upload-dir must not be empty".to_string());
        }
        Ok(())
    }

    /// Default filter directive when RUST_LOG is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
