/// Configuration management for the photo-sharing backend.
/// Handles command-line argument parsing and config structure.
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "Photoshare Server")]
#[command(about = "Photo-sharing social backend", long_about = None)]
pub struct Config {
    /// Server port (default: 3001)
    #[arg(long, default_value = "3001")]
    pub port: u16,

    /// SQLite database file path (default: photoshare.db)
    #[arg(long, default_value = "photoshare.db")]
    pub database: PathBuf,

    /// Secret used to sign and verify bearer tokens
    #[arg(long, env = "JWT_SECRET", default_value = "photoshare-dev-secret")]
    pub jwt_secret: String,

    /// Bearer token lifetime in seconds (default: 24h)
    #[arg(long, default_value = "86400")]
    pub token_ttl_secs: i64,

    /// PID file path (optional) - write server PID to this file on startup
    #[arg(long)]
    pub pidfile: Option<PathBuf>,
}

impl Config {
    /// Parse command-line arguments into Config
    pub fn from_args() -> Self {
        Config::parse()
    }
}
