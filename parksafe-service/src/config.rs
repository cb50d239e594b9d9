use clap::{Parser, ValueEnum};
use std::net::SocketAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Runtime settings, from flags or `PARKSAFE_*` environment variables.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "parksafe-service",
    version,
    about = "Parking-ticket risk scoring API for Los Angeles ZIP codes"
)]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "PARKSAFE_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Value of the Access-Control-Allow-Origin header.
    #[arg(long, env = "PARKSAFE_ALLOW_ORIGIN", default_value = "*")]
    pub allow_origin: String,

    #[arg(long, env = "PARKSAFE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Largest accepted request body.
    #[arg(long, env = "PARKSAFE_MAX_BODY_BYTES", default_value_t = 16 * 1024)]
    pub max_body_bytes: usize,

    /// Seconds open connections get to finish after a shutdown signal.
    #[arg(long, env = "PARKSAFE_SHUTDOWN_GRACE_SECS", default_value_t = 5)]
    pub shutdown_grace_secs: u64,
}
