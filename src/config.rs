// src/config.rs

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use dotenvy::dotenv;

#[derive(Debug, Clone)]
pub struct Config {
    pub rust_log: String,
    pub bind_addr: SocketAddr,
    pub log_dir: String,
    /// Optional JSON rules file; the built-in policy is used when unset.
    pub policy_rules_path: Option<PathBuf>,
    /// Upper bound on long-description input, in characters.
    pub max_description_chars: usize,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .expect("BIND_ADDR must be a valid socket address");

        let log_dir = env::var("LOG_DIR")
            .unwrap_or_else(|_| "logs".to_string());

        let policy_rules_path = env::var("POLICY_RULES_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let max_description_chars = env::var("MAX_DESCRIPTION_CHARS")
            .ok()
            .map(|v| v.parse().expect("MAX_DESCRIPTION_CHARS must be a number"))
            .unwrap_or(100_000);

        Self {
            rust_log,
            bind_addr,
            log_dir,
            policy_rules_path,
            max_description_chars,
        }
    }
}
