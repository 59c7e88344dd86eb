//! Harness configuration from environment.

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// JSON file with scoring rule overrides
    pub rules_path: Option<PathBuf>,
    /// Maximum number of teams evaluated at once
    pub workers: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            rules_path: env::var("SCORING_RULES_PATH").ok().map(PathBuf::from),
            workers: env::var("SCORING_WORKERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or_else(default_workers),
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
