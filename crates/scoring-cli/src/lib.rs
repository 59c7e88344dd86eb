//! Scoring CLI - batch driver for the mission evaluation engine.
//!
//! - `bundle`: JSON loading of missions, submissions and rule overrides
//! - `runner`: parallel per-team evaluation
//! - `config`: environment defaults

pub mod bundle;
pub mod config;
pub mod runner;

pub use bundle::{load_bundle, load_rules, Bundle};
pub use config::Config;
pub use runner::evaluate_all;
