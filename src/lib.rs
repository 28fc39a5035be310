//! runway library
//!
//! Container entrypoint that resolves a launch target from flags, env, and
//! an optional config file, then execs the web server or dashboard process.

pub mod config;
pub mod launch;

pub use config::{EnvSnapshot, LaunchTarget, LauncherConfig, Overrides};
pub use launch::LaunchPlan;
