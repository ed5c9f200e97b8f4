//! Shared utilities for stockscope
//!
//! This crate provides common functionality used across the stockscope
//! workspace: tracing setup and process-level configuration.

pub mod config;
pub mod logging;

pub use config::{Config, ConfigError, LogFormat};
pub use logging::{init_tracing, init_tracing_with};
