//! # Document Analyzer
//!
//! Entry point and configuration for the event-triggered document analyzer.
//!
//! This crate loads configuration, wires the AWS collaborators into the
//! pipeline, and turns storage notifications into document runs.

pub mod config;
pub mod handler;
pub mod trigger;

pub use config::{AnalyzerConfig, Dependencies};
pub use handler::DocumentAnalyzer;

use thiserror::Error;

/// Errors that can occur during analyzer initialization or invocation.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The trigger event could not be decoded.
    #[error("Trigger error: {0}")]
    TriggerError(String),

    /// One or more documents of the invocation failed.
    #[error("Invocation failed: {0}")]
    InvocationFailed(String),
}

impl AnalyzerError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a trigger error.
    pub fn trigger(msg: impl Into<String>) -> Self {
        Self::TriggerError(msg.into())
    }
}
