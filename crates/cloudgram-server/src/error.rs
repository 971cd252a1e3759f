//! Errors surfaced by the Cloudgram binary.

use std::{io, net::AddrParseError, path::PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use cloudgram::CloudgramError;

/// Fatal and per-request errors of the service and CLI.
#[derive(Debug, Error, Diagnostic)]
pub enum ServerError {
    #[error("Failed to parse TOML configuration: {0}")]
    #[diagnostic(
        code(cloudgram::config::parse),
        help("check the configuration file against the documented sections")
    )]
    ConfigParse(String),

    #[error("Missing configuration file: {}", .0.display())]
    #[diagnostic(code(cloudgram::config::missing))]
    MissingConfig(PathBuf),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(cloudgram::config::invalid))]
    InvalidConfig(String),

    #[error("Invalid listen address `{address}`")]
    #[diagnostic(
        code(cloudgram::server::address),
        help("use an address of the form 127.0.0.1:8000")
    )]
    Address {
        address: String,
        #[source]
        source: AddrParseError,
    },

    #[error("Failed to bind {address}")]
    #[diagnostic(
        code(cloudgram::server::bind),
        help("is another process already listening on this address?")
    )]
    Bind { address: String, message: String },

    #[error("Failed to read diagram specification: {0}")]
    #[diagnostic(code(cloudgram::spec::json))]
    Json(#[from] serde_json::Error),

    #[error("No assistant provider could answer: {0}")]
    #[diagnostic(
        code(cloudgram::assistant::unavailable),
        help("configure at least one [[assistant.providers]] entry with a valid API key")
    )]
    Assistant(String),

    #[error("Background task failed: {0}")]
    #[diagnostic(code(cloudgram::task))]
    Task(String),

    #[error(transparent)]
    #[diagnostic(code(cloudgram::io))]
    Io(#[from] io::Error),

    #[error(transparent)]
    #[diagnostic(code(cloudgram::render))]
    Render(#[from] CloudgramError),
}

impl ServerError {
    /// Whether the error was caused by the request rather than the service.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Json(_) => true,
            Self::Render(err) => err.is_validation(),
            _ => false,
        }
    }
}
