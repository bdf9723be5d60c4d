// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The error taxonomy shared by every layer (store, engine, runbook, daemon, cli).

use thiserror::Error;

/// Errors returned by store, engine, and runbook operations.
///
/// Every fallible operation in the system returns `Result<_, Error>` so that
/// the daemon can translate failures into a `Response::Error` uniformly at
/// the process boundary.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("validation error at {location}: {message}")]
    ValidationError { location: String, message: String },

    #[error("store error: {0}")]
    StoreError(String),

    #[error("gateway error: {0}")]
    GatewayError(String),

    #[error("io failure: {0}")]
    IoFailure(#[from] std::io::Error),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound(what.into())
    }

    pub fn invalid_state(what: impl Into<String>) -> Self {
        Error::InvalidState(what.into())
    }

    pub fn validation(location: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ValidationError {
            location: location.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
