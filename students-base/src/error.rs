// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Error module.
//!

use thiserror::Error;

use serde::{Deserialize, Serialize};

/// Error type.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Error {
    /// No record matches the query key.
    #[error("Not found: {0}")]
    NotFound(String),
    /// Input failed required-field checks.
    #[error("Validation error: {0}")]
    Validation(String),
    /// Identifier is not valid for the active backend.
    #[error("Invalid id: {0}")]
    InvalidId(String),
    /// Backend unreachable.
    #[error("Connection error: {0}")]
    Connection(String),
    /// Malformed statement or constraint violation.
    #[error("Query error: {0}")]
    Query(String),
    /// Networked call exceeded its bound.
    #[error("Timeout error: {0}")]
    Timeout(String),
    /// Missing or malformed configuration.
    #[error("Config error: {0}")]
    Config(String),
    /// Backend not available in this build.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl Error {
    /// True for errors caused by the caller's input rather than the backend.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::Validation(_) | Error::InvalidId(_)
        )
    }
}
