// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: AGPL-3.0-or-later

use students_base::config::{Logging, StorageConfig};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    /// Deployment label, such as `dev` or `production`.
    pub env: String,
    /// TcpListener address for the HTTP server.
    pub http_address: String,
    /// Storage engine settings.
    pub storage: StorageConfig,
    /// Logging parameters.
    pub logging: Logging,
}
