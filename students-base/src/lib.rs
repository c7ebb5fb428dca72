// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Students base library
//!
//! Student record model and the storage engines behind the students API.
//!

pub mod config;
pub mod error;
pub mod model;
pub mod storage;

pub use config::{Logging, LoggingOutput, LoggingRotation, StorageBackend, StorageConfig};
pub use error::Error;
pub use model::{Student, StudentData, StudentId, Subject};
pub use storage::{IdPolicy, SharedStorage, Storage, open_storage};
