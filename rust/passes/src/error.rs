// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the optimization pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, OptimizeError>;

/// Fatal pipeline failures. Per-entity trouble inside a pass is logged and
/// skipped instead; only load, conversion, configuration and write problems
/// abort the run.
#[derive(Error, Debug)]
pub enum OptimizeError {
    #[error("model error: {0}")]
    Model(#[from] ifc_slim_core::Error),

    #[error("schema conversion failed: {0}")]
    SchemaConversion(String),

    #[error("schema conversion requested but no migrator is configured")]
    NoMigrator,

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OptimizeError {
    /// I/O error carrying the offending path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OptimizeError::Io {
            path: path.into(),
            source,
        }
    }
}
