// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while parsing or mutating an entity graph
#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse error at byte {offset}: {message}")]
    Parse { offset: usize, message: String },

    #[error("Entity #{0} not found")]
    EntityNotFound(u32),

    #[error("Duplicate entity id #{0}")]
    DuplicateId(u32),

    /// Removal guard: hard-deleting a still-referenced entity would leave
    /// dangling references, so the model refuses instead.
    #[error("Entity #{id} is still referenced by {referencers:?} and cannot be removed")]
    StillReferenced { id: u32, referencers: Vec<u32> },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a parse error with a byte offset
    pub fn parse(offset: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            offset,
            message: message.into(),
        }
    }
}
