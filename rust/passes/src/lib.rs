// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-Slim Passes
//!
//! Graph transformation passes and the optimization pipeline for IFC
//! models, on top of the [ifc_slim_core] entity graph.
//!
//! The interesting machinery is the removal primitive in [`remove`]: every
//! pass that deletes entities routes through it, so a deletion either
//! redirects all referencers to a canonical twin, detaches incidental
//! referencers, or is refused — the output graph can never hold a dangling
//! reference.
//!
//! Passes:
//!
//! - [`dedupe`] — structural-equality merging (cartesian points, property
//!   sets, classifications, shape representations)
//! - [`prune`] — unused spaces/property sets/materials/classifications,
//!   orphaned entities, empty spatial structure
//! - [`cleanup`] — placeholder properties, owner-history trim, empty
//!   attribute clearing
//! - [`volume`] — size filter over an external volume collaborator
//! - [`rounding`] — text-level lossy coordinate rounding
//!
//! [`pipeline::optimize`] sequences everything per an [`OptimizeOptions`]
//! configuration and returns per-pass [`Stats`].

pub mod archive;
pub mod cleanup;
pub mod convert;
pub mod dedupe;
pub mod error;
pub mod pipeline;
pub mod prune;
pub mod remove;
pub mod rounding;
pub mod volume;

pub use convert::SchemaMigrator;
pub use error::{OptimizeError, Result};
pub use pipeline::{ifczip_path, optimize, Externals, OptimizeOptions, Stats};
pub use remove::{detach_and_remove, retarget_and_remove};
pub use rounding::round_coordinates;
pub use volume::VolumeSource;
