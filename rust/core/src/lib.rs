// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-Slim Core
//!
//! STEP/IFC entity graph built with [nom](https://docs.rs/nom): parser,
//! mutable in-memory model, and writer.
//!
//! ## Overview
//!
//! This crate is the storage engine under the optimization passes:
//!
//! - **STEP Parsing**: tokenization of entity lines into typed attribute
//!   values, with [memchr](https://docs.rs/memchr)-accelerated entity
//!   scanning
//! - **Entity Graph**: every entity owned by a [`Model`] with a by-type
//!   index (insertion order) and an inverse-reference index
//! - **Safe Mutation**: reference rewrites and removals route through the
//!   model so the inverse index can never drift from the attribute data;
//!   removing a still-referenced entity is refused
//! - **Writing**: serialization back to an ISO-10303-21 physical file
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ifc_slim_core::{IfcType, Model};
//!
//! let content = r#"#1=IFCPROJECT('guid',$,$,$,$,$,$,$,$);"#;
//! let mut model = Model::from_step(content)?;
//!
//! for id in model.snapshot_of_type(&IfcType::IfcCartesianPoint) {
//!     println!("point #{} referenced by {:?}", id, model.inverse_of(id));
//! }
//!
//! model.write("out.ifc".as_ref())?;
//! ```

pub mod error;
pub mod model;
pub mod parser;
pub mod schema;
pub mod value;
pub mod writer;

pub use error::{Error, Result};
pub use model::{Entity, Model};
pub use parser::{parse_entity, scan_entity_spans};
pub use schema::{IfcType, RelKind};
pub use value::{format_step_float, AttributeValue};
