// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Schema migration seam.

/// External schema-conversion collaborator: an opaque bytes-in/bytes-out
/// filter targeting a named schema version (e.g. "IFC2X3", "IFC4").
///
/// The pipeline runs it before anything else and treats a failure as fatal;
/// nothing is written in that case.
pub trait SchemaMigrator {
    fn migrate(&self, input: &[u8], target_schema: &str) -> Result<Vec<u8>, String>;
}
