// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP serialization.
//!
//! Writes a model back out as an ISO-10303-21 physical file: the header
//! block captured at load (or a minimal default), one `#id=TYPE(...);` line
//! per entity in ascending id order, and the closing section markers.

use std::fmt::Write;

use crate::model::{Entity, Model};

const DEFAULT_HEADER: &str = "ISO-10303-21;\nHEADER;\nFILE_DESCRIPTION((''),'2;1');\nFILE_NAME('','',(''),(''),'','','');\nFILE_SCHEMA(('IFC4'));\nENDSEC;\nDATA;\n";

const TRAILER: &str = "ENDSEC;\nEND-ISO-10303-21;\n";

/// Serialize the whole model to STEP text
pub fn to_step_string(model: &Model) -> String {
    let mut out = String::with_capacity(model.len() * 64);

    match model.header() {
        Some(header) => {
            out.push_str(header);
            if !header.ends_with('\n') {
                out.push('\n');
            }
        }
        None => out.push_str(DEFAULT_HEADER),
    }

    for id in model.ids_sorted() {
        if let Some(entity) = model.get(id) {
            write_entity_line(entity, &mut out);
        }
    }

    out.push_str(TRAILER);
    out
}

/// Write one entity line: `#id=TYPE(arg,arg,...);`
pub fn write_entity_line(entity: &Entity, out: &mut String) {
    let _ = write!(out, "#{}={}(", entity.id, entity.ifc_type.name());
    for (i, attr) in entity.attributes.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        attr.write_step(out);
    }
    out.push_str(");\n");
}
