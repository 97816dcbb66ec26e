// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometric size filter.
//!
//! Volume computation itself is an external collaborator behind
//! [`VolumeSource`]; this pass only decides what to do with the numbers.

use ifc_slim_core::{Entity, IfcType, Model};

use crate::remove::detach_and_remove;

/// IfcElement: GlobalId, OwnerHistory, Name, Description, ObjectType,
/// ObjectPlacement, Representation, Tag
const REPRESENTATION: usize = 6;

/// External geometry collaborator. `None` means the volume is unavailable
/// for this element; the caller must never treat that as "small".
pub trait VolumeSource {
    fn volume(&self, model: &Model, element: &Entity) -> Option<f64>;
}

/// Remove elements whose volume is strictly below `min_volume`.
///
/// Elements without a representation, or whose volume is unavailable or not
/// a number, are skipped — never removed on failure. An element that is
/// still referenced by anything other than relationship membership is kept
/// and the veto logged.
pub fn remove_small_elements(
    model: &mut Model,
    min_volume: f64,
    source: &dyn VolumeSource,
) -> usize {
    let mut removed = 0;
    for id in model.ids_of_class(IfcType::is_element) {
        let Some(element) = model.get(id) else { continue };
        if element.get_ref(REPRESENTATION).is_none() {
            continue;
        }
        let Some(volume) = source.volume(model, element) else {
            continue;
        };
        if !volume.is_finite() || volume >= min_volume {
            continue;
        }

        match detach_and_remove(model, id, relationship_membership) {
            Ok(true) => removed += 1,
            Ok(false) => tracing::debug!(element = id, volume, "small element still referenced, kept"),
            Err(e) => tracing::warn!(element = id, error = %e, "error checking volume removal"),
        }
    }
    if removed > 0 {
        tracing::info!(removed, min_volume, "removed small elements");
    }
    removed
}

fn relationship_membership(model: &Model, referencer: u32) -> bool {
    model
        .get(referencer)
        .is_some_and(|e| e.ifc_type.is_relationship())
}
