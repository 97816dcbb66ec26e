// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structural-equality deduplication.
//!
//! Groups entities of one type by a derived key, keeps the first occurrence
//! of each key as the canonical survivor, and redirects every referencer of
//! the later duplicates onto it. First-in-file-order wins, so repeated runs
//! on unchanged input pick the same survivors.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use ifc_slim_core::{AttributeValue, Entity, IfcType, Model};

use crate::error::Result;
use crate::remove::retarget_and_remove;

/// IfcShapeRepresentation: ContextOfItems, RepresentationIdentifier,
/// RepresentationType, Items
const SHAPE_ITEMS: usize = 3;

/// Structural key: the type tag plus every attribute value.
///
/// References are keyed by bare identifier at `depth == 0` and expanded
/// through the referenced entity for deeper settings. Depth 0 matches the
/// behavior of keying on a shallow attribute dump: two entities only count
/// as duplicates when their references point at the very same targets.
pub fn structural_key(model: &Model, entity: &Entity, depth: u32) -> String {
    let mut key = String::with_capacity(64);
    key.push_str(entity.ifc_type.name());
    for attr in &entity.attributes {
        key.push('|');
        write_key_value(model, attr, depth, &mut key);
    }
    key
}

fn write_key_value(model: &Model, value: &AttributeValue, depth: u32, out: &mut String) {
    match value {
        AttributeValue::EntityRef(id) => {
            match (depth.checked_sub(1), model.get(*id)) {
                (Some(inner_depth), Some(target)) => {
                    out.push('{');
                    out.push_str(target.ifc_type.name());
                    for attr in &target.attributes {
                        out.push('|');
                        write_key_value(model, attr, inner_depth, out);
                    }
                    out.push('}');
                }
                // depth exhausted or dangling: key on the identifier
                _ => value.write_step(out),
            }
        }
        AttributeValue::List(items) => {
            out.push('(');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_key_value(model, item, depth, out);
            }
            out.push(')');
        }
        AttributeValue::Typed { name, args } => {
            out.push_str(name);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_key_value(model, arg, depth, out);
            }
            out.push(')');
        }
        other => other.write_step(out),
    }
}

/// Merge duplicate instances of `entity_type`, returning how many were
/// removed. First occurrence in by-type order survives as canonical.
pub fn dedupe_by_structural_key(
    model: &mut Model,
    entity_type: &IfcType,
    depth: u32,
) -> Result<usize> {
    let snapshot = model.snapshot_of_type(entity_type);
    let mut canonical: FxHashMap<String, u32> = FxHashMap::default();
    let mut removed = 0;

    for id in snapshot {
        let Some(entity) = model.get(id) else { continue };
        let key = structural_key(model, entity, depth);
        match canonical.get(&key) {
            Some(&survivor) => {
                retarget_and_remove(model, id, Some(survivor))?;
                removed += 1;
            }
            None => {
                canonical.insert(key, id);
            }
        }
    }

    if removed > 0 {
        tracing::info!(entity_type = %entity_type, removed, "merged duplicate entities");
    }
    Ok(removed)
}

/// Merge cartesian points with identical coordinates.
///
/// Coordinates are compared exactly (bit patterns); run the lossy rounding
/// transform first for fuzzy matching.
pub fn merge_cartesian_points(model: &mut Model) -> Result<usize> {
    let snapshot = model.snapshot_of_type(&IfcType::IfcCartesianPoint);
    let mut seen: FxHashMap<SmallVec<[u64; 3]>, u32> = FxHashMap::default();
    let mut removed = 0;

    for id in snapshot {
        let Some(point) = model.get(id) else { continue };
        let Some(coords) = point.coordinates() else { continue };
        let key: SmallVec<[u64; 3]> = coords.iter().map(|c| c.to_bits()).collect();
        match seen.get(&key) {
            Some(&survivor) => {
                retarget_and_remove(model, id, Some(survivor))?;
                removed += 1;
            }
            None => {
                seen.insert(key, id);
            }
        }
    }

    if removed > 0 {
        tracing::info!(removed, "merged cartesian points");
    }
    Ok(removed)
}

/// Merge shape representations that share the same item list.
///
/// Keyed on the Items references alone, so representations differing only
/// in identifier strings still collapse. Per-entity failures are logged and
/// skipped.
pub fn deduplicate_geometry(model: &mut Model) -> usize {
    let snapshot = model.snapshot_of_type(&IfcType::IfcShapeRepresentation);
    let mut seen: FxHashMap<String, u32> = FxHashMap::default();
    let mut removed = 0;

    for id in snapshot {
        let Some(shape) = model.get(id) else { continue };
        let Some(items) = shape.get(SHAPE_ITEMS) else { continue };
        let mut key = String::new();
        items.write_step(&mut key);

        match seen.get(&key) {
            Some(&survivor) => match retarget_and_remove(model, id, Some(survivor)) {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!(shape = id, error = %e, "failed to deduplicate shape representation");
                }
            },
            None => {
                seen.insert(key, id);
            }
        }
    }

    if removed > 0 {
        tracing::info!(removed, "deduplicated shape representations");
    }
    removed
}
