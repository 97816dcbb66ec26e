// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reference-safe removal primitive.
//!
//! Every pass that deletes entities routes through here. The two entry
//! points cover the two legitimate shapes of a deletion:
//!
//! - [`retarget_and_remove`]: the victim has a canonical twin; every
//!   referencer is rewritten to point at the twin first.
//! - [`detach_and_remove`]: the victim is being pruned; referencers the
//!   caller marks as incidental are detached (single-value slots become
//!   `$`, list slots shrink), anything else vetoes the removal.
//!
//! In both cases the final `Model::remove` is guarded — a victim with a
//! surviving referencer is refused rather than leaving dangling references.

use ifc_slim_core::{AttributeValue, Model};

use crate::error::Result;

/// Redirect every referencer of `victim` to `replacement` (when given),
/// then remove `victim` from the graph.
///
/// The inverse set is snapshotted before the rewrite loop because each
/// rewrite mutates it.
pub fn retarget_and_remove(model: &mut Model, victim: u32, replacement: Option<u32>) -> Result<()> {
    if let Some(canonical) = replacement {
        for referencer in model.inverse_of(victim) {
            model.replace_attribute(referencer, victim, canonical)?;
        }
    }
    model.remove(victim)?;
    Ok(())
}

/// Prune `victim`: detach it from every referencer the predicate accepts as
/// incidental, then remove it. Any other referencer vetoes the removal and
/// the graph is left untouched.
///
/// A relationship referencer whose membership list runs empty after the
/// detach is dead glue and is dropped along with the victim.
///
/// Returns whether the victim was removed.
pub fn detach_and_remove(
    model: &mut Model,
    victim: u32,
    is_incidental: impl Fn(&Model, u32) -> bool,
) -> Result<bool> {
    let referencers = model.inverse_of(victim);
    if referencers.iter().any(|&r| !is_incidental(model, r)) {
        tracing::debug!(victim, "removal vetoed by live referencer");
        return Ok(false);
    }

    for referencer in referencers {
        model.detach_attribute(referencer, victim)?;
        drop_if_empty_relation(model, referencer)?;
    }
    model.remove(victim)?;
    Ok(true)
}

/// Remove a relationship whose membership list has run empty, provided
/// nothing references the relationship itself.
fn drop_if_empty_relation(model: &mut Model, rel: u32) -> Result<()> {
    let Some(entity) = model.get(rel) else {
        return Ok(());
    };
    if entity.ifc_type.rel_kind().is_none() {
        return Ok(());
    }
    let has_empty_membership = entity
        .attributes
        .iter()
        .any(|attr| matches!(attr, AttributeValue::List(items) if items.is_empty()));
    if has_empty_membership && !model.has_inverse(rel) {
        model.remove(rel)?;
    }
    Ok(())
}
