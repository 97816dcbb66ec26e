// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Usage-based pruning.
//!
//! A family of passes sharing one pattern: compute a liveness predicate per
//! entity of a target type over a snapshot of the by-type sequence, then
//! remove the dead set through the guarded removal primitive.

use ifc_slim_core::{AttributeValue, IfcType, Model, RelKind};

use crate::error::Result;
use crate::remove::detach_and_remove;

/// IfcPropertySet: GlobalId, OwnerHistory, Name, Description, HasProperties
const HAS_PROPERTIES: usize = 4;
/// IfcRelContainedInSpatialStructure: ..., RelatedElements, RelatingStructure
const RELATING_STRUCTURE: usize = 5;

/// Remove spaces whose only referencers are their own placement or
/// property-definition relations.
pub fn remove_unused_spaces(model: &mut Model) -> Result<usize> {
    let mut removed = 0;
    for id in model.snapshot_of_type(&IfcType::IfcSpace) {
        if model.get(id).is_none() {
            continue;
        }
        if detach_and_remove(model, id, space_incidental)? {
            removed += 1;
        }
    }
    if removed > 0 {
        tracing::info!(removed, "removed unused spaces");
    }
    Ok(removed)
}

fn space_incidental(model: &Model, referencer: u32) -> bool {
    model.get(referencer).is_some_and(|e| {
        matches!(
            e.ifc_type,
            IfcType::IfcLocalPlacement | IfcType::IfcRelDefinesByProperties
        )
    })
}

/// Remove property sets with no attached properties. Defining relations
/// pointing at such a set are dangling and dropped first; a set that still
/// has any other referencer afterwards is kept.
pub fn remove_unused_property_sets(model: &mut Model) -> usize {
    let mut removed = 0;
    for id in model.snapshot_of_type(&IfcType::IfcPropertySet) {
        let Some(pset) = model.get(id) else { continue };
        let empty = match pset.get(HAS_PROPERTIES) {
            None => true,
            Some(AttributeValue::List(items)) => items.is_empty(),
            Some(value) => value.is_null(),
        };
        if !empty {
            continue;
        }

        for referencer in model.inverse_of(id) {
            let defines = model
                .get(referencer)
                .is_some_and(|e| e.ifc_type == IfcType::IfcRelDefinesByProperties);
            if defines {
                if let Err(e) = model.remove(referencer) {
                    tracing::warn!(relation = referencer, error = %e, "could not drop defining relation");
                }
            }
        }

        if model.has_inverse(id) {
            tracing::debug!(pset = id, "empty property set still referenced, kept");
            continue;
        }
        match model.remove(id) {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!(pset = id, error = %e, "error removing property set"),
        }
    }
    if removed > 0 {
        tracing::info!(removed, "removed unused property sets");
    }
    removed
}

/// Remove materials nothing references
pub fn remove_unused_materials(model: &mut Model) -> usize {
    let removed = prune_unreferenced(model, &IfcType::IfcMaterial);
    if removed > 0 {
        tracing::info!(removed, "removed unused materials");
    }
    removed
}

/// Remove classification references nothing references
pub fn remove_unused_classifications(model: &mut Model) -> usize {
    let removed = prune_unreferenced(model, &IfcType::IfcClassificationReference);
    if removed > 0 {
        tracing::info!(removed, "removed unused classification references");
    }
    removed
}

fn prune_unreferenced(model: &mut Model, entity_type: &IfcType) -> usize {
    let mut removed = 0;
    for id in model.snapshot_of_type(entity_type) {
        if model.has_inverse(id) {
            continue;
        }
        match model.remove(id) {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!(entity = id, error = %e, "error removing entity"),
        }
    }
    removed
}

/// Remove truly unreferenced entities, keeping the protected set: the
/// project root, owner history records, and every structural relationship
/// kind. Structural relationships are exempt by type tag alone — they are
/// glue that legitimately has zero inbound references.
pub fn remove_orphaned_entities(model: &mut Model) -> usize {
    let mut orphans = Vec::new();
    for id in model.ids_sorted() {
        let Some(entity) = model.get(id) else { continue };
        if matches!(
            entity.ifc_type,
            IfcType::IfcProject | IfcType::IfcOwnerHistory
        ) {
            continue;
        }
        if entity
            .ifc_type
            .rel_kind()
            .is_some_and(RelKind::is_structural)
        {
            continue;
        }
        if !model.has_inverse(id) {
            orphans.push(id);
        }
    }

    // an orphan cannot reference another orphan (the target would have an
    // inbound reference), so the collected set removes independently
    let mut removed = 0;
    for id in orphans {
        match model.remove(id) {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!(entity = id, error = %e, "orphan removal skipped"),
        }
    }
    if removed > 0 {
        tracing::info!(removed, "removed orphaned entities");
    }
    removed
}

/// Remove spatial structure elements that contain nothing.
pub fn flatten_spatial_structure(model: &mut Model) -> usize {
    let mut removed = 0;
    for id in model.ids_of_class(IfcType::is_spatial_structure) {
        if model.get(id).is_none() {
            continue;
        }
        let has_contents = model.inverse_of(id).into_iter().any(|referencer| {
            model.get(referencer).is_some_and(|e| {
                e.ifc_type == IfcType::IfcRelContainedInSpatialStructure
                    && e.get_ref(RELATING_STRUCTURE) == Some(id)
            })
        });
        if has_contents {
            continue;
        }
        match detach_and_remove(model, id, spatial_incidental) {
            Ok(true) => removed += 1,
            Ok(false) => {}
            Err(e) => tracing::warn!(spatial = id, error = %e, "error removing spatial element"),
        }
    }
    if removed > 0 {
        tracing::info!(removed, "flattened spatial structure");
    }
    removed
}

fn spatial_incidental(model: &Model, referencer: u32) -> bool {
    model.get(referencer).is_some_and(|e| {
        e.ifc_type.is_relationship() || e.ifc_type == IfcType::IfcLocalPlacement
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_unused_spaces_scenario() {
        // three spaces, two with identical attributes and one different;
        // nothing references them beyond their own placements
        let mut model = Model::from_step(
            r#"
#1=IFCSPACE('ga',$,'Room A',$,$,#10,$,$,.ELEMENT.,.INTERNAL.,$);
#2=IFCSPACE('ga',$,'Room A',$,$,#11,$,$,.ELEMENT.,.INTERNAL.,$);
#3=IFCSPACE('gb',$,'Room B',$,$,#12,$,$,.ELEMENT.,.INTERNAL.,$);
#10=IFCLOCALPLACEMENT($,$);
#11=IFCLOCALPLACEMENT($,$);
#12=IFCLOCALPLACEMENT($,$);
"#,
        )
        .unwrap();

        assert_eq!(remove_unused_spaces(&mut model).unwrap(), 3);
        assert!(model.by_type(&IfcType::IfcSpace).is_empty());
        assert!(model.verify_integrity().is_empty());
    }

    #[test]
    fn test_contained_space_is_kept() {
        let mut model = Model::from_step(
            r#"
#1=IFCSPACE('g',$,$,$,$,$,$,$,.ELEMENT.,.INTERNAL.,$);
#2=IFCRELAGGREGATES('g2',$,$,$,#3,(#1));
#3=IFCBUILDINGSTOREY('g3',$,$,$,$,$,$,$,.ELEMENT.,$);
"#,
        )
        .unwrap();

        assert_eq!(remove_unused_spaces(&mut model).unwrap(), 0);
        assert!(model.get(1).is_some());
    }

    #[test]
    fn test_unused_space_with_defining_relation() {
        // the property relation points only at the space; removing the
        // space takes the emptied relation with it
        let mut model = Model::from_step(
            r#"
#1=IFCSPACE('g',$,$,$,$,$,$,$,.ELEMENT.,.INTERNAL.,$);
#2=IFCRELDEFINESBYPROPERTIES('g2',$,$,$,(#1),#3);
#3=IFCPROPERTYSET('g3',$,'Pset',$,(#4));
#4=IFCPROPERTYSINGLEVALUE('P',$,IFCTEXT('x'),$);
"#,
        )
        .unwrap();

        assert_eq!(remove_unused_spaces(&mut model).unwrap(), 1);
        assert!(model.get(1).is_none());
        assert!(model.get(2).is_none(), "emptied defining relation dropped");
        assert!(model.get(3).is_some(), "property set survives for later passes");
        assert!(model.verify_integrity().is_empty());
    }

    #[test]
    fn test_remove_unused_property_sets() {
        let mut model = Model::from_step(
            r#"
#1=IFCPROPERTYSET('g1',$,'Empty',$,());
#2=IFCRELDEFINESBYPROPERTIES('g2',$,$,$,(#5),#1);
#3=IFCPROPERTYSET('g3',$,'Full',$,(#4));
#4=IFCPROPERTYSINGLEVALUE('P',$,IFCTEXT('x'),$);
#5=IFCWALL('g5',$,$,$,$,$,$,$);
"#,
        )
        .unwrap();

        assert_eq!(remove_unused_property_sets(&mut model), 1);
        assert!(model.get(1).is_none());
        assert!(model.get(2).is_none(), "dangling defining relation removed");
        assert!(model.get(3).is_some());
        assert!(model.get(5).is_some());
        assert!(model.verify_integrity().is_empty());
    }

    #[test]
    fn test_remove_unused_materials() {
        let mut model = Model::from_step(
            r#"
#1=IFCMATERIAL('Concrete');
#2=IFCMATERIAL('Steel');
#3=IFCRELASSOCIATESMATERIAL('g',$,$,$,(),#2);
"#,
        )
        .unwrap();

        assert_eq!(remove_unused_materials(&mut model), 1);
        assert!(model.get(1).is_none());
        assert!(model.get(2).is_some());
    }

    #[test]
    fn test_orphan_pruning_is_conservative() {
        let mut model = Model::from_step(
            r#"
#1=IFCPROJECT('g1',$,$,$,$,$,$,$,$);
#2=IFCOWNERHISTORY($,$,$,$,$,$,$,$);
#3=IFCRELAGGREGATES('g3',$,$,$,#1,(#4));
#4=IFCBUILDING('g4',$,$,$,$,$,$,$,.ELEMENT.,$,$,$);
#5=IFCWALL('g5',$,$,$,$,$,$,$);
#6=IFCRELCONTAINEDINSPATIALSTRUCTURE('g6',$,$,$,(#5),#4);
#7=IFCMATERIAL('Unused');
"#,
        )
        .unwrap();

        let removed = remove_orphaned_entities(&mut model);

        // the unreferenced material is the only orphan: the project and the
        // history are protected, the relationships are structural glue, and
        // the building and wall have inbound references
        assert_eq!(removed, 1);
        assert!(model.get(7).is_none());
        for id in [1, 2, 3, 4, 5, 6] {
            assert!(model.get(id).is_some(), "#{} should survive", id);
        }
        assert!(model.verify_integrity().is_empty());
    }

    #[test]
    fn test_orphan_pruning_drops_nonstructural_relations() {
        let mut model = Model::from_step(
            r#"
#1=IFCMATERIAL('Concrete');
#2=IFCRELASSOCIATESMATERIAL('g',$,$,$,(),#1);
"#,
        )
        .unwrap();

        // the association is not structural and nothing references it
        assert_eq!(remove_orphaned_entities(&mut model), 1);
        assert!(model.get(2).is_none());
        assert!(model.get(1).is_some(), "material still referenced at scan time");
    }

    #[test]
    fn test_flatten_spatial_structure() {
        let mut model = Model::from_step(
            r#"
#1=IFCBUILDINGSTOREY('g1',$,'Empty storey',$,$,$,$,$,.ELEMENT.,$);
#2=IFCBUILDINGSTOREY('g2',$,'Used storey',$,$,$,$,$,.ELEMENT.,$);
#3=IFCWALL('g3',$,$,$,$,$,$,$);
#4=IFCRELCONTAINEDINSPATIALSTRUCTURE('g4',$,$,$,(#3),#2);
"#,
        )
        .unwrap();

        assert_eq!(flatten_spatial_structure(&mut model), 1);
        assert!(model.get(1).is_none());
        assert!(model.get(2).is_some());
        assert!(model.verify_integrity().is_empty());
    }
}
