// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data clean-up passes: placeholder properties, metadata, empty attributes.

use ifc_slim_core::{AttributeValue, IfcType, Model};

use crate::error::Result;
use crate::remove::retarget_and_remove;

/// IfcPropertySet: GlobalId, OwnerHistory, Name, Description, HasProperties
const HAS_PROPERTIES: usize = 4;
/// IfcPropertySingleValue: Name, Description, NominalValue, Unit
const NOMINAL_VALUE: usize = 2;

/// Delete single-value properties whose nominal value, stringified and
/// trimmed, equals `placeholder`. A set left empty afterwards is removed
/// whole, along with its defining relations.
///
/// Returns how many properties were deleted.
pub fn remove_placeholder_properties(model: &mut Model, placeholder: &str) -> Result<usize> {
    let mut deleted = 0;
    let mut empty_sets = Vec::new();

    for pset_id in model.snapshot_of_type(&IfcType::IfcPropertySet) {
        let Some(pset) = model.get(pset_id) else { continue };
        let prop_ids: Vec<u32> = pset
            .get_list(HAS_PROPERTIES)
            .map(|items| items.iter().filter_map(|v| v.as_entity_ref()).collect())
            .unwrap_or_default();

        let mut kept = prop_ids.len();
        for prop_id in prop_ids {
            let is_placeholder = model.get(prop_id).is_some_and(|prop| {
                prop.ifc_type == IfcType::IfcPropertySingleValue
                    && nominal_value_text(prop.get(NOMINAL_VALUE))
                        .is_some_and(|text| text.trim() == placeholder)
            });
            if !is_placeholder {
                continue;
            }

            model.detach_attribute(pset_id, prop_id)?;
            deleted += 1;
            kept -= 1;

            // the detached record itself goes too once nothing shares it
            if !model.has_inverse(prop_id) {
                if let Err(e) = model.remove(prop_id) {
                    tracing::warn!(property = prop_id, error = %e, "could not remove placeholder property");
                }
            }
        }

        if kept == 0 {
            empty_sets.push(pset_id);
        }
    }

    for pset_id in empty_sets {
        for referencer in model.inverse_of(pset_id) {
            let defines = model
                .get(referencer)
                .is_some_and(|e| e.ifc_type == IfcType::IfcRelDefinesByProperties);
            if defines {
                if let Err(e) = model.remove(referencer) {
                    tracing::warn!(relation = referencer, error = %e, "could not drop defining relation");
                }
            }
        }
        if model.has_inverse(pset_id) {
            tracing::debug!(pset = pset_id, "emptied property set still referenced, kept");
            continue;
        }
        if let Err(e) = model.remove(pset_id) {
            tracing::warn!(pset = pset_id, error = %e, "could not remove emptied property set");
        }
    }

    if deleted > 0 {
        tracing::info!(deleted, placeholder, "removed placeholder properties");
    }
    Ok(deleted)
}

fn nominal_value_text(value: Option<&AttributeValue>) -> Option<String> {
    fn scalar_text(value: &AttributeValue) -> Option<String> {
        match value {
            AttributeValue::String(s) => Some(s.clone()),
            AttributeValue::Integer(i) => Some(i.to_string()),
            AttributeValue::Float(f) => Some(f.to_string()),
            AttributeValue::Enum(e) => Some(e.clone()),
            _ => None,
        }
    }

    match value? {
        // wrapped measure: IFCTEXT('-'), IFCLABEL('-')
        AttributeValue::Typed { args, .. } => args.first().and_then(scalar_text),
        other => scalar_text(other),
    }
}

/// Keep only the most senior owner history record; every other one is
/// retargeted onto it and removed.
pub fn remove_metadata(model: &mut Model) -> Result<usize> {
    let histories = model.snapshot_of_type(&IfcType::IfcOwnerHistory);
    let Some((&keeper, rest)) = histories.split_first() else {
        return Ok(0);
    };

    let mut removed = 0;
    for &id in rest {
        retarget_and_remove(model, id, Some(keeper))?;
        removed += 1;
    }
    if removed > 0 {
        tracing::info!(removed, keeper, "trimmed owner history records");
    }
    Ok(removed)
}

/// Null out attribute slots holding empty/default scalars: `''`, `0`,
/// `0.0`, `NOTDEFINED`. Only top-level scalar slots are touched; lists and
/// references are left alone.
pub fn remove_empty_attributes(model: &mut Model) -> usize {
    let mut cleared = 0;
    for id in model.ids_sorted() {
        let Some(entity) = model.get(id) else { continue };
        let candidates: Vec<usize> = entity
            .attributes
            .iter()
            .enumerate()
            .filter(|(_, value)| is_empty_default(value))
            .map(|(index, _)| index)
            .collect();

        for index in candidates {
            match model.clear_attribute(id, index) {
                Ok(true) => cleared += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(entity = id, index, error = %e, "error clearing attribute");
                }
            }
        }
    }
    if cleared > 0 {
        tracing::info!(cleared, "cleared empty attributes");
    }
    cleared
}

fn is_empty_default(value: &AttributeValue) -> bool {
    match value {
        AttributeValue::String(s) => s.is_empty(),
        AttributeValue::Integer(i) => *i == 0,
        AttributeValue::Float(f) => *f == 0.0,
        AttributeValue::Enum(e) => e == "NOTDEFINED",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_cleanup_partial() {
        let mut model = Model::from_step(
            r#"
#1=IFCPROPERTYSET('g1',$,'Pset',$,(#2,#3));
#2=IFCPROPERTYSINGLEVALUE('A',$,IFCTEXT('-'),$);
#3=IFCPROPERTYSINGLEVALUE('B',$,IFCTEXT('keep me'),$);
"#,
        )
        .unwrap();

        assert_eq!(remove_placeholder_properties(&mut model, "-").unwrap(), 1);
        assert!(model.get(2).is_none());
        assert!(model.get(3).is_some());
        // the shortened set survives
        assert_eq!(model.get(1).unwrap().get_list(HAS_PROPERTIES).unwrap().len(), 1);
        assert!(model.verify_integrity().is_empty());
    }

    #[test]
    fn test_placeholder_cleanup_empties_whole_set() {
        // every property is the placeholder: the set and its defining
        // relation must be entirely absent afterwards
        let mut model = Model::from_step(
            r#"
#1=IFCPROPERTYSET('g1',$,'Pset',$,(#2,#3));
#2=IFCPROPERTYSINGLEVALUE('A',$,IFCTEXT('-'),$);
#3=IFCPROPERTYSINGLEVALUE('B',$,IFCTEXT(' - '),$);
#4=IFCRELDEFINESBYPROPERTIES('g4',$,$,$,(#5),#1);
#5=IFCWALL('g5',$,$,$,$,$,$,$);
"#,
        )
        .unwrap();

        assert_eq!(remove_placeholder_properties(&mut model, "-").unwrap(), 2);
        for id in [1, 2, 3, 4] {
            assert!(model.get(id).is_none(), "#{} should be gone", id);
        }
        assert!(model.get(5).is_some());
        assert!(model.verify_integrity().is_empty());
    }

    #[test]
    fn test_placeholder_matching_is_exact_after_trim() {
        let mut model = Model::from_step(
            "#1=IFCPROPERTYSET('g',$,'P',$,(#2));\n#2=IFCPROPERTYSINGLEVALUE('A',$,IFCTEXT('--'),$);\n",
        )
        .unwrap();
        assert_eq!(remove_placeholder_properties(&mut model, "-").unwrap(), 0);
        assert!(model.get(2).is_some());
    }

    #[test]
    fn test_remove_metadata_retargets() {
        let mut model = Model::from_step(
            r#"
#1=IFCOWNERHISTORY($,$,$,$,$,$,$,$);
#2=IFCOWNERHISTORY($,$,$,$,$,$,$,$);
#3=IFCWALL('g3',#2,$,$,$,$,$,$);
"#,
        )
        .unwrap();

        assert_eq!(remove_metadata(&mut model).unwrap(), 1);
        assert!(model.get(2).is_none());
        assert_eq!(model.get(3).unwrap().get_ref(1), Some(1));
        assert!(model.verify_integrity().is_empty());
    }

    #[test]
    fn test_remove_empty_attributes() {
        let mut model = Model::from_step(
            "#1=IFCWALL('',$,'',$,'Name',$,$,$);\n#2=IFCCARTESIANPOINT((0.,0.,0.));\n",
        )
        .unwrap();

        // two empty strings cleared; coordinate zeros are inside a list and
        // stay untouched
        assert_eq!(remove_empty_attributes(&mut model), 2);
        assert!(model.get(1).unwrap().get(0).unwrap().is_null());
        assert_eq!(model.get(1).unwrap().get_string(4), Some("Name"));
        assert_eq!(
            model.get(2).unwrap().coordinates().unwrap().as_slice(),
            &[0.0, 0.0, 0.0]
        );
    }
}
