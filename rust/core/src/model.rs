// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mutable in-memory entity graph.
//!
//! Owns every entity of a loaded STEP file plus two derived indexes: the
//! by-type index (insertion order) and the inverse-reference index. The
//! inverse index is only ever updated inside the mutation methods here
//! (`replace_attribute`, `detach_attribute`, `remove`), so passes built on
//! top cannot drive it out of sync with the attribute data.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::path::Path;

use crate::error::{Error, Result};
use crate::parser::{parse_entity, scan_entity_spans};
use crate::schema::IfcType;
use crate::value::AttributeValue;

/// A typed, identified node in the entity graph
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: u32,
    pub ifc_type: IfcType,
    pub attributes: Vec<AttributeValue>,
}

impl Entity {
    /// Create a new entity
    pub fn new(id: u32, ifc_type: IfcType, attributes: Vec<AttributeValue>) -> Self {
        Self {
            id,
            ifc_type,
            attributes,
        }
    }

    /// Get attribute by index
    pub fn get(&self, index: usize) -> Option<&AttributeValue> {
        self.attributes.get(index)
    }

    /// Get entity reference attribute
    pub fn get_ref(&self, index: usize) -> Option<u32> {
        self.get(index).and_then(|v| v.as_entity_ref())
    }

    /// Get string attribute
    pub fn get_string(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(|v| v.as_string())
    }

    /// Get float attribute
    pub fn get_float(&self, index: usize) -> Option<f64> {
        self.get(index).and_then(|v| v.as_float())
    }

    /// Get list attribute
    pub fn get_list(&self, index: usize) -> Option<&[AttributeValue]> {
        self.get(index).and_then(|v| v.as_list())
    }

    /// Numeric coordinates of a cartesian point entity
    pub fn coordinates(&self) -> Option<SmallVec<[f64; 3]>> {
        if self.ifc_type != IfcType::IfcCartesianPoint {
            return None;
        }
        self.get_list(0)?.iter().map(|v| v.as_float()).collect()
    }

    /// Visit every forward reference this entity holds
    pub fn for_each_ref(&self, mut f: impl FnMut(u32)) {
        for attr in &self.attributes {
            attr.for_each_ref(&mut f);
        }
    }
}

/// The entity graph of one STEP file
#[derive(Debug, Default)]
pub struct Model {
    entities: FxHashMap<u32, Entity>,
    /// type tag -> entity ids in insertion (file) order
    by_type: FxHashMap<IfcType, Vec<u32>>,
    /// entity id -> ids of entities referencing it
    inverse: FxHashMap<u32, FxHashSet<u32>>,
    /// raw header block captured at load, reused on write
    header: Option<String>,
}

impl Model {
    /// Load a model from a file on disk
    pub fn open(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_step(&content)
    }

    /// Load a model from STEP text
    pub fn from_step(content: &str) -> Result<Self> {
        let spans = scan_entity_spans(content);

        // keep the header block for write-back; only trust a DATA; marker
        // that sits before the first entity
        let header = content.find("DATA;").and_then(|pos| {
            let end = pos + "DATA;".len();
            match spans.first() {
                Some(&(first, _)) if first < end => None,
                _ => Some(content[..end].to_string()),
            }
        });

        let mut model = Model {
            header,
            ..Model::default()
        };

        for &(start, end) in &spans {
            let (id, ifc_type, attributes) =
                parse_entity(&content[start..end]).map_err(|e| match e {
                    Error::Parse { message, .. } => Error::Parse {
                        offset: start,
                        message,
                    },
                    other => other,
                })?;
            model.insert(Entity::new(id, ifc_type, attributes))?;
        }

        // second pass: referenced-by sets, now that every entity exists
        let mut inverse: FxHashMap<u32, FxHashSet<u32>> = FxHashMap::default();
        for id in model.entities.keys() {
            inverse.entry(*id).or_default();
        }
        for (id, entity) in &model.entities {
            entity.for_each_ref(|target| {
                inverse.entry(target).or_default().insert(*id);
            });
        }
        model.inverse = inverse;

        Ok(model)
    }

    fn insert(&mut self, entity: Entity) -> Result<()> {
        if self.entities.contains_key(&entity.id) {
            return Err(Error::DuplicateId(entity.id));
        }
        self.by_type
            .entry(entity.ifc_type.clone())
            .or_default()
            .push(entity.id);
        self.entities.insert(entity.id, entity);
        Ok(())
    }

    /// Serialize and write the model to a file
    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_step_string())?;
        Ok(())
    }

    /// Serialize the model to STEP text
    pub fn to_step_string(&self) -> String {
        crate::writer::to_step_string(self)
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if the model holds no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Raw header block captured at load
    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    /// Look up an entity by id
    pub fn get(&self, id: u32) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Entities of one exact type, in file order
    pub fn by_type(&self, ifc_type: &IfcType) -> &[u32] {
        self.by_type.get(ifc_type).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Immutable snapshot of the by-type sequence. Every pass that removes
    /// entities mid-iteration must work from one of these, never a live view.
    pub fn snapshot_of_type(&self, ifc_type: &IfcType) -> Vec<u32> {
        self.by_type(ifc_type).to_vec()
    }

    /// All entity ids whose type matches the predicate, ascending
    pub fn ids_of_class(&self, pred: impl Fn(&IfcType) -> bool) -> Vec<u32> {
        let mut ids = Vec::new();
        for (ifc_type, list) in &self.by_type {
            if pred(ifc_type) {
                ids.extend_from_slice(list);
            }
        }
        ids.sort_unstable();
        ids
    }

    /// All live entity ids, ascending
    pub fn ids_sorted(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.entities.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Snapshot of the entities referencing `id`, sorted for deterministic
    /// iteration
    pub fn inverse_of(&self, id: u32) -> Vec<u32> {
        let mut referencers: Vec<u32> = self
            .inverse
            .get(&id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        referencers.sort_unstable();
        referencers
    }

    /// Check whether anything references `id`
    pub fn has_inverse(&self, id: u32) -> bool {
        self.inverse.get(&id).is_some_and(|set| !set.is_empty())
    }

    /// Rewrite every slot of `referencer` that points at `old` so it points
    /// at `new`, keeping both inverse sets consistent.
    /// Returns the number of slots rewritten.
    pub fn replace_attribute(&mut self, referencer: u32, old: u32, new: u32) -> Result<usize> {
        if old == new {
            return Ok(0);
        }
        if !self.entities.contains_key(&new) {
            return Err(Error::EntityNotFound(new));
        }
        let entity = self
            .entities
            .get_mut(&referencer)
            .ok_or(Error::EntityNotFound(referencer))?;

        let mut replaced = 0;
        for attr in &mut entity.attributes {
            replaced += attr.replace_ref(old, new);
        }
        if replaced > 0 {
            if let Some(set) = self.inverse.get_mut(&old) {
                set.remove(&referencer);
            }
            self.inverse.entry(new).or_default().insert(referencer);
        }
        Ok(replaced)
    }

    /// Drop every reference from `referencer` to `target`: single-value
    /// slots become `$`, list slots lose the element.
    /// Returns the number of slots detached.
    pub fn detach_attribute(&mut self, referencer: u32, target: u32) -> Result<usize> {
        let entity = self
            .entities
            .get_mut(&referencer)
            .ok_or(Error::EntityNotFound(referencer))?;

        let mut detached = 0;
        for attr in &mut entity.attributes {
            detached += attr.detach_ref(target);
        }
        if detached > 0 {
            if let Some(set) = self.inverse.get_mut(&target) {
                set.remove(&referencer);
            }
        }
        Ok(detached)
    }

    /// Null out a scalar attribute slot. Refuses slots that hold entity
    /// references (those must go through detach so the inverse index keeps
    /// up). Returns whether the slot was cleared.
    pub fn clear_attribute(&mut self, id: u32, index: usize) -> Result<bool> {
        let entity = self.entities.get_mut(&id).ok_or(Error::EntityNotFound(id))?;
        let Some(slot) = entity.attributes.get_mut(index) else {
            return Ok(false);
        };
        let mut has_ref = false;
        slot.for_each_ref(&mut |_| has_ref = true);
        if has_ref || slot.is_null() {
            return Ok(false);
        }
        *slot = AttributeValue::Null;
        Ok(true)
    }

    /// Remove an entity from the graph.
    ///
    /// Guarded: an entity that is still referenced is refused with
    /// `Error::StillReferenced` — removing it anyway would leave dangling
    /// references, the one corruption this engine exists to prevent.
    pub fn remove(&mut self, id: u32) -> Result<()> {
        let mut referencers: Vec<u32> = self
            .inverse
            .get(&id)
            .map(|set| set.iter().copied().filter(|&r| r != id).collect())
            .unwrap_or_default();
        if !referencers.is_empty() {
            referencers.sort_unstable();
            return Err(Error::StillReferenced { id, referencers });
        }

        let entity = self.entities.remove(&id).ok_or(Error::EntityNotFound(id))?;

        // the removed entity no longer references anything
        entity.for_each_ref(|target| {
            if target == id {
                return;
            }
            if let Some(set) = self.inverse.get_mut(&target) {
                set.remove(&id);
            }
        });

        if let Some(ids) = self.by_type.get_mut(&entity.ifc_type) {
            ids.retain(|&e| e != id);
        }
        self.inverse.remove(&id);
        Ok(())
    }

    /// Every (referencer, missing target) pair in the graph. Empty on a
    /// healthy model; used by tests and debugging.
    pub fn verify_integrity(&self) -> Vec<(u32, u32)> {
        let mut dangling = Vec::new();
        for (id, entity) in &self.entities {
            entity.for_each_ref(|target| {
                if !self.entities.contains_key(&target) {
                    dangling.push((*id, target));
                }
            });
        }
        dangling.sort_unstable();
        dangling
    }
}
