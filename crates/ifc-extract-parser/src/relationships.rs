// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Relationship resolution
//!
//! One pass over the relationship records of a completed store builds a
//! [`RelationshipEntry`] per related object.

use crate::materials::{resolve_materials, MaterialContext};
use ifc_extract_model::{
    DecodedEntity, EntityId, EntityResolver, IfcType, MaterialFact, UNKNOWN_STOREY,
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

/// What the relationship records say about one object
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RelationshipEntry {
    /// From IFCRELASSOCIATESMATERIAL
    pub materials: Vec<MaterialFact>,
    /// From IFCRELCONTAINEDINSPATIALSTRUCTURE
    pub spatial_structure: Option<EntityId>,
    /// From IFCRELAGGREGATES
    pub aggregate_parents: BTreeSet<EntityId>,
    /// From IFCRELDEFINESBYTYPE
    pub defining_type: Option<EntityId>,
}

/// Relationship entries keyed by object id
///
/// When several records set the same slice of one object (materials,
/// spatial structure or defining type), the record that comes last in the
/// file wins. Aggregate parents accumulate.
#[derive(Debug, Default)]
pub struct RelationshipIndex {
    entries: FxHashMap<u32, RelationshipEntry>,
}

impl RelationshipIndex {
    /// Build the index from the relationship records of `ctx.resolver`,
    /// in file order
    pub fn build(ctx: &MaterialContext<'_>) -> Self {
        let resolver = ctx.resolver;
        let mut index = Self::default();

        let relationships: Vec<Arc<DecodedEntity>> = resolver
            .all_ids()
            .into_iter()
            .filter_map(|id| resolver.get(id))
            .filter(|entity| {
                matches!(
                    entity.ifc_type,
                    IfcType::IfcRelAssociatesMaterial
                        | IfcType::IfcRelContainedInSpatialStructure
                        | IfcType::IfcRelAggregates
                        | IfcType::IfcRelDefinesByType
                )
            })
            .collect();

        for rel in &relationships {
            match rel.ifc_type {
                IfcType::IfcRelAssociatesMaterial => index.add_material(ctx, rel),
                IfcType::IfcRelContainedInSpatialStructure => index.add_containment(resolver, rel),
                IfcType::IfcRelAggregates => index.add_aggregation(resolver, rel),
                IfcType::IfcRelDefinesByType => index.add_type(resolver, rel),
                _ => {}
            }
        }

        log::debug!(
            "relationship index: {} relationships, {} objects",
            relationships.len(),
            index.entries.len()
        );
        index
    }

    /// Referenced ids at `index` that exist in the store
    fn existing_refs(
        resolver: &dyn EntityResolver,
        rel: &DecodedEntity,
        index: usize,
    ) -> Vec<EntityId> {
        rel.get_refs(index)
            .unwrap_or_default()
            .into_iter()
            .filter(|id| {
                let exists = resolver.get(*id).is_some();
                if !exists {
                    log::debug!("{}: dangling related object {}", rel.id, id);
                }
                exists
            })
            .collect()
    }

    /// Single referenced id at `index` that exists in the store
    fn existing_ref(
        resolver: &dyn EntityResolver,
        rel: &DecodedEntity,
        index: usize,
    ) -> Option<EntityId> {
        let id = rel.get_ref(index)?;
        if resolver.get(id).is_none() {
            log::debug!("{}: dangling relating object {}", rel.id, id);
            return None;
        }
        Some(id)
    }

    /// IFCRELASSOCIATESMATERIAL: RelatedObjects @4, RelatingMaterial @5
    fn add_material(&mut self, ctx: &MaterialContext<'_>, rel: &DecodedEntity) {
        let Some(relating) = rel.get(5) else {
            return;
        };

        for object in Self::existing_refs(ctx.resolver, rel, 4) {
            let facts = resolve_materials(ctx, relating, object);
            if facts.is_empty() {
                continue;
            }
            self.entry(object).materials = facts;
        }
    }

    /// IFCRELCONTAINEDINSPATIALSTRUCTURE: RelatedElements @4, RelatingStructure @5
    fn add_containment(&mut self, resolver: &dyn EntityResolver, rel: &DecodedEntity) {
        let Some(structure) = Self::existing_ref(resolver, rel, 5) else {
            return;
        };
        for element in Self::existing_refs(resolver, rel, 4) {
            self.entry(element).spatial_structure = Some(structure);
        }
    }

    /// IFCRELAGGREGATES: RelatingObject @4, RelatedObjects @5
    fn add_aggregation(&mut self, resolver: &dyn EntityResolver, rel: &DecodedEntity) {
        let Some(parent) = Self::existing_ref(resolver, rel, 4) else {
            return;
        };
        for child in Self::existing_refs(resolver, rel, 5) {
            self.entry(child).aggregate_parents.insert(parent);
        }
    }

    /// IFCRELDEFINESBYTYPE: RelatedObjects @4, RelatingType @5
    fn add_type(&mut self, resolver: &dyn EntityResolver, rel: &DecodedEntity) {
        let Some(type_object) = Self::existing_ref(resolver, rel, 5) else {
            return;
        };
        for object in Self::existing_refs(resolver, rel, 4) {
            self.entry(object).defining_type = Some(type_object);
        }
    }

    fn entry(&mut self, id: EntityId) -> &mut RelationshipEntry {
        self.entries.entry(id.0).or_default()
    }

    /// Entry of an object, if any relationship mentions it
    pub fn get(&self, id: EntityId) -> Option<&RelationshipEntry> {
        self.entries.get(&id.0)
    }

    /// Number of objects with an entry
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no relationship was found
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Materials of an element, falling back to those of its defining type
    pub fn materials(&self, id: EntityId) -> &[MaterialFact] {
        let Some(entry) = self.get(id) else {
            return &[];
        };
        if !entry.materials.is_empty() {
            return &entry.materials;
        }
        entry
            .defining_type
            .and_then(|type_id| self.get(type_id))
            .map(|type_entry| type_entry.materials.as_slice())
            .unwrap_or(&[])
    }

    /// Storey of an element
    ///
    /// Breadth-first walk from the element through its spatial structure and
    /// aggregate parents until an IFCBUILDINGSTOREY is reached, so elements
    /// in a space or parts of an aggregate find the storey above them.
    pub fn storey(
        &self,
        resolver: &dyn EntityResolver,
        id: EntityId,
    ) -> Option<Arc<DecodedEntity>> {
        let mut queue = VecDeque::from([id]);
        let mut visited = FxHashSet::default();
        visited.insert(id);

        while let Some(current) = queue.pop_front() {
            if current != id {
                if let Some(entity) = resolver.get(current) {
                    if entity.ifc_type == IfcType::IfcBuildingStorey {
                        return Some(entity);
                    }
                }
            }

            let Some(entry) = self.get(current) else {
                continue;
            };
            let next = entry
                .spatial_structure
                .iter()
                .chain(entry.aggregate_parents.iter());
            for parent in next {
                if visited.insert(*parent) {
                    queue.push_back(*parent);
                }
            }
        }

        None
    }

    /// Display name of an element's storey, or [`UNKNOWN_STOREY`]
    ///
    /// Uses Name @2, else LongName @7.
    pub fn storey_name(&self, resolver: &dyn EntityResolver, id: EntityId) -> String {
        self.storey(resolver, id)
            .and_then(|storey| {
                [2, 7]
                    .into_iter()
                    .find_map(|i| storey.get_string(i).filter(|s| !s.is_empty()))
                    .map(str::to_string)
            })
            .unwrap_or_else(|| UNKNOWN_STOREY.to_string())
    }
}
