// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity resolution trait for looking up and resolving IFC entities

use crate::{AttributeValue, DecodedEntity, EntityId, IfcType};
use std::sync::Arc;

/// Entity lookup and reference resolution
///
/// This trait provides the core functionality for accessing IFC entities
/// and resolving entity references. Implementations should provide O(1)
/// lookup by entity ID.
///
/// A reference to an id that is not present resolves to `None`; callers
/// treat that as absent data, never as an error.
///
/// # Example
///
/// ```ignore
/// use ifc_extract_model::{EntityResolver, EntityId};
///
/// fn storey_name(resolver: &dyn EntityResolver, rel_id: EntityId) -> Option<String> {
///     let rel = resolver.get(rel_id)?;
///     let storey = resolver.resolve_ref(rel.get(5)?)?;
///     storey.get_string(2).map(str::to_string)
/// }
/// ```
pub trait EntityResolver: Send + Sync {
    /// Get entity by ID
    ///
    /// Returns the decoded entity if it exists, wrapped in an Arc for
    /// efficient sharing.
    fn get(&self, id: EntityId) -> Option<Arc<DecodedEntity>>;

    /// Resolve an entity reference from an attribute value
    ///
    /// If the attribute value is an EntityRef, this looks up and returns
    /// the referenced entity.
    fn resolve_ref(&self, attr: &AttributeValue) -> Option<Arc<DecodedEntity>> {
        match attr {
            AttributeValue::EntityRef(id) => self.get(*id),
            _ => None,
        }
    }

    /// Resolve a list of entity references
    ///
    /// Dangling references and non-reference items are dropped.
    fn resolve_ref_list(&self, attr: &AttributeValue) -> Vec<Arc<DecodedEntity>> {
        match attr {
            AttributeValue::List(items) => items
                .iter()
                .filter_map(|item| self.resolve_ref(item))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Get all entities of a specific type, in file order
    fn entities_by_type(&self, ifc_type: &IfcType) -> Vec<Arc<DecodedEntity>>;

    /// Find entities by type name string (case-insensitive)
    fn find_by_type_name(&self, type_name: &str) -> Vec<Arc<DecodedEntity>> {
        self.entities_by_type(&IfcType::parse(type_name))
    }

    /// Count entities of a specific type
    fn count_by_type(&self, ifc_type: &IfcType) -> usize;

    /// Get all entity IDs in file order
    fn all_ids(&self) -> Vec<EntityId>;
}

/// Extension methods for EntityResolver
pub trait EntityResolverExt: EntityResolver {
    /// Resolve an attribute to an entity only if it has the expected type
    fn resolve_typed(
        &self,
        attr: &AttributeValue,
        ifc_type: &IfcType,
    ) -> Option<Arc<DecodedEntity>> {
        self.resolve_ref(attr).filter(|e| &e.ifc_type == ifc_type)
    }
}

// Blanket implementation for all EntityResolver types
impl<T: EntityResolver + ?Sized> EntityResolverExt for T {}
