// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element to shape representation links
//!
//! Geometry is never evaluated; an element only learns which
//! IFCSHAPEREPRESENTATION records describe it.

use ifc_extract_model::{DecodedEntity, EntityId, EntityResolver, EntityResolverExt, IfcType};

/// Shape representation ids of an element, in declaration order
///
/// Follows Representation (@6) to an IFCPRODUCTDEFINITIONSHAPE and its
/// Representations list (@2). Dangling or mistyped links are dropped.
pub fn shape_representations(
    resolver: &dyn EntityResolver,
    element: &DecodedEntity,
) -> Vec<EntityId> {
    let Some(shape) = element
        .get(6)
        .and_then(|attr| resolver.resolve_typed(attr, &IfcType::IfcProductDefinitionShape))
    else {
        return Vec::new();
    };

    shape
        .get(2)
        .map(|list| resolver.resolve_ref_list(list))
        .unwrap_or_default()
        .iter()
        .filter(|rep| rep.ifc_type == IfcType::IfcShapeRepresentation)
        .map(|rep| rep.id)
        .collect()
}
