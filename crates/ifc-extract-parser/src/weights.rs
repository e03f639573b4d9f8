// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Constituent weight strategies
//!
//! Material constituents rarely carry a usable weight of their own. The
//! weight is looked up by [`CONSTITUENT_WEIGHT_STRATEGIES`], tried in order
//! until one returns a positive value.

use crate::properties::PropertyIndex;
use ifc_extract_model::{
    ComplexQuantity, DecodedEntity, EntityId, EntityResolver, IfcType, PropertyReader,
    QuantityType,
};

/// Property and quantity names that carry a constituent thickness
pub const THICKNESS_NAMES: [&str; 3] = ["Width", "LayerThickness", "Thickness"];

/// How many ids before a constituent are searched for a length quantity
pub const PRECEDING_QUANTITY_WINDOW: u32 = 5;

/// Everything a strategy may look at
pub struct WeightContext<'a> {
    pub resolver: &'a dyn EntityResolver,
    pub properties: &'a PropertyIndex<'a>,
    /// Element the material is associated with
    pub element: EntityId,
    /// The IFCMATERIALCONSTITUENT record
    pub constituent: &'a DecodedEntity,
    /// Constituent Name, when not empty
    pub constituent_name: Option<&'a str>,
    /// The constituent's IFCMATERIAL
    pub material: &'a DecodedEntity,
    pub material_name: &'a str,
}

impl WeightContext<'_> {
    /// Name used to find records describing this constituent
    fn lookup_name(&self) -> &str {
        self.constituent_name.unwrap_or(self.material_name)
    }
}

/// A weight lookup; `None` passes on to the next strategy
pub type WeightStrategy = fn(&WeightContext<'_>) -> Option<f64>;

/// Weight strategies in the order they are tried
pub const CONSTITUENT_WEIGHT_STRATEGIES: &[(&str, WeightStrategy)] = &[
    ("complex_quantity", complex_quantity),
    ("preceding_length_quantity", preceding_length_quantity),
    ("property_lookup", property_lookup),
    ("layer_by_material_name", layer_by_material_name),
];

/// Weight of a constituent, 0.0 when no strategy finds one
pub fn constituent_weight(ctx: &WeightContext<'_>) -> f64 {
    CONSTITUENT_WEIGHT_STRATEGIES
        .iter()
        .find_map(|(name, strategy)| {
            let weight = strategy(ctx).filter(|w| *w > 0.0)?;
            log::debug!("{}: weight {} from {}", ctx.constituent.id, weight, name);
            Some(weight)
        })
        .unwrap_or(0.0)
}

fn is_thickness_name(name: &str) -> bool {
    THICKNESS_NAMES.iter().any(|n| n.eq_ignore_ascii_case(name))
}

fn thickness_in(complex: &ComplexQuantity) -> Option<f64> {
    complex
        .quantities
        .iter()
        .find(|q| q.quantity_type == QuantityType::Length && is_thickness_name(&q.name))
        .map(|q| q.value)
}

/// A complex quantity named like the constituent, holding a thickness
///
/// The element's own quantity sets are searched before the whole model.
pub fn complex_quantity(ctx: &WeightContext<'_>) -> Option<f64> {
    let target = ctx.lookup_name();
    let matches = |c: &ComplexQuantity| c.name.eq_ignore_ascii_case(target);

    let own = ctx
        .properties
        .quantity_sets(ctx.element)
        .into_iter()
        .flat_map(|qset| qset.complex)
        .filter(|c| matches(c))
        .find_map(|c| thickness_in(&c));
    if own.is_some() {
        return own;
    }

    ctx.resolver
        .entities_by_type(&IfcType::IfcPhysicalComplexQuantity)
        .iter()
        .filter_map(|entity| ctx.properties.read_complex_quantity(entity))
        .filter(|c| matches(c))
        .find_map(|c| thickness_in(&c))
}

/// The nearest IFCQUANTITYLENGTH among the ids just before the constituent
///
/// Some exporters write a constituent's width right before it without
/// linking the two.
pub fn preceding_length_quantity(ctx: &WeightContext<'_>) -> Option<f64> {
    let id = ctx.constituent.id.0;

    (1..=PRECEDING_QUANTITY_WINDOW)
        .filter_map(|offset| id.checked_sub(offset))
        .filter_map(|candidate| ctx.resolver.get(EntityId(candidate)))
        .find(|entity| entity.ifc_type == IfcType::IfcQuantityLength)
        .and_then(|quantity| quantity.get_float(3))
}

/// A thickness property on the constituent, its material, or a property
/// set of the element named like the constituent
pub fn property_lookup(ctx: &WeightContext<'_>) -> Option<f64> {
    let from_material = [ctx.constituent.id, ctx.material.id]
        .into_iter()
        .flat_map(|id| ctx.properties.material_properties(id))
        .find(|p| is_thickness_name(&p.name))
        .and_then(|p| p.as_float());
    if from_material.is_some() {
        return from_material;
    }

    let target = ctx.lookup_name();
    ctx.properties
        .property_sets(ctx.element)
        .into_iter()
        .filter(|pset| pset.name.eq_ignore_ascii_case(target))
        .flat_map(|pset| pset.properties)
        .find(|p| is_thickness_name(&p.name))
        .and_then(|p| p.as_float())
}

/// The thickness of any material layer made of a material with the same name
pub fn layer_by_material_name(ctx: &WeightContext<'_>) -> Option<f64> {
    if ctx.material_name.is_empty() {
        return None;
    }

    ctx.resolver
        .entities_by_type(&IfcType::IfcMaterialLayer)
        .iter()
        .filter(|layer| {
            layer
                .get(0)
                .and_then(|attr| ctx.resolver.resolve_ref(attr))
                .and_then(|m| m.get_string(0).map(|n| n.eq_ignore_ascii_case(ctx.material_name)))
                .unwrap_or(false)
        })
        .find_map(|layer| layer.get_float(1).filter(|t| *t > 0.0))
}
