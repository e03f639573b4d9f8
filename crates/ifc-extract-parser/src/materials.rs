// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Material resolution
//!
//! Every way IFC associates a material with an element is classified into a
//! [`MaterialRepresentation`] and normalized into a list of
//! [`MaterialFact`]s whose fractions sum to 1.

use crate::properties::PropertyIndex;
use crate::weights::{constituent_weight, WeightContext};
use ifc_extract_model::{
    AttributeValue, DecodedEntity, EntityId, EntityResolver, IfcType, MaterialFact,
    FRACTION_EPSILON,
};
use std::sync::Arc;

/// Shared inputs of material resolution
#[derive(Clone, Copy)]
pub struct MaterialContext<'a> {
    /// Entity lookups
    pub resolver: &'a dyn EntityResolver,
    /// Property and quantity lookups
    pub properties: &'a PropertyIndex<'a>,
    /// File length unit to metres
    pub length_scale: f64,
}

/// The shapes a relating material can take
#[derive(Clone, Debug)]
pub enum MaterialRepresentation {
    /// IFCMATERIAL
    Single(Arc<DecodedEntity>),
    /// IFCMATERIALLAYERSETUSAGE, holding the layer set it points to
    LayerSetUsage(Arc<DecodedEntity>),
    /// IFCMATERIALLAYERSET associated directly
    LayerSet(Arc<DecodedEntity>),
    /// IFCMATERIALCONSTITUENTSET
    ConstituentSet(Arc<DecodedEntity>),
    /// IFCMATERIALLIST
    List(Arc<DecodedEntity>),
    /// IFCMATERIALPROFILESET, directly or through a usage
    ProfileSet(Arc<DecodedEntity>),
    /// Anything else, or a dangling reference
    Unknown(Option<IfcType>),
}

impl MaterialRepresentation {
    /// Classify the record a RelatingMaterial attribute points to
    pub fn classify(resolver: &dyn EntityResolver, relating: &AttributeValue) -> Self {
        let Some(record) = resolver.resolve_ref(relating) else {
            return Self::Unknown(None);
        };

        // ForLayerSet / ForProfileSet at index 0 of the usages
        let usage_target = |expected: IfcType| {
            record
                .get(0)
                .and_then(|attr| resolver.resolve_ref(attr))
                .filter(|set| set.ifc_type == expected)
        };

        let ifc_type = record.ifc_type.clone();
        match ifc_type {
            IfcType::IfcMaterial => Self::Single(record),
            IfcType::IfcMaterialLayerSet => Self::LayerSet(record),
            IfcType::IfcMaterialLayerSetUsage => match usage_target(IfcType::IfcMaterialLayerSet) {
                Some(set) => Self::LayerSetUsage(set),
                None => Self::Unknown(Some(ifc_type)),
            },
            IfcType::IfcMaterialConstituentSet => Self::ConstituentSet(record),
            IfcType::IfcMaterialList => Self::List(record),
            IfcType::IfcMaterialProfileSet => Self::ProfileSet(record),
            IfcType::IfcMaterialProfileSetUsage => {
                match usage_target(IfcType::IfcMaterialProfileSet) {
                    Some(set) => Self::ProfileSet(set),
                    None => Self::Unknown(Some(ifc_type)),
                }
            }
            other => Self::Unknown(Some(other)),
        }
    }
}

/// Resolve the material facts of one element
///
/// `element` is the object the association targets; constituent weights
/// look at its quantities and properties.
pub fn resolve_materials(
    ctx: &MaterialContext<'_>,
    relating: &AttributeValue,
    element: EntityId,
) -> Vec<MaterialFact> {
    let mut facts = match MaterialRepresentation::classify(ctx.resolver, relating) {
        MaterialRepresentation::Single(material) => {
            vec![MaterialFact::single(material_name(&material))]
        }
        MaterialRepresentation::LayerSetUsage(set) | MaterialRepresentation::LayerSet(set) => {
            layer_facts(ctx, &set)
        }
        MaterialRepresentation::ConstituentSet(set) => constituent_facts(ctx, &set, element),
        MaterialRepresentation::List(list) => list_facts(ctx, &list),
        MaterialRepresentation::ProfileSet(set) => profile_facts(ctx, &set),
        MaterialRepresentation::Unknown(ifc_type) => {
            match ifc_type {
                Some(t) => log::debug!("{}: unsupported material representation {}", element, t),
                None => log::debug!("{}: dangling material reference", element),
            }
            Vec::new()
        }
    };

    merge_same_material(&mut facts);
    normalize_fractions(&mut facts);
    facts
}

/// Name @0 of an IFCMATERIAL
fn material_name(material: &DecodedEntity) -> String {
    material.get_string(0).unwrap_or_default().to_string()
}

/// Layered materials: fraction = thickness / total positive thickness
///
/// IFCMATERIALLAYERSET(MaterialLayers, LayerSetName, ...),
/// IFCMATERIALLAYER(Material, LayerThickness, IsVentilated, Name, ...)
fn layer_facts(ctx: &MaterialContext<'_>, set: &DecodedEntity) -> Vec<MaterialFact> {
    let set_name = set.get_string(1).unwrap_or_default();
    let layers = set
        .get(0)
        .map(|list| ctx.resolver.resolve_ref_list(list))
        .unwrap_or_default();

    let layers: Vec<(Arc<DecodedEntity>, Option<f64>)> = layers
        .into_iter()
        .filter(|layer| layer.ifc_type == IfcType::IfcMaterialLayer)
        .map(|layer| {
            let thickness = layer.get_float(1);
            (layer, thickness)
        })
        .collect();

    let total: f64 = layers
        .iter()
        .filter_map(|(_, thickness)| *thickness)
        .filter(|t| *t > 0.0)
        .sum();

    layers
        .iter()
        .filter_map(|(layer, thickness)| {
            let Some(material) = layer.get(0).and_then(|attr| ctx.resolver.resolve_ref(attr))
            else {
                log::debug!("{}: layer without material skipped", layer.id);
                return None;
            };
            let fraction = match thickness {
                Some(t) if *t > 0.0 && total > 0.0 => t / total,
                _ => 0.0,
            };
            let thickness = thickness.filter(|t| *t > 0.0).map(|t| t * ctx.length_scale);
            Some(
                MaterialFact::new(material_name(&material), fraction, set_name)
                    .with_thickness(thickness)
                    .with_layer_name(layer.get_string(3).map(str::to_string)),
            )
        })
        .collect()
}

/// Constituent sets: weights come from the strategy chain
///
/// IFCMATERIALCONSTITUENTSET(Name, Description, MaterialConstituents),
/// IFCMATERIALCONSTITUENT(Name, Description, Material, Fraction, Category)
fn constituent_facts(
    ctx: &MaterialContext<'_>,
    set: &DecodedEntity,
    element: EntityId,
) -> Vec<MaterialFact> {
    let set_name = set.get_string(0).unwrap_or_default();
    let constituents = set
        .get(2)
        .map(|list| ctx.resolver.resolve_ref_list(list))
        .unwrap_or_default();

    let weighted: Vec<(String, Option<String>, f64)> = constituents
        .iter()
        .filter(|c| c.ifc_type == IfcType::IfcMaterialConstituent)
        .filter_map(|constituent| {
            let material = constituent
                .get(2)
                .and_then(|attr| ctx.resolver.resolve_ref(attr));
            let Some(material) = material else {
                log::debug!("{}: constituent without material skipped", constituent.id);
                return None;
            };
            let name = material_name(&material);
            let constituent_name = constituent.get_string(0).filter(|n| !n.is_empty());

            let weight = constituent_weight(&WeightContext {
                resolver: ctx.resolver,
                properties: ctx.properties,
                element,
                constituent,
                constituent_name,
                material: &material,
                material_name: &name,
            });
            Some((name, constituent_name.map(str::to_string), weight))
        })
        .collect();

    let total: f64 = weighted.iter().map(|(_, _, w)| *w).filter(|w| *w > 0.0).sum();

    weighted
        .into_iter()
        .map(|(name, constituent_name, weight)| {
            let (fraction, thickness) = if weight > 0.0 && total > 0.0 {
                (weight / total, Some(weight * ctx.length_scale))
            } else {
                (0.0, None)
            };
            MaterialFact::new(name, fraction, set_name)
                .with_thickness(thickness)
                .with_layer_name(constituent_name)
        })
        .collect()
}

/// IFCMATERIALLIST(Materials): equal shares
fn list_facts(ctx: &MaterialContext<'_>, list: &DecodedEntity) -> Vec<MaterialFact> {
    list.get(0)
        .map(|materials| ctx.resolver.resolve_ref_list(materials))
        .unwrap_or_default()
        .iter()
        .filter(|m| m.ifc_type == IfcType::IfcMaterial)
        .map(|m| MaterialFact::new(material_name(m), 0.0, ""))
        .collect()
}

/// Profile sets: one equal share per profile material
///
/// IFCMATERIALPROFILESET(Name, Description, MaterialProfiles, ...),
/// IFCMATERIALPROFILE(Name, Description, Material, Profile, ...)
fn profile_facts(ctx: &MaterialContext<'_>, set: &DecodedEntity) -> Vec<MaterialFact> {
    let set_name = set.get_string(0).unwrap_or_default();

    set.get(2)
        .map(|profiles| ctx.resolver.resolve_ref_list(profiles))
        .unwrap_or_default()
        .iter()
        .filter_map(|profile| {
            let material = ctx.resolver.resolve_ref(profile.get(2)?)?;
            Some(
                MaterialFact::new(material_name(&material), 0.0, set_name)
                    .with_layer_name(profile.get_string(0).map(str::to_string)),
            )
        })
        .collect()
}

/// Fold facts naming the same material into the first of them
///
/// Fractions and thicknesses are summed; `count` records how many facts
/// were folded.
pub fn merge_same_material(facts: &mut Vec<MaterialFact>) {
    let mut merged: Vec<MaterialFact> = Vec::with_capacity(facts.len());

    for fact in facts.drain(..) {
        match merged.iter_mut().find(|m| m.name == fact.name) {
            Some(existing) => {
                existing.fraction += fact.fraction;
                existing.count += fact.count;
                existing.thickness = match (existing.thickness, fact.thickness) {
                    (Some(a), Some(b)) => Some(a + b),
                    (a, b) => a.or(b),
                };
                if existing.layer_name.is_none() {
                    existing.layer_name = fact.layer_name;
                }
            }
            None => merged.push(fact),
        }
    }

    *facts = merged;
}

/// Equal split when every fraction is ~0, otherwise rescale to sum 1
pub fn normalize_fractions(facts: &mut [MaterialFact]) {
    if facts.is_empty() {
        return;
    }

    if facts.iter().all(|f| f.fraction.abs() < FRACTION_EPSILON) {
        let share = 1.0 / facts.len() as f64;
        for fact in facts.iter_mut() {
            fact.fraction = share;
        }
        return;
    }

    let sum: f64 = facts.iter().map(|f| f.fraction).sum();
    if (sum - 1.0).abs() > FRACTION_EPSILON {
        for fact in facts.iter_mut() {
            fact.fraction /= sum;
        }
    }
}
