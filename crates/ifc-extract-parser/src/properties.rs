// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PropertyReader trait implementation

use ifc_extract_model::{
    AttributeValue, ComplexQuantity, DecodedEntity, EntityId, EntityResolver, IfcType, Property,
    PropertyReader, PropertySet, Quantity, QuantitySet, QuantityType,
};
use rustc_hash::FxHashMap;

/// Index of property and quantity definitions per object
///
/// Built once per session from IFCRELDEFINESBYPROPERTIES and the material
/// property records; reads entities through the borrowed resolver.
pub struct PropertyIndex<'r> {
    resolver: &'r dyn EntityResolver,
    /// object id -> property set ids
    psets: FxHashMap<u32, Vec<EntityId>>,
    /// object id -> element quantity ids
    qsets: FxHashMap<u32, Vec<EntityId>>,
    /// material or constituent id -> material property records
    material_props: FxHashMap<u32, Vec<EntityId>>,
}

impl<'r> PropertyIndex<'r> {
    /// Create a new property index
    pub fn new(resolver: &'r dyn EntityResolver) -> Self {
        let mut psets: FxHashMap<u32, Vec<EntityId>> = FxHashMap::default();
        let mut qsets: FxHashMap<u32, Vec<EntityId>> = FxHashMap::default();

        // RelatedObjects at index 4, RelatingPropertyDefinition at index 5
        for rel in resolver.entities_by_type(&IfcType::IfcRelDefinesByProperties) {
            let Some(related) = rel.get_refs(4) else {
                continue;
            };
            let Some(definition) = rel.get(5).and_then(|attr| resolver.resolve_ref(attr)) else {
                log::debug!("{}: dangling property definition", rel.id);
                continue;
            };

            let index = match definition.ifc_type {
                IfcType::IfcPropertySet => &mut psets,
                IfcType::IfcElementQuantity => &mut qsets,
                _ => continue,
            };
            for object in related {
                index.entry(object.0).or_default().push(definition.id);
            }
        }

        let mut material_props: FxHashMap<u32, Vec<EntityId>> = FxHashMap::default();

        // IFC4: IfcMaterialProperties(Name, Description, Properties, Material)
        for record in resolver.entities_by_type(&IfcType::IfcMaterialProperties) {
            if let Some(material) = record.get_ref(3) {
                material_props.entry(material.0).or_default().push(record.id);
            }
        }
        // IFC2X3: IfcExtendedMaterialProperties(Material, ExtendedProperties, ...)
        for record in resolver.entities_by_type(&IfcType::IfcExtendedMaterialProperties) {
            if let Some(material) = record.get_ref(0) {
                material_props.entry(material.0).or_default().push(record.id);
            }
        }

        log::debug!(
            "property index: {} objects with property sets, {} with quantities",
            psets.len(),
            qsets.len()
        );

        Self {
            resolver,
            psets,
            qsets,
            material_props,
        }
    }

    /// Properties attached to a material or material constituent
    pub fn material_properties(&self, id: EntityId) -> Vec<Property> {
        let Some(records) = self.material_props.get(&id.0) else {
            return Vec::new();
        };

        records
            .iter()
            .filter_map(|record_id| self.resolver.get(*record_id))
            .flat_map(|record| {
                let list = match record.ifc_type {
                    IfcType::IfcExtendedMaterialProperties => record.get(1),
                    _ => record.get(2),
                };
                list.map(|attr| self.read_properties(attr)).unwrap_or_default()
            })
            .collect()
    }

    /// Read the property records referenced by a list attribute
    fn read_properties(&self, list: &AttributeValue) -> Vec<Property> {
        self.resolver
            .resolve_ref_list(list)
            .iter()
            .filter_map(|prop| self.read_property(prop))
            .collect()
    }

    /// Extract a single property from an IfcProperty entity
    fn read_property(&self, prop: &DecodedEntity) -> Option<Property> {
        // Name at index 0, value(s) at index 2
        let name = prop.get_string(0)?.to_string();

        match prop.ifc_type {
            IfcType::IfcPropertySingleValue => {
                let unit = prop.get(3).and_then(|attr| self.unit_label(attr));
                Some(Property {
                    name,
                    value: prop.get(2)?.clone(),
                    unit,
                })
            }
            IfcType::IfcPropertyEnumeratedValue | IfcType::IfcPropertyListValue => {
                Some(Property::new(name, prop.get(2)?.clone()))
            }
            _ => None,
        }
    }

    /// Short label for a unit reference, e.g. "mm" or "FOOT"
    fn unit_label(&self, attr: &AttributeValue) -> Option<String> {
        let unit = self.resolver.resolve_ref(attr)?;

        match unit.ifc_type {
            IfcType::IfcSIUnit => {
                let prefix = match unit.get_enum(2).unwrap_or("") {
                    "MILLI" => "m",
                    "CENTI" => "c",
                    "KILO" => "k",
                    _ => "",
                };
                let name = unit.get_enum(3)?;
                let symbol = match name {
                    "METRE" => "m",
                    "SQUARE_METRE" => "m²",
                    "CUBIC_METRE" => "m³",
                    "GRAM" => "g",
                    _ => name,
                };
                Some(format!("{}{}", prefix, symbol))
            }
            // Name at index 2
            IfcType::IfcConversionBasedUnit => unit.get_string(2).map(str::to_string),
            _ => None,
        }
    }

    /// Extract a simple quantity from an IfcQuantity* entity
    pub fn read_quantity(&self, qty: &DecodedEntity) -> Option<Quantity> {
        let quantity_type = match qty.ifc_type {
            IfcType::IfcQuantityLength => QuantityType::Length,
            IfcType::IfcQuantityArea => QuantityType::Area,
            IfcType::IfcQuantityVolume => QuantityType::Volume,
            IfcType::IfcQuantityCount => QuantityType::Count,
            IfcType::IfcQuantityWeight => QuantityType::Weight,
            IfcType::IfcQuantityTime => QuantityType::Time,
            _ => return None,
        };

        // Name at index 0, value at index 3
        Some(Quantity {
            id: qty.id,
            name: qty.get_string(0)?.to_string(),
            value: qty.get_float(3)?,
            quantity_type,
        })
    }

    /// Extract an IfcPhysicalComplexQuantity with its simple members
    pub fn read_complex_quantity(&self, complex: &DecodedEntity) -> Option<ComplexQuantity> {
        if complex.ifc_type != IfcType::IfcPhysicalComplexQuantity {
            return None;
        }

        // Name at index 0, HasQuantities at index 2
        let quantities = complex
            .get(2)
            .map(|list| self.resolver.resolve_ref_list(list))
            .unwrap_or_default()
            .iter()
            .filter_map(|qty| self.read_quantity(qty))
            .collect();

        Some(ComplexQuantity {
            id: complex.id,
            name: complex.get_string(0).unwrap_or_default().to_string(),
            quantities,
        })
    }

    /// Extract quantities from an IfcElementQuantity entity
    fn read_quantity_set(&self, qset: &DecodedEntity) -> QuantitySet {
        let mut quantities = Vec::new();
        let mut complex = Vec::new();

        // Quantities at index 5
        if let Some(list) = qset.get(5) {
            for member in self.resolver.resolve_ref_list(list) {
                if let Some(quantity) = self.read_quantity(&member) {
                    quantities.push(quantity);
                } else if let Some(nested) = self.read_complex_quantity(&member) {
                    complex.push(nested);
                }
            }
        }

        QuantitySet {
            id: qset.id,
            // Name at index 2
            name: qset.get_string(2).unwrap_or_default().to_string(),
            quantities,
            complex,
        }
    }
}

impl PropertyReader for PropertyIndex<'_> {
    fn property_sets(&self, id: EntityId) -> Vec<PropertySet> {
        let Some(ids) = self.psets.get(&id.0) else {
            return Vec::new();
        };

        ids.iter()
            .filter_map(|pset_id| self.resolver.get(*pset_id))
            .map(|pset| PropertySet {
                id: pset.id,
                // Name at index 2, HasProperties at index 4
                name: pset.get_string(2).unwrap_or_default().to_string(),
                properties: pset
                    .get(4)
                    .map(|list| self.read_properties(list))
                    .unwrap_or_default(),
            })
            .collect()
    }

    fn quantity_sets(&self, id: EntityId) -> Vec<QuantitySet> {
        let Some(ids) = self.qsets.get(&id.0) else {
            return Vec::new();
        };

        ids.iter()
            .filter_map(|qset_id| self.resolver.get(*qset_id))
            .map(|qset| self.read_quantity_set(&qset))
            .collect()
    }

    fn global_id(&self, id: EntityId) -> Option<String> {
        let entity = self.resolver.get(id)?;
        // GlobalId is at index 0 for rooted entities
        entity.get_string(0).map(str::to_string)
    }

    fn name(&self, id: EntityId) -> Option<String> {
        let entity = self.resolver.get(id)?;
        // Name is at index 2 for rooted entities
        entity.get_string(2).map(str::to_string)
    }
}
