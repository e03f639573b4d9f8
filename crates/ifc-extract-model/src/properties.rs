// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property and quantity access for IFC entities

use crate::{AttributeValue, EntityId};
use serde::{Deserialize, Serialize};

/// A single property value with optional unit
#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    /// Property name
    pub name: String,
    /// Nominal value as decoded from the file
    pub value: AttributeValue,
    /// Unit of measurement (if applicable)
    pub unit: Option<String>,
}

impl Property {
    /// Create a new property
    pub fn new(name: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            name: name.into(),
            value,
            unit: None,
        }
    }

    /// Numeric value, looking through typed values like `IFCLENGTHMEASURE(200.)`
    pub fn as_float(&self) -> Option<f64> {
        self.value.as_float()
    }

    /// Boolean value, looking through `IFCBOOLEAN(.T.)`
    pub fn as_bool(&self) -> Option<bool> {
        self.value.as_bool()
    }
}

/// A property set containing multiple properties
#[derive(Clone, Debug, PartialEq)]
pub struct PropertySet {
    /// Entity id of the set
    pub id: EntityId,
    /// Property set name (e.g., "Pset_WallCommon")
    pub name: String,
    /// Properties in this set
    pub properties: Vec<Property>,
}

impl PropertySet {
    /// Get a property by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

/// Quantity types supported in IFC
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantityType {
    /// Linear measurement (IfcQuantityLength)
    Length,
    /// Area measurement (IfcQuantityArea)
    Area,
    /// Volume measurement (IfcQuantityVolume)
    Volume,
    /// Count (IfcQuantityCount)
    Count,
    /// Weight/mass measurement (IfcQuantityWeight)
    Weight,
    /// Time measurement (IfcQuantityTime)
    Time,
}

/// A quantity value with type, in file units
#[derive(Clone, Debug, PartialEq)]
pub struct Quantity {
    /// Entity id of the quantity record
    pub id: EntityId,
    /// Quantity name
    pub name: String,
    /// Numeric value
    pub value: f64,
    /// Type of quantity
    pub quantity_type: QuantityType,
}

/// A named group of quantities (IfcPhysicalComplexQuantity)
#[derive(Clone, Debug, PartialEq)]
pub struct ComplexQuantity {
    /// Entity id of the complex quantity
    pub id: EntityId,
    /// Name, often matching a material constituent
    pub name: String,
    /// Nested simple quantities
    pub quantities: Vec<Quantity>,
}

/// An element quantity set (IfcElementQuantity)
#[derive(Clone, Debug, PartialEq)]
pub struct QuantitySet {
    /// Entity id of the set
    pub id: EntityId,
    /// Set name (e.g., "Qto_WallBaseQuantities")
    pub name: String,
    /// Simple quantities
    pub quantities: Vec<Quantity>,
    /// Complex quantities
    pub complex: Vec<ComplexQuantity>,
}

impl QuantitySet {
    /// Get a simple quantity by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&Quantity> {
        self.quantities
            .iter()
            .find(|q| q.name.eq_ignore_ascii_case(name))
    }
}

/// Property and quantity reader trait
///
/// Property sets come from IfcPropertySet entities and quantity sets from
/// IfcElementQuantity entities, both linked via IfcRelDefinesByProperties.
pub trait PropertyReader: Send + Sync {
    /// Property sets associated with an entity, in file order
    fn property_sets(&self, id: EntityId) -> Vec<PropertySet>;

    /// Quantity sets associated with an entity, in file order
    fn quantity_sets(&self, id: EntityId) -> Vec<QuantitySet>;

    /// Get a specific property by name
    ///
    /// Searches all property sets for the entity and returns the first
    /// property with the matching name.
    fn get_property(&self, id: EntityId, name: &str) -> Option<Property> {
        self.property_sets(id)
            .into_iter()
            .flat_map(|pset| pset.properties)
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Get entity's GlobalId (GUID)
    fn global_id(&self, id: EntityId) -> Option<String>;

    /// Get entity's Name attribute
    fn name(&self, id: EntityId) -> Option<String>;
}
