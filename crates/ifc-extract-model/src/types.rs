// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for IFC data representation
//!
//! This module defines the fundamental types used throughout the extraction
//! pipeline: entity ids, the closed set of interpreted entity types, decoded
//! attribute values and decoded entities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type-safe entity identifier
///
/// Wraps the raw IFC entity ID (e.g., #123 becomes EntityId(123))
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize, Default,
)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        EntityId(id)
    }
}

impl From<EntityId> for u32 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Declares [`IfcType`] from a single table of `Variant => "STEPKEYWORD"` rows,
/// so that parsing, the STEP keyword and the display name never drift apart.
macro_rules! ifc_types {
    ($($variant:ident => $keyword:literal),* $(,)?) => {
        /// IFC entity type enumeration
        ///
        /// Covers the entity types the extractor interprets. Unknown types are
        /// captured with their original (upper-cased) keyword.
        #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
        pub enum IfcType {
            $($variant,)*
            /// Any type the extractor does not interpret
            Unknown(String),
        }

        impl IfcType {
            /// Parse a STEP keyword (case-insensitive)
            pub fn parse(s: &str) -> Self {
                let upper = s.to_ascii_uppercase();
                match upper.as_str() {
                    $($keyword => IfcType::$variant,)*
                    _ => IfcType::Unknown(upper),
                }
            }

            /// STEP keyword as it appears in files, e.g. `IFCWALL`
            pub fn keyword(&self) -> &str {
                match self {
                    $(IfcType::$variant => $keyword,)*
                    IfcType::Unknown(s) => s,
                }
            }

            /// Display name, e.g. `IfcWall`
            pub fn name(&self) -> &str {
                match self {
                    $(IfcType::$variant => stringify!($variant),)*
                    IfcType::Unknown(s) => s,
                }
            }
        }
    };
}

ifc_types! {
    // Spatial structure
    IfcProject => "IFCPROJECT",
    IfcSite => "IFCSITE",
    IfcBuilding => "IFCBUILDING",
    IfcBuildingStorey => "IFCBUILDINGSTOREY",
    IfcSpace => "IFCSPACE",

    // Building elements
    IfcWall => "IFCWALL",
    IfcWallStandardCase => "IFCWALLSTANDARDCASE",
    IfcWallElementedCase => "IFCWALLELEMENTEDCASE",
    IfcCurtainWall => "IFCCURTAINWALL",
    IfcSlab => "IFCSLAB",
    IfcSlabStandardCase => "IFCSLABSTANDARDCASE",
    IfcSlabElementedCase => "IFCSLABELEMENTEDCASE",
    IfcRoof => "IFCROOF",
    IfcBeam => "IFCBEAM",
    IfcBeamStandardCase => "IFCBEAMSTANDARDCASE",
    IfcColumn => "IFCCOLUMN",
    IfcColumnStandardCase => "IFCCOLUMNSTANDARDCASE",
    IfcDoor => "IFCDOOR",
    IfcDoorStandardCase => "IFCDOORSTANDARDCASE",
    IfcWindow => "IFCWINDOW",
    IfcWindowStandardCase => "IFCWINDOWSTANDARDCASE",
    IfcStair => "IFCSTAIR",
    IfcStairFlight => "IFCSTAIRFLIGHT",
    IfcRamp => "IFCRAMP",
    IfcRampFlight => "IFCRAMPFLIGHT",
    IfcRailing => "IFCRAILING",
    IfcCovering => "IFCCOVERING",
    IfcPlate => "IFCPLATE",
    IfcPlateStandardCase => "IFCPLATESTANDARDCASE",
    IfcMember => "IFCMEMBER",
    IfcMemberStandardCase => "IFCMEMBERSTANDARDCASE",
    IfcFooting => "IFCFOOTING",
    IfcPile => "IFCPILE",
    IfcChimney => "IFCCHIMNEY",
    IfcShadingDevice => "IFCSHADINGDEVICE",
    IfcBuildingElementProxy => "IFCBUILDINGELEMENTPROXY",
    IfcBuildingElementPart => "IFCBUILDINGELEMENTPART",
    IfcElementAssembly => "IFCELEMENTASSEMBLY",
    IfcReinforcingBar => "IFCREINFORCINGBAR",
    IfcReinforcingMesh => "IFCREINFORCINGMESH",
    IfcFurnishingElement => "IFCFURNISHINGELEMENT",
    IfcFurniture => "IFCFURNITURE",
    IfcFlowTerminal => "IFCFLOWTERMINAL",
    IfcFlowSegment => "IFCFLOWSEGMENT",
    IfcFlowFitting => "IFCFLOWFITTING",

    // Representations
    IfcProductDefinitionShape => "IFCPRODUCTDEFINITIONSHAPE",
    IfcShapeRepresentation => "IFCSHAPEREPRESENTATION",

    // Relationships
    IfcRelContainedInSpatialStructure => "IFCRELCONTAINEDINSPATIALSTRUCTURE",
    IfcRelAggregates => "IFCRELAGGREGATES",
    IfcRelDefinesByProperties => "IFCRELDEFINESBYPROPERTIES",
    IfcRelDefinesByType => "IFCRELDEFINESBYTYPE",
    IfcRelAssociatesMaterial => "IFCRELASSOCIATESMATERIAL",

    // Properties and quantities
    IfcPropertySet => "IFCPROPERTYSET",
    IfcPropertySingleValue => "IFCPROPERTYSINGLEVALUE",
    IfcPropertyEnumeratedValue => "IFCPROPERTYENUMERATEDVALUE",
    IfcPropertyListValue => "IFCPROPERTYLISTVALUE",
    IfcElementQuantity => "IFCELEMENTQUANTITY",
    IfcQuantityLength => "IFCQUANTITYLENGTH",
    IfcQuantityArea => "IFCQUANTITYAREA",
    IfcQuantityVolume => "IFCQUANTITYVOLUME",
    IfcQuantityCount => "IFCQUANTITYCOUNT",
    IfcQuantityWeight => "IFCQUANTITYWEIGHT",
    IfcQuantityTime => "IFCQUANTITYTIME",
    IfcPhysicalComplexQuantity => "IFCPHYSICALCOMPLEXQUANTITY",

    // Materials
    IfcMaterial => "IFCMATERIAL",
    IfcMaterialLayer => "IFCMATERIALLAYER",
    IfcMaterialLayerSet => "IFCMATERIALLAYERSET",
    IfcMaterialLayerSetUsage => "IFCMATERIALLAYERSETUSAGE",
    IfcMaterialList => "IFCMATERIALLIST",
    IfcMaterialConstituentSet => "IFCMATERIALCONSTITUENTSET",
    IfcMaterialConstituent => "IFCMATERIALCONSTITUENT",
    IfcMaterialProfileSet => "IFCMATERIALPROFILESET",
    IfcMaterialProfileSetUsage => "IFCMATERIALPROFILESETUSAGE",
    IfcMaterialProperties => "IFCMATERIALPROPERTIES",
    IfcExtendedMaterialProperties => "IFCEXTENDEDMATERIALPROPERTIES",

    // Units
    IfcUnitAssignment => "IFCUNITASSIGNMENT",
    IfcSIUnit => "IFCSIUNIT",
    IfcConversionBasedUnit => "IFCCONVERSIONBASEDUNIT",
    IfcMeasureWithUnit => "IFCMEASUREWITHUNIT",
}

impl FromStr for IfcType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(IfcType::parse(s))
    }
}

impl IfcType {
    /// Check if this type is a building element reported by the extractor
    pub fn is_building_element(&self) -> bool {
        matches!(
            self,
            IfcType::IfcWall
                | IfcType::IfcWallStandardCase
                | IfcType::IfcWallElementedCase
                | IfcType::IfcCurtainWall
                | IfcType::IfcSlab
                | IfcType::IfcSlabStandardCase
                | IfcType::IfcSlabElementedCase
                | IfcType::IfcRoof
                | IfcType::IfcBeam
                | IfcType::IfcBeamStandardCase
                | IfcType::IfcColumn
                | IfcType::IfcColumnStandardCase
                | IfcType::IfcDoor
                | IfcType::IfcDoorStandardCase
                | IfcType::IfcWindow
                | IfcType::IfcWindowStandardCase
                | IfcType::IfcStair
                | IfcType::IfcStairFlight
                | IfcType::IfcRamp
                | IfcType::IfcRampFlight
                | IfcType::IfcRailing
                | IfcType::IfcCovering
                | IfcType::IfcPlate
                | IfcType::IfcPlateStandardCase
                | IfcType::IfcMember
                | IfcType::IfcMemberStandardCase
                | IfcType::IfcFooting
                | IfcType::IfcPile
                | IfcType::IfcChimney
                | IfcType::IfcShadingDevice
                | IfcType::IfcBuildingElementProxy
                | IfcType::IfcBuildingElementPart
                | IfcType::IfcElementAssembly
                | IfcType::IfcReinforcingBar
                | IfcType::IfcReinforcingMesh
                | IfcType::IfcFurnishingElement
                | IfcType::IfcFurniture
                | IfcType::IfcFlowTerminal
                | IfcType::IfcFlowSegment
                | IfcType::IfcFlowFitting
        )
    }


    /// Conventional base-quantities set name, e.g. `Qto_WallBaseQuantities`
    ///
    /// The standard-case and elemented-case subtypes share the set of their
    /// supertype.
    pub fn base_quantities_name(&self) -> String {
        let short = self.name().trim_start_matches("Ifc");
        let short = short
            .strip_suffix("StandardCase")
            .or_else(|| short.strip_suffix("ElementedCase"))
            .unwrap_or(short);
        format!("Qto_{}BaseQuantities", short)
    }
}

impl Default for IfcType {
    fn default() -> Self {
        IfcType::Unknown(String::new())
    }
}

impl fmt::Display for IfcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Decoded attribute value
///
/// Represents any value that can appear in an IFC entity's attribute list.
/// References stay a separate variant from numbers at every stage.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum AttributeValue {
    /// Null value ($)
    #[default]
    Null,
    /// Derived value (*)
    Derived,
    /// Entity reference (#123)
    EntityRef(EntityId),
    /// Boolean value (.T. or .F.)
    Bool(bool),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// String value with escapes decoded
    String(String),
    /// Enumeration value (.VALUE.)
    Enum(String),
    /// List of values
    List(Vec<AttributeValue>),
    /// Typed value like IFCLABEL('text')
    TypedValue(String, Vec<AttributeValue>),
}

impl AttributeValue {
    /// Try to get as entity reference
    pub fn as_entity_ref(&self) -> Option<EntityId> {
        match self {
            AttributeValue::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    /// Try to get as string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            AttributeValue::TypedValue(_, args) if !args.is_empty() => args[0].as_string(),
            _ => None,
        }
    }

    /// Try to get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Integer(i) => Some(*i as f64),
            AttributeValue::TypedValue(_, args) if !args.is_empty() => args[0].as_float(),
            _ => None,
        }
    }

    /// Try to get as boolean (`.T.`, `.F.`, `IFCBOOLEAN(.T.)`)
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            AttributeValue::Enum(s) => match s.to_uppercase().as_str() {
                "TRUE" | "T" => Some(true),
                "FALSE" | "F" => Some(false),
                _ => None,
            },
            AttributeValue::TypedValue(_, args) if !args.is_empty() => args[0].as_bool(),
            _ => None,
        }
    }

    /// Try to get as enum string
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            AttributeValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as list
    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(list) => Some(list),
            _ => None,
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

/// Decoded IFC entity
///
/// Represents a fully decoded IFC entity with its ID, type, and attribute values.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedEntity {
    /// Entity ID
    pub id: EntityId,
    /// Entity type
    pub ifc_type: IfcType,
    /// Attribute values in order
    pub attributes: Vec<AttributeValue>,
}

impl DecodedEntity {
    /// Get attribute at index
    pub fn get(&self, index: usize) -> Option<&AttributeValue> {
        self.attributes.get(index)
    }

    /// Get entity reference at index
    pub fn get_ref(&self, index: usize) -> Option<EntityId> {
        self.get(index).and_then(|v| v.as_entity_ref())
    }

    /// Get string at index
    pub fn get_string(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(|v| v.as_string())
    }

    /// Get float at index
    pub fn get_float(&self, index: usize) -> Option<f64> {
        self.get(index).and_then(|v| v.as_float())
    }

    /// Get list at index
    pub fn get_list(&self, index: usize) -> Option<&[AttributeValue]> {
        self.get(index).and_then(|v| v.as_list())
    }

    /// Get enum string at index
    pub fn get_enum(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(|v| v.as_enum())
    }

    /// Get list of entity references at index
    pub fn get_refs(&self, index: usize) -> Option<Vec<EntityId>> {
        self.get_list(index)
            .map(|list| list.iter().filter_map(|v| v.as_entity_ref()).collect())
    }
}

/// Model metadata extracted from IFC header
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// IFC schema version (e.g., "IFC2X3", "IFC4", "IFC4X3")
    pub schema_version: String,
    /// Originating system (CAD application)
    pub originating_system: Option<String>,
    /// Preprocessor version
    pub preprocessor_version: Option<String>,
    /// File name from header
    pub file_name: Option<String>,
    /// File description
    pub file_description: Option<String>,
    /// Author
    pub author: Option<String>,
    /// Organization
    pub organization: Option<String>,
    /// Timestamp
    pub timestamp: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(IfcType::parse("IfcWall"), IfcType::IfcWall);
        assert_eq!(IfcType::parse("IFCWALL"), IfcType::IfcWall);
        assert_eq!(
            IfcType::parse("ifcfoo"),
            IfcType::Unknown("IFCFOO".to_string())
        );
    }

    #[test]
    fn test_keyword_and_name() {
        let t = IfcType::IfcMaterialLayerSetUsage;
        assert_eq!(t.keyword(), "IFCMATERIALLAYERSETUSAGE");
        assert_eq!(t.name(), "IfcMaterialLayerSetUsage");
        assert_eq!(IfcType::parse(t.keyword()), t);
    }

    #[test]
    fn test_base_quantities_name() {
        assert_eq!(
            IfcType::IfcWallStandardCase.base_quantities_name(),
            "Qto_WallBaseQuantities"
        );
        assert_eq!(IfcType::IfcSlab.base_quantities_name(), "Qto_SlabBaseQuantities");
    }

    #[test]
    fn test_as_bool_variants() {
        assert_eq!(AttributeValue::Bool(false).as_bool(), Some(false));
        assert_eq!(AttributeValue::Enum("TRUE".into()).as_bool(), Some(true));
        assert_eq!(AttributeValue::Enum("F".into()).as_bool(), Some(false));
        let typed =
            AttributeValue::TypedValue("IFCBOOLEAN".into(), vec![AttributeValue::Bool(true)]);
        assert_eq!(typed.as_bool(), Some(true));
        assert_eq!(AttributeValue::Enum("UNKNOWN".into()).as_bool(), None);
    }

    #[test]
    fn test_reference_is_not_a_number() {
        let r = AttributeValue::EntityRef(EntityId(12));
        assert_eq!(r.as_float(), None);
        assert_eq!(r.as_entity_ref(), Some(EntityId(12)));
        assert_eq!(AttributeValue::Integer(12).as_entity_ref(), None);
    }
}
