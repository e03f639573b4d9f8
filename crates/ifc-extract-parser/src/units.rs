// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unit scale extraction from IFC files

use ifc_extract_model::{AttributeValue, DecodedEntity, EntityResolver, EntityResolverExt, IfcType};
use serde::{Deserialize, Serialize};

/// Scales converting raw file values to canonical SI units
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitScales {
    /// File length unit to metres
    pub length: f64,
    /// File volume unit to cubic metres
    pub volume: f64,
}

impl Default for UnitScales {
    fn default() -> Self {
        Self {
            length: 1.0,
            volume: 1.0,
        }
    }
}

/// Measure kinds the extractor converts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum UnitKind {
    Length,
    Volume,
}

impl UnitKind {
    /// Value of the UnitType enumeration
    fn unit_type(self) -> &'static str {
        match self {
            UnitKind::Length => "LENGTHUNIT",
            UnitKind::Volume => "VOLUMEUNIT",
        }
    }

    /// SI base unit name and the power the prefix is raised to
    fn si_base(self) -> (&'static str, i32) {
        match self {
            UnitKind::Length => ("METRE", 1),
            UnitKind::Volume => ("CUBIC_METRE", 3),
        }
    }
}

/// Extract unit scales from an IFC model
///
/// Reads the project's unit assignment. When it declares no length unit,
/// the first IFCSIUNIT length unit anywhere in the model is used. Missing
/// information leaves a scale of 1.0.
pub fn extract_unit_scales(resolver: &dyn EntityResolver) -> UnitScales {
    let assigned = assigned_units(resolver);

    let length = find_scale(&assigned, UnitKind::Length, resolver)
        .or_else(|| {
            let declared = resolver.entities_by_type(&IfcType::IfcSIUnit);
            find_scale(&declared, UnitKind::Length, resolver)
        })
        .unwrap_or(1.0);
    let volume = find_scale(&assigned, UnitKind::Volume, resolver).unwrap_or(1.0);

    log::debug!("unit scales: length {}, volume {}", length, volume);
    UnitScales { length, volume }
}

/// Length scale only
pub fn extract_unit_scale(resolver: &dyn EntityResolver) -> f64 {
    extract_unit_scales(resolver).length
}

/// Units listed by IFCPROJECT → UnitsInContext (@8) → IFCUNITASSIGNMENT
fn assigned_units(resolver: &dyn EntityResolver) -> Vec<std::sync::Arc<DecodedEntity>> {
    resolver
        .entities_by_type(&IfcType::IfcProject)
        .first()
        .and_then(|project| resolver.resolve_ref(project.get(8)?))
        .filter(|assignment| assignment.ifc_type == IfcType::IfcUnitAssignment)
        .and_then(|assignment| assignment.get(0).map(|units| resolver.resolve_ref_list(units)))
        .unwrap_or_default()
}

fn find_scale(
    units: &[std::sync::Arc<DecodedEntity>],
    kind: UnitKind,
    resolver: &dyn EntityResolver,
) -> Option<f64> {
    units
        .iter()
        .find_map(|unit| unit_scale(unit, kind, resolver))
}

/// Extract scale from a unit entity (IFCSIUNIT or IFCCONVERSIONBASEDUNIT)
fn unit_scale(unit: &DecodedEntity, kind: UnitKind, resolver: &dyn EntityResolver) -> Option<f64> {
    if unit.get_enum(1)? != kind.unit_type() {
        return None;
    }
    match unit.ifc_type {
        IfcType::IfcSIUnit => si_unit_scale(unit, kind),
        IfcType::IfcConversionBasedUnit => conversion_unit_scale(unit, kind, resolver),
        _ => None,
    }
}

/// Extract scale from IFCSIUNIT
///
/// IFCSIUNIT(*, UnitType, Prefix, Name)
/// - Prefix: .MILLI., .CENTI., .KILO., etc. or $
/// - Name: .METRE., .CUBIC_METRE., etc.
fn si_unit_scale(unit: &DecodedEntity, kind: UnitKind) -> Option<f64> {
    let (base, power) = kind.si_base();
    if unit.get_enum(3)? != base {
        return None;
    }

    let prefix = unit.get_enum(2).map(prefix_scale).unwrap_or(1.0);
    Some(prefix.powi(power))
}

/// Multiplier of an SI prefix; unknown prefixes count as none
fn prefix_scale(prefix: &str) -> f64 {
    match prefix {
        "EXA" => 1e18,
        "PETA" => 1e15,
        "TERA" => 1e12,
        "GIGA" => 1e9,
        "MEGA" => 1e6,
        "KILO" => 1e3,
        "HECTO" => 1e2,
        "DECA" => 1e1,
        "DECI" => 1e-1,
        "CENTI" => 1e-2,
        "MILLI" => 1e-3,
        "MICRO" => 1e-6,
        "NANO" => 1e-9,
        "PICO" => 1e-12,
        "FEMTO" => 1e-15,
        "ATTO" => 1e-18,
        _ => 1.0,
    }
}

/// Extract scale from IFCCONVERSIONBASEDUNIT
///
/// IFCCONVERSIONBASEDUNIT(Dimensions, UnitType, Name, ConversionFactor),
/// the factor being IFCMEASUREWITHUNIT(ValueComponent, UnitComponent).
fn conversion_unit_scale(
    unit: &DecodedEntity,
    kind: UnitKind,
    resolver: &dyn EntityResolver,
) -> Option<f64> {
    let factor = resolver.resolve_typed(unit.get(3)?, &IfcType::IfcMeasureWithUnit)?;

    let value = measure_value(factor.get(0)?)?;
    let base_scale = factor
        .get(1)
        .and_then(|attr| resolver.resolve_ref(attr))
        .and_then(|base| unit_scale(&base, kind, resolver))
        .unwrap_or(1.0);

    Some(value * base_scale)
}

/// Extract numeric value from a measure attribute
fn measure_value(attr: &AttributeValue) -> Option<f64> {
    match attr {
        AttributeValue::Float(f) => Some(*f),
        AttributeValue::Integer(i) => Some(*i as f64),
        AttributeValue::TypedValue(_, args) => args.first().and_then(measure_value),
        _ => None,
    }
}
