// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Consumer-facing extraction output

use crate::{Diagnostic, EntityId, MaterialFact, ModelMetadata};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Storey name for elements without a resolvable storey
pub const UNKNOWN_STOREY: &str = "Unknown Storey";

/// Count map keyed by a display string
pub type CountMap = BTreeMap<String, usize>;

/// Two-level count map, e.g. storey → type → count
pub type NestedCountMap = BTreeMap<String, CountMap>;

/// One building element with its resolved semantic data
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtractedElement {
    /// Entity id
    pub id: EntityId,
    /// Display type name, e.g. "IfcWall"
    pub ifc_type: String,
    /// GlobalId
    pub global_id: Option<String>,
    /// Name attribute, empty when absent
    pub name: String,
    /// Containing storey name, or [`UNKNOWN_STOREY`]
    pub building_storey: String,
    /// Material shares; fractions sum to 1
    pub materials: Vec<MaterialFact>,
    /// Volume with 3 decimals, `None` when no quantity was found
    pub volume: Option<String>,
    /// From the LoadBearing property
    pub is_load_bearing: bool,
    /// From the IsExternal property
    pub is_external: bool,
    /// Shape representation ids, `None` when geometry was not resolved
    /// or the element has none
    pub geometric_representation: Option<Vec<EntityId>>,
}

/// Everything one extraction produces
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Header metadata
    pub metadata: ModelMetadata,
    /// Length unit scale (file units to metres)
    pub unit_scale: f64,
    /// All building elements, in file order
    pub elements: Vec<ExtractedElement>,
    /// Elements with at least one shape representation
    pub geometry_ids: BTreeSet<EntityId>,
    /// type → count
    pub counts_by_type: CountMap,
    /// storey → type → count
    pub counts_by_storey: NestedCountMap,
    /// type → material description → count
    pub counts_by_material: NestedCountMap,
    /// Non-fatal problems found in the input
    pub diagnostics: Vec<Diagnostic>,
}

impl ExtractionResult {
    /// Elements that have geometry, in file order
    pub fn geometry_bearing(&self) -> impl Iterator<Item = &ExtractedElement> {
        self.elements
            .iter()
            .filter(|e| self.geometry_ids.contains(&e.id))
    }

    /// Look up an element by id
    pub fn element(&self, id: EntityId) -> Option<&ExtractedElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
