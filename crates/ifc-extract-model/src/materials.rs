// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Uniform material facts produced from every material representation

use serde::{Deserialize, Serialize};

/// Layer-set name given to a directly associated single material
pub const SINGLE_MATERIAL: &str = "Single Material";

/// Description used in aggregates for elements without materials
pub const NO_MATERIAL: &str = "No Material";

/// Tolerance for fraction sums and "zero" fractions
pub const FRACTION_EPSILON: f64 = 1e-4;

/// One material share of an element
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialFact {
    /// Material name
    pub name: String,
    /// Share of the element, in [0, 1]
    pub fraction: f64,
    /// Element volume times fraction, when the element volume is known
    pub volume: Option<f64>,
    /// Owning layer set, constituent set or list name
    pub layer_set_name: String,
    /// Number of layers or constituents folded into this fact
    pub count: u32,
    /// Thickness in metres, when the representation carries one
    pub thickness: Option<f64>,
    /// Layer or constituent name
    pub layer_name: Option<String>,
}

impl MaterialFact {
    /// Create a fact with a raw fraction; normalization happens later
    pub fn new(name: impl Into<String>, fraction: f64, layer_set_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fraction,
            volume: None,
            layer_set_name: layer_set_name.into(),
            count: 1,
            thickness: None,
            layer_name: None,
        }
    }

    /// A directly associated material
    pub fn single(name: impl Into<String>) -> Self {
        Self::new(name, 1.0, SINGLE_MATERIAL)
    }

    /// Set the thickness (metres)
    pub fn with_thickness(mut self, thickness: Option<f64>) -> Self {
        self.thickness = thickness;
        self
    }

    /// Set the layer name
    pub fn with_layer_name(mut self, layer_name: Option<String>) -> Self {
        self.layer_name = layer_name.filter(|n| !n.is_empty());
        self
    }

    /// Description used as aggregate key:
    /// `name[ | layer set][ | 0.200m][ | layer name]`
    pub fn description(&self) -> String {
        let mut parts = vec![self.name.clone()];
        if !self.layer_set_name.is_empty() && self.layer_set_name != SINGLE_MATERIAL {
            parts.push(self.layer_set_name.clone());
        }
        if let Some(thickness) = self.thickness {
            parts.push(format!("{:.3}m", thickness));
        }
        if let Some(layer_name) = &self.layer_name {
            parts.push(layer_name.clone());
        }
        parts.join(" | ")
    }
}

/// Sum of fractions in one element's material list
pub fn fraction_sum(facts: &[MaterialFact]) -> f64 {
    facts.iter().map(|f| f.fraction).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_description() {
        assert_eq!(MaterialFact::single("Concrete").description(), "Concrete");
    }

    #[test]
    fn test_layer_description() {
        let fact = MaterialFact::new("Brick", 0.25, "Wall 400")
            .with_thickness(Some(0.1))
            .with_layer_name(Some("Outer leaf".to_string()));
        assert_eq!(fact.description(), "Brick | Wall 400 | 0.100m | Outer leaf");
    }

    #[test]
    fn test_empty_layer_name_dropped() {
        let fact = MaterialFact::new("Brick", 1.0, "Set").with_layer_name(Some(String::new()));
        assert_eq!(fact.layer_name, None);
    }
}
