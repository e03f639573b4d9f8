// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extraction pipeline
//!
//! Each pass completes before the next starts: the store is fully built
//! before any reference is resolved.

use crate::diagnostics::DiagnosticSink;
use crate::geometry::shape_representations;
use crate::materials::MaterialContext;
use crate::properties::PropertyIndex;
use crate::quantities::{element_volume, format_volume, property_flag};
use crate::relationships::RelationshipIndex;
use crate::scanner::parse_header;
use crate::store::EntityStore;
use crate::units::{extract_unit_scales, UnitScales};
use ifc_extract_model::{
    DecodedEntity, ExtractedElement, ExtractionResult, ExtractorConfig,
    PropertyReader, Result, NO_MATERIAL,
};

/// Run a complete extraction session
///
/// `on_progress` receives (phase_name, percent_complete).
pub fn run(
    content: &str,
    config: &ExtractorConfig,
    on_progress: &dyn Fn(&str, f32),
) -> Result<ExtractionResult> {
    on_progress("Scanning entities", 0.0);
    let mut sink = DiagnosticSink::new(config);
    let metadata = parse_header(content);
    let store = EntityStore::load(content, &mut sink)?;

    on_progress("Extracting units", 30.0);
    let units = extract_unit_scales(&store);

    on_progress("Building property index", 40.0);
    let properties = PropertyIndex::new(&store);
    let ctx = MaterialContext {
        resolver: &store,
        properties: &properties,
        length_scale: units.length,
    };

    on_progress("Resolving relationships", 55.0);
    let relationships = RelationshipIndex::build(&ctx);

    on_progress("Extracting elements", 75.0);
    let session = Session {
        store: &store,
        properties: &properties,
        relationships: &relationships,
        units,
        compute_geometry: config.compute_geometry,
    };
    let elements: Vec<ExtractedElement> = store
        .iter()
        .filter(|entity| entity.ifc_type.is_building_element())
        .map(|entity| session.extract_element(entity))
        .collect();

    on_progress("Aggregating", 90.0);
    let mut result = ExtractionResult {
        metadata,
        unit_scale: units.length,
        elements,
        diagnostics: sink.into_diagnostics(),
        ..Default::default()
    };
    aggregate(&mut result);

    log::info!(
        "extracted {} elements from {} entities ({} with geometry, {} diagnostics)",
        result.elements.len(),
        store.len(),
        result.geometry_ids.len(),
        result.diagnostics.len()
    );
    on_progress("Complete", 100.0);

    Ok(result)
}

/// Read-only indices of one session
struct Session<'a> {
    store: &'a EntityStore,
    properties: &'a PropertyIndex<'a>,
    relationships: &'a RelationshipIndex,
    units: UnitScales,
    compute_geometry: bool,
}

impl Session<'_> {
    fn extract_element(&self, entity: &DecodedEntity) -> ExtractedElement {
        let volume = element_volume(self.properties, entity) * self.units.volume;

        let mut materials = self.relationships.materials(entity.id).to_vec();
        if volume != 0.0 {
            for fact in &mut materials {
                fact.volume = Some(volume * fact.fraction);
            }
        }

        let geometric_representation = if self.compute_geometry {
            Some(shape_representations(self.store, entity)).filter(|reps| !reps.is_empty())
        } else {
            None
        };

        ExtractedElement {
            id: entity.id,
            ifc_type: entity.ifc_type.name().to_string(),
            global_id: self.properties.global_id(entity.id),
            name: self.properties.name(entity.id).unwrap_or_default(),
            building_storey: self.relationships.storey_name(self.store, entity.id),
            materials,
            volume: format_volume(volume),
            is_load_bearing: property_flag(self.properties, entity, "LoadBearing"),
            is_external: property_flag(self.properties, entity, "IsExternal"),
            geometric_representation,
        }
    }
}

/// Fill the geometry set and the count maps from `result.elements`
pub fn aggregate(result: &mut ExtractionResult) {
    for element in &result.elements {
        if element.geometric_representation.is_some() {
            result.geometry_ids.insert(element.id);
        }

        *result
            .counts_by_type
            .entry(element.ifc_type.clone())
            .or_default() += 1;

        *result
            .counts_by_storey
            .entry(element.building_storey.clone())
            .or_default()
            .entry(element.ifc_type.clone())
            .or_default() += 1;

        let by_material = result
            .counts_by_material
            .entry(element.ifc_type.clone())
            .or_default();
        if element.materials.is_empty() {
            *by_material.entry(NO_MATERIAL.to_string()).or_default() += 1;
        }
        for fact in &element.materials {
            *by_material.entry(fact.description()).or_default() += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_extract_model::{EntityId, UNKNOWN_STOREY};
    use std::sync::Mutex;

    const TEST_IFC: &str = r#"ISO-10303-21;
HEADER;
FILE_NAME('test.ifc','2024-01-01T00:00:00',('Author'),('Org'),'Preprocessor','App','');
FILE_SCHEMA(('IFC2X3'));
ENDSEC;
DATA;
#1=IFCPROJECT('p',$,'Project',$,$,$,$,$,#2);
#2=IFCUNITASSIGNMENT((#3));
#3=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);
#4=IFCBUILDINGSTOREY('s',$,'Ground Floor',$,$,$,$,$,.ELEMENT.,0.);
#10=IFCWALL('w1',$,'Wall 1',$,$,$,#20,$);
#11=IFCWALL('w2',$,'Wall 2',$,$,$,$,$);
#12=IFCDOOR('d1',$,'Door',$,$,$,$,$,$,$);
#13=IFCRELCONTAINEDINSPATIALSTRUCTURE('c',$,$,$,(#10,#11),#4);
#20=IFCPRODUCTDEFINITIONSHAPE($,$,(#21));
#21=IFCSHAPEREPRESENTATION($,'Body','SweptSolid',());
#30=IFCMATERIAL('Concrete',$,$);
#31=IFCRELASSOCIATESMATERIAL('m',$,$,$,(#10,#11),#30);
#40=IFCQUANTITYVOLUME('NetVolume',$,$,2.0);
#41=IFCELEMENTQUANTITY('q',$,'Qto_WallBaseQuantities',$,$,(#40));
#42=IFCRELDEFINESBYPROPERTIES('r',$,$,$,(#10),#41);
ENDSEC;
END-ISO-10303-21;
"#;

    fn extract(config: &ExtractorConfig) -> ExtractionResult {
        run(TEST_IFC, config, &|_, _| {}).unwrap()
    }

    #[test]
    fn test_elements_and_aggregates() {
        let result = extract(&ExtractorConfig::default());

        assert_eq!(result.metadata.file_name.as_deref(), Some("test.ifc"));
        assert!((result.unit_scale - 0.001).abs() < 1e-12);
        assert_eq!(result.elements.len(), 3);

        let wall = result.element(EntityId(10)).unwrap();
        assert_eq!(wall.ifc_type, "IfcWall");
        assert_eq!(wall.building_storey, "Ground Floor");
        assert_eq!(wall.volume.as_deref(), Some("2.000"));
        assert_eq!(wall.materials[0].volume, Some(2.0));

        assert_eq!(result.counts_by_type["IfcWall"], 2);
        assert_eq!(result.counts_by_type["IfcDoor"], 1);
        assert_eq!(result.counts_by_storey["Ground Floor"]["IfcWall"], 2);
        assert_eq!(result.counts_by_storey[UNKNOWN_STOREY]["IfcDoor"], 1);
        assert_eq!(result.counts_by_material["IfcWall"]["Concrete"], 2);
        assert_eq!(result.counts_by_material["IfcDoor"][NO_MATERIAL], 1);
    }

    #[test]
    fn test_geometry_views() {
        let result = extract(&ExtractorConfig::default());
        let with_geometry: Vec<EntityId> = result.geometry_bearing().map(|e| e.id).collect();
        assert_eq!(with_geometry, vec![EntityId(10)]);
        assert_eq!(
            result.element(EntityId(10)).unwrap().geometric_representation,
            Some(vec![EntityId(21)])
        );

        let config = ExtractorConfig {
            compute_geometry: false,
            ..Default::default()
        };
        let result = extract(&config);
        assert!(result.geometry_ids.is_empty());
        assert_eq!(result.elements.len(), 3);
        assert!(result.elements.iter().all(|e| e.geometric_representation.is_none()));
    }

    #[test]
    fn test_progress_phases() {
        let phases = Mutex::new(Vec::new());
        run(TEST_IFC, &ExtractorConfig::default(), &|phase, percent| {
            phases.lock().unwrap().push((phase.to_string(), percent));
        })
        .unwrap();

        let phases = phases.into_inner().unwrap();
        assert_eq!(phases.first().map(|p| p.1), Some(0.0));
        assert_eq!(phases.last().map(|p| p.0.as_str()), Some("Complete"));
        assert!(phases.windows(2).all(|w| w[0].1 <= w[1].1));
    }
}
