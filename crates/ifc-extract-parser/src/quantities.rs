// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element volume and property flags

use ifc_extract_model::{DecodedEntity, PropertyReader, PropertySet, QuantitySet};

/// Volume names in order of preference; after these any name containing
/// "volume" is accepted
const VOLUME_NAMES: [&str; 2] = ["NetVolume", "GrossVolume"];

/// Raw volume of an element in file volume units
///
/// Returns 0.0 when no volume quantity is found.
pub fn element_volume(properties: &dyn PropertyReader, element: &DecodedEntity) -> f64 {
    let conventional = [
        element.ifc_type.base_quantities_name(),
        "BaseQuantities".to_string(),
    ];
    let is_conventional =
        |name: &str| conventional.iter().any(|c| c.eq_ignore_ascii_case(name));

    let qsets = properties.quantity_sets(element.id);

    let from_quantities = qsets
        .iter()
        .filter(|qset| is_conventional(&qset.name))
        .chain(qsets.iter().filter(|qset| {
            !is_conventional(&qset.name) && is_quantity_set_name(&qset.name)
        }))
        .find_map(volume_in_quantities);
    if let Some(volume) = from_quantities {
        return volume;
    }

    properties
        .property_sets(element.id)
        .iter()
        .filter(|pset| is_conventional(&pset.name) || is_quantity_set_name(&pset.name))
        .find_map(volume_in_properties)
        .unwrap_or(0.0)
}

/// Set names that conventionally hold quantities
fn is_quantity_set_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.contains("quantity") || lower.contains("basequantities")
}

fn volume_in_quantities(qset: &QuantitySet) -> Option<f64> {
    VOLUME_NAMES
        .iter()
        .find_map(|name| qset.get(name))
        .or_else(|| {
            qset.quantities
                .iter()
                .find(|q| q.name.to_ascii_lowercase().contains("volume"))
        })
        .map(|q| q.value)
}

fn volume_in_properties(pset: &PropertySet) -> Option<f64> {
    VOLUME_NAMES
        .iter()
        .find_map(|name| pset.get(name))
        .or_else(|| {
            pset.properties
                .iter()
                .find(|p| p.name.to_ascii_lowercase().contains("volume"))
        })
        .and_then(|p| p.as_float())
}

/// Boolean property of an element, false when absent
pub fn property_flag(
    properties: &dyn PropertyReader,
    element: &DecodedEntity,
    name: &str,
) -> bool {
    properties
        .get_property(element.id, name)
        .and_then(|p| p.as_bool())
        .unwrap_or(false)
}

/// Format a volume with 3 decimals; the 0.0 sentinel yields `None`
pub fn format_volume(volume: f64) -> Option<String> {
    (volume != 0.0).then(|| format!("{:.3}", volume))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticSink;
    use crate::properties::PropertyIndex;
    use crate::store::EntityStore;
    use ifc_extract_model::{EntityId, EntityResolver, ExtractorConfig};

    const TEST_IFC: &str = r#"ISO-10303-21;
HEADER;
FILE_SCHEMA(('IFC2X3'));
ENDSEC;
DATA;
#1=IFCWALLSTANDARDCASE('w1',$,'Wall',$,$,$,$,$);
#2=IFCQUANTITYVOLUME('GrossVolume',$,$,3.0);
#3=IFCQUANTITYVOLUME('NetVolume',$,$,2.5);
#4=IFCELEMENTQUANTITY('q1',$,'Qto_WallBaseQuantities',$,$,(#2,#3));
#5=IFCQUANTITYVOLUME('NetVolume',$,$,9.0);
#6=IFCELEMENTQUANTITY('q0',$,'CustomQuantities',$,$,(#5));
#7=IFCRELDEFINESBYPROPERTIES('r1',$,$,$,(#1),#6);
#8=IFCRELDEFINESBYPROPERTIES('r2',$,$,$,(#1),#4);
#10=IFCSLAB('s1',$,'Slab',$,$,$,$,$,$);
#11=IFCPROPERTYSINGLEVALUE('Slab Volume',$,IFCVOLUMEMEASURE(1.25),$);
#12=IFCPROPERTYSINGLEVALUE('IsExternal',$,IFCBOOLEAN(.T.),$);
#13=IFCPROPERTYSINGLEVALUE('LoadBearing',$,IFCBOOLEAN(.F.),$);
#14=IFCPROPERTYSET('p1',$,'Quantity Takeoff',$,(#11));
#15=IFCPROPERTYSET('p2',$,'Pset_SlabCommon',$,(#12,#13));
#16=IFCRELDEFINESBYPROPERTIES('r3',$,$,$,(#10),#14);
#17=IFCRELDEFINESBYPROPERTIES('r4',$,$,$,(#10),#15);
#20=IFCBEAM('b1',$,'Beam',$,$,$,$,$);
ENDSEC;
END-ISO-10303-21;
"#;

    fn with_index(f: impl FnOnce(&EntityStore, &PropertyIndex<'_>)) {
        let mut sink = DiagnosticSink::new(&ExtractorConfig::default());
        let store = EntityStore::load(TEST_IFC, &mut sink).unwrap();
        let properties = PropertyIndex::new(&store);
        f(&store, &properties)
    }

    #[test]
    fn test_conventional_set_preferred() {
        with_index(|store, properties| {
            let wall = store.get(EntityId(1)).unwrap();
            assert_eq!(element_volume(properties, &wall), 2.5);
        });
    }

    #[test]
    fn test_volume_from_property_set() {
        with_index(|store, properties| {
            let slab = store.get(EntityId(10)).unwrap();
            assert_eq!(element_volume(properties, &slab), 1.25);
        });
    }

    #[test]
    fn test_missing_volume_is_sentinel() {
        with_index(|store, properties| {
            let beam = store.get(EntityId(20)).unwrap();
            assert_eq!(element_volume(properties, &beam), 0.0);
            assert_eq!(format_volume(0.0), None);
            assert_eq!(format_volume(2.5), Some("2.500".to_string()));
        });
    }

    #[test]
    fn test_flags() {
        with_index(|store, properties| {
            let slab = store.get(EntityId(10)).unwrap();
            assert!(property_flag(properties, &slab, "IsExternal"));
            assert!(!property_flag(properties, &slab, "LoadBearing"));
            let beam = store.get(EntityId(20)).unwrap();
            assert!(!property_flag(properties, &beam, "IsExternal"));
        });
    }
}
