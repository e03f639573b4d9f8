// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity store built in one forward pass over the data section

use crate::diagnostics::DiagnosticSink;
use crate::scanner::{EntityScanner, LineIndex, RawRecord};
use crate::tokenizer::{parse_entity, RecordErrorKind};
use ifc_extract_model::{
    DecodedEntity, Diagnostic, EntityId, EntityResolver, IfcType, Result, Severity,
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// Parsed entities of one session, keyed by id
///
/// Lookups are O(1). Ids are kept in file order and per type.
///
/// Duplicate ids: the last record in the file wins. The earlier record is
/// dropped from every index and the loader reports a warning.
#[derive(Default)]
pub struct EntityStore {
    entities: FxHashMap<u32, Arc<DecodedEntity>>,
    type_index: FxHashMap<IfcType, Vec<EntityId>>,
    order: Vec<EntityId>,
    /// Replaced records still listed in `order` and `type_index`
    stale: usize,
}

impl EntityStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan and parse every record of `content`
    ///
    /// Malformed records are reported to `sink` and skipped. Fails only
    /// when the sink hits a terminal condition.
    pub fn load(content: &str, sink: &mut DiagnosticSink) -> Result<Self> {
        let lines = LineIndex::new(content);
        let mut scanner = EntityScanner::new(content);
        let mut store = Self::new();

        if !scanner.has_data_section() {
            sink.push(Diagnostic::warning(1, 1, "no DATA section marker, scanning whole input"))?;
        }

        while let Some(record) = scanner.next_record() {
            store.load_record(content, &record, &lines, sink)?;
        }
        store.compact();

        log::debug!("entity store: {} entities", store.len());
        Ok(store)
    }

    fn load_record(
        &mut self,
        content: &str,
        record: &RawRecord<'_>,
        lines: &LineIndex,
        sink: &mut DiagnosticSink,
    ) -> Result<()> {
        let text = &content[record.start..record.end];

        let entity = match parse_entity(text) {
            Ok(entity) => entity,
            Err(err) => {
                let (line, column) = lines.line_col(record.start + err.offset);
                let severity = match err.kind {
                    RecordErrorKind::Unsupported => Severity::Warning,
                    RecordErrorKind::Lexical | RecordErrorKind::Structural => Severity::Error,
                };
                let message = format!("record #{} skipped: {}", record.id, err.message);
                return sink.push(Diagnostic::new(line, column, message, severity));
            }
        };

        if !record.terminated {
            let (line, column) = lines.line_col(record.end);
            sink.push(Diagnostic::warning(
                line,
                column,
                format!("record #{} is missing its ';' terminator", record.id),
            ))?;
        }

        let id = entity.id;
        if let Some(previous) = self.insert(entity) {
            let (line, column) = lines.line_col(record.start);
            sink.push(Diagnostic::warning(
                line,
                column,
                format!(
                    "duplicate id {} ({} replaced by later record)",
                    id,
                    previous.ifc_type.name()
                ),
            ))?;
        }
        Ok(())
    }

    /// Insert an entity, returning the record it replaced
    ///
    /// A replaced id stays listed until the next `compact`.
    fn insert(&mut self, entity: DecodedEntity) -> Option<Arc<DecodedEntity>> {
        let id = entity.id;
        let ifc_type = entity.ifc_type.clone();
        let previous = self.entities.insert(id.0, Arc::new(entity));

        if previous.is_some() {
            self.stale += 1;
        }
        self.type_index.entry(ifc_type).or_default().push(id);
        self.order.push(id);

        previous
    }

    /// Drop index entries of replaced records, keeping the last occurrence
    fn compact(&mut self) {
        if self.stale == 0 {
            return;
        }

        let entities = &self.entities;
        keep_last(&mut self.order, |_| true);
        for (ifc_type, ids) in self.type_index.iter_mut() {
            keep_last(ids, |id| {
                entities
                    .get(&id.0)
                    .is_some_and(|entity| entity.ifc_type == *ifc_type)
            });
        }
        self.type_index.retain(|_, ids| !ids.is_empty());

        log::debug!("entity store: dropped {} replaced records", self.stale);
        self.stale = 0;
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate entities in file order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<DecodedEntity>> + '_ {
        self.order.iter().filter_map(|id| self.entities.get(&id.0))
    }
}

/// Keep the last occurrence of each id that passes `live`, in order
fn keep_last(ids: &mut Vec<EntityId>, live: impl Fn(EntityId) -> bool) {
    let mut seen = FxHashSet::default();
    let mut kept: Vec<EntityId> = ids
        .iter()
        .rev()
        .copied()
        .filter(|&id| live(id) && seen.insert(id))
        .collect();
    kept.reverse();
    *ids = kept;
}

impl EntityResolver for EntityStore {
    fn get(&self, id: EntityId) -> Option<Arc<DecodedEntity>> {
        self.entities.get(&id.0).cloned()
    }

    fn entities_by_type(&self, ifc_type: &IfcType) -> Vec<Arc<DecodedEntity>> {
        self.type_index
            .get(ifc_type)
            .map(|ids| ids.iter().filter_map(|id| self.get(*id)).collect())
            .unwrap_or_default()
    }

    fn count_by_type(&self, ifc_type: &IfcType) -> usize {
        self.type_index.get(ifc_type).map(|v| v.len()).unwrap_or(0)
    }

    fn all_ids(&self) -> Vec<EntityId> {
        self.order.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_extract_model::{AttributeValue, ExtractorConfig};

    const TEST_IFC: &str = r#"ISO-10303-21;
HEADER;
FILE_SCHEMA(('IFC2X3'));
ENDSEC;
DATA;
#1=IFCPROJECT('guid',$,'Project',$,$,$,$,$,#2);
#2=IFCUNITASSIGNMENT((#3));
#3=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);
#4=IFCWALL('guid2',$,'Wall 1',$,$,$,$,$);
ENDSEC;
END-ISO-10303-21;
"#;

    fn load(content: &str) -> (EntityStore, Vec<Diagnostic>) {
        let mut sink = DiagnosticSink::new(&ExtractorConfig::default());
        let store = EntityStore::load(content, &mut sink).unwrap();
        (store, sink.into_diagnostics())
    }

    #[test]
    fn test_store_get() {
        let (store, diagnostics) = load(TEST_IFC);
        assert!(diagnostics.is_empty());
        assert_eq!(store.len(), 4);

        let entity = store.get(EntityId(1)).unwrap();
        assert_eq!(entity.ifc_type, IfcType::IfcProject);
        assert!(store.get(EntityId(99)).is_none());
    }

    #[test]
    fn test_store_entities_by_type() {
        let (store, _) = load(TEST_IFC);

        let walls = store.entities_by_type(&IfcType::IfcWall);
        assert_eq!(walls.len(), 1);
        assert_eq!(walls[0].id, EntityId(4));
        assert_eq!(store.find_by_type_name("ifcproject").len(), 1);
        assert_eq!(store.count_by_type(&IfcType::IfcSIUnit), 1);
    }

    #[test]
    fn test_store_file_order() {
        let (store, _) = load(TEST_IFC);
        let ids: Vec<u32> = store.iter().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_duplicate_id_last_write_wins() {
        let content = "DATA;\n#7=IFCWALL('a',$,'First',$,$,$,$,$);\n#8=IFCSLAB('b');\n#7=IFCBEAM('c',$,'Second',$,$,$,$,$);\n";
        let (store, diagnostics) = load(content);

        let entity = store.get(EntityId(7)).unwrap();
        assert_eq!(entity.ifc_type, IfcType::IfcBeam);
        assert_eq!(entity.get(2), Some(&AttributeValue::String("Second".into())));
        assert_eq!(store.count_by_type(&IfcType::IfcWall), 0);
        assert_eq!(store.all_ids(), vec![EntityId(8), EntityId(7)]);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert_eq!(diagnostics[0].line, 4);
    }

    #[test]
    fn test_repeated_duplicates() {
        let mut content = String::from("DATA;\n#1=IFCSLAB('s');\n");
        for i in 0..200 {
            let kind = if i % 2 == 0 { "IFCWALL" } else { "IFCBEAM" };
            content.push_str(&format!("#5={kind}('x{i}',$,'Copy {i}',$,$,$,$,$);\n"));
        }
        content.push_str("#2=IFCSLAB('t');\n");
        let (store, diagnostics) = load(&content);

        assert_eq!(diagnostics.len(), 199);
        assert_eq!(store.len(), 3);
        assert_eq!(store.all_ids(), vec![EntityId(1), EntityId(5), EntityId(2)]);
        assert_eq!(store.get(EntityId(5)).unwrap().get_string(2), Some("Copy 199"));
        assert_eq!(store.count_by_type(&IfcType::IfcBeam), 1);
        assert_eq!(store.count_by_type(&IfcType::IfcWall), 0);
        assert_eq!(store.count_by_type(&IfcType::IfcSlab), 2);
    }

    #[test]
    fn test_malformed_record_skipped_with_position() {
        let content = "DATA;\n#1=IFCWALL('a',(1,2);\n#2=IFCSLAB('b');\n";
        let (store, diagnostics) = load(content);

        assert!(store.get(EntityId(1)).is_none());
        assert!(store.get(EntityId(2)).is_some());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Error);
        assert_eq!(diagnostics[0].line, 2);
        assert!(diagnostics[0].message.contains("#1"));
    }

    #[test]
    fn test_missing_data_marker_warns() {
        let (store, diagnostics) = load("#1=IFCWALL('a');\n");
        assert_eq!(store.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
    }

    #[test]
    fn test_store_thread_safe() {
        use std::thread;

        let (store, _) = load(TEST_IFC);
        let store = Arc::new(store);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || (1..=4).filter(|id| store.get(EntityId(*id)).is_some()).count())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 4);
        }
    }
}
