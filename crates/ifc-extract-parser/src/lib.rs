// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Extract Parser - Building data extraction from IFC (STEP) files
//!
//! This crate turns the text of an IFC file into an [`ExtractionResult`]:
//! building elements with their storey, materials, volume and flags, plus
//! aggregate counts. It implements the traits defined in
//! `ifc-extract-model`.
//!
//! # Features
//!
//! - **Fast tokenization** using `nom` combinators
//! - **SIMD-accelerated scanning** using `memchr`
//! - **Record-level recovery** - a corrupt record is reported, never fatal
//! - **Progress reporting** for large files
//!
//! # Example
//!
//! ```ignore
//! use ifc_extract_parser::StepExtractor;
//! use ifc_extract_model::BuildingExtractor;
//!
//! let extractor = StepExtractor::new().with_geometry(false);
//! let result = extractor.extract(ifc_content)?;
//!
//! for (ifc_type, count) in &result.counts_by_type {
//!     println!("{ifc_type}: {count}");
//! }
//! for diagnostic in &result.diagnostics {
//!     eprintln!("{diagnostic}");
//! }
//! ```

mod diagnostics;
mod extraction;
mod geometry;
mod materials;
mod properties;
mod quantities;
mod relationships;
mod scanner;
mod store;
mod tokenizer;
mod units;
mod weights;

pub use diagnostics::DiagnosticSink;
pub use materials::{
    normalize_fractions, resolve_materials, MaterialContext, MaterialRepresentation,
};
pub use properties::PropertyIndex;
pub use relationships::{RelationshipEntry, RelationshipIndex};
pub use scanner::{parse_header, EntityScanner};
pub use store::EntityStore;
pub use tokenizer::{parse_entity, RecordError, RecordErrorKind, Token};
pub use units::{extract_unit_scale, extract_unit_scales, UnitScales};
pub use weights::{WeightContext, WeightStrategy, CONSTITUENT_WEIGHT_STRATEGIES};

use ifc_extract_model::{
    BuildingExtractor, ExtractionResult, ExtractorConfig, ParseError, ProgressCallback, Result,
};

/// Main STEP/IFC extractor implementing `BuildingExtractor`
///
/// Holds only configuration; every call runs an independent session.
#[derive(Clone, Debug, Default)]
pub struct StepExtractor {
    config: ExtractorConfig,
}

impl StepExtractor {
    /// Create a new extractor with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor with the given settings
    pub fn with_config(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Set the diagnostic ceiling
    pub fn with_max_diagnostics(mut self, max: usize) -> Self {
        self.config.max_diagnostics = max;
        self
    }

    /// Set whether the first error aborts extraction
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.config.strict = strict;
        self
    }

    /// Set whether geometry links are resolved
    pub fn with_geometry(mut self, enabled: bool) -> Self {
        self.config.compute_geometry = enabled;
        self
    }

    /// Current settings
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract from raw bytes, which must be UTF-8 text
    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<ExtractionResult> {
        let content = std::str::from_utf8(bytes).map_err(|e| ParseError::NotText {
            valid_up_to: e.valid_up_to(),
        })?;
        self.extract(content)
    }
}

impl BuildingExtractor for StepExtractor {
    fn extract(&self, content: &str) -> Result<ExtractionResult> {
        extraction::run(content, &self.config, &|_, _| {})
    }

    fn extract_with_progress(
        &self,
        content: &str,
        on_progress: ProgressCallback,
    ) -> Result<ExtractionResult> {
        extraction::run(content, &self.config, &*on_progress)
    }
}

/// Quick extraction with default settings
pub fn extract(content: &str) -> Result<ExtractionResult> {
    StepExtractor::new().extract(content)
}

/// Extract from bytes with default settings
pub fn extract_bytes(bytes: &[u8]) -> Result<ExtractionResult> {
    StepExtractor::new().extract_bytes(bytes)
}

/// Extract with progress reporting
pub fn extract_with_progress(
    content: &str,
    on_progress: impl Fn(&str, f32) + Send + 'static,
) -> Result<ExtractionResult> {
    StepExtractor::new().extract_with_progress(content, Box::new(on_progress))
}
