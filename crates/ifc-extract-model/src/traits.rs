// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entry-point trait for extraction backends

use crate::{ExtractionResult, Result};

/// Progress callback type for extraction operations
pub type ProgressCallback = Box<dyn Fn(&str, f32) + Send>;

/// Main extraction interface
///
/// Implementations turn a complete STEP document into an
/// [`ExtractionResult`]. Each call is an independent session: nothing is
/// shared between calls, so one extractor can serve many threads.
///
/// # Example
///
/// ```ignore
/// use ifc_extract_model::BuildingExtractor;
///
/// let result = extractor.extract(ifc_content)?;
/// for element in &result.elements {
///     println!("{} on {}", element.name, element.building_storey);
/// }
/// ```
pub trait BuildingExtractor: Send + Sync {
    /// Extract building data from STEP content
    ///
    /// Returns `Err` only for terminal faults; malformed records are
    /// reported in `ExtractionResult::diagnostics`.
    fn extract(&self, content: &str) -> Result<ExtractionResult>;

    /// Extract with progress reporting
    ///
    /// `on_progress` receives (phase_name, percent_complete).
    fn extract_with_progress(
        &self,
        content: &str,
        on_progress: ProgressCallback,
    ) -> Result<ExtractionResult>;
}
