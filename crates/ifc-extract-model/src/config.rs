// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extraction settings

use crate::Result;
use serde::{Deserialize, Serialize};

/// Default ceiling on collected diagnostics
pub const DEFAULT_MAX_DIAGNOSTICS: usize = 1000;

/// Settings accepted by an extractor
///
/// Missing fields take their defaults when deserialized, so a partial JSON
/// document such as `{"strict": true}` is valid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Abort once more than this many diagnostics were collected
    pub max_diagnostics: usize,
    /// Abort on the first error-severity diagnostic
    pub strict: bool,
    /// Resolve element → shape representation links
    pub compute_geometry: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_diagnostics: DEFAULT_MAX_DIAGNOSTICS,
            strict: false,
            compute_geometry: true,
        }
    }
}

impl ExtractorConfig {
    /// Read settings from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
