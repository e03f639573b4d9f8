// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for extraction operations
//!
//! Almost nothing is fatal: malformed records become [`Diagnostic`]s and
//! dangling references become absent data. The variants below are the
//! terminal faults that abort a whole extraction.

use crate::Diagnostic;
use thiserror::Error;

/// Result type alias for extraction operations
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors that abort an extraction
#[derive(Error, Debug)]
pub enum ParseError {
    /// Input bytes are not valid UTF-8 text
    #[error("Input is not text: invalid UTF-8 at byte {valid_up_to}")]
    NotText { valid_up_to: usize },

    /// More diagnostics than the configured ceiling
    #[error("Too many diagnostics: limit of {limit} exceeded")]
    TooManyDiagnostics { limit: usize },

    /// Strict mode turned a diagnostic into a terminal error
    #[error("Strict mode: {0}")]
    Strict(Diagnostic),

    /// Malformed configuration document
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
