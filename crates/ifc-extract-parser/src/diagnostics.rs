// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-session diagnostic collection with the configured ceilings

use ifc_extract_model::{Diagnostic, ExtractorConfig, ParseError, Result, Severity};

/// Collects diagnostics for one extraction session
///
/// Every diagnostic is mirrored to the `log` facade. Pushing fails with a
/// terminal error when strict mode meets an error-severity diagnostic or
/// when the configured ceiling is exceeded.
#[derive(Debug)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
    max_diagnostics: usize,
    strict: bool,
}

impl DiagnosticSink {
    /// Create a sink for the given settings
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            diagnostics: Vec::new(),
            max_diagnostics: config.max_diagnostics,
            strict: config.strict,
        }
    }

    /// Record a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) -> Result<()> {
        match diagnostic.severity {
            Severity::Info => log::info!("{}", diagnostic),
            Severity::Warning | Severity::Error => log::warn!("{}", diagnostic),
        }

        if self.strict && diagnostic.severity == Severity::Error {
            return Err(ParseError::Strict(diagnostic));
        }

        self.diagnostics.push(diagnostic);
        if self.diagnostics.len() > self.max_diagnostics {
            return Err(ParseError::TooManyDiagnostics {
                limit: self.max_diagnostics,
            });
        }
        Ok(())
    }

    /// Number of diagnostics collected so far
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Whether nothing was reported
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Collected diagnostics, in the order they were found
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
