// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Non-fatal diagnostics collected while scanning and tokenizing

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a diagnostic is
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Informational note, result unaffected
    Info,
    /// Result is complete but a policy was applied (e.g. duplicate id)
    Warning,
    /// A record was skipped
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(s)
    }
}

/// A problem found in the input, reported alongside the result
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 1-based line
    pub line: usize,
    /// 1-based column
    pub column: usize,
    /// Human-readable description
    pub message: String,
    /// Severity
    pub severity: Severity,
}

impl Diagnostic {
    /// Create a diagnostic
    pub fn new(line: usize, column: usize, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            line,
            column,
            message: message.into(),
            severity,
        }
    }

    /// Create an error diagnostic (record skipped)
    pub fn error(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::new(line, column, message, Severity::Error)
    }

    /// Create a warning diagnostic
    pub fn warning(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::new(line, column, message, Severity::Warning)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.line, self.column, self.severity, self.message
        )
    }
}
