// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Extract Model - Shared types and trait definitions
//!
//! This crate provides the abstractions shared by extraction backends and
//! their consumers: decoded entities and attribute values, diagnostics,
//! material facts and the consumer-facing [`ExtractionResult`].
//!
//! # Architecture
//!
//! - [`BuildingExtractor`] - Entry point turning STEP content into a result
//! - [`EntityResolver`] - Entity lookup and reference resolution
//! - [`PropertyReader`] - Access to property sets and quantity sets
//!
//! # Example
//!
//! ```ignore
//! use ifc_extract_model::BuildingExtractor;
//!
//! let result = extractor.extract(ifc_content)?;
//! for (ifc_type, count) in &result.counts_by_type {
//!     println!("{ifc_type}: {count}");
//! }
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod extraction;
pub mod materials;
pub mod properties;
pub mod resolver;
pub mod traits;
pub mod types;

// Re-export all public types
pub use config::*;
pub use diagnostics::*;
pub use error::*;
pub use extraction::*;
pub use materials::*;
pub use properties::*;
pub use resolver::*;
pub use traits::*;
pub use types::*;
