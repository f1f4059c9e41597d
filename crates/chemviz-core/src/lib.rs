#![warn(missing_docs)]
//! # chemviz-core
//!
//! ## Purpose
//! Defines the pure data model used across the `chemviz` workspace.
//!
//! ## Responsibilities
//! - Represent analysis summaries and upload history entries.
//! - Render the human-auditable text form of a summary deterministically.
//! - Parse audit text back into a summary for round-trip verification.
//!
//! ## Data flow
//! The analysis service returns a [`Summary`] per upload. The session holds
//! the current summary; the report engine serializes it through
//! [`render_audit_text`] for the raw-data pages.
//!
//! ## Ownership and lifetimes
//! Summaries and history entries own their backing strings and maps so
//! session state and report building never borrow from transient network
//! buffers.
//!
//! ## Error model
//! Codec failures and malformed values return [`CoreError`] variants with
//! caller-actionable categorization.
//!
//! ## Security and privacy notes
//! This crate handles only analysis output; it never sees tokens or
//! credentials.
//!
//! ## Example
//! ```rust
//! use chemviz_core::Summary;
//!
//! let mut summary = Summary::new(3);
//! summary.set_type_count("Pump", 2);
//! summary.set_type_count("Valve", 1);
//! let text = chemviz_core::render_audit_text(&summary).unwrap();
//! assert_eq!(chemviz_core::parse_audit_text(&text).unwrap(), summary);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Analysis result for one uploaded spreadsheet.
///
/// A summary is immutable once received from the analysis service: a new
/// upload replaces the session's current summary entirely, never merges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Total number of equipment records in the uploaded file.
    pub total_count: u64,
    /// Per-equipment-type record counts, keyed by type name.
    ///
    /// A `BTreeMap` fixes the stable key order the audit codec depends on.
    pub type_distribution: BTreeMap<String, u64>,
}

impl Summary {
    /// Creates a summary with the given total and an empty distribution.
    pub fn new(total_count: u64) -> Self {
        Self {
            total_count,
            type_distribution: BTreeMap::new(),
        }
    }

    /// Sets the count for one equipment type, replacing any prior value.
    pub fn set_type_count(&mut self, type_name: impl Into<String>, count: u64) {
        self.type_distribution.insert(type_name.into(), count);
    }

    /// Returns the sum of all per-type counts.
    pub fn distribution_total(&self) -> u64 {
        self.type_distribution
            .values()
            .fold(0, |acc, count| acc.saturating_add(*count))
    }
}

/// Record of one past upload as reported by the history endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    /// Uploaded file name as the server recorded it.
    pub name: String,
    /// Summary computed for that upload, when the server retained one.
    #[serde(default)]
    pub summary: Option<Summary>,
}

/// Renders the audit text form of a summary.
///
/// # Semantics
/// The output is the exact text the operator visually audits on the raw-data
/// report pages: JSON with 2-space indentation and keys in stable
/// (lexicographic) order. This format is part of the report output contract.
///
/// # Errors
/// Returns [`CoreError::Codec`] when JSON encoding fails.
pub fn render_audit_text(summary: &Summary) -> Result<String, CoreError> {
    serde_json::to_string_pretty(summary).map_err(CoreError::Codec)
}

/// Parses audit text back into a summary.
///
/// Together with [`render_audit_text`] this forms an exact round trip: the
/// concatenated, de-wrapped raw-data page text re-parses to the original
/// summary.
///
/// # Errors
/// Returns [`CoreError::Codec`] when the text is not valid audit output.
pub fn parse_audit_text(raw: &str) -> Result<Summary, CoreError> {
    serde_json::from_str(raw).map_err(CoreError::Codec)
}

/// Error type for core model and codec failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON encoding/decoding error.
    #[error("audit codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}
