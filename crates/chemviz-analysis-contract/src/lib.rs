#![warn(missing_docs)]
//! # chemviz-analysis-contract
//!
//! ## Purpose
//! Defines the analysis service response schemas and client-side parsing.
//!
//! ## Responsibilities
//! - Parse upload responses into validated [`chemviz_core::Summary`] values.
//! - Parse history responses into server-ordered history entry lists.
//! - Reject payloads that violate the wire contract before they reach state.
//!
//! ## Data flow
//! Raw JSON response body -> [`parse_summary_response`] /
//! [`parse_history_response`] -> session state replacement.
//!
//! ## Ownership and lifetimes
//! Parsed values are owned structs to avoid borrowing from transient network
//! buffers.
//!
//! ## Error model
//! Invalid JSON or contract violations return [`AnalysisContractError`];
//! callers leave prior state untouched on any error.
//!
//! ## Security and privacy notes
//! This crate processes analysis output only; it does not touch bearer
//! tokens.

use chemviz_core::{HistoryItem, Summary};
use thiserror::Error;

/// Parses a raw upload response body into a validated summary.
///
/// # Errors
/// Returns [`AnalysisContractError::Decode`] for invalid JSON.
/// Returns [`AnalysisContractError::InvalidContract`] when a type name is
/// blank.
pub fn parse_summary_response(raw: &str) -> Result<Summary, AnalysisContractError> {
    let parsed: Summary = serde_json::from_str(raw).map_err(AnalysisContractError::Decode)?;
    validate_summary(&parsed)?;
    Ok(parsed)
}

/// Parses a raw history response body into server-ordered entries.
///
/// The returned order is the server's order; callers replace their history
/// wholesale rather than merging.
///
/// # Errors
/// Returns [`AnalysisContractError::Decode`] for invalid JSON.
/// Returns [`AnalysisContractError::InvalidContract`] when an entry name is
/// blank or an embedded summary is malformed.
pub fn parse_history_response(raw: &str) -> Result<Vec<HistoryItem>, AnalysisContractError> {
    let parsed: Vec<HistoryItem> =
        serde_json::from_str(raw).map_err(AnalysisContractError::Decode)?;

    for item in &parsed {
        if item.name.trim().is_empty() {
            return Err(AnalysisContractError::InvalidContract(
                "history entry name is empty".to_string(),
            ));
        }
        if let Some(summary) = &item.summary {
            validate_summary(summary)?;
        }
    }

    Ok(parsed)
}

fn validate_summary(summary: &Summary) -> Result<(), AnalysisContractError> {
    for type_name in summary.type_distribution.keys() {
        if type_name.trim().is_empty() {
            return Err(AnalysisContractError::InvalidContract(
                "type_distribution contains a blank type name".to_string(),
            ));
        }
    }

    Ok(())
}

/// Analysis contract errors.
#[derive(Debug, Error)]
pub enum AnalysisContractError {
    /// JSON decode failure.
    #[error("analysis decode failure: {0}")]
    Decode(#[from] serde_json::Error),
    /// Parsed payload violates contract invariants.
    #[error("analysis contract violation: {0}")]
    InvalidContract(String),
}
