//! Error types for hostinv-inventory

use thiserror::Error;

/// Errors that can occur during inventory collection
///
/// Collectors degrade to zero values instead of surfacing these; they are
/// logged so an empty facet can be traced back to its cause.
#[derive(Error, Debug, Clone)]
pub enum InventoryError {
    /// The interface address list could not be enumerated
    #[error("address enumeration failed: {0}")]
    AddressEnumeration(String),
}
