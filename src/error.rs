//! Error types for packet layout and definition handling.
//!
//! This module provides the error type shared by every layer of the layout
//! engine. All errors implement `std::error::Error` and carry the offending
//! keys (parameter names, SPIDs, PTC/PFC pairs) so callers can report them
//! without re-deriving context.
//!
//! ## Error Categories
//!
//! - **Type Errors**: PTC/PFC pairs without a defined bit width
//! - **Request Errors**: malformed field selectors such as `TEMP#0`
//! - **Definition Errors**: invalid placements, duplicate SPIDs or names
//! - **Lookup Errors**: packets or parameters that a caller required to exist
//! - **Document Errors**: definitions documents that fail to read or parse
//!
//! Per-parameter problems met while laying out a whole packet are *not*
//! errors; they are reported as [`crate::Diagnostic`]s and the field is
//! omitted. Errors are reserved for the immediate caller's request.
//!
//! ```rust
//! use tmlayout::{LayoutError, resolve_bit_width};
//!
//! let error = resolve_bit_width(6, 0).unwrap_err();
//! assert!(matches!(error, LayoutError::UnsupportedType { ptc: 6, pfc: 0 }));
//! assert!(!error.is_request_error());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for layout operations.
pub type Result<T, E = LayoutError> = std::result::Result<T, E>;

/// Main error type for layout and definition operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LayoutError {
    #[error("ptc/pfc combination {ptc}/{pfc} not supported")]
    UnsupportedType { ptc: u32, pfc: u32 },

    #[error("Parameter '{parameter}' has invalid commutation '{selector}'")]
    InvalidCommutationSelector { parameter: String, selector: String },

    #[error("Parameter '{parameter}' has no commutation {commutation} (occurrences: {occurrences})")]
    CommutationOutOfRange { parameter: String, commutation: u32, occurrences: u32 },

    #[error("Invalid location for parameter '{parameter}': {reason}")]
    InvalidLocation { parameter: String, reason: String },

    #[error("Duplicate packet SPID {spid}")]
    DuplicateSpid { spid: u32 },

    #[error("Duplicate packet name '{name}'")]
    DuplicatePacketName { name: String },

    #[error("Duplicate parameter name '{name}'")]
    DuplicateParameter { name: String },

    #[error("Parameter '{name}' differs from its registered definition")]
    ConflictingDefinition { name: String },

    #[error("Parameter '{name}' is not defined")]
    UnknownParameter { name: String },

    #[error("Packet '{key}' is not defined")]
    UnknownPacket { key: String },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Definitions file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LayoutError {
    /// Returns whether this error stems from a malformed request rather than
    /// from the loaded definition data.
    pub fn is_request_error(&self) -> bool {
        match self {
            LayoutError::InvalidCommutationSelector { .. } => true,
            LayoutError::CommutationOutOfRange { .. } => true,
            LayoutError::UnknownPacket { .. } => true,
            LayoutError::UnsupportedType { .. } => false,
            LayoutError::InvalidLocation { .. } => false,
            LayoutError::DuplicateSpid { .. } => false,
            LayoutError::DuplicatePacketName { .. } => false,
            LayoutError::DuplicateParameter { .. } => false,
            LayoutError::ConflictingDefinition { .. } => false,
            LayoutError::UnknownParameter { .. } => false,
            LayoutError::Parse { .. } => false,
            LayoutError::File { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            LayoutError::UnsupportedType { .. } => vec![
                "Check the PTC/PFC pair of the parameter definition",
                "Variable length types (PFC 0) cannot be placed in a fixed layout",
                "Deduced and saved synthetic parameters must be resolved elsewhere",
            ],
            LayoutError::InvalidCommutationSelector { .. } => vec![
                "Use 'NAME#k' with k starting at 1",
                "Omit the '#' suffix for single occurrence parameters",
            ],
            LayoutError::CommutationOutOfRange { .. } => vec![
                "Check the occurrence count of the parameter location",
                "Commutation selectors are 1-based",
            ],
            LayoutError::InvalidLocation { .. } => vec![
                "Repeated parameters need an occurrence stride greater than zero",
                "Occurrence count must be at least 1",
            ],
            LayoutError::DuplicateSpid { .. } | LayoutError::DuplicatePacketName { .. } => vec![
                "Each packet needs a unique SPID and mnemonic",
                "Check the definitions source for repeated packet entries",
            ],
            LayoutError::DuplicateParameter { .. } => vec![
                "Each parameter name must be defined once",
                "Check the definitions source for repeated parameter entries",
            ],
            LayoutError::ConflictingDefinition { .. } => vec![
                "Link the handle returned when the parameter was registered",
                "Make the packet's parameter definition match the registered one",
            ],
            LayoutError::UnknownParameter { .. } => vec![
                "Define the parameter before linking it to a packet",
                "Check parameter name spelling",
            ],
            LayoutError::UnknownPacket { .. } => vec![
                "Check packet mnemonic or SPID",
                "Verify the packet exists in the loaded definitions",
            ],
            LayoutError::Parse { .. } => vec![
                "Check the definitions document structure",
                "Verify required keys are present",
            ],
            LayoutError::File { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
            ],
        }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        LayoutError::File { path, source }
    }

    /// Helper constructor for parse errors.
    pub fn parse_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        LayoutError::Parse { context: context.into(), details: details.into() }
    }

    /// Helper constructor for invalid parameter locations.
    pub fn invalid_location(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        LayoutError::InvalidLocation { parameter: parameter.into(), reason: reason.into() }
    }
}

impl From<std::io::Error> for LayoutError {
    fn from(err: std::io::Error) -> Self {
        LayoutError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}
