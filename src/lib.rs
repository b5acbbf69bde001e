//! Telemetry packet layout engine for spacecraft simulators.
//!
//! `tmlayout` turns packet and parameter definitions (PUS/SCOS-style PTC/PFC
//! type codes, byte/bit offsets, PI1/PI2 identification fields and
//! supercommutated parameters) into an ordered, overlap-free list of field
//! extractions that a packet generator or decoder can use directly.
//!
//! # Features
//!
//! - **Type resolution**: PTC/PFC pairs to bit widths via [`resolve_bit_width`]
//! - **Deterministic layouts**: fields ordered by bit position, overlaps dropped
//!   with a [`Diagnostic`] instead of failing the whole packet
//! - **Registry**: immutable, shareable definitions with SPID and mnemonic lookup
//! - **YAML documents**: definitions loaded through serde for configuration and tests
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tmlayout::{
//!     IdentificationField, PacketDefinition, ParameterDefinition, ParameterLocation,
//! };
//!
//! let voltage = Arc::new(ParameterDefinition::new("VOLT", "Bus voltage", 3, 12));
//! let mut packet = PacketDefinition::new(1001, "HK").with_pi1(IdentificationField::new(0, 8, 3));
//! packet.append_param_link(ParameterLocation::new(voltage, 2, 0));
//!
//! let layout = packet.compute_extractions();
//! assert!(layout.is_clean());
//!
//! let names: Vec<&str> = layout.value.iter().map(|f| f.name.as_str()).collect();
//! assert_eq!(names, ["HK_PI1VAL", "VOLT"]);
//! assert_eq!(layout.value[1].bit_position, 16);
//! assert_eq!(layout.value[1].bit_width, 16);
//! ```
//!
//! ## Example (definitions document)
//!
//! ```rust
//! use tmlayout::{Definitions, DefinitionsDocument};
//!
//! let yaml = r#"
//! parameters:
//!   - { name: MODE, ptc: 2, pfc: 4 }
//! packets:
//!   - spid: 7
//!     name: status
//!     parameters:
//!       - { name: MODE, byte_offset: 0, bit_offset: 4 }
//! "#;
//!
//! let registry = DefinitionsDocument::parse(yaml)?.into_registry()?.into_inner();
//! let spid = registry.spid_by_packet_name("STATUS");
//! assert_eq!(spid, Some(7));
//!
//! let field = registry.packet_def_by_spid(7).and_then(|p| p.param_extraction("MODE").ok().flatten());
//! assert_eq!(field.map(|f| f.bit_position), Some(4));
//! # Ok::<(), tmlayout::LayoutError>(())
//! ```

// Core types and error handling
mod diagnostics;
mod error;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Layout computation and definitions
pub mod injection;
pub mod interfaces;
pub mod layout;
pub mod registry;

// Core exports
pub use diagnostics::*;
pub use error::*;
pub use types::*;

// Main API exports
pub use injection::{PacketInjectionRequest, SegmentationFlags, parse_parameter_values};
pub use interfaces::{OnboardComputer, TmPacketGenerator};
pub use layout::FieldSelector;
pub use registry::{
    Definitions, DefinitionsDocument, DefinitionsRegistry, PacketEntry, PlacementEntry,
    RegistryBuilder,
};
