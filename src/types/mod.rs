//! Core types for packet and parameter definitions.
//!
//! ## Architecture
//!
//! - [`TypeCode`] names the PTC families and resolves widths through [`resolve_bit_width`]
//! - [`ParameterDefinition`] describes one telemetry parameter
//! - [`ParameterLocation`] places a shared definition inside a packet, once or supercommutated
//! - [`PacketDefinition`] carries headers, PI1/PI2 and the placements
//! - [`FieldExtraction`] and [`BitRange`] describe one computed field slot
//!
//! Definitions are shared via `Arc`: a parameter defined once can be placed in
//! many packets without copying.

mod extraction;
mod location;
mod packet;
mod parameter;
mod type_code;

pub use extraction::{BitRange, FieldExtraction};
pub use location::ParameterLocation;
pub use packet::{IdentificationField, PacketDefinition};
pub use parameter::ParameterDefinition;
pub use type_code::{TypeCode, resolve_bit_width};
