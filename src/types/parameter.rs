//! Telemetry parameter definitions

use serde::{Deserialize, Serialize};

use super::TypeCode;
use crate::Result;

/// Definition of a telemetry parameter as carried in the mission database.
///
/// Created once while the definitions are populated and shared, immutable,
/// between every packet that places the parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct ParameterDefinition {
    /// Unique parameter mnemonic
    pub name: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Parameter type code
    pub ptc: u32,
    /// Parameter format code, interpreted according to `ptc`
    pub pfc: u32,
    /// Lower bound of the repeat count (informational)
    #[serde(default)]
    pub min_commutations: Option<u32>,
    /// Upper bound of the repeat count (informational)
    #[serde(default)]
    pub max_commutations: Option<u32>,
}

impl ParameterDefinition {
    /// Create a parameter definition without commutation bounds.
    pub fn new(name: impl Into<String>, description: impl Into<String>, ptc: u32, pfc: u32) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ptc,
            pfc,
            min_commutations: None,
            max_commutations: None,
        }
    }

    /// Attach informational commutation bounds.
    pub fn with_commutations(mut self, min: u32, max: u32) -> Self {
        self.min_commutations = Some(min);
        self.max_commutations = Some(max);
        self
    }

    /// Type family of this parameter, if the PTC is known.
    pub fn type_code(&self) -> Option<TypeCode> {
        TypeCode::from_ptc(self.ptc)
    }

    /// On-wire width in bits.
    pub fn bit_width(&self) -> Result<u32> {
        super::resolve_bit_width(self.ptc, self.pfc)
    }

    /// Whether the parameter is a signed or unsigned integer.
    pub fn is_integer(&self) -> bool {
        self.type_code().is_some_and(|code| code.is_integer())
    }

    /// Field name of one occurrence of a supercommutated parameter.
    ///
    /// The occurrence index is rendered with four digits, zero padded:
    /// `TEMP1` occurrence 3 becomes `TEMP1_0003`.
    pub fn commutated_name(&self, occurrence: u32) -> String {
        format!("{}_{:04}", self.name, occurrence)
    }
}
