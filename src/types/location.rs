//! Placement of a parameter inside one packet

use std::sync::Arc;

use super::ParameterDefinition;
use crate::{LayoutError, Result};

/// Links a shared [`ParameterDefinition`] to a bit position in one packet.
///
/// A location with more than one occurrence describes a supercommutated
/// parameter: occurrence `i` starts `i * stride_bits` after the first one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterLocation {
    definition: Arc<ParameterDefinition>,
    /// Byte offset of the first occurrence from the packet start
    pub byte_offset: u32,
    /// Additional bit offset within that byte
    pub bit_offset: u32,
    occurrences: u32,
    stride_bits: u32,
}

impl ParameterLocation {
    /// Single occurrence placement.
    pub fn new(definition: Arc<ParameterDefinition>, byte_offset: u32, bit_offset: u32) -> Self {
        Self { definition, byte_offset, bit_offset, occurrences: 1, stride_bits: 0 }
    }

    /// Repeated placement; `occurrences` must be at least 1 and
    /// `stride_bits` may only be 0 for a single occurrence.
    pub fn repeated(
        definition: Arc<ParameterDefinition>,
        byte_offset: u32,
        bit_offset: u32,
        occurrences: u32,
        stride_bits: u32,
    ) -> Result<Self> {
        if occurrences == 0 {
            return Err(LayoutError::invalid_location(
                definition.name.clone(),
                "occurrence count must be at least 1",
            ));
        }
        if occurrences > 1 && stride_bits == 0 {
            return Err(LayoutError::invalid_location(
                definition.name.clone(),
                format!("{} occurrences need a non-zero stride", occurrences),
            ));
        }

        Ok(Self { definition, byte_offset, bit_offset, occurrences, stride_bits })
    }

    /// The linked parameter definition.
    pub fn definition(&self) -> &ParameterDefinition {
        &self.definition
    }

    /// Shared handle to the linked parameter definition.
    pub fn definition_handle(&self) -> &Arc<ParameterDefinition> {
        &self.definition
    }

    /// Name of the linked parameter.
    pub fn parameter_name(&self) -> &str {
        &self.definition.name
    }

    pub fn occurrences(&self) -> u32 {
        self.occurrences
    }

    pub fn stride_bits(&self) -> u32 {
        self.stride_bits
    }

    pub fn is_supercommutated(&self) -> bool {
        self.occurrences > 1
    }

    /// Absolute bit position of the first occurrence.
    pub fn bit_start(&self) -> u64 {
        u64::from(self.bit_offset) + u64::from(self.byte_offset) * 8
    }

    /// Absolute bit position of the 0-based occurrence `index`, saturating
    /// at `u64::MAX`.
    pub fn occurrence_bit_position(&self, index: u32) -> u64 {
        let offset = u64::from(self.stride_bits) * u64::from(index);
        self.bit_start().saturating_add(offset)
    }
}
