//! Computed field extraction descriptors

use serde::{Deserialize, Serialize};

/// Half-open bit range `[position, position + width)` inside a packet.
///
/// An absent position never overlaps anything, neither does a zero width.
/// Ends saturate at `u64::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BitRange {
    pub position: Option<u64>,
    pub width: u32,
}

impl BitRange {
    pub fn new(position: u64, width: u32) -> Self {
        Self { position: Some(position), width }
    }

    /// Range without a position, e.g. an undefined identification field.
    pub fn undefined() -> Self {
        Self { position: None, width: 0 }
    }

    /// First bit after the range.
    pub fn end(&self) -> Option<u64> {
        self.position.map(|position| position.saturating_add(u64::from(self.width)))
    }

    /// Symmetric overlap test.
    pub fn overlaps(&self, other: &BitRange) -> bool {
        if self.width == 0 || other.width == 0 {
            return false;
        }
        match (self.position, self.end(), other.position, other.end()) {
            (Some(p1), Some(end1), Some(p2), Some(end2)) => end1 > p2 && end2 > p1,
            _ => false,
        }
    }
}

/// One field of a laid out packet: where it sits and what it is.
///
/// Produced fresh by every layout computation; only the order by
/// `bit_position` is meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct FieldExtraction {
    /// Absolute bit position from the packet start
    pub bit_position: u64,
    /// Field width in bits
    pub bit_width: u32,
    /// Parameter name, `<NAME>_NNNN` for a commutated occurrence, or
    /// `<PACKET>_PI1VAL` / `<PACKET>_PI2VAL` for identification fields
    pub name: String,
    pub description: String,
    /// Raw value is a signed or unsigned integer
    pub is_integer: bool,
    /// Synthetic entry for an identification field
    pub is_identification: bool,
}

impl FieldExtraction {
    /// Extraction of a regular parameter field.
    pub fn parameter(
        bit_position: u64,
        bit_width: u32,
        name: impl Into<String>,
        description: impl Into<String>,
        is_integer: bool,
    ) -> Self {
        Self {
            bit_position,
            bit_width,
            name: name.into(),
            description: description.into(),
            is_integer,
            is_identification: false,
        }
    }

    /// Extraction of an identification field (always integer).
    pub fn identification(
        bit_position: u64,
        bit_width: u32,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            bit_position,
            bit_width,
            name: name.into(),
            description: description.into(),
            is_integer: true,
            is_identification: true,
        }
    }

    pub fn range(&self) -> BitRange {
        BitRange::new(self.bit_position, self.bit_width)
    }

    /// First bit after the field.
    pub fn end_bit(&self) -> u64 {
        self.bit_position.saturating_add(u64::from(self.bit_width))
    }
}
