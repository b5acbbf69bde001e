//! Parameter type codes and the PTC/PFC bit width table

use serde::{Deserialize, Serialize};

use crate::{LayoutError, Result};

/// Parameter type code (PTC) families.
/// Maps to the numeric PTC values of a Mission Information Base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum TypeCode {
    /// PTC 1
    Boolean,
    /// PTC 2, unsigned
    Enumeration,
    /// PTC 3
    UnsignedInteger,
    /// PTC 4
    SignedInteger,
    /// PTC 5, IEEE or MIL-STD-1750A
    Real,
    /// PTC 6
    BitString,
    /// PTC 7
    OctetString,
    /// PTC 8
    AsciiString,
    /// PTC 9, CDS or CUC
    AbsoluteTime,
    /// PTC 10, CUC
    RelativeTime,
    /// PTC 11
    Deduced,
    /// PTC 13
    SavedSynthetic,
}

impl TypeCode {
    /// Map a numeric PTC to its family. PTC 12 and out of range values have none.
    pub const fn from_ptc(ptc: u32) -> Option<Self> {
        match ptc {
            1 => Some(TypeCode::Boolean),
            2 => Some(TypeCode::Enumeration),
            3 => Some(TypeCode::UnsignedInteger),
            4 => Some(TypeCode::SignedInteger),
            5 => Some(TypeCode::Real),
            6 => Some(TypeCode::BitString),
            7 => Some(TypeCode::OctetString),
            8 => Some(TypeCode::AsciiString),
            9 => Some(TypeCode::AbsoluteTime),
            10 => Some(TypeCode::RelativeTime),
            11 => Some(TypeCode::Deduced),
            13 => Some(TypeCode::SavedSynthetic),
            _ => None,
        }
    }

    /// Numeric PTC of this family.
    pub const fn ptc(&self) -> u32 {
        match self {
            TypeCode::Boolean => 1,
            TypeCode::Enumeration => 2,
            TypeCode::UnsignedInteger => 3,
            TypeCode::SignedInteger => 4,
            TypeCode::Real => 5,
            TypeCode::BitString => 6,
            TypeCode::OctetString => 7,
            TypeCode::AsciiString => 8,
            TypeCode::AbsoluteTime => 9,
            TypeCode::RelativeTime => 10,
            TypeCode::Deduced => 11,
            TypeCode::SavedSynthetic => 13,
        }
    }

    /// Whether values of this family are carried as raw integers.
    ///
    /// Fixed length bit strings count as unsigned integers.
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            TypeCode::Boolean
                | TypeCode::Enumeration
                | TypeCode::UnsignedInteger
                | TypeCode::SignedInteger
                | TypeCode::BitString
        )
    }

    /// Bit width of a value of this family with the given PFC.
    pub const fn bit_width(&self, pfc: u32) -> Option<u32> {
        match self {
            TypeCode::Boolean => match pfc {
                0 => Some(1),
                _ => None,
            },
            TypeCode::Enumeration => match pfc {
                0..=32 => Some(pfc),
                _ => None,
            },
            TypeCode::UnsignedInteger | TypeCode::SignedInteger => match pfc {
                0..=12 => Some(pfc + 4),
                13 => Some(24),
                14 => Some(32),
                15 => Some(48),
                16 => Some(64),
                _ => None,
            },
            TypeCode::Real => match pfc {
                // IEEE single
                1 => Some(32),
                // IEEE double
                2 => Some(64),
                // MIL-STD-1750A single
                3 => Some(32),
                // MIL-STD-1750A extended
                4 => Some(48),
                _ => None,
            },
            TypeCode::BitString => match pfc {
                // variable length
                0 => None,
                1..=32 => Some(pfc),
                _ => None,
            },
            TypeCode::OctetString | TypeCode::AsciiString => match pfc {
                0 => None,
                _ => pfc.checked_mul(8),
            },
            TypeCode::AbsoluteTime => match pfc {
                0 => None,
                // CDS without microseconds
                1 => Some(48),
                // CDS with microseconds
                2 => Some(64),
                _ => cuc_bit_width(pfc),
            },
            TypeCode::RelativeTime => cuc_bit_width(pfc),
            TypeCode::Deduced | TypeCode::SavedSynthetic => None,
        }
    }
}

/// CUC time widths for PFC 3..=18, grouped by coarse time octets (1 to 4).
const fn cuc_bit_width(pfc: u32) -> Option<u32> {
    match pfc {
        3..=6 => Some((pfc - 2) * 8),
        7..=10 => Some((pfc - 5) * 8),
        11..=14 => Some((pfc - 8) * 8),
        15..=18 => Some((pfc - 11) * 8),
        _ => None,
    }
}

/// Resolve the on-wire bit width of a PTC/PFC pair.
///
/// Every pair outside the table fails with [`LayoutError::UnsupportedType`];
/// there is no default width.
///
/// ```rust
/// use tmlayout::resolve_bit_width;
///
/// assert_eq!(resolve_bit_width(3, 12).unwrap(), 16);
/// assert_eq!(resolve_bit_width(9, 1).unwrap(), 48);
/// assert!(resolve_bit_width(12, 0).is_err());
/// ```
pub fn resolve_bit_width(ptc: u32, pfc: u32) -> Result<u32> {
    TypeCode::from_ptc(ptc)
        .and_then(|code| code.bit_width(pfc))
        .ok_or(LayoutError::UnsupportedType { ptc, pfc })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Independent rendition of the width table, row by row.
    fn expected_width(ptc: u32, pfc: u32) -> Option<u32> {
        match (ptc, pfc) {
            (1, 0) => Some(1),
            (2, 0..=32) => Some(pfc),
            (3 | 4, 0..=12) => Some(pfc + 4),
            (3 | 4, 13) => Some(24),
            (3 | 4, 14) => Some(32),
            (3 | 4, 15) => Some(48),
            (3 | 4, 16) => Some(64),
            (5, 1) | (5, 3) => Some(32),
            (5, 2) => Some(64),
            (5, 4) => Some(48),
            (6, 1..=32) => Some(pfc),
            (7 | 8, 1..) => Some(pfc * 8),
            (9, 1) => Some(48),
            (9, 2) => Some(64),
            (9 | 10, 3..=6) => Some((pfc - 2) * 8),
            (9 | 10, 7..=10) => Some((pfc - 5) * 8),
            (9 | 10, 11..=14) => Some((pfc - 8) * 8),
            (9 | 10, 15..=18) => Some((pfc - 11) * 8),
            _ => None,
        }
    }

    #[test]
    fn tabulated_widths() {
        let cases = [
            (1, 0, 1),
            (2, 0, 0),
            (2, 8, 8),
            (2, 32, 32),
            (3, 0, 4),
            (3, 4, 8),
            (3, 12, 16),
            (3, 13, 24),
            (3, 14, 32),
            (3, 15, 48),
            (3, 16, 64),
            (4, 12, 16),
            (4, 14, 32),
            (5, 1, 32),
            (5, 2, 64),
            (5, 3, 32),
            (5, 4, 48),
            (6, 1, 1),
            (6, 32, 32),
            (7, 1, 8),
            (7, 10, 80),
            (8, 16, 128),
            (9, 1, 48),
            (9, 2, 64),
            (9, 3, 8),
            (9, 6, 32),
            (9, 7, 16),
            (9, 10, 40),
            (9, 11, 24),
            (9, 14, 48),
            (9, 15, 32),
            (9, 18, 56),
            (10, 3, 8),
            (10, 17, 48),
        ];

        for (ptc, pfc, width) in cases {
            assert_eq!(resolve_bit_width(ptc, pfc).unwrap(), width, "ptc={} pfc={}", ptc, pfc);
        }
    }

    #[test]
    fn unsupported_pairs_fail() {
        let cases = [
            (0, 0),
            (1, 1),
            (2, 33),
            (3, 17),
            (4, 100),
            (5, 0),
            (5, 5),
            (6, 0),
            (6, 33),
            (7, 0),
            (8, 0),
            (9, 0),
            (9, 19),
            (10, 0),
            (10, 1),
            (10, 2),
            (10, 19),
            (11, 0),
            (11, 3),
            (12, 0),
            (12, 8),
            (13, 0),
            (14, 1),
        ];

        for (ptc, pfc) in cases {
            match resolve_bit_width(ptc, pfc) {
                Err(LayoutError::UnsupportedType { ptc: p, pfc: f }) => {
                    assert_eq!((p, f), (ptc, pfc));
                }
                other => panic!("ptc={} pfc={} resolved to {:?}", ptc, pfc, other),
            }
        }
    }

    #[test]
    fn integer_classification() {
        for ptc in [1, 2, 3, 4, 6] {
            assert!(TypeCode::from_ptc(ptc).unwrap().is_integer(), "ptc {}", ptc);
        }
        for ptc in [5, 7, 8, 9, 10, 11, 13] {
            assert!(!TypeCode::from_ptc(ptc).unwrap().is_integer(), "ptc {}", ptc);
        }
    }

    #[test]
    fn ptc_roundtrip_for_known_families() {
        for ptc in 0..20 {
            if let Some(code) = TypeCode::from_ptc(ptc) {
                assert_eq!(code.ptc(), ptc);
            } else {
                assert!(matches!(ptc, 0 | 12 | 14..));
            }
        }
    }

    proptest! {
        #[test]
        fn prop_resolver_matches_table(ptc in 0u32..16, pfc in 0u32..64) {
            let resolved = resolve_bit_width(ptc, pfc).ok();
            prop_assert_eq!(resolved, expected_width(ptc, pfc));
        }

        #[test]
        fn prop_octet_strings_scale_by_eight(pfc in 1u32..4096) {
            prop_assert_eq!(resolve_bit_width(7, pfc).unwrap(), pfc * 8);
            prop_assert_eq!(resolve_bit_width(8, pfc).unwrap(), pfc * 8);
        }
    }
}
