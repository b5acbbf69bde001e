//! Packet injection requests
//!
//! Operators request telemetry packets as a mnemonic (or SPID) plus two
//! comma separated lists: parameter names and textual values. The values stay
//! text here; the packet generator converts them once the field types are
//! known from the layout.

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::{Diagnosed, Diagnostic};

/// CCSDS packet sequence flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum SegmentationFlags {
    Continuation,
    First,
    Last,
    #[default]
    Unsegmented,
}

impl SegmentationFlags {
    /// Two bit value in the packet primary header.
    pub const fn bits(&self) -> u8 {
        match self {
            SegmentationFlags::Continuation => 0b00,
            SegmentationFlags::First => 0b01,
            SegmentationFlags::Last => 0b10,
            SegmentationFlags::Unsegmented => 0b11,
        }
    }

    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => SegmentationFlags::Continuation,
            0b01 => SegmentationFlags::First,
            0b10 => SegmentationFlags::Last,
            _ => SegmentationFlags::Unsegmented,
        }
    }
}

/// Validated request to synthesize one telemetry packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct PacketInjectionRequest {
    /// Packet mnemonic, upper case
    pub packet_name: String,
    pub spid: u32,
    /// Ordered (PARAMETER, raw value) pairs
    pub parameter_values: Vec<(String, String)>,
    /// Raw data field replacing the generated one
    pub data_field: Option<Vec<u8>>,
    pub segmentation_flags: SegmentationFlags,
}

impl PacketInjectionRequest {
    /// Build a request from comma separated parameter names and values.
    ///
    /// See [`parse_parameter_values`] for the pairing rules; its diagnostics
    /// are returned alongside the request.
    pub fn new(
        spid: u32,
        mnemonic: &str,
        names: &str,
        values: &str,
        data_field: Option<Vec<u8>>,
        segmentation_flags: SegmentationFlags,
    ) -> Diagnosed<Self> {
        let packet_name = mnemonic.to_uppercase();
        parse_parameter_values(names, values).map(|parameter_values| Self {
            packet_name,
            spid,
            parameter_values,
            data_field,
            segmentation_flags,
        })
    }

    /// Value given for a parameter, matched case-insensitively.
    pub fn value_of(&self, parameter: &str) -> Option<&str> {
        let parameter = parameter.to_uppercase();
        self.parameter_values
            .iter()
            .find(|(name, _)| *name == parameter)
            .map(|(_, value)| value.as_str())
    }
}

/// Pair up comma separated parameter names and values.
///
/// Elements are trimmed and stripped of `{` `}` braces; names are upper cased.
/// Lists of different length yield no pairs and a
/// [`Diagnostic::MismatchedInjectionLists`]. A pair with an empty name or
/// value is dropped without a diagnostic. An empty list string on either
/// side means no parameters.
pub fn parse_parameter_values(names: &str, values: &str) -> Diagnosed<Vec<(String, String)>> {
    if names.is_empty() || values.is_empty() {
        return Diagnosed::clean(Vec::new());
    }

    let names: Vec<&str> = names.split(',').collect();
    let values: Vec<&str> = values.split(',').collect();
    if names.len() != values.len() {
        warn!(
            names = names.len(),
            values = values.len(),
            "parameter-names or parameter-values have different size"
        );
        return Diagnosed::new(
            Vec::new(),
            vec![Diagnostic::MismatchedInjectionLists { names: names.len(), values: values.len() }],
        );
    }

    let pairs = names
        .iter()
        .zip(&values)
        .enumerate()
        .filter_map(|(index, (name, value))| {
            let name = strip_element(name).to_uppercase();
            let value = strip_element(value);
            if name.is_empty() || value.is_empty() {
                trace!(index, "Dropping incomplete parameter/value pair");
                return None;
            }
            Some((name, value.to_string()))
        })
        .collect();

    Diagnosed::clean(pairs)
}

fn strip_element(element: &str) -> &str {
    element.trim().trim_start_matches('{').trim_end_matches('}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_names_and_values() {
        let parsed = parse_parameter_values("temp1, volt", "12, 3.3");
        assert!(parsed.is_clean());
        assert_eq!(
            parsed.value,
            vec![("TEMP1".to_string(), "12".to_string()), ("VOLT".to_string(), "3.3".to_string())]
        );
    }

    #[test]
    fn strips_braces() {
        let parsed = parse_parameter_values("{mode},{text}", " {ON} ,{hello world}");
        assert_eq!(
            parsed.value,
            vec![
                ("MODE".to_string(), "ON".to_string()),
                ("TEXT".to_string(), "hello world".to_string())
            ]
        );
    }

    #[test]
    fn mismatched_lists_yield_nothing() {
        let parsed = parse_parameter_values("A,B", "1");
        assert!(parsed.value.is_empty());
        assert_eq!(
            parsed.diagnostics,
            vec![Diagnostic::MismatchedInjectionLists { names: 2, values: 1 }]
        );
    }

    #[test]
    fn incomplete_pairs_are_dropped_silently() {
        let parsed = parse_parameter_values("A,,C,D", "1,2,,{}");
        assert!(parsed.is_clean());
        assert_eq!(parsed.value, vec![("A".to_string(), "1".to_string())]);
    }

    #[test]
    fn empty_lists_mean_no_parameters() {
        assert!(parse_parameter_values("", "1,2").value.is_empty());
        assert!(parse_parameter_values("A", "").is_clean());
    }

    #[test]
    fn request_upper_cases_mnemonic() {
        let request = PacketInjectionRequest::new(
            42,
            "hk_tm",
            "volt",
            "5",
            None,
            SegmentationFlags::default(),
        );
        assert_eq!(request.value.packet_name, "HK_TM");
        assert_eq!(request.value.segmentation_flags, SegmentationFlags::Unsegmented);
        assert_eq!(request.value.value_of("Volt"), Some("5"));
        assert_eq!(request.value.value_of("TEMP"), None);
    }

    #[test]
    fn segmentation_flag_bits() {
        for flags in [
            SegmentationFlags::Continuation,
            SegmentationFlags::First,
            SegmentationFlags::Last,
            SegmentationFlags::Unsegmented,
        ] {
            assert_eq!(SegmentationFlags::from_bits(flags.bits()), flags);
        }
        assert_eq!(SegmentationFlags::Unsegmented.bits(), 3);
    }
}
