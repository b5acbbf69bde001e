//! Packet layout computation
//!
//! Turns a [`PacketDefinition`] into the ordered list of [`FieldExtraction`]s
//! a packet generator packs values into, or a decoder unpacks them from.
//!
//! # Placement Rules
//!
//! 1. PI1, when defined, is placed at `byte_offset * 8` as `<PACKET>_PI1VAL`.
//! 2. PI2, when defined, is placed the same way unless it overlaps PI1, in
//!    which case it is dropped.
//! 3. Every parameter link with a resolvable width yields one field, or one
//!    field per occurrence for supercommutated parameters (`<NAME>_NNNN`,
//!    positioned `stride * i` after the first occurrence).
//! 4. A field overlapping a placed identification field or an already
//!    placed parameter field is dropped. Parameter fields are considered in
//!    (bit position, name) order, so the earlier field wins.
//! 5. The result is sorted by bit position.
//!
//! Nothing in a single parameter aborts the layout: dropped fields are
//! reported as [`Diagnostic`]s and logged.

use tracing::{debug, trace, warn};

use crate::{
    BitRange, Diagnosed, Diagnostic, FieldExtraction, LayoutError, PacketDefinition, Result,
};

const PI1_LABEL: &str = "PI1";
const PI2_LABEL: &str = "PI2";

/// Parsed parameter selector: `NAME` or `NAME#k` with a 1-based commutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelector {
    pub name: String,
    pub commutation: Option<u32>,
}

impl FieldSelector {
    /// Parse a selector string.
    ///
    /// A commutation that is not a positive decimal integer fails with
    /// [`LayoutError::InvalidCommutationSelector`].
    pub fn parse(selector: &str) -> Result<Self> {
        let Some((name, commutation)) = selector.split_once('#') else {
            return Ok(Self { name: selector.to_string(), commutation: None });
        };

        let digits = !commutation.is_empty() && commutation.bytes().all(|b| b.is_ascii_digit());
        match commutation.parse::<u32>() {
            Ok(k) if digits && k >= 1 => Ok(Self { name: name.to_string(), commutation: Some(k) }),
            _ => {
                warn!(parameter = %name, commutation, "Invalid parameter commutation");
                Err(LayoutError::InvalidCommutationSelector {
                    parameter: name.to_string(),
                    selector: commutation.to_string(),
                })
            }
        }
    }
}

impl PacketDefinition {
    /// Compute all field extractions of this packet, ordered by bit position.
    ///
    /// The packet is not modified; every call builds a fresh list.
    pub fn compute_extractions(&self) -> Diagnosed<Vec<FieldExtraction>> {
        let mut diagnostics = Vec::new();
        let mut fields = Vec::with_capacity(self.param_link_count() + 2);

        if let Some(pi1) = &self.pi1 {
            fields.push(FieldExtraction::identification(
                pi1.bit_position(),
                pi1.bit_width,
                self.pi1_field_name(),
                "PI1 Value",
            ));
        }
        if let Some(pi2) = &self.pi2 {
            if self.pi2_overlaps_pi1() {
                warn!(packet = %self.name, spid = self.spid, "PI1 and PI2 overlap ---> PI2 ignored");
                diagnostics.push(Diagnostic::IdentificationOverlap { packet: self.name.clone() });
            } else {
                fields.push(FieldExtraction::identification(
                    pi2.bit_position(),
                    pi2.bit_width,
                    self.pi2_field_name(),
                    "PI2 Value",
                ));
            }
        }

        let candidates = self.parameter_candidates(&mut diagnostics);
        fields.extend(self.place_parameters(candidates, &mut diagnostics));

        fields.sort_by_key(|field| field.bit_position);

        debug!(
            packet = %self.name,
            spid = self.spid,
            fields = fields.len(),
            dropped = diagnostics.len(),
            "Computed packet layout"
        );

        Diagnosed::new(fields, diagnostics)
    }

    /// Extraction of a single parameter, addressed as `NAME` or `NAME#k`.
    ///
    /// `NAME#k` selects the k-th occurrence (1-based) and is named like the
    /// corresponding entry of [`compute_extractions`](Self::compute_extractions),
    /// so `TEMP#1` yields `TEMP_0000`. A bare name on a supercommutated
    /// parameter selects its first occurrence.
    ///
    /// Returns `Ok(None)` when the packet has no link for the name, or when
    /// the field is dropped from the full layout because it overlaps an
    /// identification field or an earlier parameter field.
    pub fn param_extraction(&self, selector: &str) -> Result<Option<FieldExtraction>> {
        let selector = FieldSelector::parse(selector)?;
        let Some(link) = self.param_link(&selector.name) else {
            trace!(packet = %self.name, parameter = %selector.name, "No link for parameter");
            return Ok(None);
        };

        let definition = link.definition();
        let bit_width = definition.bit_width().inspect_err(|e| {
            warn!(packet = %self.name, parameter = %definition.name, error = %e, "Parameter ignored");
        })?;

        let index = match selector.commutation {
            Some(k) if k > link.occurrences() => {
                return Err(LayoutError::CommutationOutOfRange {
                    parameter: definition.name.clone(),
                    commutation: k,
                    occurrences: link.occurrences(),
                });
            }
            Some(k) => k - 1,
            None => 0,
        };

        let name = if link.is_supercommutated() {
            definition.commutated_name(index)
        } else {
            definition.name.clone()
        };
        let bit_position = link.occurrence_bit_position(index);

        let range = BitRange::new(bit_position, bit_width);
        if let Some(identification) = self.overlapped_identification(&range) {
            warn!(
                packet = %self.name,
                field = %name,
                identification,
                "Parameter field overlaps identification field ---> ignored"
            );
            return Ok(None);
        }

        // Other parameter fields can win the slot, exactly as in the full layout
        let mut dropped = Vec::new();
        let candidates = self.parameter_candidates(&mut dropped);
        let placed = self.place_parameters(candidates, &mut dropped);
        let field = placed.into_iter().find(|f| f.name == name && f.bit_position == bit_position);
        if field.is_none() {
            debug!(packet = %self.name, field = %name, "Parameter field not placed in layout");
        }
        Ok(field)
    }

    /// Sweep parameter candidates in (bit position, name) order, dropping
    /// every field that overlaps an already placed one.
    fn place_parameters(
        &self,
        mut candidates: Vec<FieldExtraction>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<FieldExtraction> {
        candidates.sort_by(|a, b| {
            a.bit_position.cmp(&b.bit_position).then_with(|| a.name.cmp(&b.name))
        });

        // Furthest end among placed parameter fields; candidates arrive by
        // start position so this alone decides overlap.
        let mut frontier: Option<(u64, String)> = None;
        let mut placed = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if candidate.bit_width > 0 {
                if let Some((end, furthest)) = &frontier {
                    if *end > candidate.bit_position {
                        warn!(
                            packet = %self.name,
                            field = %candidate.name,
                            placed = %furthest,
                            "Parameter field overlaps placed field ---> ignored"
                        );
                        diagnostics.push(Diagnostic::OverlapsField {
                            field: candidate.name,
                            placed: furthest.clone(),
                        });
                        continue;
                    }
                }
                let end = candidate.end_bit();
                if frontier.as_ref().is_none_or(|(furthest, _)| end > *furthest) {
                    frontier = Some((end, candidate.name.clone()));
                }
            }
            trace!(
                field = %candidate.name,
                bit_position = candidate.bit_position,
                bit_width = candidate.bit_width,
                "Field placed"
            );
            placed.push(candidate);
        }

        placed
    }

    /// Parameter fields that clear the identification fields, in link order.
    fn parameter_candidates(&self, diagnostics: &mut Vec<Diagnostic>) -> Vec<FieldExtraction> {
        let mut candidates = Vec::new();

        for link in self.param_links() {
            let definition = link.definition();
            let bit_width = match definition.bit_width() {
                Ok(width) => width,
                Err(e) => {
                    warn!(
                        packet = %self.name,
                        parameter = %definition.name,
                        error = %e,
                        "Parameter ignored"
                    );
                    diagnostics.push(Diagnostic::UnsupportedType {
                        field: definition.name.clone(),
                        ptc: definition.ptc,
                        pfc: definition.pfc,
                    });
                    continue;
                }
            };
            let is_integer = definition.is_integer();

            for index in 0..link.occurrences() {
                let name = if link.is_supercommutated() {
                    definition.commutated_name(index)
                } else {
                    definition.name.clone()
                };
                let bit_position = link.occurrence_bit_position(index);

                let range = BitRange::new(bit_position, bit_width);
                if let Some(identification) = self.overlapped_identification(&range) {
                    warn!(
                        packet = %self.name,
                        field = %name,
                        identification,
                        "Parameter field overlaps identification field ---> ignored"
                    );
                    diagnostics.push(Diagnostic::OverlapsIdentification {
                        field: name,
                        identification: identification.to_string(),
                    });
                    continue;
                }

                candidates.push(FieldExtraction::parameter(
                    bit_position,
                    bit_width,
                    name,
                    definition.description.clone(),
                    is_integer,
                ));
            }
        }

        candidates
    }

    fn pi2_overlaps_pi1(&self) -> bool {
        match (&self.pi1, &self.pi2) {
            (Some(pi1), Some(pi2)) => pi1.range().overlaps(&pi2.range()),
            _ => false,
        }
    }

    /// Identification field (PI1 first) that a range collides with.
    /// A PI2 dropped for overlapping PI1 is not considered.
    fn overlapped_identification(&self, range: &BitRange) -> Option<&'static str> {
        let pi1 = self.pi1.map(|pi| pi.range()).unwrap_or_else(BitRange::undefined);
        if pi1.overlaps(range) {
            return Some(PI1_LABEL);
        }

        let pi2 = match self.pi2 {
            Some(pi) if !self.pi2_overlaps_pi1() => pi.range(),
            _ => BitRange::undefined(),
        };
        if pi2.overlaps(range) {
            return Some(PI2_LABEL);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{housekeeping_packet, parameter};
    use crate::{IdentificationField, ParameterLocation};
    use proptest::prelude::*;
    use std::sync::Arc;

    fn positions(fields: &[FieldExtraction]) -> Vec<(u64, u32, &str)> {
        fields.iter().map(|f| (f.bit_position, f.bit_width, f.name.as_str())).collect()
    }

    #[test]
    fn selector_parsing() {
        assert_eq!(
            FieldSelector::parse("TEMP").unwrap(),
            FieldSelector { name: "TEMP".into(), commutation: None }
        );
        assert_eq!(FieldSelector::parse("TEMP#3").unwrap().commutation, Some(3));

        let invalid =
            ["TEMP#0", "TEMP#-1", "TEMP#x", "TEMP#", "TEMP#+2", "TEMP# 2", "TEMP#99999999999"];
        for bad in invalid {
            assert!(
                matches!(
                    FieldSelector::parse(bad),
                    Err(LayoutError::InvalidCommutationSelector { .. })
                ),
                "{}",
                bad
            );
        }
    }

    #[test]
    fn identification_then_parameter() {
        let mut packet = PacketDefinition::new(1, "PKT").with_pi1(IdentificationField::new(0, 8, 5));
        packet.append_param_link(ParameterLocation::new(parameter("P1", 3, 12), 1, 0));

        let layout = packet.compute_extractions();
        assert!(layout.is_clean());
        assert_eq!(positions(&layout.value), vec![(0, 8, "PKT_PI1VAL"), (8, 16, "P1")]);
        assert!(layout.value[0].is_identification);
        assert!(!layout.value[1].is_identification);
    }

    #[test]
    fn pi2_overlapping_pi1_is_dropped() {
        let packet = PacketDefinition::new(1, "PKT")
            .with_pi1(IdentificationField::new(0, 16, 1))
            .with_pi2(IdentificationField::new(1, 8, 2));

        let layout = packet.compute_extractions();
        assert_eq!(positions(&layout.value), vec![(0, 16, "PKT_PI1VAL")]);
        assert_eq!(layout.diagnostics, vec![Diagnostic::IdentificationOverlap { packet: "PKT".into() }]);
    }

    #[test]
    fn dropped_pi2_does_not_shadow_parameters() {
        let mut packet = PacketDefinition::new(1, "PKT")
            .with_pi1(IdentificationField::new(0, 8, 1))
            .with_pi2(IdentificationField::new(0, 16, 2));
        packet.append_param_link(ParameterLocation::new(parameter("P", 3, 4), 1, 0));

        let layout = packet.compute_extractions();
        assert_eq!(positions(&layout.value), vec![(0, 8, "PKT_PI1VAL"), (8, 8, "P")]);
        assert_eq!(layout.diagnostics, vec![Diagnostic::IdentificationOverlap { packet: "PKT".into() }]);

        let single = packet.param_extraction("P").unwrap().unwrap();
        assert_eq!((single.bit_position, single.bit_width), (8, 8));
    }

    #[test]
    fn pi2_without_pi1_is_placed() {
        let packet = PacketDefinition::new(1, "PKT").with_pi2(IdentificationField::new(2, 8, 9));
        let layout = packet.compute_extractions();
        assert_eq!(positions(&layout.value), vec![(16, 8, "PKT_PI2VAL")]);
    }

    #[test]
    fn parameter_overlapping_pi2_is_dropped() {
        let mut packet = PacketDefinition::new(1, "PKT")
            .with_pi1(IdentificationField::new(0, 8, 1))
            .with_pi2(IdentificationField::new(1, 8, 2));
        packet.append_param_link(ParameterLocation::new(parameter("P1", 3, 4), 1, 4));
        packet.append_param_link(ParameterLocation::new(parameter("P2", 3, 4), 2, 0));

        let layout = packet.compute_extractions();
        assert_eq!(
            positions(&layout.value),
            vec![(0, 8, "PKT_PI1VAL"), (8, 8, "PKT_PI2VAL"), (16, 8, "P2")]
        );
        assert_eq!(
            layout.diagnostics,
            vec![Diagnostic::OverlapsIdentification {
                field: "P1".into(),
                identification: "PI2".into()
            }]
        );
    }

    #[test]
    fn supercommutated_occurrences_skip_individually() {
        let mut packet = PacketDefinition::new(1, "PKT").with_pi1(IdentificationField::new(2, 8, 1));
        // occurrences at bits 0, 8, 16, 24; the one at 16 collides with PI1
        packet.append_param_link(
            ParameterLocation::repeated(parameter("S", 3, 4), 0, 0, 4, 8).unwrap(),
        );

        let layout = packet.compute_extractions();
        assert_eq!(
            positions(&layout.value),
            vec![(0, 8, "S_0000"), (8, 8, "S_0001"), (16, 8, "PKT_PI1VAL"), (24, 8, "S_0003")]
        );
        assert_eq!(layout.diagnostics.len(), 1);
    }

    #[test]
    fn interleaved_supercommutation() {
        let mut packet = PacketDefinition::new(1, "PKT");
        packet.append_param_link(
            ParameterLocation::repeated(parameter("A", 3, 4), 0, 0, 3, 16).unwrap(),
        );
        packet.append_param_link(
            ParameterLocation::repeated(parameter("B", 3, 4), 1, 0, 3, 16).unwrap(),
        );

        let layout = packet.compute_extractions();
        let names: Vec<&str> = layout.value.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["A_0000", "B_0000", "A_0001", "B_0001", "A_0002", "B_0002"]);
        assert!(layout.is_clean());
    }

    #[test]
    fn overlapping_parameters_keep_the_earlier_field() {
        let mut packet = PacketDefinition::new(1, "PKT");
        packet.append_param_link(ParameterLocation::new(parameter("LONG", 3, 14), 0, 0));
        packet.append_param_link(ParameterLocation::new(parameter("SHORT", 3, 4), 2, 0));
        packet.append_param_link(ParameterLocation::new(parameter("AFTER", 3, 4), 4, 0));

        let layout = packet.compute_extractions();
        assert_eq!(positions(&layout.value), vec![(0, 32, "LONG"), (32, 8, "AFTER")]);
        assert_eq!(
            layout.diagnostics,
            vec![Diagnostic::OverlapsField { field: "SHORT".into(), placed: "LONG".into() }]
        );
    }

    #[test]
    fn single_extraction_agrees_with_layout_on_overlaps() {
        let mut packet = PacketDefinition::new(1, "PKT");
        packet.append_param_link(ParameterLocation::new(parameter("LONG", 3, 14), 0, 0));
        packet.append_param_link(ParameterLocation::new(parameter("SHORT", 3, 4), 2, 0));

        let layout = packet.compute_extractions();
        assert!(layout.value.iter().all(|f| f.name != "SHORT"));
        assert!(packet.param_extraction("SHORT").unwrap().is_none());

        let long = packet.param_extraction("LONG").unwrap();
        assert_eq!(long.as_ref(), layout.value.iter().find(|f| f.name == "LONG"));
    }

    #[test]
    fn unsupported_type_is_skipped() {
        let mut packet = housekeeping_packet();
        packet.append_param_link(ParameterLocation::new(parameter("VAR", 6, 0), 20, 0));

        let layout = packet.compute_extractions();
        assert!(layout.value.iter().all(|f| f.name != "VAR"));
        assert!(layout.diagnostics.contains(&Diagnostic::UnsupportedType {
            field: "VAR".into(),
            ptc: 6,
            pfc: 0
        }));
    }

    #[test]
    fn zero_width_enumeration_is_kept() {
        let mut packet = PacketDefinition::new(1, "PKT");
        packet.append_param_link(ParameterLocation::new(parameter("WIDE", 3, 12), 0, 0));
        packet.append_param_link(ParameterLocation::new(parameter("EMPTY", 2, 0), 1, 0));

        let layout = packet.compute_extractions();
        assert_eq!(positions(&layout.value), vec![(0, 16, "WIDE"), (8, 0, "EMPTY")]);
        assert!(layout.is_clean());
    }

    #[test]
    fn single_extraction_by_name() {
        let packet = housekeeping_packet();
        let field = packet.param_extraction("HK_VOLT").unwrap().unwrap();
        assert_eq!(field.name, "HK_VOLT");
        assert_eq!(field.bit_position, 16);
        assert_eq!(field.bit_width, 16);
    }

    #[test]
    fn single_extraction_of_commutation() {
        let packet = housekeeping_packet();

        let first = packet.param_extraction("HK_TEMP").unwrap().unwrap();
        assert_eq!((first.bit_position, first.name.as_str()), (32, "HK_TEMP_0000"));

        let third = packet.param_extraction("HK_TEMP#3").unwrap().unwrap();
        assert_eq!((third.bit_position, third.name.as_str()), (64, "HK_TEMP_0002"));

        let layout = packet.compute_extractions();
        assert!(layout.value.contains(&third));
    }

    #[test]
    fn single_extraction_errors() {
        let packet = housekeeping_packet();

        assert!(packet.param_extraction("MISSING").unwrap().is_none());
        assert!(matches!(
            packet.param_extraction("HK_TEMP#0"),
            Err(LayoutError::InvalidCommutationSelector { .. })
        ));
        assert!(matches!(
            packet.param_extraction("HK_TEMP#9"),
            Err(LayoutError::CommutationOutOfRange { commutation: 9, occurrences: 4, .. })
        ));
        assert_eq!(packet.param_extraction("HK_VOLT#1").unwrap().unwrap().name, "HK_VOLT");
        assert!(packet.param_extraction("HK_VOLT#2").is_err());
    }

    #[test]
    fn single_extraction_unsupported_type_is_an_error() {
        let mut packet = PacketDefinition::new(1, "PKT");
        packet.append_param_link(ParameterLocation::new(parameter("DED", 11, 0), 0, 0));
        assert!(matches!(
            packet.param_extraction("DED"),
            Err(LayoutError::UnsupportedType { ptc: 11, pfc: 0 })
        ));
    }

    #[test]
    fn single_extraction_over_identification_is_none() {
        let mut packet = PacketDefinition::new(1, "PKT").with_pi1(IdentificationField::new(0, 8, 1));
        packet.append_param_link(ParameterLocation::new(parameter("P", 3, 4), 0, 0));
        assert!(packet.param_extraction("P").unwrap().is_none());
    }

    #[test]
    fn layout_is_idempotent() {
        let packet = housekeeping_packet();
        let first = packet.compute_extractions();
        let second = packet.compute_extractions();
        assert_eq!(first, second);
    }

    fn arb_link() -> impl Strategy<Value = (String, u32, u32, u32, u32, u32, u32)> {
        (
            "[A-F][0-9]",
            prop::sample::select(vec![1u32, 2, 3, 4, 5, 6, 9, 10, 11, 12]),
            0u32..20,
            0u32..32,
            0u32..8,
            1u32..4,
            1u32..64,
        )
    }

    proptest! {
        #[test]
        fn prop_layout_sorted_and_disjoint(
            links in prop::collection::vec(arb_link(), 0..12),
            pi1 in prop::option::of((0u32..8, 1u32..24)),
            pi2 in prop::option::of((0u32..8, 1u32..24)),
        ) {
            let mut packet = PacketDefinition::new(1, "PKT");
            packet.pi1 = pi1.map(|(offset, width)| IdentificationField::new(offset, width, 1));
            packet.pi2 = pi2.map(|(offset, width)| IdentificationField::new(offset, width, 2));

            for (name, ptc, pfc, byte, bit, count, stride) in links {
                let def = Arc::new(crate::ParameterDefinition::new(name, "", ptc, pfc));
                let location = ParameterLocation::repeated(def, byte, bit, count, stride).unwrap();
                packet.append_param_link(location);
            }

            let layout = packet.compute_extractions();
            let fields = &layout.value;

            for pair in fields.windows(2) {
                prop_assert!(pair[0].bit_position <= pair[1].bit_position);
            }
            for (i, a) in fields.iter().enumerate() {
                for b in &fields[i + 1..] {
                    prop_assert!(!a.range().overlaps(&b.range()), "{:?} overlaps {:?}", a, b);
                }
            }

            prop_assert_eq!(&packet.compute_extractions(), &layout);

            for link in packet.param_links() {
                let name = link.parameter_name();
                let expected = if link.is_supercommutated() {
                    link.definition().commutated_name(0)
                } else {
                    name.to_string()
                };
                match packet.param_extraction(name) {
                    Ok(single) => {
                        let in_layout = fields.iter().find(|f| f.name == expected);
                        prop_assert_eq!(single.as_ref(), in_layout, "{}", name);
                    }
                    Err(e) => prop_assert!(matches!(e, LayoutError::UnsupportedType { .. }), "unexpected error: {:?}", e),
                }
            }
        }
    }
}
