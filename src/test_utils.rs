//! Test fixtures for packet and parameter definitions
//!
//! Shared by unit tests and benchmarks. The housekeeping fixture exercises
//! every placement feature at once:
//!
//! | field        | bits      | notes                          |
//! |--------------|-----------|--------------------------------|
//! | `HK_PI1VAL`  | 0..8      | PI1, value 3                   |
//! | `HK_PI2VAL`  | 8..16     | PI2, value 1                   |
//! | `HK_VOLT`    | 16..32    | unsigned, PTC 3 / PFC 12       |
//! | `HK_TEMP_*`  | 32..96    | signed, 4 occurrences, stride 16 |
//! | `HK_FLAG`    | 96..97    | boolean                        |
//! | `HK_MODE`    | 97..101   | enumeration, 4 bits            |
//! | `HK_TIME`    | 104..152  | CDS absolute time              |

#![cfg(any(test, feature = "benchmark"))]

use std::sync::Arc;

use crate::{
    DefinitionsRegistry, IdentificationField, PacketDefinition, ParameterDefinition,
    ParameterLocation,
};

/// SPID of the housekeeping fixture packet.
pub const HOUSEKEEPING_SPID: u32 = 1001;

/// Shared parameter definition with an empty description.
pub fn parameter(name: &str, ptc: u32, pfc: u32) -> Arc<ParameterDefinition> {
    Arc::new(ParameterDefinition::new(name, "", ptc, pfc))
}

/// Parameter definitions of the housekeeping fixture.
pub fn housekeeping_parameters() -> Vec<ParameterDefinition> {
    vec![
        ParameterDefinition::new("HK_VOLT", "Bus voltage", 3, 12),
        ParameterDefinition::new("HK_TEMP", "Panel temperature", 4, 12).with_commutations(1, 4),
        ParameterDefinition::new("HK_FLAG", "Heater enabled", 1, 0),
        ParameterDefinition::new("HK_MODE", "Operating mode", 2, 4),
        ParameterDefinition::new("HK_TIME", "Sampling time", 9, 1),
    ]
}

/// Housekeeping packet with its own (unshared) parameter definitions.
pub fn housekeeping_packet() -> PacketDefinition {
    let mut packet = PacketDefinition::new(HOUSEKEEPING_SPID, "HK")
        .with_description("Housekeeping report")
        .with_service(100, 3, 25)
        .with_pi1(IdentificationField::new(0, 8, 3))
        .with_pi2(IdentificationField::new(1, 8, 1));

    for definition in housekeeping_parameters() {
        let definition = Arc::new(definition);
        let location = match definition.name.as_str() {
            "HK_VOLT" => ParameterLocation::new(definition, 2, 0),
            "HK_TEMP" => match ParameterLocation::repeated(definition, 4, 0, 4, 16) {
                Ok(location) => location,
                Err(e) => panic!("fixture location is valid: {}", e),
            },
            "HK_FLAG" => ParameterLocation::new(definition, 12, 0),
            "HK_MODE" => ParameterLocation::new(definition, 12, 1),
            _ => ParameterLocation::new(definition, 13, 0),
        };
        packet.append_param_link(location);
    }

    packet
}

/// Registry holding the housekeeping fixture packet.
pub fn housekeeping_registry() -> DefinitionsRegistry {
    let mut builder = DefinitionsRegistry::builder();
    for definition in housekeeping_parameters() {
        if let Err(e) = builder.parameter(definition) {
            panic!("fixture parameters are unique: {}", e);
        }
    }
    let packet = PacketDefinition::new(HOUSEKEEPING_SPID, "HK")
        .with_description("Housekeeping report")
        .with_service(100, 3, 25)
        .with_pi1(IdentificationField::new(0, 8, 3))
        .with_pi2(IdentificationField::new(1, 8, 1));
    let placements = [
        ("HK_VOLT", 2, 0, 1, 0),
        ("HK_TEMP", 4, 0, 4, 16),
        ("HK_FLAG", 12, 0, 1, 0),
        ("HK_MODE", 12, 1, 1, 0),
        ("HK_TIME", 13, 0, 1, 0),
    ];

    let populated = builder.packet(packet).and_then(|builder| {
        for (name, byte, bit, occurrences, stride) in placements {
            builder.link(HOUSEKEEPING_SPID, name, byte, bit, occurrences, stride)?;
        }
        Ok(())
    });
    if let Err(e) = populated {
        panic!("fixture registry is valid: {}", e);
    }

    builder.build().into_inner()
}

/// Synthetic packet with `count` single-occurrence parameters and one
/// supercommutated block, used to size benchmarks.
pub fn wide_packet(count: u32) -> PacketDefinition {
    let mut packet = PacketDefinition::new(9000 + count, format!("WIDE{}", count))
        .with_pi1(IdentificationField::new(0, 16, 1));

    for index in 0..count {
        let definition = Arc::new(ParameterDefinition::new(format!("W{:05}", index), "", 3, 12));
        // Reverse insertion so the layout has to sort
        packet.append_param_link(ParameterLocation::new(definition, 2 + 2 * (count - index), 0));
    }

    let block = Arc::new(ParameterDefinition::new("BLOCK", "", 4, 4));
    let start = 4 + 2 * count;
    if let Ok(location) = ParameterLocation::repeated(block, start, 0, 64, 8) {
        packet.append_param_link(location);
    }

    packet
}
