//! Telemetry packet definitions

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{BitRange, ParameterLocation};

/// Packet embedded discriminator (PI1 or PI2) that tells apart packet
/// structures sharing one application process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct IdentificationField {
    /// Byte offset from the packet start
    pub byte_offset: u32,
    /// Width in bits
    pub bit_width: u32,
    /// Expected discriminator value
    pub value: i64,
}

impl IdentificationField {
    pub fn new(byte_offset: u32, bit_width: u32, value: i64) -> Self {
        Self { byte_offset, bit_width, value }
    }

    pub fn bit_position(&self) -> u64 {
        u64::from(self.byte_offset) * 8
    }

    pub fn range(&self) -> BitRange {
        BitRange::new(self.bit_position(), self.bit_width)
    }
}

/// Definition of a telemetry packet and the parameters placed in it.
///
/// Identity is the SPID; the mnemonic is unique as well. The parameter links
/// are keyed by parameter name, so a parameter appears at most once per packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketDefinition {
    /// Structure/Process ID
    pub spid: u32,
    /// Unique packet mnemonic
    pub name: String,
    pub description: String,
    /// Application process ID
    pub apid: u16,
    /// PUS service type
    pub service_type: u8,
    /// PUS service subtype
    pub service_subtype: u8,
    /// Data field header size in bytes
    pub data_field_header_size: u32,
    pub has_data_field_header: bool,
    pub has_checksum: bool,
    pub pi1: Option<IdentificationField>,
    pub pi2: Option<IdentificationField>,
    /// Structure header size in bytes, consumed by the packet generator
    pub structure_header_size: u32,
    /// Secondary header size in bytes, consumed by the packet generator
    pub secondary_header_size: u32,
    /// Data field size in bytes, consumed by the packet generator
    pub data_field_size: u32,
    param_links: BTreeMap<String, ParameterLocation>,
}

impl PacketDefinition {
    /// Create a packet definition with empty headers and no parameters.
    pub fn new(spid: u32, name: impl Into<String>) -> Self {
        Self {
            spid,
            name: name.into(),
            description: String::new(),
            apid: 0,
            service_type: 0,
            service_subtype: 0,
            data_field_header_size: 0,
            has_data_field_header: false,
            has_checksum: false,
            pi1: None,
            pi2: None,
            structure_header_size: 0,
            secondary_header_size: 0,
            data_field_size: 0,
            param_links: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_service(mut self, apid: u16, service_type: u8, service_subtype: u8) -> Self {
        self.apid = apid;
        self.service_type = service_type;
        self.service_subtype = service_subtype;
        self
    }

    pub fn with_pi1(mut self, pi1: IdentificationField) -> Self {
        self.pi1 = Some(pi1);
        self
    }

    pub fn with_pi2(mut self, pi2: IdentificationField) -> Self {
        self.pi2 = Some(pi2);
        self
    }

    /// Link a parameter placement to this packet.
    ///
    /// A link registered under an existing parameter name replaces the old
    /// one, which is returned.
    pub fn append_param_link(&mut self, location: ParameterLocation) -> Option<ParameterLocation> {
        let name = location.parameter_name().to_string();
        let replaced = self.param_links.insert(name, location);
        if let Some(old) = &replaced {
            warn!(
                packet = %self.name,
                spid = self.spid,
                parameter = %old.parameter_name(),
                "Parameter link replaced"
            );
        }
        replaced
    }

    /// Link registered for a parameter name.
    pub fn param_link(&self, parameter: &str) -> Option<&ParameterLocation> {
        self.param_links.get(parameter)
    }

    /// All links, ordered by parameter name.
    pub fn param_links(&self) -> impl Iterator<Item = &ParameterLocation> {
        self.param_links.values()
    }

    /// Remove and return all links, ordered by parameter name.
    pub(crate) fn take_param_links(&mut self) -> Vec<ParameterLocation> {
        std::mem::take(&mut self.param_links).into_values().collect()
    }

    pub fn param_link_count(&self) -> usize {
        self.param_links.len()
    }

    /// Field name of the PI1 extraction.
    pub fn pi1_field_name(&self) -> String {
        format!("{}_PI1VAL", self.name)
    }

    /// Field name of the PI2 extraction.
    pub fn pi2_field_name(&self) -> String {
        format!("{}_PI2VAL", self.name)
    }
}
