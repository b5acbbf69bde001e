//! YAML definitions documents
//!
//! A compact, serde-mapped description of parameters and packets, used for
//! simulator configuration and test fixtures:
//!
//! ```yaml
//! parameters:
//!   - name: HK_VOLT
//!     description: Bus voltage
//!     ptc: 3
//!     pfc: 12
//! packets:
//!   - spid: 1001
//!     name: HK
//!     apid: 100
//!     service_type: 3
//!     service_subtype: 25
//!     pi1: { byte_offset: 0, bit_width: 8, value: 3 }
//!     parameters:
//!       - name: HK_VOLT
//!         byte_offset: 2
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{DefinitionsRegistry, RegistryBuilder};
use crate::{
    Diagnosed, IdentificationField, LayoutError, PacketDefinition, ParameterDefinition, Result,
};

/// Root of a definitions document.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct DefinitionsDocument {
    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
    #[serde(default)]
    pub packets: Vec<PacketEntry>,
}

/// Packet entry with its parameter placements.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct PacketEntry {
    pub spid: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub apid: u16,
    #[serde(default)]
    pub service_type: u8,
    #[serde(default)]
    pub service_subtype: u8,
    #[serde(default)]
    pub data_field_header_size: u32,
    #[serde(default)]
    pub has_data_field_header: bool,
    #[serde(default)]
    pub has_checksum: bool,
    #[serde(default)]
    pub pi1: Option<IdentificationField>,
    #[serde(default)]
    pub pi2: Option<IdentificationField>,
    #[serde(default)]
    pub structure_header_size: u32,
    #[serde(default)]
    pub secondary_header_size: u32,
    #[serde(default)]
    pub data_field_size: u32,
    #[serde(default)]
    pub parameters: Vec<PlacementEntry>,
}

/// Placement of a parameter inside a packet entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct PlacementEntry {
    pub name: String,
    pub byte_offset: u32,
    #[serde(default)]
    pub bit_offset: u32,
    #[serde(default = "single_occurrence")]
    pub occurrences: u32,
    #[serde(default)]
    pub stride_bits: u32,
}

fn single_occurrence() -> u32 {
    1
}

impl PacketEntry {
    fn to_definition(&self) -> PacketDefinition {
        let mut packet = PacketDefinition::new(self.spid, self.name.to_uppercase())
            .with_description(self.description.clone())
            .with_service(self.apid, self.service_type, self.service_subtype);
        packet.data_field_header_size = self.data_field_header_size;
        packet.has_data_field_header = self.has_data_field_header;
        packet.has_checksum = self.has_checksum;
        packet.pi1 = self.pi1;
        packet.pi2 = self.pi2;
        packet.structure_header_size = self.structure_header_size;
        packet.secondary_header_size = self.secondary_header_size;
        packet.data_field_size = self.data_field_size;
        packet
    }
}

impl DefinitionsDocument {
    /// Parse a YAML definitions document.
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            LayoutError::parse_error("Definitions document deserialization", e.to_string())
        })
    }

    /// Read and parse a YAML definitions document from disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| LayoutError::file_error(path.to_path_buf(), e))?;
        debug!(path = %path.display(), bytes = yaml.len(), "Read definitions document");
        Self::parse(&yaml)
    }

    /// Serialize back to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml_ng::to_string(self).map_err(|e| {
            LayoutError::parse_error("Definitions document serialization", e.to_string())
        })
    }

    /// Populate a registry from this document.
    pub fn into_registry(self) -> Result<Diagnosed<DefinitionsRegistry>> {
        let mut builder = RegistryBuilder::new();
        self.populate(&mut builder)?;
        Ok(builder.build())
    }

    /// Add this document's definitions to an existing builder.
    ///
    /// Either the whole document is added or, on error, the builder is left
    /// as it was.
    pub fn populate(self, builder: &mut RegistryBuilder) -> Result<()> {
        let mut scratch = builder.clone();
        for parameter in self.parameters {
            scratch.parameter(parameter)?;
        }

        for entry in &self.packets {
            scratch.packet(entry.to_definition())?;
            for placement in &entry.parameters {
                scratch.link(
                    entry.spid,
                    &placement.name,
                    placement.byte_offset,
                    placement.bit_offset,
                    placement.occurrences,
                    placement.stride_bits,
                )?;
            }
        }

        debug!(
            packets = self.packets.len(),
            diagnostics = scratch.diagnostics().len(),
            "Definitions document added"
        );
        *builder = scratch;
        Ok(())
    }
}
