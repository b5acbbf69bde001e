//! Definitions registry
//!
//! The registry owns every [`ParameterDefinition`] and [`PacketDefinition`]
//! of a mission and is the only thing the rest of the simulator looks
//! definitions up in.
//!
//! # Lifecycle
//!
//! ```text
//!   RegistryBuilder ──► parameter() / packet() / link()   (single writer)
//!          │
//!          ▼ build()
//!   DefinitionsRegistry                                    (read only, Send + Sync)
//!          │
//!          ├──► packet_def_by_spid() ──► compute_extractions()
//!          └──► packet_inject_request()
//! ```
//!
//! Population goes through [`RegistryBuilder`], or through a
//! [`DefinitionsDocument`] for configuration files and fixtures. After
//! `build()` the registry is immutable and can be shared behind an `Arc`.

mod document;

pub use document::{DefinitionsDocument, PacketEntry, PlacementEntry};

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    Diagnosed, Diagnostic, LayoutError, PacketDefinition, PacketInjectionRequest,
    ParameterDefinition, ParameterLocation, Result, SegmentationFlags,
};

/// Lookup surface over loaded definitions.
///
/// Consumers such as the onboard computer or the packet generator depend
/// on this trait only, never on how definitions were loaded.
pub trait Definitions: Send + Sync {
    /// All packet definitions, ordered by SPID.
    fn packet_defs(&self) -> &[PacketDefinition];

    /// Packet definition at a 0-based index of [`packet_defs`](Self::packet_defs).
    fn packet_def_by_index(&self, index: usize) -> Option<&PacketDefinition> {
        self.packet_defs().get(index)
    }

    fn packet_def_by_spid(&self, spid: u32) -> Option<&PacketDefinition>;

    /// SPID of the packet with the given mnemonic (case-insensitive).
    fn spid_by_packet_name(&self, name: &str) -> Option<u32>;

    /// All parameter definitions, ordered by name.
    fn parameter_defs(&self) -> Vec<&ParameterDefinition>;

    fn parameter_def(&self, name: &str) -> Option<&ParameterDefinition>;

    /// Injection request for a packet addressed by mnemonic.
    fn packet_inject_request(
        &self,
        mnemonic: &str,
        names: &str,
        values: &str,
        data_field: Option<Vec<u8>>,
        segmentation_flags: SegmentationFlags,
    ) -> Result<Diagnosed<PacketInjectionRequest>> {
        let spid = self
            .spid_by_packet_name(mnemonic)
            .ok_or_else(|| LayoutError::UnknownPacket { key: mnemonic.to_string() })?;
        Ok(PacketInjectionRequest::new(spid, mnemonic, names, values, data_field, segmentation_flags))
    }

    /// Injection request for a packet addressed by SPID.
    fn packet_inject_request_by_spid(
        &self,
        spid: u32,
        names: &str,
        values: &str,
        data_field: Option<Vec<u8>>,
        segmentation_flags: SegmentationFlags,
    ) -> Result<Diagnosed<PacketInjectionRequest>> {
        let packet = self
            .packet_def_by_spid(spid)
            .ok_or_else(|| LayoutError::UnknownPacket { key: spid.to_string() })?;
        Ok(PacketInjectionRequest::new(
            spid,
            &packet.name,
            names,
            values,
            data_field,
            segmentation_flags,
        ))
    }
}

/// In-memory registry of packet and parameter definitions.
#[derive(Debug, Clone, Default)]
pub struct DefinitionsRegistry {
    packets: Vec<PacketDefinition>,
    spid_index: HashMap<u32, usize>,
    name_index: HashMap<String, u32>,
    parameters: BTreeMap<String, Arc<ParameterDefinition>>,
}

impl DefinitionsRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn packet_count(&self) -> usize {
        self.packets.len()
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }
}

impl Definitions for DefinitionsRegistry {
    fn packet_defs(&self) -> &[PacketDefinition] {
        &self.packets
    }

    fn packet_def_by_spid(&self, spid: u32) -> Option<&PacketDefinition> {
        self.spid_index.get(&spid).and_then(|&index| self.packets.get(index))
    }

    fn spid_by_packet_name(&self, name: &str) -> Option<u32> {
        self.name_index.get(&name.to_uppercase()).copied()
    }

    fn parameter_defs(&self) -> Vec<&ParameterDefinition> {
        self.parameters.values().map(|def| def.as_ref()).collect()
    }

    fn parameter_def(&self, name: &str) -> Option<&ParameterDefinition> {
        self.parameters.get(name).map(|def| def.as_ref())
    }
}

/// Single-writer population of a [`DefinitionsRegistry`].
///
/// Uniqueness of SPIDs, packet mnemonics and parameter names is enforced as
/// definitions are added. Re-linking a parameter into the same packet
/// replaces the earlier placement and is recorded as a diagnostic.
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    packets: BTreeMap<u32, PacketDefinition>,
    names: HashMap<String, u32>,
    parameters: BTreeMap<String, Arc<ParameterDefinition>>,
    diagnostics: Vec<Diagnostic>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter definition and return the shared handle to it.
    pub fn parameter(&mut self, definition: ParameterDefinition) -> Result<Arc<ParameterDefinition>> {
        if self.parameters.contains_key(&definition.name) {
            return Err(LayoutError::DuplicateParameter { name: definition.name });
        }
        let definition = Arc::new(definition);
        self.parameters.insert(definition.name.clone(), Arc::clone(&definition));
        Ok(definition)
    }

    /// Add a packet definition. The mnemonic is stored upper case.
    pub fn packet(&mut self, mut packet: PacketDefinition) -> Result<&mut Self> {
        packet.name = packet.name.to_uppercase();
        if self.packets.contains_key(&packet.spid) {
            return Err(LayoutError::DuplicateSpid { spid: packet.spid });
        }
        if self.names.contains_key(&packet.name) {
            return Err(LayoutError::DuplicatePacketName { name: packet.name });
        }

        for link in packet.take_param_links() {
            let definition = self.registered_definition(&link)?;
            packet.append_param_link(ParameterLocation::repeated(
                definition,
                link.byte_offset,
                link.bit_offset,
                link.occurrences(),
                link.stride_bits(),
            )?);
        }

        self.names.insert(packet.name.clone(), packet.spid);
        self.packets.insert(packet.spid, packet);
        Ok(self)
    }

    /// Place a registered parameter in a registered packet.
    pub fn link(
        &mut self,
        spid: u32,
        parameter: &str,
        byte_offset: u32,
        bit_offset: u32,
        occurrences: u32,
        stride_bits: u32,
    ) -> Result<&mut Self> {
        let definition = self
            .parameters
            .get(parameter)
            .cloned()
            .ok_or_else(|| LayoutError::UnknownParameter { name: parameter.to_string() })?;
        let location =
            ParameterLocation::repeated(definition, byte_offset, bit_offset, occurrences, stride_bits)?;

        let packet = self
            .packets
            .get_mut(&spid)
            .ok_or_else(|| LayoutError::UnknownPacket { key: spid.to_string() })?;
        if packet.append_param_link(location).is_some() {
            self.diagnostics.push(Diagnostic::ReplacedLink {
                packet: packet.name.clone(),
                parameter: parameter.to_string(),
            });
        }
        Ok(self)
    }

    /// Diagnostics collected so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Finish population.
    pub fn build(self) -> Diagnosed<DefinitionsRegistry> {
        let packets: Vec<PacketDefinition> = self.packets.into_values().collect();
        let spid_index =
            packets.iter().enumerate().map(|(index, packet)| (packet.spid, index)).collect();

        debug!(
            packets = packets.len(),
            parameters = self.parameters.len(),
            replaced_links = self.diagnostics.len(),
            "Definitions registry built"
        );

        Diagnosed::new(
            DefinitionsRegistry {
                packets,
                spid_index,
                name_index: self.names,
                parameters: self.parameters,
            },
            self.diagnostics,
        )
    }

    /// Links carried in by a pre-assembled packet must match the registered
    /// definition of the same name; the registered handle replaces theirs.
    fn registered_definition(&self, link: &ParameterLocation) -> Result<Arc<ParameterDefinition>> {
        match self.parameters.get(link.parameter_name()) {
            Some(registered) if registered.as_ref() == link.definition() => Ok(Arc::clone(registered)),
            Some(_) => {
                warn!(
                    parameter = %link.parameter_name(),
                    "Packet links a parameter that differs from its registered definition"
                );
                Err(LayoutError::ConflictingDefinition { name: link.parameter_name().to_string() })
            }
            None => Err(LayoutError::UnknownParameter { name: link.parameter_name().to_string() }),
        }
    }
}
