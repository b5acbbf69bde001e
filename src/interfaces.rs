//! Collaborator interfaces
//!
//! The layout engine is consumed by the packet generator and the onboard
//! computer simulation. Their implementations live elsewhere; these traits
//! fix the contract they use against the definitions.

use crate::{Definitions, PacketInjectionRequest, Result, SegmentationFlags};

/// Builds telemetry packets from definitions.
///
/// Implementations lay out the packet with
/// [`PacketDefinition::compute_extractions`](crate::PacketDefinition::compute_extractions),
/// pack the given raw values into the field slots and fill the
/// identification fields with the configured PI1/PI2 values.
pub trait TmPacketGenerator: Send + Sync {
    /// Encoded packet for `spid` with optional (PARAMETER, value) pairs.
    fn tm_packet(
        &self,
        spid: u32,
        parameter_values: &[(String, String)],
        data_field: Option<&[u8]>,
        segmentation_flags: SegmentationFlags,
    ) -> Result<Vec<u8>>;

    /// Idle packet filling `packet_size` bytes of a parent container.
    fn idle_packet(&self, packet_size: usize) -> Result<Vec<u8>>;
}

/// Onboard computer simulation, as far as telemetry generation goes.
pub trait OnboardComputer: Send + Sync {
    fn definitions(&self) -> &dyn Definitions;

    /// Generate and send the packet described by an injection request.
    fn generate_tm_packet(&self, request: &PacketInjectionRequest) -> Result<()>;

    /// Generate a packet with all parameters zero, addressed by mnemonic.
    fn generate_empty_tm_packet(&self, mnemonic: &str) -> Result<()> {
        let request = self.definitions().packet_inject_request(
            mnemonic,
            "",
            "",
            None,
            SegmentationFlags::Unsegmented,
        )?;
        self.generate_tm_packet(&request.value)
    }

    /// Generate a packet with all parameters zero, addressed by SPID.
    fn generate_empty_tm_packet_by_spid(&self, spid: u32) -> Result<()> {
        let request = self.definitions().packet_inject_request_by_spid(
            spid,
            "",
            "",
            None,
            SegmentationFlags::Unsegmented,
        )?;
        self.generate_tm_packet(&request.value)
    }
}
