//! Per-section decoding state.

use std::time::Duration;

use byteorder_slice::ByteOrder;
use tracing::debug;

use crate::blocks::block_common::{
    ENHANCED_PACKET_BLOCK, INTERFACE_DESCRIPTION_BLOCK, PACKET_BLOCK, SECTION_HEADER_BLOCK, SIMPLE_PACKET_BLOCK,
};
use crate::blocks::enhanced_packet::EnhancedPacketBlock;
use crate::blocks::interface_description::{InterfaceDescriptionBlock, DEFAULT_TS_RESOLUTION};
use crate::blocks::packet::PacketBlock;
use crate::blocks::section_header::SectionHeaderBlock;
use crate::blocks::simple_packet::SimplePacketBlock;
use crate::cursor::BlockCursor;
use crate::errors::PcapError;
use crate::{Endianness, PcapResult};


/// State that must be maintained while decoding a PcapNg stream.
///
/// The encoding of blocks depends on information seen earlier in the
/// stream: the byte order of the current [`SectionHeaderBlock`] and the
/// timestamp parameters of the first [`InterfaceDescriptionBlock`].
#[derive(Debug)]
pub(crate) struct SectionState {
    /// Current section header of the stream.
    section: SectionHeaderBlock,
    /// First interface of the stream; authoritative for every later one.
    interface: Option<InterfaceDescriptionBlock>,
    /// Interfaces declared so far in the current section.
    if_count: u32,
    /// Factor between sub-second timestamp ticks and microseconds.
    ts_scale: u64,
}

impl SectionState {
    /// Creates the state for the first section of a stream, adopting its
    /// byte order.
    pub fn new(section: SectionHeaderBlock) -> PcapResult<Self> {
        if section.major_version != 1 {
            return Err(PcapError::UnsupportedVersion(section.major_version));
        }

        Ok(SectionState { section, interface: None, if_count: 0, ts_scale: 1 })
    }

    pub fn endianness(&self) -> Endianness {
        self.section.endianness
    }

    pub fn section(&self) -> &SectionHeaderBlock {
        &self.section
    }

    pub fn interface(&self) -> Option<&InterfaceDescriptionBlock> {
        self.interface.as_ref()
    }

    /// Installs a later section header.
    ///
    /// The byte order must not change mid-stream. The interface count is
    /// reset: the new section declares its own set of interfaces, which
    /// must match the parameters of the first one seen.
    pub fn on_section_header(&mut self, section: SectionHeaderBlock) -> PcapResult<()> {
        if section.endianness != self.section.endianness {
            return Err(PcapError::ByteOrderChanged);
        }
        if section.major_version != 1 {
            return Err(PcapError::UnsupportedVersion(section.major_version));
        }

        debug!("new section, version {}.{}", section.major_version, section.minor_version);

        self.section = section;
        self.if_count = 0;

        Ok(())
    }

    /// Counts an interface and installs it as the authoritative one, or
    /// verifies it against the authoritative one.
    pub fn on_interface_description(&mut self, idb: InterfaceDescriptionBlock) -> PcapResult<()> {
        self.if_count += 1;

        // Sub-second ticks are reported in microseconds whatever the
        // resolution of the interface.
        self.ts_scale = if idb.ts_resolution > 1_000_000 {
            idb.ts_resolution / 1_000_000
        }
        else {
            1_000_000 / idb.ts_resolution
        };

        match &self.interface {
            None => {
                debug!("interface: {:?}, snaplen {}, {} ticks/s", idb.linktype, idb.snaplen, idb.ts_resolution);
                self.interface = Some(idb);
            },
            Some(first) => {
                if idb.ts_resolution != first.ts_resolution {
                    return Err(PcapError::InterfaceMismatch("time stamp resolution"));
                }
                if idb.ts_offset != first.ts_offset {
                    return Err(PcapError::InterfaceMismatch("time stamp offset"));
                }
                if idb.linktype != first.linktype {
                    return Err(PcapError::InterfaceMismatch("link layer type"));
                }
                if idb.snaplen != first.snaplen {
                    return Err(PcapError::InterfaceMismatch("snapshot length"));
                }
            },
        }

        Ok(())
    }

    /// Fails unless `interface_id` was declared in the current section.
    pub fn check_interface_id(&self, interface_id: u32) -> PcapResult<()> {
        if interface_id >= self.if_count {
            return Err(PcapError::UnknownInterface(interface_id));
        }

        Ok(())
    }

    /// Snap length of the capture, from the first interface.
    pub fn snaplen(&self) -> u32 {
        self.interface.as_ref().map(|i| i.snaplen).unwrap_or(0)
    }

    /// Converts a packet tick count into a timestamp with microsecond
    /// granularity, applying the interface resolution and offset.
    pub fn packet_timestamp(&self, ticks: u64) -> Duration {
        let (resolution, offset) = match &self.interface {
            Some(iface) => (iface.ts_resolution, iface.ts_offset),
            None => (DEFAULT_TS_RESOLUTION, 0),
        };

        let sec = (ticks / resolution).saturating_add(offset);
        let frac = ticks % resolution;
        let usec = if resolution > 1_000_000 { frac / self.ts_scale } else { frac * self.ts_scale };

        // A resolution that does not divide a power of ten can push the
        // scaled fraction past one second; carry it rather than overflow
        // the nanosecond field.
        Duration::new(sec.saturating_add(usec / 1_000_000), (usec % 1_000_000) as u32 * 1_000)
    }

    /// Runs the state updates and validity checks of one block without
    /// decoding a packet out of it.
    ///
    /// This is the raw-block path: section headers and interface
    /// descriptions update the state, packet prefixes are checked against
    /// the declared interfaces, anything else is ignored.
    pub fn register_block<B: ByteOrder>(&mut self, mut cursor: BlockCursor) -> PcapResult<()> {
        match cursor.block_type() {
            SECTION_HEADER_BLOCK => {
                let shb = SectionHeaderBlock::from_cursor(&mut cursor)?;
                self.on_section_header(shb)
            },
            INTERFACE_DESCRIPTION_BLOCK => {
                let idb = InterfaceDescriptionBlock::from_cursor::<B>(&mut cursor)?;
                self.on_interface_description(idb)
            },
            ENHANCED_PACKET_BLOCK => {
                let epb = EnhancedPacketBlock::from_cursor::<B>(&mut cursor)?;
                self.check_interface_id(epb.interface_id)
            },
            SIMPLE_PACKET_BLOCK => {
                let _spb = SimplePacketBlock::from_cursor::<B>(&mut cursor)?;
                // SPB packets are assumed to have arrived on the first interface
                self.check_interface_id(0)
            },
            PACKET_BLOCK => {
                let pb = PacketBlock::from_cursor::<B>(&mut cursor)?;
                self.check_interface_id(pb.interface_id as u32)
            },
            _ => Ok(()),
        }
    }
}
