//! Streaming PcapNg writer.

use std::io::Write;

use byteorder_slice::{BigEndian, ByteOrder, LittleEndian};

use crate::blocks::block_common::{write_block, INTERFACE_DESCRIPTION_BLOCK, SECTION_HEADER_BLOCK};
use crate::blocks::enhanced_packet::write_enhanced_packet;
use crate::blocks::interface_description::{InterfaceDescriptionBlock, DEFAULT_TS_RESOLUTION};
use crate::blocks::section_header::SectionHeaderBlock;
use crate::packet::Packet;
use crate::{DataLink, Endianness, PcapResult};


/// Writes a PcapNg stream: one section, one interface, one Enhanced
/// Packet Block per packet.
///
/// Everything is written in the byte order of the host; timestamps are
/// encoded with microsecond resolution.
///
/// # Examples
///
/// ```rust,no_run
/// use std::fs::File;
/// use std::time::Duration;
///
/// use pcapng_file::{DataLink, PcapNgWriter};
///
/// let data = [0_u8; 10];
///
/// let file_out = File::create("out.pcapng").expect("Error creating file");
/// let mut pcapng_writer = PcapNgWriter::new(file_out, DataLink::ETHERNET, 65535).unwrap();
///
/// pcapng_writer.write(Duration::new(1, 0), &data, data.len() as u32, None).unwrap();
/// ```
pub struct PcapNgWriter<W: Write> {
    writer: W,
    endianness: Endianness,
    section: SectionHeaderBlock,
    interface: InterfaceDescriptionBlock,
}

impl<W: Write> PcapNgWriter<W> {
    /// Creates a new [`PcapNgWriter`] and writes the file preamble: a
    /// Section Header Block of unspecified section length followed by one
    /// Interface Description Block with the given link type and snapshot
    /// length, without options.
    pub fn new(writer: W, linktype: DataLink, snaplen: u32) -> PcapResult<Self> {
        let endianness = Endianness::native();

        let section = SectionHeaderBlock { endianness, ..Default::default() };
        let interface = InterfaceDescriptionBlock {
            linktype,
            snaplen,
            ts_resolution: DEFAULT_TS_RESOLUTION,
            ts_offset: 0,
        };

        let mut this = Self { writer, endianness, section, interface };
        match endianness {
            Endianness::Big => this.write_header::<BigEndian>()?,
            Endianness::Little => this.write_header::<LittleEndian>()?,
        }

        Ok(this)
    }

    fn write_header<B: ByteOrder>(&mut self) -> PcapResult<()> {
        let section = &self.section;
        write_block::<B, W, _>(&mut self.writer, SECTION_HEADER_BLOCK, 16, |w| {
            section.write_to::<B, W>(w)?;
            Ok(())
        })?;

        let interface = &self.interface;
        write_block::<B, W, _>(&mut self.writer, INTERFACE_DESCRIPTION_BLOCK, 8, |w| {
            interface.write_to::<B, W>(w)?;
            Ok(())
        })?;

        Ok(())
    }

    /// Writes one packet as an Enhanced Packet Block and returns the
    /// number of bytes written.
    ///
    /// The timestamp is encoded in microseconds; `original_len` is the
    /// length of the packet on the wire. A non-empty comment is appended
    /// as the block's only option. Data longer than the snapshot length
    /// declared at creation is the caller's responsibility: it is written
    /// as given, not truncated.
    pub fn write(&mut self, timestamp: std::time::Duration, data: &[u8], original_len: u32, comment: Option<&str>) -> PcapResult<usize> {
        self.write_inner(timestamp, data, original_len, comment.map(str::as_bytes))
    }

    /// Writes a [`Packet`], typically one decoded by a
    /// [`PcapNgReader`](crate::PcapNgReader).
    pub fn write_packet(&mut self, packet: &Packet) -> PcapResult<usize> {
        self.write_inner(
            packet.timestamp,
            &packet.data,
            packet.original_len,
            packet.comment.as_ref().map(|c| c.as_bytes()),
        )
    }

    fn write_inner(&mut self, timestamp: std::time::Duration, data: &[u8], original_len: u32, comment: Option<&[u8]>) -> PcapResult<usize> {
        let ticks: u64 = timestamp
            .as_micros()
            .try_into()
            .map_err(|_| std::io::Error::other("Timestamp too big to be encoded in microseconds"))?;

        let comment = comment.filter(|c| !c.is_empty());

        match self.endianness {
            Endianness::Big => write_enhanced_packet::<BigEndian, W>(&mut self.writer, ticks, data, original_len, comment),
            Endianness::Little => write_enhanced_packet::<LittleEndian, W>(&mut self.writer, ticks, data, original_len, comment),
        }
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> PcapResult<()> {
        Ok(self.writer.flush()?)
    }

    /// Returns the section header written by the preamble.
    pub fn section(&self) -> &SectionHeaderBlock {
        &self.section
    }

    /// Returns the interface description written by the preamble.
    pub fn interface(&self) -> &InterfaceDescriptionBlock {
        &self.interface
    }

    /// Consumes the [`PcapNgWriter`], returning the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Gets a reference to the wrapped writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Gets a mutable reference to the wrapped writer.
    ///
    /// It is inadvisable to directly write to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }
}
