//! Streaming PcapNg reader.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::io::Read;

use byteorder_slice::result::ReadSlice;
use byteorder_slice::{BigEndian, ByteOrder, LittleEndian};
use tracing::trace;

use crate::blocks::block_common::{
    ENHANCED_PACKET_BLOCK, INTERFACE_DESCRIPTION_BLOCK, PACKET_BLOCK, SECTION_HEADER_BLOCK, SIMPLE_PACKET_BLOCK,
};
use crate::blocks::enhanced_packet::EnhancedPacketBlock;
use crate::blocks::interface_description::InterfaceDescriptionBlock;
use crate::blocks::opt_common::{next_option, pad_len, OPT_COMMENT};
use crate::blocks::packet::PacketBlock;
use crate::blocks::section_header::SectionHeaderBlock;
use crate::blocks::simple_packet::SimplePacketBlock;
use crate::blocks::{RawBlock, MAX_BLOCK_LEN};
use crate::cursor::BlockCursor;
use crate::errors::PcapError;
use crate::packet::{Packet, PacketComment};
use crate::read_buffer::{read_up_to, round_up_to_4, BlockReader};
use crate::section::SectionState;
use crate::{Endianness, PcapResult};


/// First bytes of every pcapng stream: the Section Header Block type,
/// `\n\r\r\n`, the same byte sequence in either byte order.
const SHB_TYPE_BYTES: [u8; 4] = [0x0A, 0x0D, 0x0D, 0x0A];

/// Smallest possible Section Header Block: framing plus the 16-byte
/// fixed-length body.
const MIN_SHB_LEN: u32 = 28;


/// Reads a PcapNg stream from a reader.
///
/// The constructor consumes the stream up to and including the first
/// Interface Description Block; every packet block decoded afterwards is
/// interpreted with the byte order of the section and the timestamp
/// parameters of that interface.
///
/// Returned packets borrow the internal block buffer and are only valid
/// until the next call; use [`Packet::into_owned`] to retain one.
///
/// # Examples
///
/// ```rust,no_run
/// use std::fs::File;
///
/// use pcapng_file::PcapNgReader;
///
/// let file_in = File::open("test.pcapng").expect("Error opening file");
/// let mut pcapng_reader = PcapNgReader::new(file_in).unwrap();
///
/// while let Some(packet) = pcapng_reader.next_packet() {
///     let packet = packet.unwrap();
///
///     // Do something
/// }
/// ```
pub struct PcapNgReader<R: Read> {
    loader: BlockReader<R>,
    state: SectionState,
    /// Blocks consumed while looking for the first interface, kept
    /// verbatim so the raw-block entry point can replay the stream from
    /// its beginning.
    preamble: VecDeque<Vec<u8>>,
    /// Holds the bytes of the last replayed block for the caller's borrow.
    replayed: Option<Vec<u8>>,
}

impl<R: Read> PcapNgReader<R> {
    /// Creates a new [`PcapNgReader`] from a reader.
    ///
    /// Fails with [`PcapError::NotPcapNg`] if the stream does not start
    /// with a pcapng Section Header Block; use [`check_header`] to probe a
    /// stream of unknown format without treating that as an error.
    ///
    /// [`check_header`]: PcapNgReader::check_header
    pub fn new(reader: R) -> PcapResult<Self> {
        Self::check_header(reader)?.ok_or(PcapError::NotPcapNg)
    }

    /// Probes a stream for the pcapng format and bootstraps a reader.
    ///
    /// Returns `Ok(None)` when the stream is recognizably not pcapng: the
    /// first bytes are not the Section Header Block type, or the stream
    /// ends before the byte-order magic could be read (the SHB type is
    /// `\n\r\r\n`, so a short text file can start with it), or the magic
    /// matches neither byte order. Everything beyond that point is a real
    /// decoding error.
    pub fn check_header(mut reader: R) -> PcapResult<Option<Self>> {
        let mut start = [0_u8; 12];

        if read_up_to(&mut reader, &mut start[..4])? < 4 || start[..4] != SHB_TYPE_BYTES {
            return Ok(None);
        }
        if read_up_to(&mut reader, &mut start[4..])? < 8 {
            return Ok(None);
        }

        let endianness = match start[8..12] {
            [0x1A, 0x2B, 0x3C, 0x4D] => Endianness::Big,
            [0x4D, 0x3C, 0x2B, 0x1A] => Endianness::Little,
            _ => return Ok(None),
        };
        trace!("found section header block, endianness {:?}", endianness);

        match endianness {
            Endianness::Big => Self::bootstrap::<BigEndian>(reader, start),
            Endianness::Little => Self::bootstrap::<LittleEndian>(reader, start),
        }
        .map(Some)
    }

    /// Loads the rest of the first Section Header Block, then consumes
    /// blocks until the first Interface Description Block is accepted.
    fn bootstrap<B: ByteOrder>(reader: R, start: [u8; 12]) -> PcapResult<Self> {
        let mut len_field = &start[4..8];
        let total_len = len_field.read_u32::<B>().unwrap();

        if total_len > MAX_BLOCK_LEN {
            return Err(PcapError::BlockTooLarge(total_len));
        }
        if total_len < MIN_SHB_LEN {
            return Err(PcapError::BlockTooShort(total_len));
        }

        let mut loader = BlockReader::resume_block::<B>(reader, &start, round_up_to_4(total_len as usize))?;

        let shb = SectionHeaderBlock::from_cursor(&mut loader.body())?;
        let mut state = SectionState::new(shb)?;

        let mut preamble = VecDeque::new();
        preamble.push_back(loader.raw().to_vec());

        loop {
            if !loader.advance::<B>()? {
                return Err(PcapError::NoInterface);
            }
            preamble.push_back(loader.raw().to_vec());

            match loader.block_type() {
                INTERFACE_DESCRIPTION_BLOCK => {
                    let idb = InterfaceDescriptionBlock::from_cursor::<B>(&mut loader.body())?;
                    state.on_interface_description(idb)?;
                    break;
                },
                ENHANCED_PACKET_BLOCK | SIMPLE_PACKET_BLOCK | PACKET_BLOCK => {
                    return Err(PcapError::PacketBeforeIdb);
                },
                t => trace!("skipping block of type {:#010X} before the first interface", t),
            }
        }

        Ok(Self { loader, state, preamble, replayed: None })
    }

    /// Returns the next packet, decoded from an Enhanced, Simple or legacy
    /// Packet Block. Interface descriptions and section headers crossed on
    /// the way update the section state; unrecognized blocks are skipped.
    ///
    /// `None` is the clean end of the stream; any error aborts the
    /// current decode and no partial packet is returned.
    pub fn next_packet(&mut self) -> Option<PcapResult<Packet<'_>>> {
        match self.state.endianness() {
            Endianness::Big => self.next_packet_inner::<BigEndian>().transpose(),
            Endianness::Little => self.next_packet_inner::<LittleEndian>().transpose(),
        }
    }

    fn next_packet_inner<B: ByteOrder>(&mut self) -> PcapResult<Option<Packet<'_>>> {
        enum Kind {
            Enhanced,
            Simple,
            Legacy,
        }

        let kind = loop {
            if !self.loader.advance::<B>()? {
                return Ok(None);
            }

            match self.loader.block_type() {
                ENHANCED_PACKET_BLOCK => break Kind::Enhanced,
                SIMPLE_PACKET_BLOCK => break Kind::Simple,
                PACKET_BLOCK => break Kind::Legacy,

                INTERFACE_DESCRIPTION_BLOCK => {
                    let idb = InterfaceDescriptionBlock::from_cursor::<B>(&mut self.loader.body())?;
                    self.state.on_interface_description(idb)?;
                },
                SECTION_HEADER_BLOCK => {
                    let shb = SectionHeaderBlock::from_cursor(&mut self.loader.body())?;
                    self.state.on_section_header(shb)?;
                },
                t => trace!("skipping block of type {:#010X}", t),
            }
        };

        let mut cursor = self.loader.body();
        let (ticks, captured_len, original_len) = match kind {
            Kind::Enhanced => {
                let epb = EnhancedPacketBlock::from_cursor::<B>(&mut cursor)?;
                self.state.check_interface_id(epb.interface_id)?;
                (epb.timestamp, epb.captured_len, epb.original_len)
            },
            Kind::Simple => {
                let spb = SimplePacketBlock::from_cursor::<B>(&mut cursor)?;
                // SPB packets are assumed to have arrived on the first interface
                self.state.check_interface_id(0)?;

                // The SPB doesn't carry the captured length: it is the
                // minimum of the snapshot length and the packet length.
                let captured_len = spb.original_len.min(self.state.snaplen());
                (0, captured_len, spb.original_len)
            },
            Kind::Legacy => {
                let pb = PacketBlock::from_cursor::<B>(&mut cursor)?;
                self.state.check_interface_id(pb.interface_id as u32)?;
                (pb.timestamp, pb.captured_len, pb.original_len)
            },
        };

        let timestamp = self.state.packet_timestamp(ticks);

        let data = cursor.take(captured_len as usize).map_err(|_| PcapError::Truncated("packet data"))?;
        let pad = pad_len(captured_len as usize);
        if pad != 0 {
            cursor.take(pad).map_err(|_| PcapError::Truncated("packet data padding"))?;
        }

        // Only a comment in leading position is recovered; no further
        // options are parsed.
        let mut comment = None;
        if cursor.remaining() >= 4 {
            if let Some(opt) = next_option::<B>(&mut cursor)? {
                if opt.code == OPT_COMMENT && opt.length > 0 {
                    comment = Some(PacketComment::new(opt.value));
                }
            }
        }

        Ok(Some(Packet { timestamp, original_len, data: Cow::Borrowed(data), comment }))
    }

    /// Returns the next block verbatim, in the byte order of its section,
    /// so that a higher-level consumer can re-emit pcapng blocks.
    ///
    /// The stream is replayed from its very beginning: the Section Header
    /// Block and everything up to the first Interface Description Block
    /// come back first, even though the constructor already consumed them.
    /// Section and interface state updates, the byte-order pinning and the
    /// interface checks on packet prefixes all still apply. Interleaving
    /// this entry point with [`next_packet`] is not supported.
    ///
    /// [`next_packet`]: PcapNgReader::next_packet
    pub fn next_raw_block(&mut self) -> Option<PcapResult<RawBlock<'_>>> {
        match self.state.endianness() {
            Endianness::Big => self.next_raw_block_inner::<BigEndian>().transpose(),
            Endianness::Little => self.next_raw_block_inner::<LittleEndian>().transpose(),
        }
    }

    fn next_raw_block_inner<B: ByteOrder>(&mut self) -> PcapResult<Option<RawBlock<'_>>> {
        if let Some(bytes) = self.preamble.pop_front() {
            let raw: &[u8] = &*self.replayed.insert(bytes);
            self.state.register_block::<B>(cursor_over::<B>(raw))?;
            return Ok(Some(RawBlock::from_loaded::<B>(raw)));
        }

        if !self.loader.advance::<B>()? {
            return Ok(None);
        }

        self.state.register_block::<B>(self.loader.body())?;
        Ok(Some(RawBlock::from_loaded::<B>(self.loader.raw())))
    }

    /// Returns the current section header.
    pub fn section(&self) -> &SectionHeaderBlock {
        self.state.section()
    }

    /// Returns the first, authoritative interface of the stream.
    pub fn interface(&self) -> Option<&InterfaceDescriptionBlock> {
        self.state.interface()
    }

    /// Returns the byte order of the stream.
    pub fn endianness(&self) -> Endianness {
        self.state.endianness()
    }

    /// Consumes the [`PcapNgReader`], returning the wrapped reader.
    pub fn into_inner(self) -> R {
        self.loader.into_inner()
    }

    /// Gets a reference to the wrapped reader.
    pub fn get_ref(&self) -> &R {
        self.loader.get_ref()
    }

    /// Gets a mutable reference to the wrapped reader.
    ///
    /// Reading from the underlying reader desynchronizes the block
    /// framing; it is not advised.
    pub fn get_mut(&mut self) -> &mut R {
        self.loader.get_mut()
    }
}

/// Cursor over the body of an already-framed block held in `raw`.
fn cursor_over<B: ByteOrder>(raw: &[u8]) -> BlockCursor<'_> {
    let mut head = &raw[..4];
    let block_type = head.read_u32::<B>().unwrap();

    BlockCursor::new(block_type, &raw[8..raw.len() - 4])
}
