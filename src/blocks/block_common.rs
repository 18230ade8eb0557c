//! Common block types.

use std::borrow::Cow;
use std::io::Write;

use byteorder_slice::byteorder::WriteBytesExt;
use byteorder_slice::result::ReadSlice;
use byteorder_slice::ByteOrder;
use derive_into_owned::IntoOwned;

use crate::cursor::BlockCursor;
use crate::PcapResult;


/// Section header block type
pub const SECTION_HEADER_BLOCK: u32 = 0x0A0D0D0A;
/// Interface description block type
pub const INTERFACE_DESCRIPTION_BLOCK: u32 = 0x00000001;
/// Packet block type, obsolete
pub const PACKET_BLOCK: u32 = 0x00000002;
/// Simple packet block type
pub const SIMPLE_PACKET_BLOCK: u32 = 0x00000003;
/// Enhanced packet block type
pub const ENHANCED_PACKET_BLOCK: u32 = 0x00000006;

/// Maximum accepted block size.
///
/// Large enough for any reasonable block, small enough not to chew up all
/// the memory on a malformed length field.
pub const MAX_BLOCK_LEN: u32 = 16 * 1024 * 1024;

/// Length of a block header: type field + total length field.
pub(crate) const BLOCK_HEADER_LEN: usize = 8;
/// Length of a block trailer: the duplicated total length field.
pub(crate) const BLOCK_TRAILER_LEN: usize = 4;
/// Smallest possible block: a header directly followed by a trailer.
pub(crate) const MIN_BLOCK_LEN: usize = BLOCK_HEADER_LEN + BLOCK_TRAILER_LEN;


//   0               1               2               3
//   0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  |                          Block Type                           |
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  |                      Block Total Length                       |
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  /                          Block Body                           /
//  /          /* variable length, aligned to 32 bits */            /
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  |                      Block Total Length                       |
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// A framed PcapNg block, kept in the byte order of its section.
///
/// The body bytes are exactly as they appear in the stream; only the type
/// and length fields are decoded. Re-emitting the block with [`write_to`]
/// in the section's byte order reproduces it verbatim (modulo the padding
/// normalization applied by the loader to non-conformant lengths).
///
/// [`write_to`]: RawBlock::write_to
#[derive(Clone, Debug, IntoOwned, Eq, PartialEq)]
pub struct RawBlock<'a> {
    /// Type field
    pub type_: u32,
    /// Initial length field
    pub initial_len: u32,
    /// Body of the block
    pub body: Cow<'a, [u8]>,
    /// Trailer length field
    pub trailer_len: u32,
}

impl<'a> RawBlock<'a> {
    /// Builds a [`RawBlock`] over a loader-normalized framed block.
    pub(crate) fn from_loaded<B: ByteOrder>(mut raw: &'a [u8]) -> Self {
        let body = &raw[BLOCK_HEADER_LEN..raw.len() - BLOCK_TRAILER_LEN];
        let total_len = raw.len() as u32;
        let type_ = raw.read_u32::<B>().unwrap();

        RawBlock { type_, initial_len: total_len, body: Cow::Borrowed(body), trailer_len: total_len }
    }

    /// Cursor over the body of the block, for decoding it further.
    pub fn cursor(&self) -> BlockCursor<'_> {
        BlockCursor::new(self.type_, &self.body)
    }

    /// Writes a [`RawBlock`] to a writer in the `B` byte order.
    pub fn write_to<B: ByteOrder, W: Write>(&self, writer: &mut W) -> PcapResult<usize> {
        writer.write_u32::<B>(self.type_)?;
        writer.write_u32::<B>(self.initial_len)?;
        writer.write_all(&self.body[..])?;
        writer.write_u32::<B>(self.trailer_len)?;

        Ok(self.body.len() + MIN_BLOCK_LEN)
    }
}


/// Writes one framed block: header, body, trailer duplicating the length.
///
/// `body_len` must be the exact number of bytes `write_body` emits,
/// padding included.
pub(crate) fn write_block<B: ByteOrder, W: Write, F>(
    writer: &mut W,
    block_type: u32,
    body_len: usize,
    write_body: F,
) -> PcapResult<usize>
where
    F: FnOnce(&mut W) -> PcapResult<()>,
{
    let total_len = (body_len + MIN_BLOCK_LEN) as u32;

    writer.write_u32::<B>(block_type)?;
    writer.write_u32::<B>(total_len)?;
    write_body(writer)?;
    writer.write_u32::<B>(total_len)?;

    Ok(total_len as usize)
}
