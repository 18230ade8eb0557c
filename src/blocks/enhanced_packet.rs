//! Enhanced Packet Block (EPB).

use std::io::Write;

use byteorder_slice::byteorder::WriteBytesExt;
use byteorder_slice::ByteOrder;

use super::block_common::{write_block, ENHANCED_PACKET_BLOCK};
use super::opt_common::{pad_len, write_end_of_options, write_option, OPT_COMMENT};
use crate::cursor::BlockCursor;
use crate::PcapResult;


/// Fixed-length portion of an Enhanced Packet Block (EPB), the standard
/// container for packets coming from the network.
///
/// The packet data, its padding and the trailing options follow this
/// prefix in the block body.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EnhancedPacketBlock {
    /// It specifies the interface this packet comes from.
    ///
    /// The correct interface is the one whose Interface Description Block
    /// (within the current section) is identified by the same number.
    pub interface_id: u32,

    /// Number of interface timestamp-resolution ticks elapsed since
    /// 1970-01-01 00:00:00 UTC, composed from the two 32-bit halves.
    pub timestamp: u64,

    /// Number of octets captured from the packet.
    pub captured_len: u32,

    /// Actual length of the packet when it was transmitted on the network.
    pub original_len: u32,
}

impl EnhancedPacketBlock {
    /// Parses the fixed-length portion of an EPB, leaving the cursor on
    /// the packet data.
    pub fn from_cursor<B: ByteOrder>(cursor: &mut BlockCursor) -> PcapResult<Self> {
        let interface_id = cursor.read_u32::<B>()?;

        let timestamp_high = cursor.read_u32::<B>()? as u64;
        let timestamp_low = cursor.read_u32::<B>()? as u64;
        let timestamp = (timestamp_high << 32) | timestamp_low;

        let captured_len = cursor.read_u32::<B>()?;
        let original_len = cursor.read_u32::<B>()?;

        Ok(EnhancedPacketBlock { interface_id, timestamp, captured_len, original_len })
    }
}


/// Writes one framed EPB: prefix, packet data, padding and, for a
/// non-empty comment, the comment option followed by end-of-options.
pub(crate) fn write_enhanced_packet<B: ByteOrder, W: Write>(
    writer: &mut W,
    timestamp: u64,
    data: &[u8],
    original_len: u32,
    comment: Option<&[u8]>,
) -> PcapResult<usize> {
    let data_pad = pad_len(data.len());

    let mut body_len = 20 + data.len() + data_pad;
    if let Some(comment) = comment {
        body_len += 4 + comment.len() + pad_len(comment.len()); // opt_comment
        body_len += 4; // opt_endofopt
    }

    write_block::<B, W, _>(writer, ENHANCED_PACKET_BLOCK, body_len, |writer| {
        writer.write_u32::<B>(0)?; // interface id, the writer declares only one
        writer.write_u32::<B>((timestamp >> 32) as u32)?;
        writer.write_u32::<B>((timestamp & 0xFFFFFFFF) as u32)?;
        writer.write_u32::<B>(data.len() as u32)?;
        writer.write_u32::<B>(original_len)?;

        writer.write_all(data)?;
        writer.write_all(&[0_u8; 3][..data_pad])?;

        if let Some(comment) = comment {
            write_option::<B, W>(writer, OPT_COMMENT, comment)?;
            write_end_of_options::<B, W>(writer)?;
        }

        Ok(())
    })
}
