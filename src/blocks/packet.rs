//! Packet Block (PB).

use byteorder_slice::ByteOrder;

use crate::cursor::BlockCursor;
use crate::PcapResult;


/// Fixed-length portion of a Packet Block.
///
/// The Packet Block is obsolete and MUST NOT be used in new files; it is
/// decoded for compatibility with old captures only. Use the Enhanced
/// Packet Block or the Simple Packet Block instead.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PacketBlock {
    /// It specifies the interface this packet comes from.
    pub interface_id: u16,

    /// Local drop counter.
    ///
    /// Number of packets lost by the interface and the operating system
    /// between this packet and the preceding one.
    pub drop_count: u16,

    /// Number of interface timestamp-resolution ticks elapsed since
    /// 1970-01-01 00:00:00 UTC, composed from the two 32-bit halves.
    pub timestamp: u64,

    /// Number of octets captured from the packet.
    pub captured_len: u32,

    /// Actual length of the packet when it was transmitted on the network.
    pub original_len: u32,
}

impl PacketBlock {
    /// Parses the fixed-length portion of a PB, leaving the cursor on the
    /// packet data.
    pub fn from_cursor<B: ByteOrder>(cursor: &mut BlockCursor) -> PcapResult<Self> {
        let interface_id = cursor.read_u16::<B>()?;
        let drop_count = cursor.read_u16::<B>()?;

        let timestamp_high = cursor.read_u32::<B>()? as u64;
        let timestamp_low = cursor.read_u32::<B>()? as u64;
        let timestamp = (timestamp_high << 32) | timestamp_low;

        let captured_len = cursor.read_u32::<B>()?;
        let original_len = cursor.read_u32::<B>()?;

        Ok(PacketBlock { interface_id, drop_count, timestamp, captured_len, original_len })
    }
}
