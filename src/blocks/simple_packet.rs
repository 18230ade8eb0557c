//! Simple Packet Block (SPB).

use byteorder_slice::ByteOrder;

use crate::cursor::BlockCursor;
use crate::PcapResult;


/// Fixed-length portion of a Simple Packet Block (SPB), a lightweight
/// container for packets coming from the network.
///
/// The SPB carries neither a timestamp nor a captured length: packets are
/// assumed to have arrived on the first interface, and the captured length
/// is the minimum of the original length and the interface snap length.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SimplePacketBlock {
    /// Actual length of the packet when it was transmitted on the network.
    pub original_len: u32,
}

impl SimplePacketBlock {
    /// Parses the fixed-length portion of an SPB, leaving the cursor on
    /// the packet data.
    pub fn from_cursor<B: ByteOrder>(cursor: &mut BlockCursor) -> PcapResult<Self> {
        let original_len = cursor.read_u32::<B>()?;

        Ok(SimplePacketBlock { original_len })
    }
}
