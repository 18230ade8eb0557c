//! Typed view over the body of a loaded block.

use byteorder_slice::result::ReadSlice;
use byteorder_slice::ByteOrder;

use crate::errors::PcapError;
use crate::PcapResult;


/// A view over the body of a block, between its header and its trailer.
///
/// All reads advance the remaining window and return sub-slices of the
/// initial borrow, so the data handed out stays valid for as long as the
/// cursor's source buffer does.
#[derive(Clone, Debug)]
pub struct BlockCursor<'a> {
    block_type: u32,
    rem: &'a [u8],
}

impl<'a> BlockCursor<'a> {
    /// Creates a cursor over the body of a block of the given type,
    /// header and trailer excluded.
    pub fn new(block_type: u32, body: &'a [u8]) -> Self {
        BlockCursor { block_type, rem: body }
    }

    /// Type field of the block this cursor walks.
    pub fn block_type(&self) -> u32 {
        self.block_type
    }

    /// Number of bytes left in the body.
    pub fn remaining(&self) -> usize {
        self.rem.len()
    }

    /// Advances the cursor by `n` bytes and returns the window it skipped.
    pub fn take(&mut self, n: usize) -> PcapResult<&'a [u8]> {
        if self.rem.len() < n {
            return Err(PcapError::Truncated("block body"));
        }

        let (chunk, rem) = self.rem.split_at(n);
        self.rem = rem;

        Ok(chunk)
    }

    /// Reads a `u8` from the body.
    pub fn read_u8(&mut self) -> PcapResult<u8> {
        self.rem.read_u8().map_err(|_| PcapError::Truncated("block body"))
    }

    /// Reads a `u16` from the body in the `B` byte order.
    pub fn read_u16<B: ByteOrder>(&mut self) -> PcapResult<u16> {
        self.rem.read_u16::<B>().map_err(|_| PcapError::Truncated("block body"))
    }

    /// Reads a `u32` from the body in the `B` byte order.
    pub fn read_u32<B: ByteOrder>(&mut self) -> PcapResult<u32> {
        self.rem.read_u32::<B>().map_err(|_| PcapError::Truncated("block body"))
    }

    /// Reads a `u64` from the body in the `B` byte order.
    pub fn read_u64<B: ByteOrder>(&mut self) -> PcapResult<u64> {
        self.rem.read_u64::<B>().map_err(|_| PcapError::Truncated("block body"))
    }

    /// Reads an `i64` from the body in the `B` byte order.
    pub fn read_i64<B: ByteOrder>(&mut self) -> PcapResult<i64> {
        self.rem.read_i64::<B>().map_err(|_| PcapError::Truncated("block body"))
    }
}


#[cfg(test)]
mod tests {
    use byteorder_slice::BigEndian;

    use super::*;

    #[test]
    fn take_advances_the_window() {
        let data = [1, 2, 3, 4, 5, 6];
        let mut cursor = BlockCursor::new(6, &data);

        assert_eq!(cursor.take(2).unwrap(), &[1, 2]);
        assert_eq!(cursor.read_u32::<BigEndian>().unwrap(), 0x03040506);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn take_past_the_end_fails() {
        let data = [1, 2, 3];
        let mut cursor = BlockCursor::new(6, &data);

        assert!(matches!(cursor.take(4), Err(PcapError::Truncated(_))));
        // A failed take must not consume anything
        assert_eq!(cursor.remaining(), 3);
    }
}
