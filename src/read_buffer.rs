//! Framed block loading into a reusable buffer.

use std::io::{ErrorKind, Read};

use byteorder_slice::result::ReadSlice;
use byteorder_slice::ByteOrder;
use tracing::trace;

use crate::blocks::block_common::{BLOCK_HEADER_LEN, BLOCK_TRAILER_LEN, MIN_BLOCK_LEN};
use crate::blocks::MAX_BLOCK_LEN;
use crate::cursor::BlockCursor;
use crate::errors::PcapError;
use crate::PcapResult;


/// Default capacity of the block buffer.
///
/// Large enough for an Enhanced Packet Block holding a full-size Ethernet
/// frame with room for some options; grown on demand for bigger blocks.
pub(crate) const DEFAULT_BUF_CAPACITY: usize = 2048;


/// Reads one framed block at a time from a stream into a reusable buffer.
///
/// The buffer only ever grows, up to the largest block seen (itself bounded
/// by [`MAX_BLOCK_LEN`]). [`advance`] loads the next block; [`raw`] and
/// [`body`] then expose it until the following [`advance`] overwrites it.
///
/// [`advance`]: BlockReader::advance
/// [`raw`]: BlockReader::raw
/// [`body`]: BlockReader::body
#[derive(Debug)]
pub(crate) struct BlockReader<R: Read> {
    reader: R,
    buffer: Vec<u8>,
    last_type: u32,
    last_len: usize,
}

impl<R: Read> BlockReader<R> {
    /// Creates a [`BlockReader`] with a buffer already holding the first
    /// `loaded` bytes of a block of `total_len` bytes; reads the rest.
    ///
    /// This is the bootstrap path: the probe has consumed the start of the
    /// Section Header Block before the endianness was known.
    pub fn resume_block<B: ByteOrder>(reader: R, loaded: &[u8], total_len: usize) -> PcapResult<Self> {
        let mut this = Self {
            reader,
            buffer: vec![0_u8; DEFAULT_BUF_CAPACITY.max(total_len)],
            last_type: 0,
            last_len: 0,
        };

        this.buffer[..loaded.len()].copy_from_slice(loaded);
        read_exact(&mut this.reader, &mut this.buffer[loaded.len()..total_len])?;

        let mut header = &this.buffer[..BLOCK_HEADER_LEN];
        this.last_type = header.read_u32::<B>().unwrap();
        this.last_len = total_len;

        Ok(this)
    }

    /// Reads the next block into the buffer.
    ///
    /// Returns `false` on a clean end of stream, which is only permitted
    /// at the block framing boundary: zero bytes where a block header
    /// would start.
    pub fn advance<B: ByteOrder>(&mut self) -> PcapResult<bool> {
        let mut header = [0_u8; BLOCK_HEADER_LEN];
        if !read_exact_or_eof(&mut self.reader, &mut header)? {
            self.last_len = 0;
            return Ok(false);
        }

        let mut header_slice = &header[..];
        let block_type = header_slice.read_u32::<B>().unwrap();
        let total_len = header_slice.read_u32::<B>().unwrap();

        if total_len > MAX_BLOCK_LEN {
            return Err(PcapError::BlockTooLarge(total_len));
        }
        if (total_len as usize) < MIN_BLOCK_LEN {
            return Err(PcapError::BlockTooShort(total_len));
        }

        // Some writers do not round the total length up to a multiple of 4
        // even though the block body is 32-bit aligned; read the padding
        // they left implicit.
        let total_len = round_up_to_4(total_len as usize);

        if self.buffer.len() < total_len {
            self.buffer.resize(total_len, 0);
        }

        self.buffer[..BLOCK_HEADER_LEN].copy_from_slice(&header);
        read_exact(&mut self.reader, &mut self.buffer[BLOCK_HEADER_LEN..total_len])?;

        trace!("loaded block of type {:#010X}, {} bytes", block_type, total_len);

        self.last_type = block_type;
        self.last_len = total_len;

        Ok(true)
    }

    /// Type field of the last loaded block.
    pub fn block_type(&self) -> u32 {
        self.last_type
    }

    /// The last loaded block, framing included, length normalized.
    pub fn raw(&self) -> &[u8] {
        &self.buffer[..self.last_len]
    }

    /// Cursor over the body of the last loaded block, between its header
    /// and its trailer. The trailer length field is never validated.
    pub fn body(&self) -> BlockCursor<'_> {
        BlockCursor::new(self.last_type, &self.buffer[BLOCK_HEADER_LEN..self.last_len - BLOCK_TRAILER_LEN])
    }

    /// Consumes the [`BlockReader`], returning the wrapped reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }
}

pub(crate) fn round_up_to_4(len: usize) -> usize {
    (len + 3) & !3
}

/// Fills `buf` from the reader. A short read is [`PcapError::Truncated`],
/// end of stream included.
pub(crate) fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> PcapResult<()> {
    if read_up_to(reader, buf)? < buf.len() {
        return Err(PcapError::Truncated("block cut short by end of stream"));
    }

    Ok(())
}

/// Fills `buf` from the reader, permitting a clean end of stream.
///
/// Returns `false` when the stream ended before the first byte; a partial
/// fill is still [`PcapError::Truncated`].
pub(crate) fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> PcapResult<bool> {
    let filled = read_up_to(reader, buf)?;
    if filled == 0 {
        return Ok(false);
    }
    if filled < buf.len() {
        return Err(PcapError::Truncated("block header cut short by end of stream"));
    }

    Ok(true)
}

/// Reads until `buf` is full or the stream ends, returning the number of
/// bytes read.
pub(crate) fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> PcapResult<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(PcapError::IoError(e)),
        }
    }

    Ok(filled)
}


#[cfg(test)]
mod tests {
    use byteorder_slice::byteorder::WriteBytesExt;
    use byteorder_slice::BigEndian;

    use super::*;

    fn framed(block_type: u32, body: &[u8]) -> Vec<u8> {
        let total_len = (body.len() + MIN_BLOCK_LEN) as u32;
        let mut block = Vec::new();
        block.write_u32::<BigEndian>(block_type).unwrap();
        block.write_u32::<BigEndian>(total_len).unwrap();
        block.extend_from_slice(body);
        block.write_u32::<BigEndian>(total_len).unwrap();
        block
    }

    #[test]
    fn loads_one_block_and_reports_eof() {
        let data = framed(42, &[1, 2, 3, 4]);
        let mut reader = BlockReader { reader: &data[..], buffer: vec![], last_type: 0, last_len: 0 };

        assert!(reader.advance::<BigEndian>().unwrap());
        assert_eq!(reader.block_type(), 42);
        assert_eq!(reader.raw(), &data[..]);

        let mut body = reader.body();
        assert_eq!(body.take(4).unwrap(), &[1, 2, 3, 4]);
        assert_eq!(body.remaining(), 0);

        assert!(!reader.advance::<BigEndian>().unwrap());
    }

    #[test]
    fn block_above_the_ceiling_is_rejected() {
        let mut data = Vec::new();
        data.write_u32::<BigEndian>(6).unwrap();
        data.write_u32::<BigEndian>(17 * 1024 * 1024).unwrap();
        let mut reader = BlockReader { reader: &data[..], buffer: vec![], last_type: 0, last_len: 0 };

        assert!(matches!(reader.advance::<BigEndian>(), Err(PcapError::BlockTooLarge(_))));
    }

    #[test]
    fn block_below_the_floor_is_rejected() {
        let mut data = Vec::new();
        data.write_u32::<BigEndian>(6).unwrap();
        data.write_u32::<BigEndian>(8).unwrap();
        let mut reader = BlockReader { reader: &data[..], buffer: vec![], last_type: 0, last_len: 0 };

        assert!(matches!(reader.advance::<BigEndian>(), Err(PcapError::BlockTooShort(8))));
    }

    #[test]
    fn unpadded_total_length_is_rounded_up() {
        // The length field claims 18 bytes but the body is 32-bit aligned
        // in the stream, so 20 bytes are actually present.
        let mut data = Vec::new();
        data.write_u32::<BigEndian>(42).unwrap();
        data.write_u32::<BigEndian>(18).unwrap();
        data.extend_from_slice(&[1, 2, 3, 4, 5, 6, 0, 0]);
        data.write_u32::<BigEndian>(18).unwrap();

        let mut reader = BlockReader { reader: &data[..], buffer: vec![], last_type: 0, last_len: 0 };
        assert!(reader.advance::<BigEndian>().unwrap());
        assert_eq!(reader.raw().len(), 20);
        assert!(!reader.advance::<BigEndian>().unwrap());
    }

    #[test]
    fn truncated_body_is_an_error() {
        let mut data = framed(42, &[1, 2, 3, 4]);
        data.truncate(10);
        let mut reader = BlockReader { reader: &data[..], buffer: vec![], last_type: 0, last_len: 0 };

        assert!(matches!(reader.advance::<BigEndian>(), Err(PcapError::Truncated(_))));
    }
}
