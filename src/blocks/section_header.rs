//! Section Header Block (SHB).

use std::io::Write;

use byteorder_slice::byteorder::WriteBytesExt;
use byteorder_slice::{BigEndian, ByteOrder, LittleEndian};

use crate::cursor::BlockCursor;
use crate::errors::PcapError;
use crate::{Endianness, PcapResult};


/// Byte-order magic in the endianness it was written with.
const MAGIC_BIG: [u8; 4] = [0x1A, 0x2B, 0x3C, 0x4D];
const MAGIC_LITTLE: [u8; 4] = [0x4D, 0x3C, 0x2B, 0x1A];


/// Section Header Block: it defines the most important characteristics of
/// the section that follows it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SectionHeaderBlock {
    /// Endianness of the section, revealed by the byte-order magic.
    pub endianness: Endianness,

    /// Major version of the format.
    /// Current value is 1.
    pub major_version: u16,

    /// Minor version of the format.
    /// Current value is 0.
    pub minor_version: u16,

    /// Length in bytes of the following section excluding this block.
    ///
    /// A value of -1i64 means that the length is unspecified.
    pub section_length: i64,
}

impl SectionHeaderBlock {
    /// Parses a [`SectionHeaderBlock`] from a block body.
    ///
    /// The body is self-describing: the magic field reveals the byte order
    /// of the remaining fields, whatever order the caller read the block
    /// framing in. Trailing options are left unread.
    pub fn from_cursor(cursor: &mut BlockCursor) -> PcapResult<Self> {
        let magic = cursor.take(4).map_err(|_| PcapError::Truncated("section header block"))?;
        let endianness = match *magic {
            [0x1A, 0x2B, 0x3C, 0x4D] => Endianness::Big,
            [0x4D, 0x3C, 0x2B, 0x1A] => Endianness::Little,
            _ => {
                let raw = u32::from_be_bytes([magic[0], magic[1], magic[2], magic[3]]);
                return Err(PcapError::BadMagic(raw));
            },
        };

        let (major_version, minor_version, section_length) = match endianness {
            Endianness::Big => parse_inner::<BigEndian>(cursor)?,
            Endianness::Little => parse_inner::<LittleEndian>(cursor)?,
        };

        return Ok(SectionHeaderBlock { endianness, major_version, minor_version, section_length });

        fn parse_inner<B: ByteOrder>(cursor: &mut BlockCursor) -> PcapResult<(u16, u16, i64)> {
            let maj_ver = cursor.read_u16::<B>()?;
            let min_ver = cursor.read_u16::<B>()?;
            let sec_len = cursor.read_i64::<B>()?;

            Ok((maj_ver, min_ver, sec_len))
        }
    }

    /// Writes the fixed-length body of a [`SectionHeaderBlock`] to a writer.
    pub fn write_to<B: ByteOrder, W: Write>(&self, writer: &mut W) -> PcapResult<usize> {
        match self.endianness {
            Endianness::Big => writer.write_all(&MAGIC_BIG)?,
            Endianness::Little => writer.write_all(&MAGIC_LITTLE)?,
        };

        writer.write_u16::<B>(self.major_version)?;
        writer.write_u16::<B>(self.minor_version)?;
        writer.write_i64::<B>(self.section_length)?;

        Ok(16)
    }
}

impl Default for SectionHeaderBlock {
    fn default() -> Self {
        Self {
            endianness: Endianness::Big,
            major_version: 1,
            minor_version: 0,
            section_length: -1,
        }
    }
}
