//! Generic block option plumbing.

use std::io::Write;

use byteorder_slice::byteorder::WriteBytesExt;
use byteorder_slice::ByteOrder;

use crate::cursor::BlockCursor;
use crate::errors::PcapError;
use crate::PcapResult;


/// End of options option code
pub const OPT_END_OF_OPTIONS: u16 = 0;
/// Comment option code, valid in every block type
pub const OPT_COMMENT: u16 = 1;


/// One option record: a 2-byte code, a 2-byte length and a value padded
/// to a 4-byte boundary.
#[derive(Clone, Debug)]
pub(crate) struct OptionRecord<'a> {
    /// Option code
    pub code: u16,
    /// Option length, padding excluded
    pub length: u16,
    /// Option value, padding stripped
    pub value: &'a [u8],
}

/// Reads the next option record from a block body.
///
/// A cursor with nothing remaining yields `None`: options may also end by
/// exhausting the block instead of with an explicit end-of-options record.
pub(crate) fn next_option<'a, B: ByteOrder>(cursor: &mut BlockCursor<'a>) -> PcapResult<Option<OptionRecord<'a>>> {
    if cursor.remaining() == 0 {
        return Ok(None);
    }

    let code = cursor.read_u16::<B>().map_err(|_| PcapError::Truncated("option header"))?;
    let length = cursor.read_u16::<B>().map_err(|_| PcapError::Truncated("option header"))?;

    let padded_len = pad_len(length as usize) + length as usize;
    let value = cursor.take(padded_len).map_err(|_| PcapError::Truncated("option value"))?;

    Ok(Some(OptionRecord { code, length, value: &value[..length as usize] }))
}

/// Writes one option record, padding the value to a 4-byte boundary.
pub(crate) fn write_option<B: ByteOrder, W: Write>(writer: &mut W, code: u16, value: &[u8]) -> PcapResult<usize> {
    let len = value.len();
    let pad = pad_len(len);

    writer.write_u16::<B>(code)?;
    writer.write_u16::<B>(len as u16)?;
    writer.write_all(value)?;
    writer.write_all(&[0_u8; 3][..pad])?;

    Ok(len + pad + 4)
}

/// Writes the end-of-options record.
pub(crate) fn write_end_of_options<B: ByteOrder, W: Write>(writer: &mut W) -> PcapResult<usize> {
    writer.write_u16::<B>(OPT_END_OF_OPTIONS)?;
    writer.write_u16::<B>(0)?;

    Ok(4)
}

/// Number of padding bytes after `len` bytes of value or packet data.
pub(crate) fn pad_len(len: usize) -> usize {
    (4 - len % 4) % 4
}


#[cfg(test)]
mod tests {
    use byteorder_slice::BigEndian;

    use super::*;

    /// A list of options without an end-of-options record ends on block end.
    #[test]
    fn opt_without_endofopt() {
        let data = [0, 9, 0, 1, 0x83, 0, 0, 0];
        let mut cursor = BlockCursor::new(1, &data);

        let opt = next_option::<BigEndian>(&mut cursor).expect("Failed to read the option").unwrap();
        assert_eq!(opt.code, 9);
        assert_eq!(opt.length, 1);
        assert_eq!(opt.value, &[0x83]);

        assert!(next_option::<BigEndian>(&mut cursor).unwrap().is_none());
    }

    /// An option value that overruns the block body is an error.
    #[test]
    fn opt_value_cut_short() {
        let data = [0, 1, 0, 12, b'h', b'i'];
        let mut cursor = BlockCursor::new(1, &data);

        assert!(matches!(next_option::<BigEndian>(&mut cursor), Err(PcapError::Truncated(_))));
    }

    #[test]
    fn write_option_pads_to_alignment() {
        let mut out = Vec::new();
        let written = write_option::<BigEndian, _>(&mut out, OPT_COMMENT, b"hello").unwrap();

        assert_eq!(written, 12);
        assert_eq!(out, [0, 1, 0, 5, b'h', b'e', b'l', b'l', b'o', 0, 0, 0]);
    }
}
