#![allow(clippy::cast_lossless)]

//! Interface Description Block (IDB).

use std::io::Write;

use byteorder_slice::byteorder::WriteBytesExt;
use byteorder_slice::result::ReadSlice;
use byteorder_slice::ByteOrder;
use once_cell::sync::Lazy;

use super::opt_common::{next_option, OPT_END_OF_OPTIONS};
use crate::cursor::BlockCursor;
use crate::errors::PcapError;
use crate::{DataLink, PcapResult};


/// The if_name option code: the name of the capture device.
const IF_NAME: u16 = 2;
/// The if_tsresol option code: the resolution of timestamps.
const IF_TSRESOL: u16 = 9;
/// The if_tsoffset option code: seconds to add to each packet timestamp.
const IF_TSOFFSET: u16 = 14;

/// Timestamp resolution used when an IDB carries no if_tsresol option,
/// in ticks per second.
pub const DEFAULT_TS_RESOLUTION: u64 = 1_000_000;


/// An Interface Description Block (IDB) describes an interface on which
/// packet data was captured.
///
/// Only the fields that govern packet interpretation are retained; the
/// remaining options are consumed and ignored.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InterfaceDescriptionBlock {
    /// A value that defines the link layer type of this interface.
    pub linktype: DataLink,

    /// Maximum number of octets captured from each packet.
    ///
    /// The portion of each packet that exceeds this value will not be
    /// stored in the file. A value of zero indicates no limit.
    pub snaplen: u32,

    /// Timestamp resolution of the interface, in ticks per second.
    /// Defaults to microseconds.
    pub ts_resolution: u64,

    /// Seconds to add to the decoded seconds of each packet timestamp.
    /// Zero for absolute timestamps.
    pub ts_offset: u64,
}

impl InterfaceDescriptionBlock {
    /// Parses an [`InterfaceDescriptionBlock`] from a block body,
    /// fixed-length portion and options included.
    pub fn from_cursor<B: ByteOrder>(cursor: &mut BlockCursor) -> PcapResult<Self> {
        let linktype = (cursor.read_u16::<B>()? as u32).into();

        // The reserved field carries no information; writers in the wild
        // leave garbage in it, so its value is not checked.
        let _reserved = cursor.read_u16::<B>()?;

        let snaplen = cursor.read_u32::<B>()?;
        let (ts_resolution, ts_offset) = process_options::<B>(cursor)?;

        Ok(InterfaceDescriptionBlock { linktype, snaplen, ts_resolution, ts_offset })
    }

    /// Writes the fixed-length body of an [`InterfaceDescriptionBlock`] to
    /// a writer, without options.
    pub fn write_to<B: ByteOrder, W: Write>(&self, writer: &mut W) -> PcapResult<usize> {
        writer.write_u16::<B>(u32::from(self.linktype) as u16)?;
        writer.write_u16::<B>(0)?;
        writer.write_u32::<B>(self.snaplen)?;

        Ok(8)
    }
}


/// Walks the option list of an IDB and returns the observed
/// `(ts_resolution, ts_offset)`, defaulted when absent.
///
/// Recognized options are validated (length, multiplicity); every other
/// option is consumed and ignored.
fn process_options<B: ByteOrder>(cursor: &mut BlockCursor) -> PcapResult<(u64, u64)> {
    let mut ts_resolution = DEFAULT_TS_RESOLUTION;
    let mut ts_offset = 0_u64;

    let mut saw_ifname = false;
    let mut saw_tsresol = false;
    let mut saw_tsoffset = false;

    while let Some(opt) = next_option::<B>(cursor)? {
        match opt.code {
            OPT_END_OF_OPTIONS => {
                if opt.length != 0 {
                    return Err(PcapError::MalformedOption("opt_endofopt length != 0"));
                }
                break;
            },

            IF_NAME => {
                if saw_ifname {
                    return Err(PcapError::DuplicateOption("if_name"));
                }
                saw_ifname = true;
            },

            IF_TSRESOL => {
                if opt.length != 1 {
                    return Err(PcapError::MalformedOption("if_tsresol length != 1"));
                }
                if saw_tsresol {
                    return Err(PcapError::DuplicateOption("if_tsresol"));
                }
                saw_tsresol = true;
                ts_resolution = decode_ts_resolution(opt.value[0])?;
            },

            IF_TSOFFSET => {
                if opt.length != 8 {
                    return Err(PcapError::MalformedOption("if_tsoffset length != 8"));
                }
                if saw_tsoffset {
                    return Err(PcapError::DuplicateOption("if_tsoffset"));
                }
                saw_tsoffset = true;

                let mut value = opt.value;
                ts_offset = value.read_u64::<B>().unwrap();
            },

            _ => {},
        }
    }

    Ok((ts_resolution, ts_offset))
}

/// Decodes an if_tsresol byte into ticks per second.
///
/// The high bit selects a negative power of 2, otherwise the value is a
/// negative power of 10.
fn decode_ts_resolution(raw: u8) -> PcapResult<u64> {
    static DECIMAL_TICKS: Lazy<Vec<u64>> = Lazy::new(|| (0..20).map(|i| 10_u64.pow(i)).collect());

    if raw & 0x80 != 0 {
        1_u64.checked_shl((raw & 0x7F) as u32).ok_or(PcapError::ResolutionTooHigh(raw))
    }
    else {
        DECIMAL_TICKS.get(raw as usize).copied().ok_or(PcapError::ResolutionTooHigh(raw))
    }
}


#[cfg(test)]
mod tests {
    use byteorder_slice::BigEndian;

    use super::*;

    #[test]
    fn ts_resolution_decoding() {
        assert_eq!(decode_ts_resolution(0).unwrap(), 1);
        assert_eq!(decode_ts_resolution(6).unwrap(), 1_000_000);
        assert_eq!(decode_ts_resolution(9).unwrap(), 1_000_000_000);
        assert_eq!(decode_ts_resolution(0x83).unwrap(), 8);
        assert_eq!(decode_ts_resolution(0x9E).unwrap(), 1 << 30);

        assert!(matches!(decode_ts_resolution(20), Err(PcapError::ResolutionTooHigh(20))));
        assert!(matches!(decode_ts_resolution(0xC0), Err(PcapError::ResolutionTooHigh(0xC0))));
    }

    #[test]
    fn options_in_any_order() {
        // if_tsoffset before if_tsresol, then end-of-options
        let data = [
            0, 14, 0, 8, 0, 0, 0, 0, 0, 0, 0, 42, // if_tsoffset = 42
            0, 9, 0, 1, 9, 0, 0, 0, // if_tsresol = 10^-9
            0, 0, 0, 0, // opt_endofopt
        ];
        let mut cursor = BlockCursor::new(1, &data);

        let (resol, offset) = process_options::<BigEndian>(&mut cursor).unwrap();
        assert_eq!(resol, 1_000_000_000);
        assert_eq!(offset, 42);
    }

    #[test]
    fn duplicated_tsresol_is_rejected() {
        let data = [
            0, 9, 0, 1, 6, 0, 0, 0, //
            0, 9, 0, 1, 9, 0, 0, 0, //
        ];
        let mut cursor = BlockCursor::new(1, &data);

        assert!(matches!(process_options::<BigEndian>(&mut cursor), Err(PcapError::DuplicateOption("if_tsresol"))));
    }

    #[test]
    fn end_of_options_with_nonzero_length_is_rejected() {
        let data = [0, 0, 0, 4, 1, 2, 3, 4];
        let mut cursor = BlockCursor::new(1, &data);

        assert!(matches!(process_options::<BigEndian>(&mut cursor), Err(PcapError::MalformedOption(_))));
    }
}
