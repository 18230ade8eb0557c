//! In-memory pcapng fixture builders.
#![allow(dead_code)]

use byteorder_slice::byteorder::WriteBytesExt;
use byteorder_slice::ByteOrder;

pub const SHB: u32 = 0x0A0D0D0A;
pub const IDB: u32 = 1;
pub const PB: u32 = 2;
pub const SPB: u32 = 3;
pub const EPB: u32 = 6;

/// Frames a block body: type, total length, body, duplicated length.
pub fn block<B: ByteOrder>(block_type: u32, body: &[u8]) -> Vec<u8> {
    let total_len = (body.len() + 12) as u32;

    let mut out = Vec::new();
    out.write_u32::<B>(block_type).unwrap();
    out.write_u32::<B>(total_len).unwrap();
    out.extend_from_slice(body);
    out.write_u32::<B>(total_len).unwrap();
    out
}

/// A Section Header Block, version 1.0, unspecified section length.
pub fn shb<B: ByteOrder>() -> Vec<u8> {
    let mut body = Vec::new();
    body.write_u32::<B>(0x1A2B3C4D).unwrap();
    body.write_u16::<B>(1).unwrap();
    body.write_u16::<B>(0).unwrap();
    body.write_i64::<B>(-1).unwrap();

    block::<B>(SHB, &body)
}

/// An Interface Description Block with pre-encoded options.
pub fn idb<B: ByteOrder>(linktype: u16, snaplen: u32, options: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.write_u16::<B>(linktype).unwrap();
    body.write_u16::<B>(0).unwrap();
    body.write_u32::<B>(snaplen).unwrap();
    body.extend_from_slice(options);

    block::<B>(IDB, &body)
}

/// One option record, value padded to a 4-byte boundary.
pub fn option<B: ByteOrder>(code: u16, value: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u16::<B>(code).unwrap();
    out.write_u16::<B>(value.len() as u16).unwrap();
    out.extend_from_slice(value);
    out.extend_from_slice(&[0, 0, 0][..(4 - value.len() % 4) % 4]);
    out
}

pub fn end_of_options<B: ByteOrder>() -> Vec<u8> {
    option::<B>(0, &[])
}

/// An Enhanced Packet Block; the captured length is the data length.
pub fn epb<B: ByteOrder>(interface_id: u32, timestamp: u64, data: &[u8], original_len: u32, options: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.write_u32::<B>(interface_id).unwrap();
    body.write_u32::<B>((timestamp >> 32) as u32).unwrap();
    body.write_u32::<B>((timestamp & 0xFFFFFFFF) as u32).unwrap();
    body.write_u32::<B>(data.len() as u32).unwrap();
    body.write_u32::<B>(original_len).unwrap();
    body.extend_from_slice(data);
    body.extend_from_slice(&[0, 0, 0][..(4 - data.len() % 4) % 4]);
    body.extend_from_slice(options);

    block::<B>(EPB, &body)
}

/// A Simple Packet Block holding `data` bytes of the packet.
pub fn spb<B: ByteOrder>(original_len: u32, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.write_u32::<B>(original_len).unwrap();
    body.extend_from_slice(data);
    body.extend_from_slice(&[0, 0, 0][..(4 - data.len() % 4) % 4]);

    block::<B>(SPB, &body)
}

/// An obsolete Packet Block; the captured length is the data length.
pub fn pb<B: ByteOrder>(
    interface_id: u16,
    drop_count: u16,
    timestamp: u64,
    data: &[u8],
    original_len: u32,
    options: &[u8],
) -> Vec<u8> {
    let mut body = Vec::new();
    body.write_u16::<B>(interface_id).unwrap();
    body.write_u16::<B>(drop_count).unwrap();
    body.write_u32::<B>((timestamp >> 32) as u32).unwrap();
    body.write_u32::<B>((timestamp & 0xFFFFFFFF) as u32).unwrap();
    body.write_u32::<B>(data.len() as u32).unwrap();
    body.write_u32::<B>(original_len).unwrap();
    body.extend_from_slice(data);
    body.extend_from_slice(&[0, 0, 0][..(4 - data.len() % 4) % 4]);
    body.extend_from_slice(options);

    block::<B>(PB, &body)
}

/// Concatenates blocks into one stream.
pub fn stream(blocks: &[Vec<u8>]) -> Vec<u8> {
    blocks.concat()
}
