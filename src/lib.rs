#![allow(clippy::unreadable_literal)]

//! Provides a parser, a reader and a writer for the PcapNg file format.
//!
//! To read a PcapNg stream see [`PcapNgReader`]; to write one see
//! [`PcapNgWriter`]. The blocks themselves live in the [`blocks`] module.

pub use common::*;
pub use errors::*;
pub use packet::{Packet, PacketComment, COMMENT_BUF_LEN};
pub use reader::PcapNgReader;
pub use writer::PcapNgWriter;

pub(crate) mod common;
pub(crate) mod cursor;
pub(crate) mod errors;
pub(crate) mod packet;
pub(crate) mod read_buffer;
pub(crate) mod reader;
pub(crate) mod section;
pub(crate) mod writer;

pub mod blocks;

pub use cursor::BlockCursor;
