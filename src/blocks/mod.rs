//! Contains the PcapNg blocks.


pub mod enhanced_packet;
pub mod interface_description;
pub mod packet;
pub mod section_header;
pub mod simple_packet;
pub(crate) mod block_common;
pub(crate) mod opt_common;

pub use block_common::{
    RawBlock, ENHANCED_PACKET_BLOCK, INTERFACE_DESCRIPTION_BLOCK, MAX_BLOCK_LEN, PACKET_BLOCK, SECTION_HEADER_BLOCK,
    SIMPLE_PACKET_BLOCK,
};
pub use opt_common::{OPT_COMMENT, OPT_END_OF_OPTIONS};
