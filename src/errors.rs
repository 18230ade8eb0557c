//! Error types of the crate.

use thiserror::Error;

/// Result of a pcapng parsing, reading or writing operation.
pub type PcapResult<T> = Result<T, PcapError>;

/// Errors that can occur while parsing, reading or writing a PcapNg stream.
#[derive(Debug, Error)]
pub enum PcapError {
    /// An I/O error occurred on the underlying stream.
    #[error("error reading or writing the capture stream")]
    IoError(#[from] std::io::Error),

    /// The stream ended in the middle of a block or of a field.
    #[error("truncated capture: {0}")]
    Truncated(&'static str),

    /// A block advertises a total length above the 16 MiB ceiling.
    #[error("pcapng block size {0} > maximum {max}", max = crate::blocks::MAX_BLOCK_LEN)]
    BlockTooLarge(u32),

    /// A block advertises a total length smaller than its header plus trailer.
    #[error("pcapng block has a length of {0} < 12")]
    BlockTooShort(u32),

    /// A section header carries an invalid byte-order magic field.
    #[error("section header has an invalid byte-order magic: {0:#010X}")]
    BadMagic(u32),

    /// A later section header contradicts the byte order of the first one.
    #[error("the capture has sections with different byte orders")]
    ByteOrderChanged,

    /// The major version of a section is not 1.
    #[error("unknown pcapng major version number {0}")]
    UnsupportedVersion(u16),

    /// The stream ended before any Interface Description Block.
    #[error("the capture has no Interface Description Block")]
    NoInterface,

    /// A packet block appeared before any Interface Description Block.
    #[error("the capture has a packet block before any Interface Description Block")]
    PacketBeforeIdb,

    /// A packet block references an interface with no Interface Description Block.
    #[error("a packet arrived on interface {0}, but there's no Interface Description Block for it")]
    UnknownInterface(u32),

    /// A later Interface Description Block contradicts the first one.
    #[error("an interface has a {0} different from the first interface")]
    InterfaceMismatch(&'static str),

    /// An option that may appear at most once appeared again.
    #[error("block has more than one {0} option")]
    DuplicateOption(&'static str),

    /// An option record violates the format of its option code.
    #[error("malformed option: {0}")]
    MalformedOption(&'static str),

    /// An `if_tsresol` value that does not fit a 64-bit tick denominator.
    #[error("if_tsresol option resolution {0:#04X} is too high")]
    ResolutionTooHigh(u8),

    /// The stream does not start with a pcapng Section Header Block.
    #[error("not a pcapng capture")]
    NotPcapNg,
}
