//! Canonical decoded packet record.

use std::borrow::Cow;
use std::fmt;
use std::str::Utf8Error;
use std::time::Duration;

use derive_into_owned::IntoOwned;


/// Size of the fixed buffer holding a per-packet comment, terminator
/// included.
pub const COMMENT_BUF_LEN: usize = 256;


/// A packet decoded from an Enhanced, Simple or legacy Packet Block.
///
/// The data is borrowed from the reader's block buffer and stays valid
/// only until the next decode call; call [`into_owned`] to keep a packet
/// across calls.
///
/// [`into_owned`]: Packet::into_owned
#[derive(Clone, Debug, IntoOwned, Eq, PartialEq)]
pub struct Packet<'a> {
    /// Time elapsed since 1970-01-01 00:00:00 UTC, with microsecond
    /// granularity. Zero for Simple Packet Blocks, which carry no
    /// timestamp.
    pub timestamp: Duration,

    /// Actual length of the packet when it was transmitted on the network.
    pub original_len: u32,

    /// The captured data, including link-layer headers.
    pub data: Cow<'a, [u8]>,

    /// Comment attached to the packet, if any.
    pub comment: Option<PacketComment>,
}

impl Packet<'_> {
    /// Number of octets captured from the packet, i.e. the length of the
    /// data field.
    pub fn captured_len(&self) -> u32 {
        self.data.len() as u32
    }
}


/// A per-packet comment, bounded by a fixed 256-byte buffer.
///
/// A comment longer than 255 bytes is truncated on read; the buffer is
/// always NUL-terminated.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct PacketComment {
    buf: [u8; COMMENT_BUF_LEN],
}

impl PacketComment {
    /// Copies up to 255 bytes of `src` into a new comment buffer.
    pub(crate) fn new(src: &[u8]) -> Self {
        let mut buf = [0_u8; COMMENT_BUF_LEN];
        let len = src.len().min(COMMENT_BUF_LEN - 1);
        buf[..len].copy_from_slice(&src[..len]);

        PacketComment { buf }
    }

    /// The comment bytes, up to the first NUL terminator.
    pub fn as_bytes(&self) -> &[u8] {
        let len = self.buf.iter().position(|b| *b == 0).unwrap_or(self.buf.len());
        &self.buf[..len]
    }

    /// The comment as UTF-8 text.
    ///
    /// Comments are meant to be UTF-8, but nothing stops a writer from
    /// storing arbitrary bytes.
    pub fn to_str(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(self.as_bytes())
    }
}

impl fmt::Debug for PacketComment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PacketComment").field(&String::from_utf8_lossy(self.as_bytes())).finish()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_is_nul_terminated() {
        let comment = PacketComment::new(b"hello");
        assert_eq!(comment.as_bytes(), b"hello");
        assert_eq!(comment.to_str().unwrap(), "hello");
    }

    #[test]
    fn oversized_comment_is_truncated() {
        let long = [b'x'; 300];
        let comment = PacketComment::new(&long);
        assert_eq!(comment.as_bytes().len(), COMMENT_BUF_LEN - 1);
    }
}
