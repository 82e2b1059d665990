//! On-disk record layouts for `.data` and `.tree` files.
//!
//! Both file kinds share the same 8-byte header shape and differ only in
//! their signature and in what follows it: a `.data` file is a header
//! followed by `N` little-endian `i64` values, a `.tree` file is a header
//! followed by `2N - 1` [`Node`] records. Every multi-byte scalar is
//! little-endian and there is no padding between a node's digest and its
//! value — this is encoded explicitly with `to_bytes`/`from_bytes` rather
//! than relying on any particular struct layout.

use std::io::{
    Read,
    Seek,
    SeekFrom,
    Write,
};

use crate::error::Error;

/// Signature of a `.data` file header.
pub const DATA_SIGNATURE: [u8; 4] = *b"KADD";
/// Signature of a `.tree` file header.
pub const TREE_SIGNATURE: [u8; 4] = *b"KADT";

/// Size in bytes of a [`Header`] record on disk.
pub const HEADER_SIZE: u64 = 8;
/// Size in bytes of a [`Node`] record on disk.
pub const NODE_SIZE: u64 = 40;
/// Size in bytes of a single leaf value in a `.data` file.
pub const VALUE_SIZE: u64 = 8;

/// The 8-byte header shared by `.data` and `.tree` files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub signature: [u8; 4],
    pub numrecords: u32,
}

impl Header {
    #[must_use]
    pub fn to_bytes(self) -> [u8; HEADER_SIZE as usize] {
        let mut buf = [0u8; HEADER_SIZE as usize];
        buf[0..4].copy_from_slice(&self.signature);
        buf[4..8].copy_from_slice(&self.numrecords.to_le_bytes());
        buf
    }

    #[must_use]
    pub fn from_bytes(buf: &[u8; HEADER_SIZE as usize]) -> Self {
        let mut signature = [0u8; 4];
        signature.copy_from_slice(&buf[0..4]);
        let numrecords = u32::from_le_bytes(buf[4..8].try_into().unwrap());
        Self {
            signature,
            numrecords,
        }
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, Error> {
        let mut buf = [0u8; HEADER_SIZE as usize];
        reader.read_exact(&mut buf).map_err(Error::Io)?;
        Ok(Self::from_bytes(&buf))
    }

    pub fn write_to<W: Write>(self, writer: &mut W) -> Result<(), Error> {
        writer.write_all(&self.to_bytes()).map_err(Error::Io)
    }
}

/// A single node record: a 32-byte digest followed immediately by a signed
/// 64-bit value, 40 bytes total, no padding.
///
/// The same layout is used for leaves (`value` is the original balance) and
/// internal nodes (`value` is the wrapping sum of the two children).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub digest: [u8; 32],
    pub value: i64,
}

impl Node {
    #[must_use]
    pub fn to_bytes(&self) -> [u8; NODE_SIZE as usize] {
        let mut buf = [0u8; NODE_SIZE as usize];
        buf[0..32].copy_from_slice(&self.digest);
        buf[32..40].copy_from_slice(&self.value.to_le_bytes());
        buf
    }

    #[must_use]
    pub fn from_bytes(buf: &[u8; NODE_SIZE as usize]) -> Self {
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&buf[0..32]);
        let value = i64::from_le_bytes(buf[32..40].try_into().unwrap());
        Self {
            digest,
            value,
        }
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, Error> {
        let mut buf = [0u8; NODE_SIZE as usize];
        reader.read_exact(&mut buf).map_err(Error::Io)?;
        Ok(Self::from_bytes(&buf))
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), Error> {
        writer.write_all(&self.to_bytes()).map_err(Error::Io)
    }
}

/// Reads `count` consecutive node records starting at node-area position
/// `pos`, where position `0` is the first byte following the header.
pub fn read_nodes_at<R: Read + Seek>(
    reader: &mut R,
    pos: u64,
    count: usize,
) -> Result<Vec<Node>, Error> {
    reader
        .seek(SeekFrom::Start(HEADER_SIZE + pos * NODE_SIZE))
        .map_err(Error::Io)?;
    let mut nodes = Vec::with_capacity(count);
    for _ in 0..count {
        nodes.push(Node::read_from(reader)?);
    }
    Ok(nodes)
}

/// Reads the little-endian `i64` leaf value at data-file position `pos`
/// (`0`-based, counted from the first value after the header).
pub fn read_value_at<R: Read + Seek>(reader: &mut R, pos: u64) -> Result<i64, Error> {
    reader
        .seek(SeekFrom::Start(HEADER_SIZE + pos * VALUE_SIZE))
        .map_err(Error::Io)?;
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf).map_err(Error::Io)?;
    Ok(i64::from_le_bytes(buf))
}

/// Returns `true` if `n` is a power of two, `false` for `0`.
#[must_use]
pub fn is_power_of_two(n: u32) -> bool {
    n != 0 && (n & (n - 1)) == 0
}

/// Size in bytes a well-formed tree file must have for `numrecords = n`.
#[must_use]
pub fn expected_tree_file_size(n: u32) -> u64 {
    HEADER_SIZE + NODE_SIZE * (2 * u64::from(n) - 1)
}

/// Size in bytes a well-formed data file must have for `numrecords = n`.
#[must_use]
pub fn expected_data_file_size(n: u32) -> u64 {
    HEADER_SIZE + VALUE_SIZE * u64::from(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trips() {
        let header = Header {
            signature: TREE_SIGNATURE,
            numrecords: 8,
        };
        assert_eq!(Header::from_bytes(&header.to_bytes()), header);
    }

    #[test]
    fn node_round_trips_negative_value() {
        let node = Node {
            digest: [7u8; 32],
            value: -2000,
        };
        assert_eq!(Node::from_bytes(&node.to_bytes()), node);
    }

    #[test]
    fn node_layout_has_no_padding() {
        let node = Node {
            digest: [0xab; 32],
            value: -1,
        };
        let bytes = node.to_bytes();
        assert_eq!(bytes.len(), NODE_SIZE as usize);
        assert_eq!(&bytes[32..40], &(-1i64).to_le_bytes());
    }

    #[test]
    fn power_of_two_detection() {
        assert!(is_power_of_two(2));
        assert!(is_power_of_two(8));
        assert!(!is_power_of_two(0));
        assert!(!is_power_of_two(6));
        assert!(!is_power_of_two(1023));
    }

    #[test]
    fn tree_file_size_for_eight_leaves() {
        // header + (2*8 - 1) * 40-byte nodes
        assert_eq!(expected_tree_file_size(8), 8 + 15 * 40);
    }

    #[test]
    fn data_file_size_for_eight_leaves() {
        assert_eq!(expected_data_file_size(8), 8 + 8 * 8);
    }
}
