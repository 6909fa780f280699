//! # Common Node Header
//!
//! Every page begins with the same 10-byte header regardless of node kind.
//! `NodeHeader` is a `zerocopy` view over those bytes: reading a header is a
//! structural cast into the page buffer, and writing through the mutable
//! view edits the page in place.
//!
//! The kind tag deliberately makes 0 mean "leaf": a freshly zeroed page is
//! already a well-formed empty leaf header, which is what a brand-new
//! database file needs page 0 to be.

use eyre::{bail, ensure, Result};
use zerocopy::byteorder::{LittleEndian, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

pub const COMMON_NODE_HEADER_SIZE: usize = size_of::<NodeHeader>();

const _: () = assert!(COMMON_NODE_HEADER_SIZE == 10, "node header layout drifted");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NodeKind {
    Leaf = 0,
    Internal = 1,
}

impl NodeKind {
    pub fn from_byte(b: u8) -> Result<Self> {
        match b {
            0 => Ok(NodeKind::Leaf),
            1 => Ok(NodeKind::Internal),
            other => bail!("invalid node kind byte: {:#04x}", other),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct NodeHeader {
    node_kind: u8,
    is_root: u8,
    parent: U32<LittleEndian>,
    num_cells: U32<LittleEndian>,
}

impl NodeHeader {
    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        ensure!(
            data.len() >= size_of::<Self>(),
            "buffer too small for NodeHeader: {} < {}",
            data.len(),
            size_of::<Self>()
        );

        Self::ref_from_bytes(&data[..size_of::<Self>()])
            .map_err(|e| eyre::eyre!("failed to read NodeHeader: {:?}", e))
    }

    pub fn from_bytes_mut(data: &mut [u8]) -> Result<&mut Self> {
        ensure!(
            data.len() >= size_of::<Self>(),
            "buffer too small for NodeHeader: {} < {}",
            data.len(),
            size_of::<Self>()
        );

        Self::mut_from_bytes(&mut data[..size_of::<Self>()])
            .map_err(|e| eyre::eyre!("failed to read NodeHeader: {:?}", e))
    }

    pub fn kind(&self) -> Result<NodeKind> {
        NodeKind::from_byte(self.node_kind)
    }

    pub fn set_kind(&mut self, kind: NodeKind) {
        self.node_kind = kind as u8;
    }

    pub fn is_root(&self) -> bool {
        self.is_root != 0
    }

    pub fn set_root(&mut self, is_root: bool) {
        self.is_root = is_root as u8;
    }

    pub fn parent(&self) -> u32 {
        self.parent.get()
    }

    pub fn set_parent(&mut self, page_num: u32) {
        self.parent = U32::new(page_num);
    }

    pub fn num_cells(&self) -> u32 {
        self.num_cells.get()
    }

    pub fn set_num_cells(&mut self, count: u32) {
        self.num_cells = U32::new(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_10_bytes() {
        assert_eq!(size_of::<NodeHeader>(), 10);
    }

    #[test]
    fn node_kind_from_byte() {
        assert_eq!(NodeKind::from_byte(0).unwrap(), NodeKind::Leaf);
        assert_eq!(NodeKind::from_byte(1).unwrap(), NodeKind::Internal);
        assert!(NodeKind::from_byte(2).is_err());
    }

    #[test]
    fn zeroed_page_reads_as_empty_non_root_leaf() {
        let data = [0u8; 32];
        let header = NodeHeader::from_bytes(&data).unwrap();

        assert_eq!(header.kind().unwrap(), NodeKind::Leaf);
        assert!(!header.is_root());
        assert_eq!(header.parent(), 0);
        assert_eq!(header.num_cells(), 0);
    }

    #[test]
    fn mutations_land_in_the_buffer() {
        let mut data = [0u8; 10];

        {
            let header = NodeHeader::from_bytes_mut(&mut data).unwrap();
            header.set_kind(NodeKind::Internal);
            header.set_root(true);
            header.set_parent(3);
            header.set_num_cells(5);
        }

        assert_eq!(data[0], 1);
        assert_eq!(data[1], 1);
        assert_eq!(u32::from_le_bytes(data[2..6].try_into().unwrap()), 3);
        assert_eq!(u32::from_le_bytes(data[6..10].try_into().unwrap()), 5);
    }

    #[test]
    fn from_bytes_too_small() {
        let data = [0u8; 4];

        let result = NodeHeader::from_bytes(&data);

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("buffer too small"));
    }
}
