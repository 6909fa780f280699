//! # B+Tree Internal Node Implementation
//!
//! Internal nodes route lookups. Each holds up to `INTERNAL_MAX_KEYS`
//! cells of `child ‖ key` plus a separate rightmost-child pointer, giving a
//! node with N keys exactly N+1 children.
//!
//! ## Page Layout
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  ----------------------------------------
//! 0       10    Common node header (num_cells = key count)
//! 10      4     right_child (page number of rightmost child)
//! 14      8     Cell 0: child (4) ‖ key (4)
//! 22      8     Cell 1
//! 30      8     Cell 2
//! ```
//!
//! For child slot i (i < N) every key in the subtree is <= key[i]; every key
//! under `right_child` is greater than the last cell key.
//!
//! The fan-out is a deliberately small fixed constant rather than a value
//! computed from the page size: splitting internal nodes is not implemented,
//! and a fan-out of three makes the overflow path reachable in tests instead
//! of needing hundreds of thousands of rows.

use eyre::{ensure, Result};
use zerocopy::byteorder::{LittleEndian, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::storage::{NodeHeader, NodeKind, COMMON_NODE_HEADER_SIZE, PAGE_SIZE};

pub const INTERNAL_HEADER_SIZE: usize = COMMON_NODE_HEADER_SIZE + INTERNAL_RIGHT_CHILD_SIZE;
pub const INTERNAL_RIGHT_CHILD_OFFSET: usize = COMMON_NODE_HEADER_SIZE;
pub const INTERNAL_RIGHT_CHILD_SIZE: usize = 4;

pub const INTERNAL_CELL_SIZE: usize = size_of::<InternalCell>();

/// Maximum keys per internal node. Kept intentionally small so the
/// unimplemented internal-split path is exercised by tests.
pub const INTERNAL_MAX_KEYS: usize = 3;

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct InternalCell {
    child: U32<LittleEndian>,
    key: U32<LittleEndian>,
}

const _: () = assert!(INTERNAL_CELL_SIZE == 8, "internal cell layout drifted");

impl InternalCell {
    pub fn new(child: u32, key: u32) -> Self {
        Self {
            child: U32::new(child),
            key: U32::new(key),
        }
    }

    pub fn child(&self) -> u32 {
        self.child.get()
    }

    pub fn key(&self) -> u32 {
        self.key.get()
    }
}

const fn cell_offset(index: usize) -> usize {
    INTERNAL_HEADER_SIZE + index * INTERNAL_CELL_SIZE
}

#[derive(Debug)]
pub struct InternalNode<'a> {
    data: &'a [u8],
}

pub struct InternalNodeMut<'a> {
    data: &'a mut [u8],
}

impl<'a> InternalNode<'a> {
    pub fn from_page(data: &'a [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );
        let header = NodeHeader::from_bytes(data)?;
        ensure!(
            header.kind()? == NodeKind::Internal,
            "expected internal page, got {:?}",
            header.kind()?
        );
        Ok(Self { data })
    }

    fn header(&self) -> &NodeHeader {
        NodeHeader::from_bytes(self.data).unwrap() // INVARIANT: page validated in from_page
    }

    pub fn num_keys(&self) -> u32 {
        self.header().num_cells()
    }

    pub fn is_root(&self) -> bool {
        self.header().is_root()
    }

    pub fn parent(&self) -> u32 {
        self.header().parent()
    }

    pub fn right_child(&self) -> u32 {
        let bytes = &self.data
            [INTERNAL_RIGHT_CHILD_OFFSET..INTERNAL_RIGHT_CHILD_OFFSET + INTERNAL_RIGHT_CHILD_SIZE];
        U32::<LittleEndian>::read_from_bytes(bytes).unwrap().get() // INVARIANT: fixed 4-byte slice
    }

    pub fn cell_at(&self, index: usize) -> Result<&'a InternalCell> {
        ensure!(
            index < self.num_keys() as usize,
            "cell index {} out of bounds (num_keys={})",
            index,
            self.num_keys()
        );
        let offset = cell_offset(index);
        InternalCell::ref_from_bytes(&self.data[offset..offset + INTERNAL_CELL_SIZE])
            .map_err(|e| eyre::eyre!("failed to read internal cell {}: {:?}", index, e))
    }

    pub fn key_at(&self, index: usize) -> Result<u32> {
        Ok(self.cell_at(index)?.key())
    }

    pub fn child_at(&self, index: usize) -> Result<u32> {
        Ok(self.cell_at(index)?.child())
    }

    /// Key of the last cell. Errors on a node with no keys.
    pub fn max_key(&self) -> Result<u32> {
        let num_keys = self.num_keys();
        ensure!(num_keys > 0, "max_key on an internal node with no keys");
        self.key_at(num_keys as usize - 1)
    }

    /// Binary search for the child slot covering `key`: the smallest index
    /// whose cell key is >= `key`, or `num_keys` when every cell key is
    /// smaller (the right-child slot).
    pub fn find_child_index(&self, key: u32) -> Result<u32> {
        let mut min = 0u32;
        let mut max = self.num_keys();

        while min != max {
            let mid = (min + max) / 2;
            if self.key_at(mid as usize)? >= key {
                max = mid;
            } else {
                min = mid + 1;
            }
        }

        Ok(min)
    }
}

impl<'a> InternalNodeMut<'a> {
    pub fn from_page(data: &'a mut [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );
        let header = NodeHeader::from_bytes(data)?;
        ensure!(
            header.kind()? == NodeKind::Internal,
            "expected internal page, got {:?}",
            header.kind()?
        );
        Ok(Self { data })
    }

    /// Initializes `data` as an empty non-root internal node.
    pub fn init(data: &'a mut [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );

        {
            let header = NodeHeader::from_bytes_mut(data)?;
            header.set_kind(NodeKind::Internal);
            header.set_root(false);
            header.set_num_cells(0);
        }

        let mut node = Self { data };
        node.set_right_child(0);
        Ok(node)
    }

    fn header_mut(&mut self) -> &mut NodeHeader {
        NodeHeader::from_bytes_mut(self.data).unwrap() // INVARIANT: page validated at construction
    }

    pub fn num_keys(&self) -> u32 {
        NodeHeader::from_bytes(self.data).unwrap().num_cells() // INVARIANT: page validated at construction
    }

    pub fn set_num_keys(&mut self, count: u32) {
        self.header_mut().set_num_cells(count);
    }

    pub fn set_root(&mut self, is_root: bool) {
        self.header_mut().set_root(is_root);
    }

    pub fn set_parent(&mut self, page_num: u32) {
        self.header_mut().set_parent(page_num);
    }

    pub fn right_child(&self) -> u32 {
        let bytes = &self.data
            [INTERNAL_RIGHT_CHILD_OFFSET..INTERNAL_RIGHT_CHILD_OFFSET + INTERNAL_RIGHT_CHILD_SIZE];
        U32::<LittleEndian>::read_from_bytes(bytes).unwrap().get() // INVARIANT: fixed 4-byte slice
    }

    pub fn set_right_child(&mut self, page_num: u32) {
        let bytes = &mut self.data
            [INTERNAL_RIGHT_CHILD_OFFSET..INTERNAL_RIGHT_CHILD_OFFSET + INTERNAL_RIGHT_CHILD_SIZE];
        bytes.copy_from_slice(U32::<LittleEndian>::new(page_num).as_bytes());
    }

    /// Overwrites the cell slot at `index`, bounded by capacity rather
    /// than the live key count.
    pub fn set_cell(&mut self, index: usize, cell: &InternalCell) -> Result<()> {
        ensure!(
            index < INTERNAL_MAX_KEYS,
            "cell index {} beyond internal capacity {}",
            index,
            INTERNAL_MAX_KEYS
        );
        let offset = cell_offset(index);
        self.data[offset..offset + INTERNAL_CELL_SIZE].copy_from_slice(cell.as_bytes());
        Ok(())
    }

    /// Rewrites the key of an existing cell, keeping its child pointer.
    pub fn set_key(&mut self, index: usize, key: u32) -> Result<()> {
        ensure!(
            index < self.num_keys() as usize,
            "key index {} out of bounds (num_keys={})",
            index,
            self.num_keys()
        );
        let child = {
            let offset = cell_offset(index);
            InternalCell::ref_from_bytes(&self.data[offset..offset + INTERNAL_CELL_SIZE])
                .map_err(|e| eyre::eyre!("failed to read internal cell {}: {:?}", index, e))?
                .child()
        };
        self.set_cell(index, &InternalCell::new(child, key))
    }

    /// Shifts cells `index..num_keys` one slot right, writes the new cell
    /// at `index`, and bumps the key count. The caller must have verified
    /// there is room.
    pub fn insert_cell(&mut self, index: usize, cell: &InternalCell) -> Result<()> {
        let num_keys = self.num_keys() as usize;
        ensure!(
            num_keys < INTERNAL_MAX_KEYS,
            "insert into a full internal node ({} keys)",
            num_keys
        );
        ensure!(
            index <= num_keys,
            "insert index {} out of bounds (num_keys={})",
            index,
            num_keys
        );

        if index < num_keys {
            let start = cell_offset(index);
            let end = cell_offset(num_keys);
            self.data.copy_within(start..end, start + INTERNAL_CELL_SIZE);
        }

        self.set_cell(index, cell)?;
        self.set_num_keys(num_keys as u32 + 1);
        Ok(())
    }
}
