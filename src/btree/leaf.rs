//! # B+Tree Leaf Node Implementation
//!
//! Leaf nodes hold the table's rows. Cells are fixed-width and packed, so
//! every offset is a compile-time expression of the layout constants and a
//! cell index — there is no slot array and no free-space bookkeeping.
//!
//! ## Page Layout
//!
//! ```text
//! Offset  Size   Field
//! ------  -----  ----------------------------------------
//! 0       10     Common node header
//! 10      4      next_leaf (page number; 0 = no sibling)
//! 14      295    Cell 0: key (4) ‖ row (291)
//! 309     295    Cell 1
//! ...
//! 3554    295    Cell 12
//! 3849    247    Unused
//! ```
//!
//! Thirteen cells fit in a 4096-byte page. `next_leaf` links leaves in key
//! order for range scans; 0 works as the "no sibling" sentinel because page
//! 0 is always the tree root and never a chained leaf once the tree has more
//! than one node.
//!
//! ## Views
//!
//! `LeafNode` borrows a page immutably and returns `&'a`-references into
//! it; `LeafNodeMut` edits the page in place. Both validate the page size
//! and the node-kind tag at construction, after which header reads are
//! infallible.

use eyre::{ensure, Result};
use zerocopy::byteorder::{LittleEndian, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::row::{Row, ROW_SIZE};
use crate::storage::{NodeHeader, NodeKind, COMMON_NODE_HEADER_SIZE, PAGE_SIZE};

pub const LEAF_HEADER_SIZE: usize = COMMON_NODE_HEADER_SIZE + LEAF_NEXT_LEAF_SIZE;
pub const LEAF_NEXT_LEAF_OFFSET: usize = COMMON_NODE_HEADER_SIZE;
pub const LEAF_NEXT_LEAF_SIZE: usize = 4;

pub const LEAF_KEY_SIZE: usize = 4;
pub const LEAF_CELL_SIZE: usize = LEAF_KEY_SIZE + ROW_SIZE;
pub const LEAF_SPACE_FOR_CELLS: usize = PAGE_SIZE - LEAF_HEADER_SIZE;
pub const LEAF_MAX_CELLS: usize = LEAF_SPACE_FOR_CELLS / LEAF_CELL_SIZE;

/// Cell counts for the two halves of a leaf split. The left (original)
/// leaf keeps the ceiling half of `LEAF_MAX_CELLS + 1` logical cells.
pub const LEAF_RIGHT_SPLIT_COUNT: usize = (LEAF_MAX_CELLS + 1) / 2;
pub const LEAF_LEFT_SPLIT_COUNT: usize = LEAF_MAX_CELLS + 1 - LEAF_RIGHT_SPLIT_COUNT;

const _: () = assert!(
    LEAF_LEFT_SPLIT_COUNT + LEAF_RIGHT_SPLIT_COUNT == LEAF_MAX_CELLS + 1,
    "split counts must cover every logical cell exactly once"
);

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct LeafCell {
    key: U32<LittleEndian>,
    row: Row,
}

const _: () = assert!(size_of::<LeafCell>() == LEAF_CELL_SIZE, "leaf cell layout drifted");

impl LeafCell {
    pub fn new(key: u32, row: &Row) -> Self {
        Self {
            key: U32::new(key),
            row: *row,
        }
    }

    pub fn key(&self) -> u32 {
        self.key.get()
    }

    pub fn row(&self) -> &Row {
        &self.row
    }
}

const fn cell_offset(index: usize) -> usize {
    LEAF_HEADER_SIZE + index * LEAF_CELL_SIZE
}

#[derive(Debug)]
pub struct LeafNode<'a> {
    data: &'a [u8],
}

pub struct LeafNodeMut<'a> {
    data: &'a mut [u8],
}

impl<'a> LeafNode<'a> {
    pub fn from_page(data: &'a [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );
        let header = NodeHeader::from_bytes(data)?;
        ensure!(
            header.kind()? == NodeKind::Leaf,
            "expected leaf page, got {:?}",
            header.kind()?
        );
        Ok(Self { data })
    }

    fn header(&self) -> &NodeHeader {
        NodeHeader::from_bytes(self.data).unwrap() // INVARIANT: page validated in from_page
    }

    pub fn num_cells(&self) -> u32 {
        self.header().num_cells()
    }

    pub fn is_root(&self) -> bool {
        self.header().is_root()
    }

    pub fn parent(&self) -> u32 {
        self.header().parent()
    }

    pub fn next_leaf(&self) -> u32 {
        let bytes = &self.data[LEAF_NEXT_LEAF_OFFSET..LEAF_NEXT_LEAF_OFFSET + LEAF_NEXT_LEAF_SIZE];
        U32::<LittleEndian>::read_from_bytes(bytes).unwrap().get() // INVARIANT: fixed 4-byte slice
    }

    pub fn cell_at(&self, index: usize) -> Result<&'a LeafCell> {
        ensure!(
            index < self.num_cells() as usize,
            "cell index {} out of bounds (num_cells={})",
            index,
            self.num_cells()
        );
        let offset = cell_offset(index);
        LeafCell::ref_from_bytes(&self.data[offset..offset + LEAF_CELL_SIZE])
            .map_err(|e| eyre::eyre!("failed to read leaf cell {}: {:?}", index, e))
    }

    pub fn key_at(&self, index: usize) -> Result<u32> {
        Ok(self.cell_at(index)?.key())
    }

    pub fn row_at(&self, index: usize) -> Result<&'a Row> {
        Ok(self.cell_at(index)?.row())
    }

    /// Key of the rightmost cell. Errors on an empty leaf.
    pub fn max_key(&self) -> Result<u32> {
        let num_cells = self.num_cells();
        ensure!(num_cells > 0, "max_key on an empty leaf");
        self.key_at(num_cells as usize - 1)
    }

    /// Binary search for `key`. Returns the unique index holding `key`, or
    /// the index where `key` would be inserted to keep the leaf sorted
    /// (`num_cells` if `key` is greater than every existing key).
    pub fn find(&self, key: u32) -> Result<u32> {
        let mut min = 0u32;
        let mut one_past_max = self.num_cells();

        while min != one_past_max {
            let mid = (min + one_past_max) / 2;
            let mid_key = self.key_at(mid as usize)?;
            if mid_key >= key {
                one_past_max = mid;
            } else {
                min = mid + 1;
            }
        }

        Ok(min)
    }
}

impl<'a> LeafNodeMut<'a> {
    pub fn from_page(data: &'a mut [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );
        let header = NodeHeader::from_bytes(data)?;
        ensure!(
            header.kind()? == NodeKind::Leaf,
            "expected leaf page, got {:?}",
            header.kind()?
        );
        Ok(Self { data })
    }

    /// Initializes `data` as an empty non-root leaf and returns the view.
    pub fn init(data: &'a mut [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );

        {
            let header = NodeHeader::from_bytes_mut(data)?;
            header.set_kind(NodeKind::Leaf);
            header.set_root(false);
            header.set_num_cells(0);
        }

        let mut leaf = Self { data };
        leaf.set_next_leaf(0);
        Ok(leaf)
    }

    fn header_mut(&mut self) -> &mut NodeHeader {
        NodeHeader::from_bytes_mut(self.data).unwrap() // INVARIANT: page validated at construction
    }

    pub fn num_cells(&self) -> u32 {
        NodeHeader::from_bytes(self.data).unwrap().num_cells() // INVARIANT: page validated at construction
    }

    pub fn set_num_cells(&mut self, count: u32) {
        self.header_mut().set_num_cells(count);
    }

    pub fn set_root(&mut self, is_root: bool) {
        self.header_mut().set_root(is_root);
    }

    pub fn set_parent(&mut self, page_num: u32) {
        self.header_mut().set_parent(page_num);
    }

    pub fn next_leaf(&self) -> u32 {
        let bytes = &self.data[LEAF_NEXT_LEAF_OFFSET..LEAF_NEXT_LEAF_OFFSET + LEAF_NEXT_LEAF_SIZE];
        U32::<LittleEndian>::read_from_bytes(bytes).unwrap().get() // INVARIANT: fixed 4-byte slice
    }

    pub fn set_next_leaf(&mut self, page_num: u32) {
        let bytes =
            &mut self.data[LEAF_NEXT_LEAF_OFFSET..LEAF_NEXT_LEAF_OFFSET + LEAF_NEXT_LEAF_SIZE];
        bytes.copy_from_slice(U32::<LittleEndian>::new(page_num).as_bytes());
    }

    /// Overwrites the cell slot at `index`. Bounded by the structural
    /// capacity, not the live count, so split distribution can place cells
    /// before the counts are final.
    pub fn set_cell(&mut self, index: usize, cell: &LeafCell) -> Result<()> {
        ensure!(
            index < LEAF_MAX_CELLS,
            "cell index {} beyond leaf capacity {}",
            index,
            LEAF_MAX_CELLS
        );
        let offset = cell_offset(index);
        self.data[offset..offset + LEAF_CELL_SIZE].copy_from_slice(cell.as_bytes());
        Ok(())
    }

    pub fn write_cell(&mut self, index: usize, key: u32, row: &Row) -> Result<()> {
        self.set_cell(index, &LeafCell::new(key, row))
    }

    /// Shifts cells `index..num_cells` one slot right and writes the new
    /// cell at `index`. The caller must have verified there is room.
    pub fn insert_cell(&mut self, index: usize, key: u32, row: &Row) -> Result<()> {
        let num_cells = self.num_cells() as usize;
        ensure!(
            num_cells < LEAF_MAX_CELLS,
            "insert into a full leaf ({} cells)",
            num_cells
        );
        ensure!(
            index <= num_cells,
            "insert index {} out of bounds (num_cells={})",
            index,
            num_cells
        );

        if index < num_cells {
            let start = cell_offset(index);
            let end = cell_offset(num_cells);
            self.data.copy_within(start..end, start + LEAF_CELL_SIZE);
        }

        self.write_cell(index, key, row)?;
        self.set_num_cells(num_cells as u32 + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_page() -> Vec<u8> {
        vec![0u8; PAGE_SIZE]
    }

    fn row(id: u32) -> Row {
        Row::new(id, &format!("user{}", id), &format!("user{}@example.com", id)).unwrap()
    }

    #[test]
    fn layout_constants() {
        assert_eq!(LEAF_HEADER_SIZE, 14);
        assert_eq!(LEAF_CELL_SIZE, 295);
        assert_eq!(LEAF_SPACE_FOR_CELLS, 4082);
        assert_eq!(LEAF_MAX_CELLS, 13);
        assert_eq!(LEAF_LEFT_SPLIT_COUNT, 7);
        assert_eq!(LEAF_RIGHT_SPLIT_COUNT, 7);
    }

    #[test]
    fn init_produces_empty_leaf() {
        let mut page = blank_page();
        page[0] = 1; // stale internal tag

        let leaf = LeafNodeMut::init(&mut page).unwrap();
        assert_eq!(leaf.num_cells(), 0);
        assert_eq!(leaf.next_leaf(), 0);

        let view = LeafNode::from_page(&page).unwrap();
        assert!(!view.is_root());
    }

    #[test]
    fn insert_cell_keeps_cells_sorted() {
        let mut page = blank_page();
        let mut leaf = LeafNodeMut::init(&mut page).unwrap();

        leaf.insert_cell(0, 20, &row(20)).unwrap();
        leaf.insert_cell(0, 5, &row(5)).unwrap();
        leaf.insert_cell(1, 10, &row(10)).unwrap();

        let view = LeafNode::from_page(&page).unwrap();
        assert_eq!(view.num_cells(), 3);
        assert_eq!(view.key_at(0).unwrap(), 5);
        assert_eq!(view.key_at(1).unwrap(), 10);
        assert_eq!(view.key_at(2).unwrap(), 20);
        assert_eq!(view.row_at(1).unwrap().username(), "user10");
    }

    #[test]
    fn insert_cell_rejects_full_leaf() {
        let mut page = blank_page();
        let mut leaf = LeafNodeMut::init(&mut page).unwrap();

        for i in 0..LEAF_MAX_CELLS {
            leaf.insert_cell(i, i as u32, &row(i as u32)).unwrap();
        }

        let result = leaf.insert_cell(0, 99, &row(99));
        assert!(result.is_err());
    }

    #[test]
    fn find_returns_match_or_insertion_point() {
        let mut page = blank_page();
        let mut leaf = LeafNodeMut::init(&mut page).unwrap();
        for (i, key) in [10, 20, 30].iter().enumerate() {
            leaf.insert_cell(i, *key, &row(*key)).unwrap();
        }

        let view = LeafNode::from_page(&page).unwrap();
        assert_eq!(view.find(10).unwrap(), 0);
        assert_eq!(view.find(20).unwrap(), 1);
        assert_eq!(view.find(30).unwrap(), 2);
        assert_eq!(view.find(5).unwrap(), 0);
        assert_eq!(view.find(25).unwrap(), 2);
        assert_eq!(view.find(35).unwrap(), 3);
    }

    #[test]
    fn find_on_empty_leaf_is_zero() {
        let mut page = blank_page();
        LeafNodeMut::init(&mut page).unwrap();

        let view = LeafNode::from_page(&page).unwrap();
        assert_eq!(view.find(1).unwrap(), 0);
    }

    #[test]
    fn max_key_is_rightmost() {
        let mut page = blank_page();
        let mut leaf = LeafNodeMut::init(&mut page).unwrap();
        leaf.insert_cell(0, 3, &row(3)).unwrap();
        leaf.insert_cell(1, 8, &row(8)).unwrap();

        let view = LeafNode::from_page(&page).unwrap();
        assert_eq!(view.max_key().unwrap(), 8);
    }

    #[test]
    fn max_key_on_empty_leaf_fails() {
        let mut page = blank_page();
        LeafNodeMut::init(&mut page).unwrap();

        let view = LeafNode::from_page(&page).unwrap();
        assert!(view.max_key().is_err());
    }

    #[test]
    fn cell_at_past_count_fails() {
        let mut page = blank_page();
        let mut leaf = LeafNodeMut::init(&mut page).unwrap();
        leaf.insert_cell(0, 1, &row(1)).unwrap();

        let view = LeafNode::from_page(&page).unwrap();
        assert!(view.cell_at(1).is_err());
    }

    #[test]
    fn from_page_rejects_internal_node() {
        let mut page = blank_page();
        page[0] = NodeKind::Internal as u8;

        assert!(LeafNode::from_page(&page).is_err());
    }

    #[test]
    fn next_leaf_roundtrip() {
        let mut page = blank_page();
        let mut leaf = LeafNodeMut::init(&mut page).unwrap();

        leaf.set_next_leaf(7);

        assert_eq!(leaf.next_leaf(), 7);
        assert_eq!(LeafNode::from_page(&page).unwrap().next_leaf(), 7);
    }
}
