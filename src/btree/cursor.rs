//! # Cursor
//!
//! A cursor is a position inside the table: a leaf page number, a cell
//! index within that leaf, and an end-of-table flag. Scans advance it cell
//! by cell, hopping leaves through `next_leaf`; inserts use it as the
//! landing slot, splitting the leaf when there is no room.
//!
//! Cursors borrow the table mutably for their whole life, so the tree
//! cannot change underneath one except through its own `insert` — which
//! should be the cursor's last use, since a split moves cells between
//! pages and stales the position.

use eyre::Result;

use crate::row::Row;
use crate::table::Table;

use super::leaf::{LeafNode, LeafNodeMut, LEAF_MAX_CELLS};
use super::tree;

pub struct Cursor<'a> {
    table: &'a mut Table,
    page_num: u32,
    cell_num: u32,
    end_of_table: bool,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(
        table: &'a mut Table,
        page_num: u32,
        cell_num: u32,
        end_of_table: bool,
    ) -> Self {
        Self {
            table,
            page_num,
            cell_num,
            end_of_table,
        }
    }

    pub fn page_num(&self) -> u32 {
        self.page_num
    }

    pub fn cell_num(&self) -> u32 {
        self.cell_num
    }

    pub fn end_of_table(&self) -> bool {
        self.end_of_table
    }

    /// The row under the cursor.
    pub fn row(&mut self) -> Result<&Row> {
        let page = self.table.pager.get_page(self.page_num)?;
        let leaf = LeafNode::from_page(&page[..])?;
        leaf.row_at(self.cell_num as usize)
    }

    /// Moves to the next cell, following the leaf chain. Sets the end
    /// flag after the last cell of the rightmost leaf.
    pub fn advance(&mut self) -> Result<()> {
        let page = self.table.pager.get_page(self.page_num)?;
        let leaf = LeafNode::from_page(&page[..])?;

        self.cell_num += 1;
        if self.cell_num >= leaf.num_cells() {
            match leaf.next_leaf() {
                0 => self.end_of_table = true,
                next => {
                    self.page_num = next;
                    self.cell_num = 0;
                }
            }
        }
        Ok(())
    }

    /// Writes `key`/`row` at the cursor position, splitting the leaf when
    /// it is full. Consumes the cursor: a split redistributes cells and
    /// the position would no longer mean anything.
    pub fn insert(self, key: u32, row: &Row) -> Result<()> {
        let num_cells = {
            let page = self.table.pager.get_page(self.page_num)?;
            LeafNode::from_page(&page[..])?.num_cells()
        };

        if num_cells as usize >= LEAF_MAX_CELLS {
            return tree::leaf_split_and_insert(self.table, self.page_num, self.cell_num, key, row);
        }

        let page = self.table.pager.get_page(self.page_num)?;
        let mut leaf = LeafNodeMut::from_page(&mut page[..])?;
        leaf.insert_cell(self.cell_num as usize, key, row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn row(id: u32) -> Row {
        Row::new(id, &format!("user{}", id), &format!("user{}@example.com", id)).unwrap()
    }

    #[test]
    fn start_cursor_on_empty_table_is_at_end() {
        let dir = tempdir().unwrap();
        let mut table = Table::open(dir.path().join("test.db")).unwrap();

        let cursor = table.start().unwrap();

        assert!(cursor.end_of_table());
    }

    #[test]
    fn advance_walks_a_single_leaf_in_order() {
        let dir = tempdir().unwrap();
        let mut table = Table::open(dir.path().join("test.db")).unwrap();
        for id in [3, 1, 2] {
            table.insert(&row(id)).unwrap();
        }

        let mut cursor = table.start().unwrap();
        let mut ids = Vec::new();
        while !cursor.end_of_table() {
            ids.push(cursor.row().unwrap().id());
            cursor.advance().unwrap();
        }

        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn advance_follows_the_leaf_chain_after_a_split() {
        let dir = tempdir().unwrap();
        let mut table = Table::open(dir.path().join("test.db")).unwrap();
        for id in 1..=14 {
            table.insert(&row(id)).unwrap();
        }

        let mut cursor = table.start().unwrap();
        let mut ids = Vec::new();
        while !cursor.end_of_table() {
            ids.push(cursor.row().unwrap().id());
            cursor.advance().unwrap();
        }

        assert_eq!(ids, (1..=14).collect::<Vec<u32>>());
    }
}
