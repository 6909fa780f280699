//! # Table Facade
//!
//! `Table` ties the pager to the B+-tree: it owns the page cache, knows
//! the root page number (always 0), and exposes the operations the REPL
//! needs — open, close, point lookup, insert, and the ordered full scan.
//!
//! Opening a zero-length file materializes page 0 as an empty leaf that is
//! also the root, so every later operation can assume the tree exists.

use std::path::Path;

use eyre::Result;

use crate::btree::{self, Cursor, LeafNode, LeafNodeMut};
use crate::error::DbError;
use crate::row::Row;
use crate::storage::Pager;

pub struct Table {
    pub(crate) pager: Pager,
    pub(crate) root_page_num: u32,
}

impl Table {
    /// Opens (or creates) the database file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut pager = Pager::open(path)?;

        if pager.num_pages() == 0 {
            // Fresh file: page 0 becomes an empty leaf that is the root.
            let page = pager.get_page(0)?;
            let mut root = LeafNodeMut::init(&mut page[..])?;
            root.set_root(true);
        }

        Ok(Self {
            pager,
            root_page_num: 0,
        })
    }

    /// Flushes every touched page and syncs the file.
    pub fn close(&mut self) -> Result<()> {
        self.pager.close()
    }

    pub fn root_page_num(&self) -> u32 {
        self.root_page_num
    }

    /// Positions a cursor at `key`, or where `key` would be inserted.
    pub fn find(&mut self, key: u32) -> Result<Cursor<'_>> {
        let (page_num, cell_num) = btree::find(&mut self.pager, self.root_page_num, key)?;
        Ok(Cursor::new(self, page_num, cell_num, false))
    }

    /// Positions a cursor at the first row in key order.
    pub fn start(&mut self) -> Result<Cursor<'_>> {
        let (page_num, cell_num) = btree::find(&mut self.pager, self.root_page_num, 0)?;

        let num_cells = {
            let page = self.pager.get_page(page_num)?;
            LeafNode::from_page(&page[..])?.num_cells()
        };

        Ok(Cursor::new(self, page_num, cell_num, num_cells == 0))
    }

    /// Inserts one row keyed by its id. Fails with `DuplicateKey` — before
    /// touching any page — if the id is already present.
    pub fn insert(&mut self, row: &Row) -> Result<()> {
        let key = row.id();
        let (page_num, cell_num) = btree::find(&mut self.pager, self.root_page_num, key)?;

        {
            let page = self.pager.get_page(page_num)?;
            let leaf = LeafNode::from_page(&page[..])?;
            if cell_num < leaf.num_cells() && leaf.key_at(cell_num as usize)? == key {
                return Err(DbError::DuplicateKey(key).into());
            }
        }

        Cursor::new(self, page_num, cell_num, false).insert(key, row)
    }

    /// All rows in ascending key order.
    pub fn select_all(&mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        let mut cursor = self.start()?;

        while !cursor.end_of_table() {
            rows.push(*cursor.row()?);
            cursor.advance()?;
        }

        Ok(rows)
    }

    /// The `.btree` rendering of the whole tree.
    pub fn render_tree(&mut self) -> Result<String> {
        btree::render_tree(&mut self.pager, self.root_page_num)
    }
}
