//! # B+Tree Operations
//!
//! The tree operations tie the node views to the pager: descent, insert
//! with leaf split, root promotion, parent maintenance, and the `.btree`
//! renderer. All data lives in leaves; internal nodes only route.
//!
//! ## Descent
//!
//! `find` starts at the root and walks internal nodes by binary-searching
//! the separator keys until it reaches a leaf, then binary-searches the
//! leaf for the key's cell (or its insertion point).
//!
//! ## Leaf Split
//!
//! A full leaf plus the incoming cell makes `LEAF_MAX_CELLS + 1` logical
//! cells, redistributed into a left half (the original page) and a right
//! half (a freshly allocated page):
//!
//! ```text
//! 1. Snapshot the old page, allocate and initialize the new leaf
//! 2. Chain: new.next_leaf = old.next_leaf, old.next_leaf = new
//! 3. Walk logical positions max..0, writing each cell into its
//!    post-split page and slot; the insertion position takes the new cell
//! 4. Set both cell counts
//! 5. Root split: promote via create_new_root
//!    Non-root split: rewrite the old max key in the parent, then insert
//!    the new leaf into the parent
//! ```
//!
//! ## Root Promotion
//!
//! The root is always page 0, so external references never move: the old
//! root's bytes are copied to a fresh page (the new left child) and page 0
//! is rebuilt in place as an internal node over the two halves.
//!
//! ## Internal Nodes
//!
//! `internal_insert` handles a parent gaining a child, including the case
//! where the new child becomes the rightmost one. Splitting internal nodes
//! is not implemented: a parent already holding `INTERNAL_MAX_KEYS` keys
//! fails with the fatal `InternalNodeFull` error.

use eyre::Result;

use crate::error::DbError;
use crate::row::Row;
use crate::storage::{NodeHeader, NodeKind, PageBuf, Pager};
use crate::table::Table;

use super::internal::{InternalCell, InternalNode, InternalNodeMut, INTERNAL_MAX_KEYS};
use super::leaf::{LeafNode, LeafNodeMut, LEAF_LEFT_SPLIT_COUNT, LEAF_MAX_CELLS, LEAF_RIGHT_SPLIT_COUNT};

/// Descends from `root_page_num` to the leaf covering `key`. Returns the
/// leaf's page number and the cell index holding `key` or, if absent, the
/// index where `key` would be inserted.
pub fn find(pager: &mut Pager, root_page_num: u32, key: u32) -> Result<(u32, u32)> {
    let mut current = root_page_num;

    loop {
        let page = pager.get_page(current)?;
        match NodeHeader::from_bytes(&page[..])?.kind()? {
            NodeKind::Leaf => {
                let leaf = LeafNode::from_page(&page[..])?;
                let cell_num = leaf.find(key)?;
                return Ok((current, cell_num));
            }
            NodeKind::Internal => {
                let node = InternalNode::from_page(&page[..])?;
                let index = node.find_child_index(key)?;
                current = if index == node.num_keys() {
                    node.right_child()
                } else {
                    node.child_at(index as usize)?
                };
            }
        }
    }
}

/// Largest key stored under this node. For a leaf that is its last cell;
/// for an internal node, its last separator key.
pub fn max_key(page: &[u8]) -> Result<u32> {
    match NodeHeader::from_bytes(page)?.kind()? {
        NodeKind::Leaf => LeafNode::from_page(page)?.max_key(),
        NodeKind::Internal => InternalNode::from_page(page)?.max_key(),
    }
}

/// Splits a full leaf while inserting `key`/`row` at `cell_num`, then
/// repairs the tree above it.
pub(crate) fn leaf_split_and_insert(
    table: &mut Table,
    page_num: u32,
    cell_num: u32,
    key: u32,
    row: &Row,
) -> Result<()> {
    let old_snapshot: PageBuf = *table.pager.get_page(page_num)?;
    let old_view = LeafNode::from_page(&old_snapshot[..])?;
    let old_max = old_view.max_key()?;
    let old_is_root = old_view.is_root();
    let old_parent = old_view.parent();
    let old_next_leaf = old_view.next_leaf();

    let new_page_num = table.pager.get_unused_page_num();
    {
        let new_page = table.pager.get_page(new_page_num)?;
        let mut new_leaf = LeafNodeMut::init(&mut new_page[..])?;
        new_leaf.set_parent(old_parent);
        new_leaf.set_next_leaf(old_next_leaf);
    }

    // Walk logical positions from highest to lowest, placing each cell in
    // its post-split page and slot. Position `cell_num` takes the new
    // cell; positions above it map to old cells shifted down by one.
    for position in (0..=LEAF_MAX_CELLS as u32).rev() {
        let dest_page_num = if position >= LEAF_LEFT_SPLIT_COUNT as u32 {
            new_page_num
        } else {
            page_num
        };
        let index_within_node = position as usize % LEAF_LEFT_SPLIT_COUNT;

        let dest_page = table.pager.get_page(dest_page_num)?;
        let mut dest = LeafNodeMut::from_page(&mut dest_page[..])?;

        if position == cell_num {
            dest.write_cell(index_within_node, key, row)?;
        } else if position > cell_num {
            dest.set_cell(index_within_node, old_view.cell_at(position as usize - 1)?)?;
        } else {
            dest.set_cell(index_within_node, old_view.cell_at(position as usize)?)?;
        }
    }

    {
        let old_page = table.pager.get_page(page_num)?;
        let mut old_leaf = LeafNodeMut::from_page(&mut old_page[..])?;
        old_leaf.set_num_cells(LEAF_LEFT_SPLIT_COUNT as u32);
        old_leaf.set_next_leaf(new_page_num);
    }
    {
        let new_page = table.pager.get_page(new_page_num)?;
        let mut new_leaf = LeafNodeMut::from_page(&mut new_page[..])?;
        new_leaf.set_num_cells(LEAF_RIGHT_SPLIT_COUNT as u32);
    }

    if old_is_root {
        create_new_root(table, new_page_num)
    } else {
        let new_max = {
            let old_page = table.pager.get_page(page_num)?;
            LeafNode::from_page(&old_page[..])?.max_key()?
        };
        update_internal_key(&mut table.pager, old_parent, old_max, new_max)?;
        internal_insert(&mut table.pager, old_parent, new_page_num)
    }
}

/// Handles a root split: the old root's bytes move to a fresh page (the
/// new left child) and the root page is rebuilt in place as an internal
/// node over the two children. The table's root page number never changes.
pub(crate) fn create_new_root(table: &mut Table, right_child_page_num: u32) -> Result<()> {
    let root_page_num = table.root_page_num;
    let root_copy: PageBuf = *table.pager.get_page(root_page_num)?;

    let left_child_page_num = table.pager.get_unused_page_num();
    {
        let left_page = table.pager.get_page(left_child_page_num)?;
        *left_page = root_copy;
        let header = NodeHeader::from_bytes_mut(&mut left_page[..])?;
        header.set_root(false);
        header.set_parent(root_page_num);
    }

    let left_max = max_key(&root_copy[..])?;
    {
        let root_page = table.pager.get_page(root_page_num)?;
        let mut root = InternalNodeMut::init(&mut root_page[..])?;
        root.set_root(true);
        root.set_cell(0, &InternalCell::new(left_child_page_num, left_max))?;
        root.set_num_keys(1);
        root.set_right_child(right_child_page_num);
    }

    let right_page = table.pager.get_page(right_child_page_num)?;
    NodeHeader::from_bytes_mut(&mut right_page[..])?.set_parent(root_page_num);
    Ok(())
}

/// Rewrites the separator that used to read `old_key`. When the child that
/// grew was the parent's right child, its old max never appears as a cell
/// key and there is nothing to rewrite.
pub(crate) fn update_internal_key(
    pager: &mut Pager,
    page_num: u32,
    old_key: u32,
    new_key: u32,
) -> Result<()> {
    let index = {
        let page = pager.get_page(page_num)?;
        InternalNode::from_page(&page[..])?.find_child_index(old_key)?
    };

    let page = pager.get_page(page_num)?;
    let mut node = InternalNodeMut::from_page(&mut page[..])?;
    if index < node.num_keys() {
        node.set_key(index as usize, new_key)?;
    }
    Ok(())
}

/// Registers `child_page_num` as a new child of `parent_page_num`,
/// keeping the separator keys and the right-child slot consistent.
pub(crate) fn internal_insert(
    pager: &mut Pager,
    parent_page_num: u32,
    child_page_num: u32,
) -> Result<()> {
    let child_max_key = {
        let page = pager.get_page(child_page_num)?;
        max_key(&page[..])?
    };

    let (num_keys, right_child_page_num, index) = {
        let page = pager.get_page(parent_page_num)?;
        let node = InternalNode::from_page(&page[..])?;
        (
            node.num_keys(),
            node.right_child(),
            node.find_child_index(child_max_key)?,
        )
    };

    if num_keys as usize >= INTERNAL_MAX_KEYS {
        return Err(DbError::InternalNodeFull(parent_page_num).into());
    }

    // The right child's max must come from its own page, not from any
    // separator in the parent.
    let right_max = {
        let page = pager.get_page(right_child_page_num)?;
        max_key(&page[..])?
    };

    let page = pager.get_page(parent_page_num)?;
    let mut node = InternalNodeMut::from_page(&mut page[..])?;
    if child_max_key > right_max {
        // The new child is the rightmost; the old right child becomes a
        // regular cell keyed by its own max.
        node.set_cell(
            num_keys as usize,
            &InternalCell::new(right_child_page_num, right_max),
        )?;
        node.set_num_keys(num_keys + 1);
        node.set_right_child(child_page_num);
    } else {
        node.insert_cell(index as usize, &InternalCell::new(child_page_num, child_max_key))?;
    }
    Ok(())
}

/// Renders the tree rooted at `page_num` in the `.btree` format: one node
/// per line, two spaces of indent per level, separator keys interleaved
/// with the subtrees they bound.
pub fn render_tree(pager: &mut Pager, page_num: u32) -> Result<String> {
    let mut out = String::new();
    render_node(pager, page_num, 0, &mut out)?;
    Ok(out)
}

enum NodeSummary {
    Leaf { keys: Vec<u32> },
    Internal { cells: Vec<(u32, u32)>, right_child: u32 },
}

fn render_node(pager: &mut Pager, page_num: u32, depth: usize, out: &mut String) -> Result<()> {
    use std::fmt::Write;

    let summary = {
        let page = pager.get_page(page_num)?;
        match NodeHeader::from_bytes(&page[..])?.kind()? {
            NodeKind::Leaf => {
                let leaf = LeafNode::from_page(&page[..])?;
                let keys = (0..leaf.num_cells() as usize)
                    .map(|i| leaf.key_at(i))
                    .collect::<Result<Vec<_>>>()?;
                NodeSummary::Leaf { keys }
            }
            NodeKind::Internal => {
                let node = InternalNode::from_page(&page[..])?;
                let cells = (0..node.num_keys() as usize)
                    .map(|i| Ok((node.child_at(i)?, node.key_at(i)?)))
                    .collect::<Result<Vec<_>>>()?;
                NodeSummary::Internal {
                    cells,
                    right_child: node.right_child(),
                }
            }
        }
    };

    match summary {
        NodeSummary::Leaf { keys } => {
            push_indent(out, depth);
            writeln!(out, "- leaf (size {})", keys.len())?;
            for key in keys {
                push_indent(out, depth + 1);
                writeln!(out, "- {}", key)?;
            }
        }
        NodeSummary::Internal { cells, right_child } => {
            push_indent(out, depth);
            writeln!(out, "- internal (size {})", cells.len())?;
            for (child, key) in cells {
                render_node(pager, child, depth + 1, out)?;
                push_indent(out, depth + 1);
                writeln!(out, "- key {}", key)?;
            }
            render_node(pager, right_child, depth + 1, out)?;
        }
    }
    Ok(())
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}
