//! # Pager
//!
//! The pager maps page numbers to in-memory page buffers backed by the
//! database file. It is the cache: two `get_page(n)` calls return the same
//! buffer, so in-place mutations made through one handle are seen by the
//! next. There is no eviction — the working set is bounded by the fixed
//! 100-slot cap, and pages are only written back at `close`.
//!
//! ## Disk Mapping
//!
//! Page `n` lives at byte offset `n * PAGE_SIZE`. `num_pages` tracks the
//! highest page number ever requested plus one; pages past the on-disk end
//! of file start life zeroed and materialize on disk when flushed. The file
//! length must be an exact multiple of the page size, otherwise the file is
//! rejected as corrupt at open.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use eyre::{Result, WrapErr};

use crate::error::DbError;

use super::PAGE_SIZE;

/// Hard cap on the number of pages a table may occupy.
pub const TABLE_MAX_PAGES: usize = 100;

/// One in-memory page buffer.
pub type PageBuf = [u8; PAGE_SIZE];

pub struct Pager {
    file: File,
    file_length: u64,
    num_pages: u32,
    pages: [Option<Box<PageBuf>>; TABLE_MAX_PAGES],
}

impl std::fmt::Debug for Pager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pager")
            .field("file_length", &self.file_length)
            .field("num_pages", &self.num_pages)
            .field(
                "loaded",
                &self.pages.iter().filter(|slot| slot.is_some()).count(),
            )
            .finish()
    }
}

impl Pager {
    /// Opens (or creates) the database file. No pages are loaded eagerly.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)
            .wrap_err_with(|| format!("failed to open database file '{}'", path.display()))?;

        let file_length = file
            .metadata()
            .wrap_err("failed to read database file metadata")?
            .len();

        if file_length % PAGE_SIZE as u64 != 0 {
            return Err(DbError::CorruptFile(file_length).into());
        }

        Ok(Self {
            file,
            file_length,
            num_pages: (file_length / PAGE_SIZE as u64) as u32,
            pages: std::array::from_fn(|_| None),
        })
    }

    /// Number of pages the table occupies, counting unflushed ones.
    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    /// Next page number with no contents yet. The caller must follow up
    /// with `get_page` on the returned number, which bumps the counter.
    pub fn get_unused_page_num(&self) -> u32 {
        self.num_pages
    }

    /// Returns the in-memory buffer for page `page_num`, loading it from
    /// disk on first touch. Pages past the on-disk end start zeroed.
    pub fn get_page(&mut self, page_num: u32) -> Result<&mut PageBuf> {
        if page_num as usize >= TABLE_MAX_PAGES {
            return Err(DbError::PageOutOfRange {
                page_num,
                limit: TABLE_MAX_PAGES as u32,
            }
            .into());
        }

        let slot = page_num as usize;
        if self.pages[slot].is_none() {
            let mut page: Box<PageBuf> = Box::new([0; PAGE_SIZE]);

            let pages_on_disk = (self.file_length / PAGE_SIZE as u64) as u32;
            if page_num < pages_on_disk {
                self.file
                    .seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))
                    .wrap_err_with(|| format!("failed to seek to page {}", page_num))?;
                self.file
                    .read_exact(&mut page[..])
                    .wrap_err_with(|| format!("failed to read page {}", page_num))?;
            }

            self.pages[slot] = Some(page);
            if page_num >= self.num_pages {
                self.num_pages = page_num + 1;
            }
        }

        // The slot was just filled if it was empty.
        Ok(self.pages[slot].as_mut().unwrap())
    }

    /// Writes the full buffer of page `page_num` back to disk.
    pub fn flush(&mut self, page_num: u32) -> Result<()> {
        let page = match self.pages.get(page_num as usize).and_then(Option::as_ref) {
            Some(page) => page,
            None => return Err(DbError::FlushNullPage(page_num).into()),
        };

        self.file
            .seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))
            .wrap_err_with(|| format!("failed to seek to page {}", page_num))?;
        self.file
            .write_all(&page[..])
            .wrap_err_with(|| format!("failed to write page {}", page_num))?;

        let end = (page_num as u64 + 1) * PAGE_SIZE as u64;
        self.file_length = self.file_length.max(end);
        Ok(())
    }

    /// Flushes and drops every loaded page, then syncs the file.
    pub fn close(&mut self) -> Result<()> {
        for page_num in 0..TABLE_MAX_PAGES as u32 {
            if self.pages[page_num as usize].is_some() {
                self.flush(page_num)?;
                self.pages[page_num as usize] = None;
            }
        }

        self.file.sync_all().wrap_err("failed to sync database file")?;
        Ok(())
    }
}
