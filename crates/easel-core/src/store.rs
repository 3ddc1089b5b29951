//! Disk-backed page store with decrypt-on-fetch.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::page::{self, VirtualPage, PAGE_SIZE, TABLE_SPAN};

const EMPTY_SLOT: u32 = u32::MAX;

struct CacheSlot {
    index: u32,
    page: Box<VirtualPage>,
}

impl CacheSlot {
    fn new() -> Self {
        CacheSlot {
            index: EMPTY_SLOT,
            page: Box::new(VirtualPage::new()),
        }
    }
}

/// Read-only handle on an encrypted paged volume.
///
/// Serves decrypted pages on demand through a pair of one-slot caches, one
/// for the current table page and one for the current data page. Consumers
/// read data pages in runs that share a single table, so the table slot hits
/// on nearly every fetch; widening the caches buys little.
pub struct PageStore {
    file: File,
    page_count: u32,
    table_cache: CacheSlot,
    data_cache: CacheSlot,
}

impl PageStore {
    /// Opens a volume, validating that its length is a nonzero multiple of
    /// the page size.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let len = file.metadata()?.len();
        if len == 0 || len % PAGE_SIZE as u64 != 0 {
            return Err(Error::InvalidSize(len));
        }
        let page_count = (len / PAGE_SIZE as u64) as u32;
        debug!(path = %path.as_ref().display(), page_count, "opened volume");

        Ok(PageStore {
            file,
            page_count,
            table_cache: CacheSlot::new(),
            data_cache: CacheSlot::new(),
        })
    }

    /// Number of pages in the volume.
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Fetches a page, decrypting and integrity-checking it.
    ///
    /// Data pages are verified against the checksum in their table entry;
    /// table pages against the self-checksum in their first slot. A failed
    /// check leaves the corresponding cache slot empty.
    pub fn fetch(&mut self, index: u32) -> Result<&VirtualPage> {
        if index >= self.page_count {
            return Err(Error::EndOfVolume);
        }
        if page::is_table_index(index) {
            self.load_table(index)?;
            Ok(&self.table_cache.page)
        } else {
            self.load_data(index)?;
            Ok(&self.data_cache.page)
        }
    }

    fn load_table(&mut self, index: u32) -> Result<()> {
        if self.table_cache.index == index {
            trace!(index, "table cache hit");
            return Ok(());
        }
        trace!(index, "table cache miss");

        self.table_cache.index = EMPTY_SLOT;
        read_page(&mut self.file, index, &mut self.table_cache.page)?;
        self.table_cache.page.decrypt_table(index);

        let expected = self.table_cache.page.table_entry(0).checksum;
        let actual = self.table_cache.page.table_checksum();
        if actual != expected {
            return Err(Error::ChecksumMismatch {
                page_index: index,
                expected,
                actual,
            });
        }
        self.table_cache.index = index;
        Ok(())
    }

    fn load_data(&mut self, index: u32) -> Result<()> {
        if self.data_cache.index == index {
            trace!(index, "data cache hit");
            return Ok(());
        }
        trace!(index, "data cache miss");

        self.load_table(page::nearest_table_index(index))?;
        let expected = self
            .table_cache
            .page
            .table_entry(index as usize % TABLE_SPAN)
            .checksum;

        self.data_cache.index = EMPTY_SLOT;
        read_page(&mut self.file, index, &mut self.data_cache.page)?;
        self.data_cache.page.decrypt_data(expected);

        let actual = self.data_cache.page.checksum();
        if actual != expected {
            return Err(Error::ChecksumMismatch {
                page_index: index,
                expected,
                actual,
            });
        }
        self.data_cache.index = index;
        Ok(())
    }
}

fn read_page(file: &mut File, index: u32, into: &mut VirtualPage) -> Result<()> {
    file.seek(SeekFrom::Start(index as u64 * PAGE_SIZE as u64))?;
    file.read_exact(into.bytes_mut())?;
    Ok(())
}
