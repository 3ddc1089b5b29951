//! File handles over chained page lists.

use std::borrow::Cow;
use std::io;

use crate::error::{Error, Result};
use crate::page::{self, FatEntry, FatKind, PAGE_SIZE, TABLE_SPAN};
use crate::stream::VolumeReader;

/// An open entry of the virtual file system.
///
/// Owns a copy of the FAT record and a cursor `(offset, page_index,
/// page_offset)` into the entry's chained pages. Handles are independent:
/// each carries its own reader clone and position, and any number may be
/// open at once.
pub struct FileEntry {
    reader: VolumeReader,
    fat: FatEntry,
    offset: usize,
    page_index: u32,
    page_offset: usize,
}

impl FileEntry {
    pub(crate) fn new(reader: VolumeReader, fat: FatEntry) -> Self {
        let page_index = fat.page_index;
        FileEntry {
            reader,
            fat,
            offset: 0,
            page_index,
            page_offset: 0,
        }
    }

    /// The underlying FAT record.
    pub fn fat(&self) -> &FatEntry {
        &self.fat
    }

    pub fn name(&self) -> Cow<'_, str> {
        self.fat.name()
    }

    pub fn kind(&self) -> Option<FatKind> {
        self.fat.kind()
    }

    pub fn size(&self) -> usize {
        self.fat.size as usize
    }

    /// First page of the entry's content.
    pub fn page_index(&self) -> u32 {
        self.fat.page_index
    }

    /// Raw Windows FILETIME.
    pub fn timestamp(&self) -> u64 {
        self.fat.timestamp
    }

    /// Timestamp as Unix epoch seconds.
    pub fn timestamp_unix(&self) -> i64 {
        self.fat.timestamp_unix()
    }

    /// Current read position.
    pub fn tell(&self) -> usize {
        self.offset
    }

    /// Moves the cursor to `new_offset`, walking the page chain from the
    /// first page. Offsets beyond the file size are rejected.
    pub fn seek(&mut self, new_offset: usize) -> Result<()> {
        if new_offset > self.size() {
            return Err(Error::EndOfVolume);
        }
        self.offset = new_offset;
        self.page_offset = new_offset % PAGE_SIZE;
        self.page_index = self.fat.page_index;
        for _ in 0..new_offset / PAGE_SIZE {
            match self.next_page()? {
                0 => break,
                next => self.page_index = next,
            }
        }
        Ok(())
    }

    /// Reads up to `dest.len()` bytes at the cursor, following the page
    /// chain. Short only when the file (or its chain) ends.
    pub fn read(&mut self, dest: &mut [u8]) -> Result<usize> {
        let want = dest.len().min(self.size().saturating_sub(self.offset));
        if want == 0 {
            return Ok(0);
        }

        let mut done = 0;
        while done < want {
            let run = (want - done).min(PAGE_SIZE - self.page_offset);
            let position = self.page_index as u64 * PAGE_SIZE as u64 + self.page_offset as u64;
            self.reader
                .read_exact_at(position, &mut dest[done..done + run])?;

            done += run;
            self.offset += run;
            self.page_offset += run;

            if self.page_offset == PAGE_SIZE {
                self.page_offset = 0;
                match self.next_page()? {
                    0 => break,
                    next => self.page_index = next,
                }
            }
        }
        Ok(done)
    }

    /// Link to the page after the current one, from the current page's
    /// table entry. Zero means the chain ends here.
    fn next_page(&self) -> Result<u32> {
        let table = self
            .reader
            .read_page(page::nearest_table_index(self.page_index))?;
        Ok(table
            .table_entry(self.page_index as usize % TABLE_SPAN)
            .next_page_index)
    }
}

impl io::Read for FileEntry {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        FileEntry::read(self, buf).map_err(io::Error::from)
    }
}
