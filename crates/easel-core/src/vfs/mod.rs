//! FAT-style directory tree laid over the page store.
//!
//! The root directory starts at page 2. A directory page holds up to 64 FAT
//! records; directories with more entries continue on the page named by the
//! `next_page_index` of their own table entry. Path separators are `.` and
//! `/`, a leftover of the dotted on-disk names, and names are compared as
//! raw bytes.

mod entry;

pub use entry::FileEntry;

use crate::error::{Error, Result};
use crate::page::{self, FatKind, VirtualPage, FAT_ENTRIES_PER_PAGE, TABLE_SPAN};
use crate::store::PageStore;
use crate::stream::VolumeReader;

/// First page of the root directory.
pub const ROOT_PAGE_INDEX: u32 = 2;

const SEPARATORS: [u8; 2] = [b'.', b'/'];

/// Depth-first traversal callbacks. Each returns `false` to stop the whole
/// iteration; stopping is cooperative and not an error.
pub trait VfsVisitor {
    fn folder_begin(&mut self, _entry: &mut FileEntry) -> bool {
        true
    }

    fn folder_end(&mut self, _entry: &mut FileEntry) -> bool {
        true
    }

    fn file(&mut self, _entry: &mut FileEntry) -> bool {
        true
    }
}

/// Read-only view of the directory tree inside a volume.
pub struct VirtualFileSystem {
    reader: VolumeReader,
}

impl VirtualFileSystem {
    /// Opens the volume at `path` and binds the tree over it.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let store = PageStore::open(path)?;
        Ok(VirtualFileSystem {
            reader: VolumeReader::new(store),
        })
    }

    /// Whether `path` resolves to an entry.
    pub fn exists(&self, path: impl AsRef<[u8]>) -> bool {
        self.get_entry(path).is_ok()
    }

    /// Resolves `path` to an independent file handle.
    pub fn get_entry(&self, path: impl AsRef<[u8]>) -> Result<FileEntry> {
        let path = path.as_ref();
        let mut tokens = path
            .split(|b| SEPARATORS.contains(b))
            .filter(|token| !token.is_empty());

        let mut token = tokens
            .next()
            .ok_or_else(|| Error::PathNotFound(display_path(path)))?;
        let mut page_index = ROOT_PAGE_INDEX;

        loop {
            let dir_page = self.reader.read_page(page_index)?;
            match scan_directory_page(&dir_page, token) {
                Scan::Found(fat) => {
                    match tokens.next() {
                        Some(next) => {
                            if fat.kind() != Some(FatKind::Folder) {
                                return Err(Error::PathNotFolder(display_path(path)));
                            }
                            page_index = fat.page_index;
                            token = next;
                        }
                        None => return Ok(FileEntry::new(self.reader.clone(), fat)),
                    }
                }
                Scan::Terminated => return Err(Error::PathNotFound(display_path(path))),
                Scan::Exhausted => {
                    // The page is full; the directory may continue elsewhere.
                    let next = self.next_directory_page(page_index)?;
                    if next == 0 {
                        return Err(Error::PathNotFound(display_path(path)));
                    }
                    page_index = next;
                }
            }
        }
    }

    /// Walks the tree depth-first from the root, feeding each entry to
    /// `visitor`.
    pub fn iterate<V: VfsVisitor + ?Sized>(&self, visitor: &mut V) -> Result<()> {
        self.iterate_directory(ROOT_PAGE_INDEX, visitor)?;
        Ok(())
    }

    fn iterate_directory<V: VfsVisitor + ?Sized>(
        &self,
        first_page: u32,
        visitor: &mut V,
    ) -> Result<bool> {
        let mut page_index = first_page;
        loop {
            let dir_page = self.reader.read_page(page_index)?;
            for slot in 0..FAT_ENTRIES_PER_PAGE {
                let fat = dir_page.fat_entry(slot);
                if !fat.is_valid() {
                    break;
                }
                match fat.kind() {
                    Some(FatKind::File) => {
                        let mut entry = FileEntry::new(self.reader.clone(), fat);
                        if !visitor.file(&mut entry) {
                            return Ok(false);
                        }
                    }
                    Some(FatKind::Folder) => {
                        let child_page = fat.page_index;
                        let mut entry = FileEntry::new(self.reader.clone(), fat);
                        if !visitor.folder_begin(&mut entry) {
                            return Ok(false);
                        }
                        if !self.iterate_directory(child_page, visitor)? {
                            return Ok(false);
                        }
                        if !visitor.folder_end(&mut entry) {
                            return Ok(false);
                        }
                    }
                    None => {}
                }
            }

            let next = self.next_directory_page(page_index)?;
            if next == 0 {
                return Ok(true);
            }
            page_index = next;
        }
    }

    fn next_directory_page(&self, page_index: u32) -> Result<u32> {
        let table = self
            .reader
            .read_page(page::nearest_table_index(page_index))?;
        Ok(table
            .table_entry(page_index as usize % TABLE_SPAN)
            .next_page_index)
    }
}

enum Scan {
    /// A valid entry matched the token.
    Found(page::FatEntry),
    /// A zeroed entry ended the directory before a match.
    Terminated,
    /// All 64 slots are valid and none matched.
    Exhausted,
}

fn scan_directory_page(dir_page: &VirtualPage, token: &[u8]) -> Scan {
    for slot in 0..FAT_ENTRIES_PER_PAGE {
        let fat = dir_page.fat_entry(slot);
        if !fat.is_valid() {
            return Scan::Terminated;
        }
        if fat.name_bytes() == token {
            return Scan::Found(fat);
        }
    }
    Scan::Exhausted
}

fn display_path(path: &[u8]) -> String {
    String::from_utf8_lossy(path).into_owned()
}
