//! Byte-granular view over the decrypted volume.

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::page::{VirtualPage, PAGE_SIZE};
use crate::store::PageStore;

/// Shared, cursor-carrying reader over a [`PageStore`].
///
/// Clones share the store (and its caches) but keep independent positions,
/// so every consumer can hold its own cheap handle. Offsets address the
/// decrypted volume linearly; reads stop short at the end of the volume.
#[derive(Clone)]
pub struct VolumeReader {
    store: Arc<Mutex<PageStore>>,
    position: u64,
}

impl VolumeReader {
    pub fn new(store: PageStore) -> Self {
        VolumeReader {
            store: Arc::new(Mutex::new(store)),
            position: 0,
        }
    }

    /// Volume length in bytes.
    pub fn len(&self) -> u64 {
        self.store.lock().page_count() as u64 * PAGE_SIZE as u64
    }

    pub fn is_empty(&self) -> bool {
        // Open volumes have at least one page.
        false
    }

    /// Reads at an absolute offset without touching the cursor. Returns the
    /// number of bytes read, short only at the end of the volume.
    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let end = self.len();
        if buf.is_empty() || offset >= end {
            return Ok(0);
        }
        let want = buf.len().min((end - offset) as usize);

        let mut store = self.store.lock();
        let mut done = 0;
        while done < want {
            let position = offset + done as u64;
            let page_index = (position / PAGE_SIZE as u64) as u32;
            let page_offset = (position % PAGE_SIZE as u64) as usize;
            let run = (want - done).min(PAGE_SIZE - page_offset);

            let page = store.fetch(page_index)?;
            buf[done..done + run].copy_from_slice(&page.bytes()[page_offset..page_offset + run]);
            done += run;
        }
        Ok(done)
    }

    /// Reads exactly `buf.len()` bytes at `offset`.
    pub fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        if self.read_at(offset, buf)? != buf.len() {
            return Err(Error::EndOfVolume);
        }
        Ok(())
    }

    /// Copies out a whole decrypted page.
    pub fn read_page(&self, index: u32) -> Result<VirtualPage> {
        let mut store = self.store.lock();
        store.fetch(index).map(|page| page.clone())
    }
}

impl io::Read for VolumeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.read_at(self.position, buf)?;
        self.position += read as u64;
        Ok(read)
    }
}

impl io::Seek for VolumeReader {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let target = match pos {
            io::SeekFrom::Start(offset) => Some(offset),
            io::SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
            io::SeekFrom::End(delta) => self.len().checked_add_signed(delta),
        };
        match target {
            Some(offset) => {
                self.position = offset;
                Ok(offset)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of volume",
            )),
        }
    }
}
