//! Canvas-level helpers over the virtual file system.
//!
//! Thin readers for the well-known files a document carries: `canvas`
//! (dimensions), `thumbnail` (an uncompressed BGRA preview tagged `BM32`),
//! and the `laytbl`/`subtbl` tables that index the per-layer files under
//! `/layers` and `/sublayers`.

use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Error, Result};
use crate::vfs::{FileEntry, VirtualFileSystem};

/// Four-character tag packed little-endian.
pub(crate) const fn tag(name: &[u8; 4]) -> u32 {
    u32::from_le_bytes(*name)
}

/// Tag of an uncompressed 32-bit BGRA thumbnail.
pub const BM32_TAG: u32 = tag(b"BM32");

/// Contents of the `canvas` file header.
#[derive(Debug, Clone, Copy)]
pub struct CanvasInfo {
    /// Leading field of unknown meaning, observed as 0x10. Kept verbatim.
    pub alignment: u32,
    pub width: u32,
    pub height: u32,
}

/// Decoded preview image, always RGBA.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// A document opened from a v1 volume.
pub struct Document {
    vfs: VirtualFileSystem,
}

impl Document {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Document {
            vfs: VirtualFileSystem::open(path)?,
        })
    }

    /// The underlying file system, for direct traversal.
    pub fn vfs(&self) -> &VirtualFileSystem {
        &self.vfs
    }

    /// Reads the `canvas` header.
    pub fn canvas_info(&self) -> Result<CanvasInfo> {
        let mut canvas = self.vfs.get_entry("canvas")?;
        Ok(CanvasInfo {
            alignment: canvas.read_u32::<LittleEndian>()?,
            width: canvas.read_u32::<LittleEndian>()?,
            height: canvas.read_u32::<LittleEndian>()?,
        })
    }

    /// Canvas dimensions as `(width, height)`.
    pub fn canvas_size(&self) -> Result<(u32, u32)> {
        let info = self.canvas_info()?;
        Ok((info.width, info.height))
    }

    /// Decodes the `thumbnail` file into RGBA pixels.
    pub fn thumbnail(&self) -> Result<Thumbnail> {
        let mut file = self.vfs.get_entry("thumbnail")?;
        let width = file.read_u32::<LittleEndian>()?;
        let height = file.read_u32::<LittleEndian>()?;
        let magic = file.read_u32::<LittleEndian>()?;
        if magic != BM32_TAG {
            return Err(Error::InvalidFormat("thumbnail is not tagged BM32"));
        }

        let mut pixels = vec![0u8; width as usize * height as usize * 4];
        if FileEntry::read(&mut file, &mut pixels)? != pixels.len() {
            return Err(Error::EndOfVolume);
        }
        swizzle_bgra_to_rgba(&mut pixels);

        Ok(Thumbnail {
            pixels,
            width,
            height,
        })
    }

    /// Opens each layer file named by `laytbl`, in table order. The callback
    /// returns `false` to stop early; table entries whose file is missing
    /// are skipped.
    pub fn iterate_layer_files<F>(&self, layer_proc: F) -> Result<()>
    where
        F: FnMut(&mut FileEntry) -> bool,
    {
        self.iterate_table("laytbl", "layers", layer_proc)
    }

    /// As [`iterate_layer_files`](Self::iterate_layer_files), over `subtbl`
    /// and `/sublayers`.
    pub fn iterate_sublayer_files<F>(&self, sublayer_proc: F) -> Result<()>
    where
        F: FnMut(&mut FileEntry) -> bool,
    {
        self.iterate_table("subtbl", "sublayers", sublayer_proc)
    }

    fn iterate_table<F>(&self, table: &str, folder: &str, mut proc: F) -> Result<()>
    where
        F: FnMut(&mut FileEntry) -> bool,
    {
        let mut table_file = self.vfs.get_entry(table)?;
        let count = table_file.read_u32::<LittleEndian>()?;
        for _ in 0..count {
            let identifier = table_file.read_u32::<LittleEndian>()?;
            let _kind = table_file.read_u16::<LittleEndian>()?;
            let _reserved = table_file.read_u16::<LittleEndian>()?;

            let path = format!("{folder}/{identifier:08x}");
            match self.vfs.get_entry(path.as_bytes()) {
                Ok(mut entry) => {
                    if !proc(&mut entry) {
                        break;
                    }
                }
                Err(Error::PathNotFound(_)) => continue,
                Err(other) => return Err(other),
            }
        }
        Ok(())
    }
}

pub(crate) fn swizzle_bgra_to_rgba(pixels: &mut [u8]) {
    for pixel in pixels.chunks_exact_mut(4) {
        pixel.swap(0, 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bm32_tag_value() {
        assert_eq!(BM32_TAG, 0x3233_4D42);
    }

    #[test]
    fn swizzle_swaps_blue_and_red() {
        let mut pixels = vec![0x10, 0x20, 0x30, 0xFF, 0x01, 0x02, 0x03, 0x04];
        swizzle_bgra_to_rgba(&mut pixels);
        assert_eq!(pixels, vec![0x30, 0x20, 0x10, 0xFF, 0x03, 0x02, 0x01, 0x04]);
    }
}
