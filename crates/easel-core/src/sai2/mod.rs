//! Reader for the v2 canvas file format.
//!
//! A v2 file is not paged or encrypted: a 64-byte header, a table of typed
//! blob entries, and the blobs themselves addressed by absolute offset. The
//! whole file is held in memory and sliced; the only blob type this reader
//! interprets is the `intg` tile-compressed thumbnail.

mod bitstream;
mod thumbnail;

use byteorder::{ByteOrder, LittleEndian};
use tracing::warn;

use crate::document::{tag, Thumbnail};
use crate::error::{Error, Result};

/// Leading identifier of a v2 canvas file.
pub const CANVAS_IDENTIFIER: [u8; 16] = *b"SAI-CANVAS-TYPE0";

/// Entry type of the tile-compressed thumbnail.
pub const THUMBNAIL_TAG: u32 = tag(b"intg");

/// Blob tag of a delta-compressed pixel stream.
pub const DELTA_PIXELS_TAG: u32 = tag(b"dpcm");

pub const HEADER_SIZE: usize = 64;
pub const ENTRY_SIZE: usize = 16;

/// The fixed v2 file header. Fields prefixed `unknown` are carried verbatim
/// and never interpreted.
#[derive(Debug, Clone)]
pub struct CanvasHeader {
    pub identifier: [u8; 16],
    pub flags: [u8; 4],
    pub width: u32,
    pub height: u32,
    pub printing_resolution: u32,
    pub table_count: u32,
    pub selected_layer: u32,
    pub unknown_a: u64,
    pub unknown_b: u64,
    pub unknown_flags: u32,
    pub unknown_blending_mode: u32,
}

impl CanvasHeader {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(Error::InvalidFormat("canvas header truncated"));
        }
        let mut identifier = [0u8; 16];
        identifier.copy_from_slice(&bytes[0..16]);
        if identifier != CANVAS_IDENTIFIER {
            return Err(Error::InvalidFormat("missing SAI-CANVAS-TYPE0 identifier"));
        }
        let mut flags = [0u8; 4];
        flags.copy_from_slice(&bytes[16..20]);

        Ok(CanvasHeader {
            identifier,
            flags,
            width: LittleEndian::read_u32(&bytes[20..24]),
            height: LittleEndian::read_u32(&bytes[24..28]),
            printing_resolution: LittleEndian::read_u32(&bytes[28..32]),
            table_count: LittleEndian::read_u32(&bytes[32..36]),
            selected_layer: LittleEndian::read_u32(&bytes[36..40]),
            unknown_a: LittleEndian::read_u64(&bytes[40..48]),
            unknown_b: LittleEndian::read_u64(&bytes[48..56]),
            unknown_flags: LittleEndian::read_u32(&bytes[56..60]),
            unknown_blending_mode: LittleEndian::read_u32(&bytes[60..64]),
        })
    }

    /// Channels carried by the thumbnail stream: 4 when the alpha flag bits
    /// are clear, 3 otherwise.
    pub fn thumbnail_channels(&self) -> usize {
        if self.flags[1] & 7 == 0 {
            4
        } else {
            3
        }
    }
}

/// One 16-byte slot of the blob table.
#[derive(Debug, Clone, Copy)]
pub struct CanvasEntry {
    /// Four-character type code.
    pub kind: u32,
    pub layer_id: u32,
    /// Absolute file offset of the entry's blob.
    pub blobs_offset: u64,
}

/// A parsed v2 file, borrowing the raw bytes.
pub struct CanvasFile<'a> {
    header: CanvasHeader,
    entries: Vec<CanvasEntry>,
    data: &'a [u8],
}

impl<'a> CanvasFile<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let header = CanvasHeader::parse(data)?;
        let table_len = header.table_count as usize * ENTRY_SIZE;
        let table_end = HEADER_SIZE + table_len;
        if data.len() < table_end {
            return Err(Error::InvalidFormat("canvas entry table truncated"));
        }

        let entries = data[HEADER_SIZE..table_end]
            .chunks_exact(ENTRY_SIZE)
            .map(|slot| CanvasEntry {
                kind: LittleEndian::read_u32(&slot[0..4]),
                layer_id: LittleEndian::read_u32(&slot[4..8]),
                blobs_offset: LittleEndian::read_u64(&slot[8..16]),
            })
            .collect();

        Ok(CanvasFile {
            header,
            entries,
            data,
        })
    }

    pub fn header(&self) -> &CanvasHeader {
        &self.header
    }

    pub fn entries(&self) -> &[CanvasEntry] {
        &self.entries
    }

    /// Bytes of entry `index`'s blob: from its offset to the next entry's
    /// offset, or to the end of the file for the last entry.
    pub fn blob(&self, index: usize) -> Result<&'a [u8]> {
        let entry = &self.entries[index];
        let start = entry.blobs_offset as usize;
        let end = match self.entries.get(index + 1) {
            Some(next) => next.blobs_offset as usize,
            None => self.data.len(),
        };
        if start > end || end > self.data.len() {
            return Err(Error::InvalidFormat("blob offset out of range"));
        }
        Ok(&self.data[start..end])
    }

    /// Decodes the thumbnail from the first `intg` entry.
    pub fn thumbnail(&self) -> Result<Thumbnail> {
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.kind == THUMBNAIL_TAG {
                return thumbnail::decode(&self.header, self.blob(index)?);
            }
            warn!(
                kind = entry.kind,
                layer_id = entry.layer_id,
                "skipping unrecognized canvas entry"
            );
        }
        Err(Error::InvalidFormat("no thumbnail entry in canvas table"))
    }
}

/// Parses `bytes` as a v2 canvas file and decodes its thumbnail to RGBA.
pub fn extract_thumbnail(bytes: &[u8]) -> Result<Thumbnail> {
    CanvasFile::parse(bytes)?.thumbnail()
}
