//! Reader for SAI paint-program document containers.
//!
//! A v1 document is a single encrypted file behaving like a small file
//! system: fixed 4096-byte pages, per-page checksums doubling as cipher
//! keys, and a FAT-style directory tree rooted at page 2. A v2 canvas file
//! is a flat header-plus-blob-table layout whose thumbnail is tile
//! compressed with a delta bitstream.
//!
//! The layers, bottom up:
//!
//! - [`page`] - page cipher, checksums, and packed record parsing
//! - [`store`] - [`PageStore`]: validated volume with decrypt-on-fetch and
//!   the table/data cache pair
//! - [`stream`] - [`VolumeReader`]: byte-granular `Read + Seek` view
//! - [`vfs`] - [`VirtualFileSystem`]: path lookup, visitor iteration, and
//!   [`FileEntry`] handles over chained pages
//! - [`document`] - [`Document`]: canvas size, thumbnail, layer tables
//! - [`sai2`] - the v2 reader and tile codec
//!
//! ## Example
//!
//! ```rust,no_run
//! use easel_core::{Document, Result};
//!
//! fn main() -> Result<()> {
//!     let document = Document::open("painting.sai")?;
//!     let (width, height) = document.canvas_size()?;
//!     println!("canvas: {width}x{height}");
//!
//!     document.iterate_layer_files(|layer| {
//!         println!("layer {} ({} bytes)", layer.name(), layer.size());
//!         true
//!     })?;
//!     Ok(())
//! }
//! ```
//!
//! Reading is strictly single-threaded: handles share one store and its
//! cache slots behind a lock, and a handle must not outlive its store.

pub mod document;
pub mod error;
pub mod keys;
pub mod page;
pub mod sai2;
pub mod store;
pub mod stream;
pub mod vfs;

pub use document::{CanvasInfo, Document, Thumbnail, BM32_TAG};
pub use error::{Error, Result};
pub use page::{FatEntry, FatKind, TableEntry, VirtualPage, PAGE_SIZE, TABLE_SPAN};
pub use store::PageStore;
pub use stream::VolumeReader;
pub use vfs::{FileEntry, VfsVisitor, VirtualFileSystem, ROOT_PAGE_INDEX};
