use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("volume size {0} is not a nonzero multiple of 4096 bytes")]
    InvalidSize(u64),

    #[error("checksum mismatch on page {page_index}: table says {expected:#010x}, page computes {actual:#010x}")]
    ChecksumMismatch {
        page_index: u32,
        expected: u32,
        actual: u32,
    },

    #[error("path not found: {0}")]
    PathNotFound(String),

    #[error("path component is not a folder: {0}")]
    PathNotFolder(String),

    #[error("invalid format: {0}")]
    InvalidFormat(&'static str),

    #[error("codec error: {0}")]
    Codec(&'static str),

    #[error("read past end of volume")]
    EndOfVolume,
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(inner) => inner,
            Error::EndOfVolume => std::io::Error::new(std::io::ErrorKind::UnexpectedEof, err),
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        }
    }
}
