use thiserror::Error;
use wavelzw_lzw::{decoder::DecodingError, encoder::EncodingError};

/// Everything that can go wrong while compressing or decompressing an image.
#[derive(Debug, Error)]
pub enum Error {
    #[error("lzw encoding failed: {0}")]
    Encoding(#[from] EncodingError),
    #[error("lzw decoding failed: {0}")]
    Decoding(#[from] DecodingError),
    /// The byte count does not match the image dimensions.
    #[error("expected {expected} bytes for the image, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    /// Bad magic bytes, unknown tags or a file cut short.
    #[error("invalid compressed image header: {0}")]
    InvalidHeader(&'static str),
    #[error("invalid compression options: {0}")]
    InvalidOptions(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("image file error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
