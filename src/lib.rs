//! Grayscale image compression with lifting wavelets, band quantization and adaptive LZW.
//!
//! An image is split into square tiles. Each tile goes through an optional integer wavelet
//! transform and a quantizer that stores one signed byte per coefficient, then all tiles are
//! concatenated and coded with LZW. Without a transform the pixels are coded as they are,
//! and compression is lossless.
//!
//! Options are saved in the header of the compressed file, see [container].
//!
//! # Examples
//!
//! ```
//! use wavelzw::{compress, decompress, options::CompressionOptions};
//!
//! let (width, height) = (64, 48);
//! let pixels: Vec<u8> = (0..width * height).map(|i| (i % 64) as u8 * 4).collect();
//!
//! let compressed = compress(&pixels, width, height, CompressionOptions::lossless()).unwrap();
//! assert!(compressed.payload.len() < pixels.len());
//!
//! let restored = decompress(&compressed).unwrap();
//! assert_eq!(restored, pixels);
//! ```

#[cfg(feature = "cli")]
pub mod cli;
pub mod container;
mod error;
pub mod image_io;
pub mod options;
pub mod pipeline;
pub mod quantize;
pub mod region;
pub mod transform;
pub mod view;

pub use error::{Error, Result};
pub use wavelzw_lzw as lzw;

use container::CompressedImage;
use options::CompressionOptions;
use pipeline::{ImageDecoder, ImageEncoder};

/// Compresses the row-major `width` x `height` `pixels`.
pub fn compress(
    pixels: &[u8],
    width: u32,
    height: u32,
    options: CompressionOptions,
) -> Result<CompressedImage> {
    let mut payload = Vec::new();
    ImageEncoder::new(options)?.encode(pixels, width as usize, height as usize, &mut payload)?;

    Ok(CompressedImage {
        options,
        width,
        height,
        payload,
    })
}

/// Rebuilds the pixels of a compressed image.
pub fn decompress(image: &CompressedImage) -> Result<Vec<u8>> {
    let mut pixels = Vec::new();
    ImageDecoder::new(image.options)?.decode(
        &image.payload,
        image.width as usize,
        image.height as usize,
        &mut pixels,
    )?;
    Ok(pixels)
}
