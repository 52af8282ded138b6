//! Loading and writing 8 bit grayscale bitmaps.

use std::path::Path;

use image::{GrayImage, ImageFormat};

use crate::{Error, Result};

/// Row-major 8 bit grayscale pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grayscale {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Grayscale {
    /// Loads any supported image file, converting color images to grayscale.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let image = image::open(path)?.into_luma8();
        let (width, height) = image.dimensions();
        log::debug!("loaded {width}x{height} image");

        Ok(Self {
            width,
            height,
            pixels: image.into_raw(),
        })
    }

    /// Writes the pixels as a grayscale BMP file.
    pub fn save_bmp<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let expected = self.width as usize * self.height as usize;
        let actual = self.pixels.len();
        let image = GrayImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or(Error::LengthMismatch { expected, actual })?;

        image.save_with_format(path, ImageFormat::Bmp)?;
        Ok(())
    }
}
