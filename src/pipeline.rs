//! Image encoders and decoders: tiles, then transform and quantization, then LZW.
//!
//! Each tile is transformed and quantized on its own and the resulting bytes are
//! concatenated, tile after tile, into a single stream handed to the LZW coder. The
//! decoder recovers the tile geometry from the image size and the region size alone.

use wavelzw_lzw::{decoder::Decoder, encoder::Encoder};

use crate::{
    options::{Coding, CompressionOptions, Transform, Wavelet, WaveletParams},
    quantize::{to_pixel, Quantizer},
    region,
    transform::{Inverse2d, LiftingScheme, Sample, Transform2d},
    view::Rect,
    Error, Result,
};

/// Transform and quantization of tiles for one sample type, with its scratch buffers.
#[derive(Debug)]
pub struct WaveletStage<T> {
    scheme: LiftingScheme<T>,
    quantizer: Quantizer,
    forward: Transform2d<T>,
    inverse: Inverse2d<T>,
    samples: Vec<T>,
    coefficients: Vec<T>,
}

impl<T: Sample> WaveletStage<T> {
    pub fn new(scheme: LiftingScheme<T>, params: &WaveletParams) -> Self {
        let quantizer = Quantizer::new(
            &scheme,
            params.q_factor,
            params.q_alpha,
            params.q_beta,
            params.levels(),
        );
        Self {
            scheme,
            quantizer,
            forward: Transform2d::new(),
            inverse: Inverse2d::new(),
            samples: Vec::new(),
            coefficients: Vec::new(),
        }
    }

    /// Appends the quantized coefficients of `tile`, one byte per pixel.
    pub fn encode_tile(&mut self, image: &[u8], tile: Rect, output: &mut Vec<u8>) {
        self.samples.clear();
        tile.extend_into(image, &mut self.samples, |pixel| T::from_i64(pixel.into()));

        self.coefficients.clear();
        self.forward.forward(
            &self.samples,
            tile.width,
            tile.height,
            &self.scheme,
            self.quantizer.iterations,
            &mut self.coefficients,
        );
        self.quantizer
            .quantize(&self.coefficients, tile.width, tile.height, output);
    }

    /// Rebuilds the pixels of `tile` from its quantized coefficients.
    pub fn decode_tile(&mut self, bytes: &[u8], tile: Rect, image: &mut [u8]) {
        self.quantizer
            .dequantize(bytes, tile.width, tile.height, &mut self.coefficients);
        self.inverse.inverse(
            &self.coefficients,
            tile.width,
            tile.height,
            &self.scheme,
            self.quantizer.iterations,
            &mut self.samples,
        );
        tile.fill_from(image, &self.samples, to_pixel);
    }
}

/// Haar never leaves the 16 bit range, the other wavelets need wider samples.
#[derive(Debug)]
enum TileStage {
    Raw,
    Narrow(WaveletStage<i16>),
    Wide(WaveletStage<i64>),
}

impl TileStage {
    fn new(transform: &Transform) -> Self {
        match transform {
            Transform::None => TileStage::Raw,
            Transform::Wavelet(params) => match params.wavelet {
                Wavelet::Haar => {
                    TileStage::Narrow(WaveletStage::new(LiftingScheme::haar(), params))
                }
                Wavelet::Db4 => TileStage::Wide(WaveletStage::new(LiftingScheme::db4(), params)),
                Wavelet::Bior22 => {
                    TileStage::Wide(WaveletStage::new(LiftingScheme::bior_2_2(), params))
                }
            },
        }
    }

    fn encode_tile(&mut self, image: &[u8], tile: Rect, output: &mut Vec<u8>) {
        match self {
            TileStage::Raw => tile.extend_into(image, output, |pixel| pixel),
            TileStage::Narrow(stage) => stage.encode_tile(image, tile, output),
            TileStage::Wide(stage) => stage.encode_tile(image, tile, output),
        }
    }

    fn decode_tile(&mut self, bytes: &[u8], tile: Rect, image: &mut [u8]) {
        match self {
            TileStage::Raw => {
                tile.fill_from(image, bytes, |pixel| pixel);
            }
            TileStage::Narrow(stage) => stage.decode_tile(bytes, tile, image),
            TileStage::Wide(stage) => stage.decode_tile(bytes, tile, image),
        }
    }
}

fn pixel_count(width: usize, height: usize) -> Result<usize> {
    width
        .checked_mul(height)
        .ok_or_else(|| Error::InvalidOptions(format!("a {width}x{height} image is too large")))
}

/// Compresses 8 bit grayscale images with fixed options.
///
/// The encoder keeps its buffers between calls, compressing many images with one encoder
/// avoids reallocating them.
pub struct ImageEncoder {
    options: CompressionOptions,
    stage: TileStage,
    lzw: Encoder,
    tiles: Vec<u8>,
}

impl ImageEncoder {
    /// # Errors
    ///
    /// Fails with [Error::InvalidOptions] if the options cannot be used.
    pub fn new(options: CompressionOptions) -> Result<Self> {
        options.validate()?;
        let lzw = match options.coding {
            Coding::Lzw { code_size, options } => Encoder::new(code_size, options)?,
        };

        Ok(Self {
            options,
            stage: TileStage::new(&options.transform),
            lzw,
            tiles: Vec::new(),
        })
    }

    pub fn options(&self) -> &CompressionOptions {
        &self.options
    }

    /// Compresses the row-major `width` x `height` `image`, appending the payload to
    /// `output`.
    pub fn encode(
        &mut self,
        image: &[u8],
        width: usize,
        height: usize,
        output: &mut Vec<u8>,
    ) -> Result<()> {
        let expected = pixel_count(width, height)?;
        if image.len() != expected {
            return Err(Error::LengthMismatch {
                expected,
                actual: image.len(),
            });
        }

        self.tiles.clear();
        let region_size = self.options.region_size.map(|size| size as usize);
        let mut count = 0;
        for tile in region::split(width, height, region_size) {
            self.stage.encode_tile(image, tile, &mut self.tiles);
            count += 1;
        }
        log::trace!("{count} tiles coded into {} bytes", self.tiles.len());

        let start = output.len();
        self.lzw.encode(&self.tiles[..], &mut *output)?;
        log::debug!(
            "compressed {width}x{height} image, {} bytes into {}",
            image.len(),
            output.len() - start
        );

        Ok(())
    }
}

/// Decompresses images written by an [ImageEncoder] with the same options.
pub struct ImageDecoder {
    options: CompressionOptions,
    stage: TileStage,
    lzw: Decoder,
    tiles: Vec<u8>,
}

impl ImageDecoder {
    /// # Errors
    ///
    /// Fails with [Error::InvalidOptions] if the options cannot be used.
    pub fn new(options: CompressionOptions) -> Result<Self> {
        options.validate()?;
        let lzw = match options.coding {
            Coding::Lzw { code_size, options } => Decoder::new(code_size, options)?,
        };

        Ok(Self {
            options,
            stage: TileStage::new(&options.transform),
            lzw,
            tiles: Vec::new(),
        })
    }

    pub fn options(&self) -> &CompressionOptions {
        &self.options
    }

    /// Decompresses `payload` into the `width * height` pixels of `output`, replacing its
    /// contents.
    ///
    /// # Errors
    ///
    /// Fails with [Error::Decoding] on a corrupted payload and with
    /// [Error::LengthMismatch] if it does not hold exactly one byte per pixel.
    pub fn decode(
        &mut self,
        payload: &[u8],
        width: usize,
        height: usize,
        output: &mut Vec<u8>,
    ) -> Result<()> {
        let expected = pixel_count(width, height)?;

        self.tiles.clear();
        self.lzw.decode(payload, &mut self.tiles)?;
        if self.tiles.len() != expected {
            return Err(Error::LengthMismatch {
                expected,
                actual: self.tiles.len(),
            });
        }

        output.clear();
        output.resize(expected, 0);
        let region_size = self.options.region_size.map(|size| size as usize);
        let mut position = 0;
        for tile in region::split(width, height, region_size) {
            let bytes = &self.tiles[position..position + tile.len()];
            self.stage.decode_tile(bytes, tile, output);
            position += tile.len();
        }
        log::debug!(
            "decompressed {width}x{height} image from {} bytes",
            payload.len()
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: usize, height: usize) -> Vec<u8> {
        (0..width * height)
            .map(|i| ((i % width) * 4 + (i / width) * 2) as u8)
            .collect()
    }

    fn round_trip(
        options: CompressionOptions,
        image: &[u8],
        width: usize,
        height: usize,
    ) -> Vec<u8> {
        let mut payload = vec![];
        ImageEncoder::new(options)
            .unwrap()
            .encode(image, width, height, &mut payload)
            .unwrap();

        let mut output = vec![];
        ImageDecoder::new(options)
            .unwrap()
            .decode(&payload, width, height, &mut output)
            .unwrap();
        output
    }

    fn max_error(expected: &[u8], actual: &[u8]) -> u8 {
        expected
            .iter()
            .zip(actual)
            .map(|(&a, &b)| a.abs_diff(b))
            .max()
            .unwrap_or(0)
    }

    fn wavelet(wavelet: Wavelet, q_factor: i16) -> CompressionOptions {
        CompressionOptions::lossless()
            .with_region_size(Some(16))
            .with_transform(Transform::Wavelet(WaveletParams {
                wavelet,
                q_factor,
                ..WaveletParams::default()
            }))
    }

    #[test]
    fn zero_image() {
        let image = vec![0; 64];
        let output = round_trip(CompressionOptions::lossless(), &image, 8, 8);
        assert_eq!(output, image);
    }

    #[test]
    fn lossless_with_and_without_tiles() {
        let image = gradient(37, 21);
        for region_size in [None, Some(1), Some(8), Some(32), Some(100)] {
            let options = CompressionOptions::lossless().with_region_size(region_size);
            assert_eq!(round_trip(options, &image, 37, 21), image, "{region_size:?}");
        }
    }

    #[test]
    fn haar_stays_close() {
        let image = gradient(40, 24);
        let output = round_trip(wavelet(Wavelet::Haar, 2), &image, 40, 24);

        let error = image
            .iter()
            .zip(&output)
            .map(|(&a, &b)| (a as f64 - b as f64).abs())
            .sum::<f64>()
            / image.len() as f64;
        assert!(error < 4.0, "mean error {error}");
    }

    #[test]
    fn every_wavelet_stays_close() {
        let flat = vec![90; 32 * 32];
        let ramp = gradient(40, 24);

        for kind in [Wavelet::Haar, Wavelet::Db4, Wavelet::Bior22] {
            for level in [1, 4, 8] {
                let mut options = CompressionOptions::from_loss_level(level);
                if let Transform::Wavelet(params) = &mut options.transform {
                    params.wavelet = kind;
                }

                let output = round_trip(options, &flat, 32, 32);
                let error = max_error(&flat, &output);
                assert!(error <= 8, "{kind:?} level {level}: flat image off by {error}");

                let output = round_trip(options, &ramp, 40, 24);
                let error = max_error(&ramp, &output);
                assert!(error <= 24, "{kind:?} level {level}: gradient off by {error}");
            }
        }
    }

    #[test]
    fn wide_wavelets_are_deterministic() {
        let image = gradient(20, 12);
        for kind in [Wavelet::Db4, Wavelet::Bior22] {
            let first = round_trip(wavelet(kind, 4), &image, 20, 12);
            let second = round_trip(wavelet(kind, 4), &image, 20, 12);
            assert_eq!(first.len(), image.len());
            assert_eq!(first, second);
            assert!(max_error(&image, &first) <= 24);
        }
    }

    #[test]
    fn flat_image_survives_quantization() {
        let image = vec![90; 32 * 32];
        let output = round_trip(CompressionOptions::from_loss_level(64), &image, 32, 32);
        assert_eq!(output, image);
    }

    #[test]
    fn encoders_are_reusable() {
        let options = CompressionOptions::from_loss_level(4);
        let mut encoder = ImageEncoder::new(options).unwrap();
        let mut decoder = ImageDecoder::new(options).unwrap();

        for (width, height) in [(16, 16), (33, 7), (1, 1)] {
            let image = gradient(width, height);
            let mut payload = vec![];
            encoder.encode(&image, width, height, &mut payload).unwrap();

            let mut output = vec![];
            decoder.decode(&payload, width, height, &mut output).unwrap();
            assert_eq!(output.len(), image.len());
        }
    }

    #[test]
    fn empty_image() {
        let output = round_trip(CompressionOptions::from_loss_level(2), &[], 0, 0);
        assert!(output.is_empty());
    }

    #[test]
    fn input_length_is_checked() {
        let mut encoder = ImageEncoder::new(CompressionOptions::lossless()).unwrap();
        let result = encoder.encode(&[1, 2, 3], 2, 2, &mut vec![]);

        assert!(matches!(
            result,
            Err(Error::LengthMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn decoded_length_is_checked() {
        let options = CompressionOptions::lossless();
        let mut payload = vec![];
        ImageEncoder::new(options)
            .unwrap()
            .encode(&[7; 12], 4, 3, &mut payload)
            .unwrap();

        let result = ImageDecoder::new(options)
            .unwrap()
            .decode(&payload, 4, 4, &mut vec![]);
        assert!(matches!(
            result,
            Err(Error::LengthMismatch {
                expected: 16,
                actual: 12
            })
        ));
    }

    #[test]
    fn corrupted_payload() {
        let options = CompressionOptions::lossless();
        let result = ImageDecoder::new(options)
            .unwrap()
            .decode(&[0x2C, 0x01], 1, 1, &mut vec![]);

        assert!(matches!(result, Err(Error::Decoding(_))));
    }
}
