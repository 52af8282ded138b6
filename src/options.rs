//! Compression options and their fixed binary layout.
//!
//! Options are chosen once per image and stored in the compressed file header, so that
//! decoding needs no configuration at all.

use std::io::{self, Read, Write};

use bitstream_io::{ByteRead, ByteReader, ByteWrite, ByteWriter, LittleEndian};
use wavelzw_lzw::{Options as LzwOptions, DEFAULT_CODE_SIZE, MAX_CODE_SIZE, MIN_CODE_SIZE};

use crate::{Error, Result};

pub const DEFAULT_Q_FACTOR: i16 = 32;
pub const DEFAULT_Q_ALPHA: i16 = 8;
pub const DEFAULT_Q_BETA: i16 = 0;

/// Loss levels above this one compress like this one.
pub const MAX_LOSS_LEVEL: u32 = 64;
pub const Q_FACTOR_PER_LOSS_LEVEL: u32 = 2;
/// Tile size used by lossy presets.
pub const LOSSY_REGION_SIZE: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wavelet {
    /// Integer Haar, computed on 16 bits.
    Haar,
    /// Integer Daubechies 4, computed on 64 bits.
    Db4,
    /// Integer biorthogonal 2,2, computed on 64 bits.
    Bior22,
}

impl Wavelet {
    const fn tag(self) -> u8 {
        match self {
            Wavelet::Haar => 1,
            Wavelet::Db4 => 2,
            Wavelet::Bior22 => 3,
        }
    }

    const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Wavelet::Haar),
            2 => Some(Wavelet::Db4),
            3 => Some(Wavelet::Bior22),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Wavelet::Haar => "haar",
            Wavelet::Db4 => "db4",
            Wavelet::Bior22 => "bior2.2",
        }
    }
}

/// Wavelet transform followed by band quantization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveletParams {
    pub wavelet: Wavelet,
    /// Decomposition levels. `None` decomposes until a single approximation sample is left.
    pub iterations: Option<u32>,
    /// Quantization factor of the outermost level, at least 2 once applied.
    pub q_factor: i16,
    /// The factor is divided by `q_alpha` at each deeper level.
    pub q_alpha: i16,
    /// And then lowered by `q_beta`.
    pub q_beta: i16,
}

impl WaveletParams {
    pub fn levels(&self) -> Option<usize> {
        self.iterations.map(|iterations| iterations as usize)
    }
}

impl Default for WaveletParams {
    fn default() -> Self {
        Self {
            wavelet: Wavelet::Haar,
            iterations: None,
            q_factor: DEFAULT_Q_FACTOR,
            q_alpha: DEFAULT_Q_ALPHA,
            q_beta: DEFAULT_Q_BETA,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transform {
    /// Pixels are coded as they are.
    #[default]
    None,
    Wavelet(WaveletParams),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coding {
    Lzw { code_size: u8, options: LzwOptions },
}

impl Default for Coding {
    fn default() -> Self {
        Coding::Lzw {
            code_size: DEFAULT_CODE_SIZE,
            options: LzwOptions::default(),
        }
    }
}

/// Everything the encoder and the decoder must agree on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompressionOptions {
    /// Side of the square tiles the image is split into. `None` keeps the image whole.
    pub region_size: Option<u32>,
    pub transform: Transform,
    pub coding: Coding,
}

impl CompressionOptions {
    /// Size of the options in the file header.
    pub const ENCODED_SIZE: usize = 19;

    /// No transform, the whole image as one region.
    pub fn lossless() -> Self {
        Self::default()
    }

    /// Preset for a loss level: 0 is lossless, anything above uses the Haar transform on
    /// 32 pixel tiles with a quantization factor growing with the level.
    pub fn from_loss_level(level: u32) -> Self {
        if level == 0 {
            return Self::lossless();
        }

        let q_factor = Q_FACTOR_PER_LOSS_LEVEL * level.min(MAX_LOSS_LEVEL);
        Self {
            region_size: Some(LOSSY_REGION_SIZE),
            transform: Transform::Wavelet(WaveletParams {
                q_factor: q_factor as i16,
                ..WaveletParams::default()
            }),
            coding: Coding::default(),
        }
    }

    pub fn with_region_size(mut self, region_size: Option<u32>) -> Self {
        self.region_size = region_size;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_coding(mut self, coding: Coding) -> Self {
        self.coding = coding;
        self
    }

    /// Rejects options that no encoder could use.
    pub fn validate(&self) -> Result<()> {
        if self.region_size == Some(0) {
            return Err(Error::InvalidOptions("region size must not be 0".into()));
        }

        if let Transform::Wavelet(params) = &self.transform {
            if params.q_alpha < 1 {
                return Err(Error::InvalidOptions(format!(
                    "quantization alpha must be at least 1, was {}",
                    params.q_alpha
                )));
            }
        }

        match self.coding {
            Coding::Lzw { code_size, .. } => {
                if !(MIN_CODE_SIZE..=MAX_CODE_SIZE).contains(&code_size) {
                    return Err(Error::InvalidOptions(format!(
                        "lzw code size must be between {MIN_CODE_SIZE} and {MAX_CODE_SIZE}, was {code_size}"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Writes the [ENCODED_SIZE](Self::ENCODED_SIZE) bytes of the options.
    ///
    /// | field        | type | meaning                                |
    /// |--------------|------|----------------------------------------|
    /// | region size  | u32  | 0 when the image is not split          |
    /// | transform    | u8   | 0 none, 1 haar, 2 db4, 3 bior 2,2      |
    /// | has levels   | u8   | 1 when the level count is bounded      |
    /// | levels       | u32  |                                        |
    /// | q factor     | i16  |                                        |
    /// | q alpha      | i16  |                                        |
    /// | q beta       | i16  |                                        |
    /// | coding       | u8   | 0 lzw                                  |
    /// | code size    | u8   |                                        |
    /// | coding flags | u8   | bit 0 dynamic code size, bit 1 flush   |
    pub fn write_to<W: Write>(&self, writer: &mut ByteWriter<W, LittleEndian>) -> io::Result<()> {
        writer.write::<u32>(self.region_size.unwrap_or(0))?;

        let (tag, params) = match self.transform {
            Transform::None => (0, None),
            Transform::Wavelet(params) => (params.wavelet.tag(), Some(params)),
        };
        writer.write::<u8>(tag)?;
        let iterations = params.and_then(|params| params.iterations);
        writer.write::<u8>(iterations.is_some() as u8)?;
        writer.write::<u32>(iterations.unwrap_or(0))?;
        writer.write::<i16>(params.map_or(0, |params| params.q_factor))?;
        writer.write::<i16>(params.map_or(0, |params| params.q_alpha))?;
        writer.write::<i16>(params.map_or(0, |params| params.q_beta))?;

        match self.coding {
            Coding::Lzw { code_size, options } => {
                writer.write::<u8>(0)?;
                writer.write::<u8>(code_size)?;
                writer.write::<u8>(options.bits())?;
            }
        }

        Ok(())
    }

    /// Reads options written by [write_to](Self::write_to).
    ///
    /// # Errors
    ///
    /// Fails with [Error::InvalidHeader] on unknown tags or when the input is too short.
    pub fn read_from<R: Read>(reader: &mut ByteReader<R, LittleEndian>) -> Result<Self> {
        let region_size = match reader.read::<u32>().map_err(short_read)? {
            0 => None,
            size => Some(size),
        };

        let tag = reader.read::<u8>().map_err(short_read)?;
        let has_iterations = reader.read::<u8>().map_err(short_read)?;
        let iterations = reader.read::<u32>().map_err(short_read)?;
        let q_factor = reader.read::<i16>().map_err(short_read)?;
        let q_alpha = reader.read::<i16>().map_err(short_read)?;
        let q_beta = reader.read::<i16>().map_err(short_read)?;

        let iterations = match has_iterations {
            0 => None,
            1 => Some(iterations),
            _ => return Err(Error::InvalidHeader("invalid level count flag")),
        };
        let transform = match tag {
            0 => Transform::None,
            tag => {
                let wavelet =
                    Wavelet::from_tag(tag).ok_or(Error::InvalidHeader("unknown transform"))?;
                Transform::Wavelet(WaveletParams {
                    wavelet,
                    iterations,
                    q_factor,
                    q_alpha,
                    q_beta,
                })
            }
        };

        let coding_tag = reader.read::<u8>().map_err(short_read)?;
        let code_size = reader.read::<u8>().map_err(short_read)?;
        let flags = reader.read::<u8>().map_err(short_read)?;
        let coding = match coding_tag {
            0 => Coding::Lzw {
                code_size,
                options: LzwOptions::from_known_bits(flags)
                    .ok_or(Error::InvalidHeader("unknown coding flags"))?,
            },
            _ => return Err(Error::InvalidHeader("unknown coding")),
        };

        Ok(Self {
            region_size,
            transform,
            coding,
        })
    }
}

/// Input ending in the middle of the header is a header error, anything else is I/O.
pub(crate) fn short_read(error: io::Error) -> Error {
    if error.kind() == io::ErrorKind::UnexpectedEof {
        Error::InvalidHeader("unexpected end of file")
    } else {
        Error::Io(error)
    }
}
