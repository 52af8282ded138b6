//! Adaptive LZW encoder and decoder.
//!
//! This crate provides an [Encoder](encoder::Encoder) and a [Decoder](decoder::Decoder)
//! working on raw bytes. The dictionary starts with the 256 single byte sequences and a
//! reserved end of input code, then grows by one entry for every code written.
//!
//! Codes are packed least significant bit first with no gap between them, only the last byte
//! of a stream is padded. Nothing about the dictionary is transmitted: both sides replay the
//! same growth rules, so they must be configured with identical [Options] and code size.
//!
//! It works with any [std::io::Read] and [std::io::Write].
//!
//! # Examples
//!
//! ```
//! use wavelzw_lzw::{decoder::Decoder, encoder::Encoder, Options};
//!
//! let data = b"TOBEORNOTTOBEORTOBEORNOT";
//!
//! let mut encoder = Encoder::new(12, Options::default()).unwrap();
//! let compressed = encoder.encode_to_vec(&data[..]).unwrap();
//!
//! let mut decoder = Decoder::new(12, Options::default()).unwrap();
//! let decompressed = decoder.decode_to_vec(&compressed[..]).unwrap();
//!
//! assert_eq!(decompressed, data);
//! ```

pub mod decoder;
pub mod encoder;
mod io;

/// Code written once all the input has been consumed. Never assigned to a sequence.
pub const END_OF_INPUT: u16 = 256;
/// First code point available for multi byte sequences.
pub const FIRST_CODE: u16 = 257;
/// Smallest supported maximum code size: the initial table alone needs 9 bits.
pub const MIN_CODE_SIZE: u8 = 9;
/// Largest supported maximum code size.
pub const MAX_CODE_SIZE: u8 = 16;
pub const DEFAULT_CODE_SIZE: u8 = 12;

const INITIAL_DYNAMIC_SIZE: u8 = 9;

/// Coding flags, shared by the encoder and the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Start writing codes with 9 bits and grow up to the maximum code size.
    /// When disabled, every code is written with the maximum code size.
    pub dynamic_code_size: bool,
    /// Reset the dictionary as soon as the last code point is assigned.
    /// When disabled, a full dictionary is frozen for the rest of the stream.
    pub flush_full_dictionary: bool,
}

impl Options {
    const DYNAMIC_CODE_SIZE: u8 = 1 << 0;
    const FLUSH_FULL_DICTIONARY: u8 = 1 << 1;

    /// Packs the flags in a single byte.
    pub const fn bits(&self) -> u8 {
        let mut bits = 0;
        if self.dynamic_code_size {
            bits |= Self::DYNAMIC_CODE_SIZE;
        }
        if self.flush_full_dictionary {
            bits |= Self::FLUSH_FULL_DICTIONARY;
        }
        bits
    }

    /// Unpacks flags written by [Options::bits]. Unknown bits are ignored.
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            dynamic_code_size: bits & Self::DYNAMIC_CODE_SIZE != 0,
            flush_full_dictionary: bits & Self::FLUSH_FULL_DICTIONARY != 0,
        }
    }

    /// Like [Options::from_bits], but returns `None` if any unknown bit is set.
    pub const fn from_known_bits(bits: u8) -> Option<Self> {
        if bits & !(Self::DYNAMIC_CODE_SIZE | Self::FLUSH_FULL_DICTIONARY) != 0 {
            None
        } else {
            Some(Self::from_bits(bits))
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            dynamic_code_size: true,
            flush_full_dictionary: true,
        }
    }
}

pub(crate) const fn is_valid_code_size(code_size: u8) -> bool {
    code_size >= MIN_CODE_SIZE && code_size <= MAX_CODE_SIZE
}

/// Code size and code point bookkeeping.
///
/// The encoder assigns one code point for every code it writes, the decoder reserves one for
/// every code it reads. Both drive the very same state machine, which is how they agree on
/// code sizes, on table fullness and on flushes without any signaling in the stream.
#[derive(Debug, Clone)]
pub(crate) struct CodeState {
    max_size: u8,
    options: Options,
    size: u8,
    next_code: Option<u16>,
}

impl CodeState {
    pub fn new(max_size: u8, options: Options) -> Self {
        let mut state = Self {
            max_size,
            options,
            size: max_size,
            next_code: Some(FIRST_CODE),
        };
        state.reset();
        state
    }

    pub fn reset(&mut self) {
        self.size = if self.options.dynamic_code_size {
            INITIAL_DYNAMIC_SIZE
        } else {
            self.max_size
        };
        self.next_code = Some(FIRST_CODE);
    }

    /// Current width of codes, in bits.
    #[inline(always)]
    pub fn size(&self) -> u8 {
        self.size
    }

    /// Assigns the next free code point, growing the code size when the following one
    /// would not fit anymore. Returns `None` once the table is full.
    #[inline(always)]
    pub fn assign(&mut self) -> Option<u16> {
        let code = self.next_code?;
        let max_code = ((1u32 << self.max_size) - 1) as u16;

        if code == max_code {
            self.next_code = None;
            if !self.options.flush_full_dictionary {
                log::debug!("lzw: dictionary frozen at {} bits", self.size);
            }
        } else {
            let next = code + 1;
            self.next_code = Some(next);

            if self.options.dynamic_code_size
                && self.size < self.max_size
                && next as u32 == 1u32 << self.size
            {
                self.size += 1;
            }
        }

        Some(code)
    }

    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.next_code.is_none()
    }

    /// True when the table is full and the options ask for a reset.
    #[inline(always)]
    pub fn should_flush(&self) -> bool {
        self.is_full() && self.options.flush_full_dictionary
    }
}
