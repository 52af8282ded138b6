//! Contains the dictionary decoder.

use std::io::{Read, Write};

use log::debug;
use thiserror::Error;

use crate::{io::BitReader, is_valid_code_size, CodeState, Options, END_OF_INPUT};

/// The error type for decoding operations.
#[derive(Debug, Error)]
pub enum DecodingError {
    /// An I/O error happened when reading or writing data.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Code size out of bounds. It should be between 9 and 16 included.
    #[error("code size must be between 9 and 16, was {0}")]
    CodeSize(u8),
    /// The stream ended before the end of input code.
    #[error("truncated stream: not enough bits left for the next code")]
    Truncated,
    /// A code point that the dictionary does not contain yet. Either the data is corrupted,
    /// or it was encoded with other options.
    #[error("unknown code point {code}, the table holds {table_size} entries")]
    UnknownCode { code: u16, table_size: usize },
}

/// A dictionary entry, stored as a link to its prefix.
#[derive(Debug, Clone, Copy)]
struct Entry {
    k: u8,
    first: u8,
    /// Length of the sequence minus one.
    depth: u16,
    parent: Option<u16>,
}

impl Entry {
    fn root(k: u8) -> Self {
        Self {
            k,
            first: k,
            depth: 0,
            parent: None,
        }
    }
}

struct Table {
    entries: Vec<Entry>,
    buffer: Vec<u8>,
}

impl Table {
    fn new(max_code_size: u8) -> Self {
        Self {
            entries: Vec::with_capacity(1 << max_code_size),
            buffer: Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.entries.clear();
        self.entries.extend((0..=255).map(Entry::root));
        // End of input, never resolved.
        self.entries.push(Entry::root(0));
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline(always)]
    fn first_byte(&self, code: u16) -> u8 {
        self.entries[code as usize].first
    }

    fn add(&mut self, prefix: u16, k: u8) {
        let parent = self.entries[prefix as usize];
        self.entries.push(Entry {
            k,
            first: parent.first,
            depth: parent.depth + 1,
            parent: Some(prefix),
        });
    }

    /// Writes the sequence of `code`, walking the prefix links backward.
    fn write_word<W: Write>(&mut self, code: u16, write: &mut W) -> Result<(), std::io::Error> {
        let depth = self.entries[code as usize].depth as usize;
        self.buffer.resize(depth + 1, 0);

        let mut next = Some(code);
        let mut position = depth + 1;
        while let Some(index) = next {
            let entry = &self.entries[index as usize];
            position -= 1;
            self.buffer[position] = entry.k;
            next = entry.parent;
        }

        write.write_all(&self.buffer)
    }
}

/// LZW decoder, the mirror of [Encoder](crate::encoder::Encoder).
///
/// It must be created with the code size and options used for encoding, nothing about them
/// is stored in the stream.
pub struct Decoder {
    code_size: u8,
    options: Options,
    table: Table,
    state: CodeState,
}

impl Decoder {
    /// Creates a decoder.
    ///
    /// # Errors
    ///
    /// Fails with [DecodingError::CodeSize] if the code size is not between 9 and 16.
    pub fn new(code_size: u8, options: Options) -> Result<Self, DecodingError> {
        if !is_valid_code_size(code_size) {
            return Err(DecodingError::CodeSize(code_size));
        }

        Ok(Self {
            code_size,
            options,
            table: Table::new(code_size),
            state: CodeState::new(code_size, options),
        })
    }

    pub fn code_size(&self) -> u8 {
        self.code_size
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// Decompresses `data` into `into`, up to and including the end of input code.
    ///
    /// Bytes are written as soon as they are decoded: on error, `into` holds whatever was
    /// decoded until then.
    ///
    /// # Errors
    ///
    /// Besides [std::io::Error], fails with [DecodingError::Truncated] when the data ends
    /// before the end of input code, and with [DecodingError::UnknownCode] when a code does
    /// not match any dictionary entry.
    pub fn decode<R: Read, W: Write>(&mut self, data: R, into: W) -> Result<(), DecodingError> {
        let mut bit_reader = BitReader::new(data);
        let mut into = into;

        self.table.reset();
        self.state.reset();

        let mut previous: Option<u16> = None;
        // Code point reserved for the entry that the next code completes.
        let mut pending: Option<u16> = None;

        loop {
            let code = bit_reader
                .read(self.state.size())?
                .ok_or(DecodingError::Truncated)?;

            if code == END_OF_INPUT {
                break;
            }

            let table_size = self.table.len() + pending.is_some() as usize;
            if code as usize >= table_size {
                return Err(DecodingError::UnknownCode { code, table_size });
            }

            if let (Some(previous), Some(slot)) = (previous, pending) {
                // The code may refer to the entry it completes: previous + its first byte.
                let first = if code == slot {
                    self.table.first_byte(previous)
                } else {
                    self.table.first_byte(code)
                };
                self.table.add(previous, first);
            }

            self.table.write_word(code, &mut into)?;

            pending = self.state.assign();
            previous = Some(code);

            if self.state.should_flush() {
                debug!(
                    "lzw: dictionary full at {} entries, flushing",
                    self.table.len()
                );
                self.table.reset();
                self.state.reset();
                pending = None;
                previous = None;
            }
        }

        into.flush()?;

        Ok(())
    }

    /// Decompresses `data`.
    /// Convenient wrapper that creates a [Vec<u8>] under the hood.
    pub fn decode_to_vec<R: Read>(&mut self, data: R) -> Result<Vec<u8>, DecodingError> {
        let mut output = vec![];
        self.decode(data, &mut output)?;
        Ok(output)
    }
}
