//! Contains the dictionary encoder.

use std::io::{Read, Write};

use log::debug;
use thiserror::Error;

use crate::{io::BitWriter, is_valid_code_size, CodeState, Options, END_OF_INPUT};

/// The error type for encoding operations.
///
/// Encapsulate [std::io::Error] and expose LZW code size issues.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// An I/O error happened when reading or writing data.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Code size out of bounds. It should be between 9 and 16 included.
    #[error("code size must be between 9 and 16, was {0}")]
    CodeSize(u8),
}

/// Most entries of the dictionary end up with zero or one child, only a few short prefixes
/// branch a lot. The enum avoids allocating a full child table for the common cases, the
/// table is only allocated once a second child shows up.
#[derive(Debug, Clone)]
enum Node {
    NoChild,
    OneChild(u8, u16),
    ManyChildren(Box<[u16; 256]>),
}

/// Trie of the byte sequences known to the encoder. The index of a node is its code point.
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn new(max_code_size: u8) -> Self {
        Self {
            nodes: Vec::with_capacity(1 << max_code_size),
        }
    }

    #[inline(always)]
    fn reset(&mut self) {
        self.nodes.clear();
        // The single bytes, plus a placeholder so that the end of input code never matches.
        self.nodes.resize(END_OF_INPUT as usize + 1, Node::NoChild);
    }

    #[inline(always)]
    fn find_word(&self, prefix_index: u16, next_char: u8) -> Option<u16> {
        match &self.nodes[prefix_index as usize] {
            Node::NoChild => None,
            &Node::OneChild(child_char, child_index) => {
                (child_char == next_char).then_some(child_index)
            }
            Node::ManyChildren(children) => {
                let child_index = children[next_char as usize];
                (child_index > 0).then_some(child_index)
            }
        }
    }

    /// Inserts `prefix + k` and returns its code point, the length of the table before insertion.
    #[inline(always)]
    fn add(&mut self, prefix_index: u16, k: u8) -> u16 {
        let new_index = self.nodes.len() as u16;
        let node = &mut self.nodes[prefix_index as usize];

        match node {
            Node::NoChild => {
                *node = Node::OneChild(k, new_index);
            }
            &mut Node::OneChild(other_k, other_index) => {
                let mut children = Box::new([0; 256]);
                children[other_k as usize] = other_index;
                children[k as usize] = new_index;
                *node = Node::ManyChildren(children);
            }
            Node::ManyChildren(children) => {
                children[k as usize] = new_index;
            }
        };
        self.nodes.push(Node::NoChild);
        new_index
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// LZW encoder with a growing dictionary.
///
/// The dictionary and its scratch storage are kept between calls to [Encoder::encode], each
/// call still starts a brand new stream.
pub struct Encoder {
    code_size: u8,
    options: Options,
    tree: Tree,
    state: CodeState,
}

impl Encoder {
    /// Creates an encoder.
    ///
    /// # Arguments
    ///
    /// * `code_size` - Between 9 and 16, the maximum width of a code. It bounds the
    ///   dictionary to 2.pow(code_size) entries.
    /// * `options` - Dynamic code size and flush flags. They must match the decoder's.
    ///
    /// # Errors
    ///
    /// Fails with [EncodingError::CodeSize] if the code size is out of bounds.
    pub fn new(code_size: u8, options: Options) -> Result<Self, EncodingError> {
        if !is_valid_code_size(code_size) {
            return Err(EncodingError::CodeSize(code_size));
        }

        Ok(Self {
            code_size,
            options,
            tree: Tree::new(code_size),
            state: CodeState::new(code_size, options),
        })
    }

    pub fn code_size(&self) -> u8 {
        self.code_size
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// Compresses `data` into `into`.
    ///
    /// # Errors
    ///
    /// This function can only fail on an [std::io::Error].
    ///
    /// # Examples
    /// ```
    /// use wavelzw_lzw::{encoder::{EncodingError, Encoder}, Options};
    ///
    /// fn main() -> Result<(), EncodingError> {
    ///     let data = [0x41, 0x42];
    ///     let mut output = vec![];
    ///
    ///     let mut encoder = Encoder::new(12, Options::default())?;
    ///     encoder.encode(&data[..], &mut output)?;
    ///
    ///     assert_eq!(output, [0x41, 0x84, 0x00, 0x04]);
    ///     Ok(())
    /// }
    /// ```
    pub fn encode<R: Read, W: Write>(&mut self, data: R, into: W) -> Result<(), EncodingError> {
        let mut bit_writer = BitWriter::new(into);

        self.tree.reset();
        self.state.reset();

        let mut bytes = data.bytes();
        let mut current_prefix = match bytes.next() {
            Some(k) => k? as u16,
            None => {
                // Empty stream, only the end of input code.
                bit_writer.write(END_OF_INPUT, self.state.size())?;
                bit_writer.fill()?;
                bit_writer.flush()?;
                return Ok(());
            }
        };

        for k in bytes {
            let k = k?;

            if let Some(word) = self.tree.find_word(current_prefix, k) {
                current_prefix = word;
            } else {
                bit_writer.write(current_prefix, self.state.size())?;

                if let Some(code) = self.state.assign() {
                    let index = self.tree.add(current_prefix, k);
                    debug_assert_eq!(index, code);
                }
                self.flush_if_full();

                current_prefix = k as u16;
            }
        }

        bit_writer.write(current_prefix, self.state.size())?;
        // The decoder reserves a code point for every data code, the last one included,
        // so the end of input code must be written with the width that follows it.
        self.state.assign();
        self.flush_if_full();

        bit_writer.write(END_OF_INPUT, self.state.size())?;
        bit_writer.fill()?;
        bit_writer.flush()?;

        debug!(
            "lzw: encoded stream, {} dictionary entries, final code size {}",
            self.tree.len(),
            self.state.size()
        );

        Ok(())
    }

    /// Compresses `data`.
    /// Convenient wrapper that creates a [Vec<u8>] under the hood.
    ///
    /// # Errors
    ///
    /// This function can only fail on an [std::io::Error].
    pub fn encode_to_vec<R: Read>(&mut self, data: R) -> Result<Vec<u8>, EncodingError> {
        let mut output = vec![];
        self.encode(data, &mut output)?;
        Ok(output)
    }

    #[inline(always)]
    fn flush_if_full(&mut self) {
        if self.state.should_flush() {
            debug!("lzw: dictionary full at {} entries, flushing", self.tree.len());
            self.tree.reset();
            self.state.reset();
        }
    }
}
