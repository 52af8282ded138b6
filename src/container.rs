//! The compressed image file: a fixed size header followed by the LZW payload.
//!
//! | field          | type     |
//! |----------------|----------|
//! | magic          | 8 bytes  |
//! | options        | 19 bytes |
//! | width          | u32      |
//! | height         | u32      |
//! | payload length | u64      |
//! | payload        | bytes    |
//!
//! Every integer is little endian.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use bitstream_io::{ByteRead, ByteReader, ByteWrite, ByteWriter, LittleEndian};

use crate::{
    options::{short_read, CompressionOptions},
    Error, Result,
};

pub const MAGIC: [u8; 8] = *b"WVLZIMG1";
pub const HEADER_SIZE: usize = MAGIC.len() + CompressionOptions::ENCODED_SIZE + 4 + 4 + 8;

/// A compressed image, as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub options: CompressionOptions,
    pub width: u32,
    pub height: u32,
    pub payload: Vec<u8>,
}

impl CompressedImage {
    /// Size of the file this image is written to.
    pub fn file_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    pub fn write_to<W: Write>(&self, mut into: W) -> Result<()> {
        let mut writer = ByteWriter::endian(&mut into, LittleEndian);
        writer.write_bytes(&MAGIC)?;
        self.options.write_to(&mut writer)?;
        writer.write::<u32>(self.width)?;
        writer.write::<u32>(self.height)?;
        writer.write::<u64>(self.payload.len() as u64)?;
        writer.write_bytes(&self.payload)?;
        into.flush()?;
        Ok(())
    }

    /// Reads a whole compressed image.
    ///
    /// # Errors
    ///
    /// The magic bytes are checked before anything else. A bad magic, an unknown tag or a
    /// file shorter than what its header announces fail with [Error::InvalidHeader].
    pub fn read_from<R: Read>(mut from: R) -> Result<Self> {
        let mut reader = ByteReader::endian(&mut from, LittleEndian);

        let mut magic = [0; MAGIC.len()];
        reader.read_bytes(&mut magic).map_err(short_read)?;
        if magic != MAGIC {
            return Err(Error::InvalidHeader("not a compressed image"));
        }

        let options = CompressionOptions::read_from(&mut reader)?;
        options.validate()?;
        let width = reader.read::<u32>().map_err(short_read)?;
        let height = reader.read::<u32>().map_err(short_read)?;
        let payload_len = reader.read::<u64>().map_err(short_read)?;
        log::debug!("header: {width}x{height}, {payload_len} payload bytes, {options:?}");

        let mut payload = Vec::new();
        from.take(payload_len).read_to_end(&mut payload)?;
        if payload.len() as u64 != payload_len {
            return Err(Error::InvalidHeader("payload is shorter than announced"));
        }

        Ok(Self {
            options,
            width,
            height,
            payload,
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.write_to(BufWriter::new(File::create(path)?))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::read_from(BufReader::new(File::open(path)?))
    }
}
