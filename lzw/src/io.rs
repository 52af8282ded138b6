use std::io::{ErrorKind, Read, Write};

/// Accumulates variable width codes, least significant bit first, and emits
/// every completed byte to the underlying writer.
///
/// Codes are packed back to back. The only alignment happens in [fill](BitWriter::fill),
/// which pads the last partial byte with zero bits.
pub(crate) struct BitWriter<W>
where
    W: Write,
{
    write: W,
    filled: u8,
    block: u64,
}

impl<W> BitWriter<W>
where
    W: Write,
{
    pub fn new(write: W) -> Self {
        Self {
            write,
            filled: 0,
            block: 0,
        }
    }

    #[inline]
    pub fn write(&mut self, data: u16, amount: u8) -> Result<(), std::io::Error> {
        let mask = (1u64 << amount) - 1;
        self.block |= (data as u64 & mask) << self.filled;
        self.filled += amount;

        while self.filled >= 8 {
            let byte = self.block as u8;
            self.block >>= 8;
            self.filled -= 8;

            self.write.write_all(&[byte])?;
        }

        Ok(())
    }

    #[inline]
    pub fn fill(&mut self) -> Result<(), std::io::Error> {
        if self.filled > 0 {
            self.write.write_all(&[self.block as u8])?;
            self.block = 0;
            self.filled = 0;
        }

        Ok(())
    }

    #[inline]
    pub fn flush(&mut self) -> Result<(), std::io::Error> {
        self.write.flush()
    }
}

/// Mirror of [BitWriter]: pulls bytes on demand and hands out codes of the
/// requested width, least significant bit first.
pub(crate) struct BitReader<R>
where
    R: Read,
{
    read: R,
    filled: u8,
    block: u64,
    read_buffer: [u8; 1],
}

impl<R> BitReader<R>
where
    R: Read,
{
    pub fn new(read: R) -> Self {
        Self {
            read,
            filled: 0,
            block: 0,
            read_buffer: [0; 1],
        }
    }

    /// Reads one code of `amount` bits.
    ///
    /// Returns `Ok(None)` when the input ends before a full code is available.
    #[inline]
    pub fn read(&mut self, amount: u8) -> Result<Option<u16>, std::io::Error> {
        while self.filled < amount {
            match self.read.read(&mut self.read_buffer[..]) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.block |= (self.read_buffer[0] as u64) << self.filled;
                    self.filled += 8;
                }
                Err(error) if error.kind() == ErrorKind::Interrupted => continue,
                Err(error) => return Err(error),
            }
        }

        let mask = (1u64 << amount) - 1;
        let data = (self.block & mask) as u16;
        self.block >>= amount;
        self.filled -= amount;
        Ok(Some(data))
    }
}
