//! Bounds-checked sequential reads over an in-memory byte region.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::Error;

/// Cursor over a byte slice for sequential parsing.
///
/// Every read either returns exactly the requested number of bytes or fails
/// with [`Error::TruncatedInput`], so the offset never passes the end.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the region.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn truncated(&self, requested: usize) -> Error {
        Error::TruncatedInput {
            requested,
            remaining: self.remaining(),
        }
    }

    /// Reads the next `n` bytes.
    pub fn read(&mut self, n: usize) -> Result<&'a [u8], Error> {
        if n > self.remaining() {
            return Err(self.truncated(n));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Reads a NUL-terminated UTF-8 string and moves past the terminator.
    pub fn read_cstring(&mut self) -> Result<String, Error> {
        let rest = &self.data[self.pos..];
        let len = rest.iter().position(|&b| b == 0).ok_or_else(|| {
            Error::MalformedString(format!(
                "no NUL terminator within {} bytes at offset {}",
                rest.len(),
                self.pos
            ))
        })?;
        let s = std::str::from_utf8(&rest[..len]).map_err(|e| {
            Error::MalformedString(format!("invalid UTF-8 at offset {}: {}", self.pos, e))
        })?;
        self.pos += len + 1;
        Ok(s.to_string())
    }

    /// Returns the next byte without advancing.
    pub fn peek(&self) -> Result<u8, Error> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.truncated(1))
    }

    /// Skips `n` bytes.
    pub fn advance(&mut self, n: usize) -> Result<(), Error> {
        self.read(n).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.read(1)?[0])
    }

    pub fn read_i32_le(&mut self) -> Result<i32, Error> {
        Ok(LittleEndian::read_i32(self.read(4)?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64, Error> {
        Ok(LittleEndian::read_u64(self.read(8)?))
    }
}
