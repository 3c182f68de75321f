// Bounds-checked big-endian reader over a capture body

use crate::core::error::{PnmError, Result};

/// Forward-only reader that tracks its offset and refuses to read past the end.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_bytes(&mut self, len: usize, context: &'static str) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(PnmError::TruncatedPayload {
                context,
                expected: len,
                actual: self.remaining(),
            });
        }
        let out = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(out)
    }

    /// Split off the next `len` bytes as an independent cursor.
    pub fn sub_cursor(&mut self, len: usize, context: &'static str) -> Result<ByteCursor<'a>> {
        self.read_bytes(len, context).map(ByteCursor::new)
    }

    pub fn read_array<const N: usize>(&mut self, context: &'static str) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N, context)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&mut self, context: &'static str) -> Result<u8> {
        Ok(self.read_array::<1>(context)?[0])
    }

    pub fn read_u16(&mut self, context: &'static str) -> Result<u16> {
        self.read_array(context).map(u16::from_be_bytes)
    }

    pub fn read_i16(&mut self, context: &'static str) -> Result<i16> {
        self.read_array(context).map(i16::from_be_bytes)
    }

    pub fn read_u32(&mut self, context: &'static str) -> Result<u32> {
        self.read_array(context).map(u32::from_be_bytes)
    }

    /// Read a `u32` byte-length field and check it against the element width.
    pub fn read_length(&mut self, field: &'static str, width: usize) -> Result<usize> {
        let length = self.read_u32(field)? as usize;
        if length % width != 0 {
            return Err(PnmError::MisalignedLength {
                field,
                length,
                width,
            });
        }
        Ok(length)
    }

    pub fn rest(&mut self) -> &'a [u8] {
        let out = &self.data[self.offset..];
        self.offset = self.data.len();
        out
    }
}
