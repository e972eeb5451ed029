//! Bounds-checked sequential reads over a raw frame
//!
//! Every parser in this crate goes through [`ByteCursor`] instead of
//! indexing into the buffer directly. Multi-byte fields in the HCI wire
//! format are little-endian, so reads use `byteorder` to keep the layout
//! explicit at each call site.

use crate::error::DecodeError;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

/// Sequential reader over one frame's bytes.
///
/// Each operation checks the remaining length before reading. A failed
/// read exhausts the cursor, so later reads cannot resume mid-field.
#[derive(Debug)]
pub struct ByteCursor<'a> {
    inner: Cursor<&'a [u8]>,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            inner: Cursor::new(data),
        }
    }

    /// Bytes left between the current offset and the end of the buffer
    pub fn remaining(&self) -> usize {
        let data = *self.inner.get_ref();
        data.len().saturating_sub(self.inner.position() as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn exhaust(&mut self) {
        let len = self.inner.get_ref().len();
        self.inner.set_position(len as u64);
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        match self.inner.read_u8() {
            Ok(value) => Ok(value),
            Err(_) => {
                self.exhaust();
                Err(DecodeError::TruncatedFrame)
            }
        }
    }

    pub fn read_i8(&mut self) -> Result<i8, DecodeError> {
        self.read_u8().map(|value| value as i8)
    }

    pub fn read_u16_le(&mut self) -> Result<u16, DecodeError> {
        match self.inner.read_u16::<LittleEndian>() {
            Ok(value) => Ok(value),
            Err(_) => {
                self.exhaust();
                Err(DecodeError::TruncatedFrame)
            }
        }
    }

    /// Borrow the next `n` bytes and advance past them
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let data = *self.inner.get_ref();
        let start = self.inner.position() as usize;
        let Some(end) = start.checked_add(n) else {
            self.exhaust();
            return Err(DecodeError::TruncatedFrame);
        };
        if end > data.len() {
            self.exhaust();
            return Err(DecodeError::TruncatedFrame);
        }
        self.inner.set_position(end as u64);
        Ok(&data[start..end])
    }

    /// Read a fixed-size array, used for 6-byte device addresses
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        self.read_bytes(n).map(|_| ())
    }
}
