use byteorder::{BigEndian, ByteOrder};

use crate::{ClassFileError, Result};

type Endian = BigEndian;

/// Big-endian reader over a borrowed class file buffer.
///
/// Every read goes through [`ByteCursor::read_bytes`], so running past the end of the
/// buffer always surfaces as [`ClassFileError::UnexpectedEndOfInput`].
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(Endian::read_u16(self.read_bytes(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(Endian::read_u32(self.read_bytes(4)?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(Endian::read_u64(self.read_bytes(8)?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(Endian::read_i32(self.read_bytes(4)?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(Endian::read_i64(self.read_bytes(8)?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(Endian::read_f32(self.read_bytes(4)?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(Endian::read_f64(self.read_bytes(8)?))
    }

    /// Reads `count` big-endian `u16`s, checking the whole run fits before allocating.
    pub fn read_u16_vec(&mut self, count: usize) -> Result<Vec<u16>> {
        let bytes = self.read_bytes(count * 2)?;
        let mut values = vec![0u16; count];
        Endian::read_u16_into(bytes, &mut values);
        Ok(values)
    }

    /// Allocates room for `count` records of at least `min_record_size` bytes each, failing
    /// first if the rest of the buffer could not possibly hold them.
    pub fn bounded_vec<T>(&self, count: usize, min_record_size: usize) -> Result<Vec<T>> {
        self.ensure(count.saturating_mul(min_record_size))?;
        Ok(Vec::with_capacity(count))
    }

    /// Fails unless at least `requested` bytes are left, without consuming anything.
    pub fn ensure(&self, requested: usize) -> Result<()> {
        let remaining = self.remaining();
        if requested > remaining {
            return Err(ClassFileError::UnexpectedEndOfInput {
                requested,
                remaining,
            });
        }
        Ok(())
    }
}
