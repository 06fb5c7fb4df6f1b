//! A position-tracking big-endian byte reader.
//!
//! Built on `byteorder`'s primitive reads, wrapped to report the exact byte
//! offset of a truncated read, which a plain `io::Result` cannot do on its
//! own.

use byteorder::{ByteOrder, BE};

use crate::error::{ClassFormatError, ContextStack, FormatCause};

/// A read-only cursor over a borrowed byte slice. Never copies input bytes; callers decide when to
/// copy a borrowed slice into an owned `Vec<u8>`.
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Reader { data, pos: 0 }
    }

    pub fn position(&self) -> u64 {
        self.pos as u64
    }

    pub fn set_position(&mut self, pos: u64) {
        self.pos = pos as usize;
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn full_len(&self) -> usize {
        self.data.len()
    }

    fn take(&mut self, n: usize, ctx: &ContextStack) -> Result<&'a [u8], ClassFormatError> {
        if self.remaining() < n {
            return Err(ClassFormatError::new(
                self.position(),
                FormatCause::Truncated {
                    needed: n,
                    available: self.remaining(),
                },
                ctx,
            ));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn u8(&mut self, ctx: &ContextStack) -> Result<u8, ClassFormatError> {
        Ok(self.take(1, ctx)?[0])
    }

    pub fn i8(&mut self, ctx: &ContextStack) -> Result<i8, ClassFormatError> {
        Ok(self.take(1, ctx)?[0] as i8)
    }

    pub fn u16(&mut self, ctx: &ContextStack) -> Result<u16, ClassFormatError> {
        Ok(BE::read_u16(self.take(2, ctx)?))
    }

    pub fn i16(&mut self, ctx: &ContextStack) -> Result<i16, ClassFormatError> {
        Ok(BE::read_i16(self.take(2, ctx)?))
    }

    pub fn u32(&mut self, ctx: &ContextStack) -> Result<u32, ClassFormatError> {
        Ok(BE::read_u32(self.take(4, ctx)?))
    }

    pub fn i32(&mut self, ctx: &ContextStack) -> Result<i32, ClassFormatError> {
        Ok(BE::read_i32(self.take(4, ctx)?))
    }

    pub fn u64(&mut self, ctx: &ContextStack) -> Result<u64, ClassFormatError> {
        Ok(BE::read_u64(self.take(8, ctx)?))
    }

    pub fn i64(&mut self, ctx: &ContextStack) -> Result<i64, ClassFormatError> {
        Ok(BE::read_i64(self.take(8, ctx)?))
    }

    pub fn f32(&mut self, ctx: &ContextStack) -> Result<f32, ClassFormatError> {
        Ok(BE::read_f32(self.take(4, ctx)?))
    }

    pub fn f64(&mut self, ctx: &ContextStack) -> Result<f64, ClassFormatError> {
        Ok(BE::read_f64(self.take(8, ctx)?))
    }

    pub fn bytes(&mut self, n: usize, ctx: &ContextStack) -> Result<&'a [u8], ClassFormatError> {
        self.take(n, ctx)
    }

    pub fn owned_bytes(&mut self, n: usize, ctx: &ContextStack) -> Result<Vec<u8>, ClassFormatError> {
        Ok(self.take(n, ctx)?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_primitives() {
        let ctx = ContextStack::new();
        let mut r = Reader::new(&[0x01, 0x02, 0x00, 0x03]);
        assert_eq!(r.u16(&ctx).unwrap(), 0x0102);
        assert_eq!(r.u16(&ctx).unwrap(), 0x0003);
    }

    #[test]
    fn truncation_reports_position_and_sizes() {
        let ctx = ContextStack::new();
        let mut r = Reader::new(&[0x01]);
        let err = r.u16(&ctx).unwrap_err();
        assert_eq!(err.position, 0);
        assert_eq!(
            err.cause,
            FormatCause::Truncated {
                needed: 2,
                available: 1
            }
        );
    }
}
