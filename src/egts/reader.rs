//! Bounds-checked little-endian cursor over a frame.

use super::types::ResultCode;

/// Reads past the end yield `INC_DATAFORM` instead of panicking.
pub(crate) struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub(crate) fn take(&mut self, len: usize) -> Result<&'a [u8], ResultCode> {
        let end = self.pos.checked_add(len).ok_or(ResultCode::IncorrectDataForm)?;
        let slice = self.buf.get(self.pos..end).ok_or(ResultCode::IncorrectDataForm)?;
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn skip(&mut self, len: usize) -> Result<(), ResultCode> {
        self.take(len).map(|_| ())
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, ResultCode> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16, ResultCode> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32, ResultCode> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}
