//! Splitting the connection byte stream into protocol frames.
//!
//! The first non-newline byte decides the protocol: `#` starts a Wialon
//! line, anything else is treated as EGTS.

use crate::egts::{HEADER_LEN, PAYLOAD_CRC_LEN, PROTOCOL_VERSION, ROUTED_HEADER_LEN};
use crate::wialon::FRAME_SEPARATOR;

const TEXT_MARKER: u8 = b'#';

/// One complete frame taken off the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Wialon line without the `\r\n` terminator.
    Text(String),
    /// Raw EGTS frame, header through SFRCS.
    Binary(Vec<u8>),
}

/// Accumulates socket reads until whole frames are available.
#[derive(Debug)]
pub struct FrameBuffer {
    buf: Vec<u8>,
    max_frame_bytes: usize,
}

impl FrameBuffer {
    pub fn new(max_frame_bytes: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_frame_bytes,
        }
    }

    pub fn extend(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Buffered bytes exceed the frame limit without forming a frame.
    pub fn overflowed(&self) -> bool {
        self.buf.len() > self.max_frame_bytes
    }

    /// Drop everything buffered, returning the discarded byte count.
    pub fn clear(&mut self) -> usize {
        let len = self.buf.len();
        self.buf.clear();
        len
    }

    /// Take the next complete frame, or `None` if more bytes are needed.
    pub fn next_frame(&mut self) -> Option<Frame> {
        let skip = self.buf.iter().take_while(|&&b| b == b'\r' || b == b'\n').count();
        self.buf.drain(..skip);

        match *self.buf.first()? {
            TEXT_MARKER => self.next_line().map(Frame::Text),
            _ => self.next_binary().map(Frame::Binary),
        }
    }

    fn next_line(&mut self) -> Option<String> {
        let separator = FRAME_SEPARATOR.as_bytes();
        let end = self.buf.windows(separator.len()).position(|w| w == separator)?;

        let line = String::from_utf8_lossy(&self.buf[..end]).into_owned();
        self.buf.drain(..end + separator.len());
        Some(line)
    }

    fn next_binary(&mut self) -> Option<Vec<u8>> {
        if self.buf[0] != PROTOCOL_VERSION {
            return Some(self.take_all());
        }
        // Header length byte not here yet.
        let &header_len = self.buf.get(3)?;
        if header_len != HEADER_LEN && header_len != ROUTED_HEADER_LEN {
            return Some(self.take_all());
        }
        let fdl = self.buf.get(5..7).map(|b| usize::from(u16::from_le_bytes([b[0], b[1]])))?;

        let crc_len = if fdl > 0 { PAYLOAD_CRC_LEN } else { 0 };
        let total = usize::from(header_len) + fdl + crc_len;
        if total > self.max_frame_bytes {
            return Some(self.take_all());
        }
        if self.buf.len() < total {
            return None;
        }
        Some(self.buf.drain(..total).collect())
    }

    fn take_all(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }
}
