//! Wialon IPS text protocol.
//!
//! Frames look like `#TYPE#field;field;...;CRC16\r\n`. Login (`L`), short
//! position (`SD`) and extended position (`D`) frames are validated field by
//! field and answered with `#AL#`, `#ASD#` or `#AD#` status replies.

mod handler;
mod parser;
mod types;
pub mod validators;

#[cfg(test)]
mod tests;

pub use handler::WialonCodec;
pub use parser::{RawFrame, ValidatedPosition, login_check, parse_frame, position_check};
pub use types::{FRAME_SEPARATOR, FieldError, FrameKind, ReplyCode};
