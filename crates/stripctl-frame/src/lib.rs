//! Length-prefixed message framing for the stripctl protocol.
//!
//! Every message is framed as:
//! - An ASCII header `Content-Length: <1-7 digits>`
//! - A blank-line terminator `\r\n\r\n`
//! - Exactly `Content-Length` body bytes
//!
//! Readers and writers absorb partial reads and writes; callers always see
//! complete message bodies.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_message, encode_message, scan_header, FrameConfig, HeaderInfo, HEADER_PREFIX,
    HEADER_TERMINATOR, MAX_BODY_LEN, MAX_HEADER_LEN,
};
pub use error::{FrameError, Result};
pub use reader::MessageReader;
pub use writer::MessageWriter;
