use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Literal header prefix, including the single space after the colon.
pub const HEADER_PREFIX: &[u8] = b"Content-Length: ";

/// Blank line that ends the header.
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Maximum number of decimal digits in the length field.
pub const MAX_LENGTH_DIGITS: usize = 7;

/// Longest possible header: prefix + 7 digits + terminator = 27 bytes.
pub const MAX_HEADER_LEN: usize = HEADER_PREFIX.len() + MAX_LENGTH_DIGITS + HEADER_TERMINATOR.len();

/// Largest body a 7-digit length can declare.
pub const MAX_BODY_LEN: usize = 9_999_999;

/// A fully parsed message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderInfo {
    /// Header length in bytes, terminator included.
    pub header_len: usize,
    /// Declared body length in bytes.
    pub body_len: usize,
}

impl HeaderInfo {
    /// Total wire size of the message (header + body).
    pub fn message_len(&self) -> usize {
        self.header_len + self.body_len
    }
}

/// Encode a message body into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────────────────────┬──────────────┬────────────────────┐
/// │ "Content-Length: " + digits  │ "\r\n\r\n"   │ Body               │
/// │ (1-7 ASCII digits)           │              │ (Length bytes)     │
/// └──────────────────────────────┴──────────────┴────────────────────┘
/// ```
pub fn encode_message(body: &[u8], dst: &mut BytesMut) -> Result<()> {
    if body.len() > MAX_BODY_LEN {
        return Err(FrameError::BodyTooLarge {
            size: body.len(),
            max: MAX_BODY_LEN,
        });
    }
    let length = body.len().to_string();
    dst.reserve(HEADER_PREFIX.len() + length.len() + HEADER_TERMINATOR.len() + body.len());
    dst.put_slice(HEADER_PREFIX);
    dst.put_slice(length.as_bytes());
    dst.put_slice(HEADER_TERMINATOR);
    dst.put_slice(body);
    Ok(())
}

/// Inspect the start of `src` for a message header.
///
/// Returns `Ok(None)` while the bytes seen so far are a valid prefix of a
/// header, and fails as soon as a byte cannot continue one.
pub fn scan_header(src: &[u8]) -> Result<Option<HeaderInfo>> {
    let prefix_len = HEADER_PREFIX.len();
    let seen = src.len().min(prefix_len);
    if src[..seen] != HEADER_PREFIX[..seen] {
        return Err(invalid_header(src, "expected \"Content-Length: \""));
    }
    if src.len() < prefix_len {
        return Ok(None);
    }

    let digits = src[prefix_len..]
        .iter()
        .take(MAX_LENGTH_DIGITS + 1)
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits > MAX_LENGTH_DIGITS {
        return Err(invalid_header(src, "length has more than 7 digits"));
    }
    let digits_end = prefix_len + digits;
    if digits_end == src.len() {
        return Ok(None);
    }
    if digits == 0 {
        return Err(invalid_header(src, "length is not a decimal number"));
    }

    let rest = &src[digits_end..];
    let seen = rest.len().min(HEADER_TERMINATOR.len());
    if rest[..seen] != HEADER_TERMINATOR[..seen] {
        return Err(invalid_header(src, "expected CRLF CRLF after length"));
    }
    if rest.len() < HEADER_TERMINATOR.len() {
        return Ok(None);
    }

    let body_len = std::str::from_utf8(&src[prefix_len..digits_end])
        .ok()
        .and_then(|digits| digits.parse::<usize>().ok())
        .ok_or_else(|| invalid_header(src, "length is not a decimal number"))?;

    Ok(Some(HeaderInfo {
        header_len: digits_end + HEADER_TERMINATOR.len(),
        body_len,
    }))
}

/// Decode one message body from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete message yet.
/// On success, consumes the message bytes from the buffer.
pub fn decode_message(src: &mut BytesMut, max_body: usize) -> Result<Option<Bytes>> {
    let header = match scan_header(src)? {
        Some(header) => header,
        None => return Ok(None),
    };

    if header.body_len > max_body {
        return Err(FrameError::BodyTooLarge {
            size: header.body_len,
            max: max_body,
        });
    }

    if src.len() < header.message_len() {
        return Ok(None);
    }

    src.advance(header.header_len);
    Ok(Some(src.split_to(header.body_len).freeze()))
}

fn invalid_header(src: &[u8], reason: &str) -> FrameError {
    let shown = &src[..src.len().min(MAX_HEADER_LEN)];
    FrameError::InvalidHeader(format!("{reason} (got \"{}\")", shown.escape_ascii()))
}

/// Configuration for the message codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum body size in bytes. Default: 9,999,999.
    pub max_body_size: usize,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_body_size: MAX_BODY_LEN,
            read_timeout: None,
            write_timeout: None,
        }
    }
}
