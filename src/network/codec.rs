//! Line codec for the chat protocol.
//!
//! Splits input on `\n` and decodes each line lossily, so bytes that are not
//! valid UTF-8 become U+FFFD instead of a decoder error. An over-long line is
//! yielded as [`Frame::TooLong`] and the rest of it is discarded up to the
//! next newline. `FramedRead` treats any decoder error as the end of the
//! stream, so neither condition may surface as one.

use bytes::{Buf, BufMut, BytesMut};
use std::cmp;
use tokio_util::codec::{Decoder, Encoder, LinesCodecError};

/// One decoded unit of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A complete line, without its terminator (and without a trailing `\r`).
    Line(String),
    /// A line that exceeded the configured maximum length.
    TooLong,
}

#[derive(Debug, Clone)]
pub struct ChatCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length, excluding the `\n`
    max_length: usize,
    /// Dropping the tail of an over-long line
    is_discarding: bool,
}

impl ChatCodec {
    /// Codec that accepts lines of at most `max_length` bytes.
    pub fn new(max_length: usize) -> Self {
        Self {
            next_index: 0,
            max_length,
            is_discarding: false,
        }
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

impl Decoder for ChatCodec {
    type Item = Frame;
    type Error = LinesCodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, LinesCodecError> {
        loop {
            // Never scan further than one byte past the limit
            let read_to = cmp::min(self.max_length.saturating_add(1), src.len());
            let newline = src[self.next_index..read_to]
                .iter()
                .position(|b| *b == b'\n');

            match (self.is_discarding, newline) {
                (true, Some(offset)) => {
                    src.advance(self.next_index + offset + 1);
                    self.next_index = 0;
                    self.is_discarding = false;
                }
                (true, None) => {
                    src.advance(read_to);
                    self.next_index = 0;
                    if src.is_empty() {
                        return Ok(None);
                    }
                }
                (false, Some(offset)) => {
                    let end = self.next_index + offset;
                    self.next_index = 0;
                    let line = src.split_to(end + 1);
                    return Ok(Some(Frame::Line(decode_line(&line[..end]))));
                }
                (false, None) if src.len() > self.max_length => {
                    self.is_discarding = true;
                    return Ok(Some(Frame::TooLong));
                }
                (false, None) => {
                    self.next_index = read_to;
                    return Ok(None);
                }
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, LinesCodecError> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        // Unterminated final line
        self.next_index = 0;
        if src.is_empty() || src[..] == b"\r"[..] {
            src.clear();
            return Ok(None);
        }
        let line = src.split_to(src.len());
        Ok(Some(Frame::Line(decode_line(&line))))
    }
}

impl Encoder<String> for ChatCodec {
    type Error = LinesCodecError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<(), LinesCodecError> {
        dst.reserve(line.len() + 1);
        dst.put_slice(line.as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}
