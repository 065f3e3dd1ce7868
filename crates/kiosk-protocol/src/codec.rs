//! Tokio codec for the kiosk serial line protocol.
//!
//! The serial link is read with short timeouts, so a single read may hold
//! half a line, several lines, or nothing at all. [`SerialLineCodec`]
//! accumulates bytes until a newline completes a line, then classifies it
//! with [`SerialEvent::from_line`].
//!
//! # Framing
//!
//! ```text
//! bytes -> split on '\n' -> strip '\r'/NUL -> skip empty -> SerialEvent
//! DeviceCommand -> [byte, '\n'] -> bytes
//! ```
//!
//! # Line Noise Protection
//!
//! A line that grows past the configured maximum length without a newline
//! is dropped along with everything up to the next newline. The codec never
//! fails on content; malformed lines surface as `InvalidInput` events.
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use tokio_util::codec::Decoder;
//! use kiosk_protocol::{SerialEvent, SerialLineCodec};
//!
//! let mut codec = SerialLineCodec::new();
//! let mut buffer = BytesMut::from(&b"m:2"[..]);
//! assert!(codec.decode(&mut buffer).unwrap().is_none());
//!
//! buffer.extend_from_slice(b"5\r\n");
//! let event = codec.decode(&mut buffer).unwrap();
//! assert_eq!(event, Some(SerialEvent::MoneyDeposited(25)));
//! ```

use std::io;

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use kiosk_core::constants::{LINE_TERMINATOR, MAX_LINE_LENGTH};

use crate::{DeviceCommand, SerialEvent};

/// Line codec decoding [`SerialEvent`]s and encoding [`DeviceCommand`]s.
#[derive(Debug)]
pub struct SerialLineCodec {
    /// Maximum line length in bytes, terminator excluded.
    max_line_length: usize,

    /// Index in the buffer already scanned for a terminator.
    next_index: usize,

    /// Dropping an overlong line until the next terminator.
    discarding: bool,
}

impl SerialLineCodec {
    /// Create a codec with the default maximum line length.
    pub fn new() -> Self {
        Self::with_max_line_length(MAX_LINE_LENGTH)
    }

    /// Create a codec with a custom maximum line length.
    ///
    /// # Arguments
    ///
    /// * `max_line_length` - Longest line kept, in bytes
    pub fn with_max_line_length(max_line_length: usize) -> Self {
        Self {
            max_line_length,
            next_index: 0,
            discarding: false,
        }
    }

    /// Get the current maximum line length.
    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    fn reset(&mut self) {
        self.next_index = 0;
        self.discarding = false;
    }
}

impl Default for SerialLineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for SerialLineCodec {
    type Item = SerialEvent;
    type Error = io::Error;

    /// Decode the next event from the byte stream.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(event))` - A complete, non-empty line was classified
    /// - `Ok(None)` - Need more data (empty lines are consumed silently)
    fn decode(&mut self, src: &mut BytesMut) -> io::Result<Option<SerialEvent>> {
        loop {
            let terminator = src[self.next_index..]
                .iter()
                .position(|b| *b == LINE_TERMINATOR);

            match (self.discarding, terminator) {
                (true, Some(offset)) => {
                    src.advance(self.next_index + offset + 1);
                    self.reset();
                }
                (true, None) => {
                    src.clear();
                    self.next_index = 0;
                    return Ok(None);
                }
                (false, Some(offset)) => {
                    let end = self.next_index + offset;
                    self.next_index = 0;

                    let line = src.split_to(end + 1);
                    if end > self.max_line_length {
                        warn!(len = end, "Serial line exceeds maximum length, discarding");
                        continue;
                    }

                    let text = String::from_utf8_lossy(&line[..end]);
                    if let Some(event) = SerialEvent::from_line(&text) {
                        return Ok(Some(event));
                    }
                }
                (false, None) if src.len() > self.max_line_length => {
                    warn!(
                        len = src.len(),
                        "Serial line exceeds maximum length, discarding"
                    );
                    src.clear();
                    self.next_index = 0;
                    self.discarding = true;
                    return Ok(None);
                }
                (false, None) => {
                    self.next_index = src.len();
                    return Ok(None);
                }
            }
        }
    }

    /// Decode at end of stream, treating an unterminated tail as a line.
    fn decode_eof(&mut self, src: &mut BytesMut) -> io::Result<Option<SerialEvent>> {
        if let Some(event) = self.decode(src)? {
            return Ok(Some(event));
        }

        if self.discarding || src.is_empty() {
            src.clear();
            self.reset();
            return Ok(None);
        }

        let tail = src.split();
        self.reset();
        Ok(SerialEvent::from_line(&String::from_utf8_lossy(&tail)))
    }
}

impl Encoder<DeviceCommand> for SerialLineCodec {
    type Error = io::Error;

    fn encode(&mut self, item: DeviceCommand, dst: &mut BytesMut) -> io::Result<()> {
        dst.extend_from_slice(&item.to_line());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_core::TokenId;

    fn decode_all(codec: &mut SerialLineCodec, buffer: &mut BytesMut) -> Vec<SerialEvent> {
        let mut events = Vec::new();
        while let Some(event) = codec.decode(buffer).unwrap() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_codec_new() {
        let codec = SerialLineCodec::new();
        assert_eq!(codec.max_line_length(), MAX_LINE_LENGTH);
    }

    #[test]
    fn test_decode_complete_line() {
        let mut codec = SerialLineCodec::new();
        let mut buffer = BytesMut::from(&b"i:ab12\n"[..]);

        let event = codec.decode(&mut buffer).unwrap();
        assert_eq!(
            event,
            Some(SerialEvent::TokenScanned(TokenId::new("AB12").unwrap()))
        );
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_decode_partial_line() {
        let mut codec = SerialLineCodec::new();
        let mut buffer = BytesMut::from(&b"i:AB"[..]);

        assert!(codec.decode(&mut buffer).unwrap().is_none());
        assert_eq!(buffer.len(), 4);

        buffer.extend_from_slice(b"12\r\n");
        let event = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(event.to_string(), "i:AB12");
    }

    #[test]
    fn test_decode_multiple_lines_in_buffer() {
        let mut codec = SerialLineCodec::new();
        let mut buffer = BytesMut::from(&b"m:25\nm:25\ni:CAFE\n"[..]);

        let events = decode_all(&mut codec, &mut buffer);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], SerialEvent::MoneyDeposited(25));
        assert_eq!(events[1], SerialEvent::MoneyDeposited(25));
        assert_eq!(events[2].kind(), "token_scanned");
    }

    #[test]
    fn test_decode_skips_empty_lines() {
        let mut codec = SerialLineCodec::new();
        let mut buffer = BytesMut::from(&b"\n\r\n\n\0\nm:1\n"[..]);

        let events = decode_all(&mut codec, &mut buffer);
        assert_eq!(events, vec![SerialEvent::MoneyDeposited(1)]);
    }

    #[test]
    fn test_decode_empty_buffer() {
        let mut codec = SerialLineCodec::new();
        let mut buffer = BytesMut::new();
        assert!(codec.decode(&mut buffer).unwrap().is_none());
    }

    #[test]
    fn test_decode_malformed_amount_is_invalid_input() {
        let mut codec = SerialLineCodec::new();
        let mut buffer = BytesMut::from(&b"m:ten\n"[..]);

        let event = codec.decode(&mut buffer).unwrap();
        assert_eq!(event, Some(SerialEvent::InvalidInput("m:ten".to_string())));
    }

    #[test]
    fn test_decode_invalid_utf8_is_invalid_input() {
        let mut codec = SerialLineCodec::new();
        let mut buffer = BytesMut::from(&b"\xff\xfe\n"[..]);

        let event = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(event.kind(), "invalid_input");
    }

    #[test]
    fn test_decode_overlong_line_is_discarded() {
        let mut codec = SerialLineCodec::with_max_line_length(8);
        let mut buffer = BytesMut::from(&b"xxxxxxxxxxxxxxxx"[..]);

        assert!(codec.decode(&mut buffer).unwrap().is_none());
        assert!(buffer.is_empty());

        // Rest of the overlong line, then a good one
        buffer.extend_from_slice(b"yyyy\nm:5\n");
        let event = codec.decode(&mut buffer).unwrap();
        assert_eq!(event, Some(SerialEvent::MoneyDeposited(5)));
    }

    #[test]
    fn test_decode_overlong_terminated_line_is_discarded() {
        let mut codec = SerialLineCodec::with_max_line_length(4);
        let mut buffer = BytesMut::from(&b"i:ABCDEF\nm:2\n"[..]);

        let events = decode_all(&mut codec, &mut buffer);
        assert_eq!(events, vec![SerialEvent::MoneyDeposited(2)]);
    }

    #[test]
    fn test_decode_eof_flushes_unterminated_tail() {
        let mut codec = SerialLineCodec::new();
        let mut buffer = BytesMut::from(&b"m:3"[..]);

        assert!(codec.decode(&mut buffer).unwrap().is_none());
        let event = codec.decode_eof(&mut buffer).unwrap();
        assert_eq!(event, Some(SerialEvent::MoneyDeposited(3)));
        assert!(codec.decode_eof(&mut buffer).unwrap().is_none());
    }

    #[test]
    fn test_encode_commands() {
        let mut codec = SerialLineCodec::new();
        let mut buffer = BytesMut::new();

        codec.encode(DeviceCommand::Arm, &mut buffer).unwrap();
        codec.encode(DeviceCommand::Heartbeat, &mut buffer).unwrap();
        codec.encode(DeviceCommand::LogoutSignal, &mut buffer).unwrap();

        assert_eq!(&buffer[..], b"a\nh\nl\n");
    }
}
