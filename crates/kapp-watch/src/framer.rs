//! Incremental JSON object framing
//!
//! Turns the raw bytes of a watch response into complete top-level JSON
//! object strings, regardless of where the transport cut its chunks.

use crate::error::WatchError;
use tracing::warn;

/// Default cap on a single buffered object (16 MiB)
pub const DEFAULT_MAX_OBJECT_BYTES: usize = 16 * 1024 * 1024;

/// Splits a growing response body into complete JSON object strings.
///
/// One framer serves one connection attempt; `reset` is called before a
/// reconnect so no state leaks between attempts.
pub trait ObjectFramer: Send {
    /// Feed newly arrived text, returning every object completed by it in
    /// arrival order.
    fn push(&mut self, chunk: &str) -> Result<Vec<String>, WatchError>;

    /// Drop all buffered state
    fn reset(&mut self);
}

/// Brace-depth tokenizer.
///
/// Tracks nesting depth, whether the cursor is inside a string and whether
/// the previous byte was an escape, so delimiters inside string values and
/// objects spanning several chunks are handled. Structural characters are
/// all ASCII, which makes scanning UTF-8 text byte-wise safe.
#[derive(Debug, Clone)]
pub struct JsonObjectFramer {
    pending: String,
    scanned: usize,
    start: Option<usize>,
    depth: usize,
    in_string: bool,
    escaped: bool,
    max_object_bytes: usize,
}

impl Default for JsonObjectFramer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_OBJECT_BYTES)
    }
}

impl JsonObjectFramer {
    /// Framer rejecting objects larger than `max_object_bytes`
    pub fn new(max_object_bytes: usize) -> Self {
        Self {
            pending: String::new(),
            scanned: 0,
            start: None,
            depth: 0,
            in_string: false,
            escaped: false,
            max_object_bytes,
        }
    }

    /// Bytes held for an object that has not been closed yet
    pub fn buffered_len(&self) -> usize {
        self.pending.len()
    }

    /// Drop everything before the current object (or everything, between
    /// objects) so memory tracks the largest object rather than the
    /// connection lifetime.
    fn compact(&mut self) {
        match self.start {
            None => {
                self.pending.clear();
                self.scanned = 0;
            }
            Some(0) => {}
            Some(start) => {
                self.pending.drain(..start);
                self.scanned -= start;
                self.start = Some(0);
            }
        }
    }
}

impl ObjectFramer for JsonObjectFramer {
    fn push(&mut self, chunk: &str) -> Result<Vec<String>, WatchError> {
        self.pending.push_str(chunk);

        let mut objects = Vec::new();
        let mut stray = 0usize;
        let mut oversized = None;
        let bytes = self.pending.as_bytes();

        for (i, &b) in bytes.iter().enumerate().skip(self.scanned) {
            if self.depth == 0 {
                match b {
                    b'{' => {
                        self.start = Some(i);
                        self.depth = 1;
                    }
                    b if b.is_ascii_whitespace() => {}
                    _ => stray += 1,
                }
                continue;
            }

            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if b == b'\\' {
                    self.escaped = true;
                } else if b == b'"' {
                    self.in_string = false;
                }
                continue;
            }

            match b {
                b'"' => self.in_string = true,
                b'{' => self.depth += 1,
                b'}' => {
                    self.depth -= 1;
                    if self.depth == 0 {
                        if let Some(start) = self.start.take() {
                            let size = i + 1 - start;
                            if size > self.max_object_bytes {
                                oversized = Some(size);
                                break;
                            }
                            objects.push(self.pending[start..=i].to_string());
                        }
                    }
                }
                _ => {}
            }
        }
        self.scanned = self.pending.len();

        if let Some(size) = oversized {
            self.reset();
            return Err(WatchError::ObjectTooLarge {
                size,
                limit: self.max_object_bytes,
            });
        }

        if stray > 0 {
            warn!("Discarded {} stray bytes between watch objects", stray);
        }

        self.compact();

        if self.start.is_some() && self.pending.len() > self.max_object_bytes {
            let size = self.pending.len();
            self.reset();
            return Err(WatchError::ObjectTooLarge {
                size,
                limit: self.max_object_bytes,
            });
        }

        Ok(objects)
    }

    fn reset(&mut self) {
        self.pending.clear();
        self.scanned = 0;
        self.start = None;
        self.depth = 0;
        self.in_string = false;
        self.escaped = false;
    }
}

/// Converts transport bytes to text without splitting multi-byte characters.
///
/// An incomplete UTF-8 sequence at the end of a chunk is carried into the
/// next one; invalid sequences become U+FFFD.
#[derive(Debug, Clone, Default)]
pub struct Utf8Decoder {
    carry: Vec<u8>,
}

impl Utf8Decoder {
    /// Empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk, prefixed by any bytes carried from the previous one
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut data = std::mem::take(&mut self.carry);
        data.extend_from_slice(chunk);

        let mut out = String::with_capacity(data.len());
        let mut rest = data.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            self.carry = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Drop any carried partial character
    pub fn reset(&mut self) {
        self.carry.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDED: &str = r#"{"type":"ADDED","object":{"a":1}}"#;
    const MODIFIED: &str = r#"{"type":"MODIFIED","object":{"a":2}}"#;

    #[test]
    fn test_multiple_objects_in_one_chunk() {
        let mut framer = JsonObjectFramer::default();
        let objects = framer.push(&format!("{ADDED}\n{MODIFIED}{ADDED}")).unwrap();
        assert_eq!(objects, vec![ADDED, MODIFIED, ADDED]);
        assert_eq!(framer.buffered_len(), 0);
    }

    #[test]
    fn test_object_split_across_chunks_waits_for_rest() {
        let mut framer = JsonObjectFramer::default();
        let (head, tail) = MODIFIED.split_at(17);

        assert!(framer.push(head).unwrap().is_empty());
        assert_eq!(framer.buffered_len(), head.len());
        assert_eq!(framer.push(tail).unwrap(), vec![MODIFIED]);
    }

    #[test]
    fn test_every_split_point_yields_the_same_objects() {
        let body = format!("{ADDED}\n{MODIFIED}\n");
        for cut in 0..=body.len() {
            let mut framer = JsonObjectFramer::default();
            let mut objects = framer.push(&body[..cut]).unwrap();
            objects.extend(framer.push(&body[cut..]).unwrap());
            assert_eq!(objects, vec![ADDED, MODIFIED], "cut at {cut}");
        }
    }

    #[test]
    fn test_delimiter_inside_string_is_not_a_boundary() {
        let tricky = r#"{"type":"ADDED","object":{"data":"a}\n{b","esc":"q\"}{"}}"#;
        let mut framer = JsonObjectFramer::default();
        assert_eq!(framer.push(tricky).unwrap(), vec![tricky]);
    }

    #[test]
    fn test_escaped_backslash_before_quote_closes_string() {
        let obj = r#"{"type":"ADDED","object":{"path":"C:\\"}}"#;
        let mut framer = JsonObjectFramer::default();
        assert_eq!(framer.push(obj).unwrap(), vec![obj]);
    }

    #[test]
    fn test_stray_bytes_are_skipped() {
        let mut framer = JsonObjectFramer::default();
        let objects = framer.push(&format!("garbage]{ADDED},\n{MODIFIED}")).unwrap();
        assert_eq!(objects, vec![ADDED, MODIFIED]);
    }

    #[test]
    fn test_oversized_object_is_rejected_and_state_reset() {
        let mut framer = JsonObjectFramer::new(16);
        let err = framer.push(r#"{"type":"ADDED","object":{"#).unwrap_err();
        assert!(matches!(err, WatchError::ObjectTooLarge { limit: 16, .. }));
        assert_eq!(framer.buffered_len(), 0);

        assert_eq!(framer.push("{}").unwrap(), vec!["{}"]);
    }

    #[test]
    fn test_oversized_complete_object_is_rejected() {
        let mut framer = JsonObjectFramer::new(16);
        let err = framer.push(&format!("{ADDED}\n")).unwrap_err();
        match err {
            WatchError::ObjectTooLarge { size, limit } => {
                assert_eq!(size, ADDED.len());
                assert_eq!(limit, 16);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(framer.buffered_len(), 0);
    }

    #[test]
    fn test_object_at_limit_is_accepted() {
        let mut framer = JsonObjectFramer::new(ADDED.len());
        assert_eq!(framer.push(ADDED).unwrap(), vec![ADDED]);
    }

    #[test]
    fn test_reset_discards_partial_object() {
        let mut framer = JsonObjectFramer::default();
        framer.push(r#"{"type":"ADDED","#).unwrap();
        framer.reset();
        assert_eq!(framer.push(ADDED).unwrap(), vec![ADDED]);
    }

    #[test]
    fn test_utf8_split_character_is_carried() {
        let text = "{\"name\":\"größe\"}";
        let bytes = text.as_bytes();
        // Cut inside the two-byte 'ö'
        let cut = text.find('ö').unwrap() + 1;

        let mut decoder = Utf8Decoder::new();
        let mut out = decoder.decode(&bytes[..cut]);
        out.push_str(&decoder.decode(&bytes[cut..]));
        assert_eq!(out, text);
    }

    #[test]
    fn test_utf8_invalid_bytes_are_replaced() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"a\xffb"), "a\u{fffd}b");
    }
}
