//! Delimiter-based object splitting
//!
//! The watch body is a run of JSON objects written back to back, with
//! `}\n{` between consecutive objects. [`ProgressDecoder`] reproduces the
//! heuristic the dashboard has always used: remember how much of the
//! cumulative response text was already consumed, split the first slice of
//! a connection on `}\n{`, and treat every later slice as exactly one
//! object.
//!
//! The heuristic cannot cope with an object split across two reads, nor with
//! `}\n{` inside a string value. [`crate::framer::JsonObjectFramer`] handles
//! both and is the default; this decoder stays available as
//! [`crate::config::Framing::Delimited`].

use crate::error::WatchError;
use crate::framer::ObjectFramer;
use tracing::warn;

/// Separator between consecutive objects on the wire
pub const OBJECT_DELIMITER: &str = "}\n{";

/// Split a slice on `}\n{` and repair each fragment into standalone JSON.
///
/// The first fragment gets its closing `}` back, the last its opening `{`,
/// and fragments in between get both. A slice without the delimiter is
/// returned as-is.
pub fn split_boundary_candidates(slice: &str) -> Vec<String> {
    let fragments: Vec<&str> = slice.split(OBJECT_DELIMITER).collect();
    let last = fragments.len() - 1;
    if last == 0 {
        return vec![slice.to_string()];
    }

    fragments
        .iter()
        .enumerate()
        .map(|(i, fragment)| match i {
            0 => format!("{fragment}}}"),
            i if i == last => format!("{{{fragment}"),
            _ => format!("{{{fragment}}}"),
        })
        .collect()
}

/// Offset-tracking decoder over the cumulative response text of one
/// connection.
#[derive(Debug, Clone, Default)]
pub struct ProgressDecoder {
    last_index: usize,
}

impl ProgressDecoder {
    /// Fresh decoder for a new connection
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes of the response already attributed to emitted candidates
    pub fn last_index(&self) -> usize {
        self.last_index
    }

    /// Forget all progress, as on reconnect
    pub fn reset(&mut self) {
        self.last_index = 0;
    }

    /// Handle a progress notification carrying the full response text so far.
    ///
    /// Returns the boundary candidates found in the newly arrived suffix. A
    /// notification without new data returns nothing and leaves the offset
    /// untouched.
    pub fn on_progress(&mut self, full_text: &str) -> Vec<String> {
        let current_index = full_text.len();
        if current_index == self.last_index {
            return Vec::new();
        }

        if current_index < self.last_index {
            warn!(
                "Response text shrank from {} to {} bytes; restarting from the beginning",
                self.last_index, current_index
            );
            self.last_index = 0;
        }

        let Some(slice) = full_text.get(self.last_index..current_index) else {
            warn!(
                "Progress offset {} is not a character boundary; waiting for more data",
                self.last_index
            );
            return Vec::new();
        };

        let candidates = if self.last_index == 0 {
            split_boundary_candidates(slice)
        } else {
            vec![slice.to_string()]
        };

        self.last_index = current_index;
        candidates
    }
}

/// [`ObjectFramer`] running [`ProgressDecoder`] over an owned, append-only
/// response buffer.
#[derive(Debug, Clone, Default)]
pub struct DelimitedFramer {
    buffer: String,
    decoder: ProgressDecoder,
}

impl DelimitedFramer {
    /// Empty framer
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset reached by the inner decoder
    pub fn last_index(&self) -> usize {
        self.decoder.last_index()
    }
}

impl ObjectFramer for DelimitedFramer {
    fn push(&mut self, chunk: &str) -> Result<Vec<String>, WatchError> {
        self.buffer.push_str(chunk);
        Ok(self.decoder.on_progress(&self.buffer))
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.decoder.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{decode_event, WatchEventType};
    use serde_json::{json, Value};

    const ADDED: &str = r#"{"type":"ADDED","object":{"a":1}}"#;
    const MODIFIED: &str = r#"{"type":"MODIFIED","object":{"a":2}}"#;

    fn decode_all(candidates: &[String]) -> Vec<(WatchEventType, Value)> {
        candidates
            .iter()
            .map(|c| {
                let event = decode_event::<Value>(c).expect("candidate should be valid JSON");
                (event.event_type, event.object)
            })
            .collect()
    }

    #[test]
    fn test_single_object_first_chunk() {
        let mut decoder = ProgressDecoder::new();
        let candidates = decoder.on_progress(ADDED);

        assert_eq!(candidates, vec![ADDED.to_string()]);
        assert_eq!(decode_all(&candidates), vec![(WatchEventType::Added, json!({"a": 1}))]);
        assert_eq!(decoder.last_index(), ADDED.len());
    }

    #[test]
    fn test_multi_object_first_chunk() {
        let mut decoder = ProgressDecoder::new();
        let candidates = decoder.on_progress(&format!("{ADDED}\n{MODIFIED}"));

        assert_eq!(candidates, vec![ADDED.to_string(), MODIFIED.to_string()]);
        assert_eq!(
            decode_all(&candidates),
            vec![
                (WatchEventType::Added, json!({"a": 1})),
                (WatchEventType::Modified, json!({"a": 2})),
            ]
        );
    }

    #[test]
    fn test_stale_progress_is_a_no_op() {
        let mut decoder = ProgressDecoder::new();
        decoder.on_progress(ADDED);
        let before = decoder.last_index();

        assert!(decoder.on_progress(ADDED).is_empty());
        assert_eq!(decoder.last_index(), before);
    }

    #[test]
    fn test_empty_first_progress_is_a_no_op() {
        let mut decoder = ProgressDecoder::new();
        assert!(decoder.on_progress("").is_empty());
        assert_eq!(decoder.last_index(), 0);
    }

    #[test]
    fn test_single_object_subsequent_chunk() {
        let mut decoder = ProgressDecoder::new();
        let mut full = ADDED.to_string();
        decoder.on_progress(&full);

        full.push_str(MODIFIED);
        let candidates = decoder.on_progress(&full);

        assert_eq!(candidates, vec![MODIFIED.to_string()]);
        assert_eq!(decoder.last_index(), full.len());
    }

    #[test]
    fn test_offset_inside_character_is_kept() {
        let mut decoder = ProgressDecoder::new();
        assert_eq!(decoder.on_progress("é"), vec!["é".to_string()]);
        assert_eq!(decoder.last_index(), 2);

        // Byte 2 falls inside 'é' here; nothing is emitted and nothing skipped
        assert!(decoder.on_progress("aé").is_empty());
        assert_eq!(decoder.last_index(), 2);

        assert_eq!(decoder.on_progress("éx"), vec!["x".to_string()]);
        assert_eq!(decoder.last_index(), 3);
    }

    #[test]
    fn test_reset_treats_next_data_as_first_chunk() {
        let mut decoder = ProgressDecoder::new();
        let big = format!("{ADDED}\n{MODIFIED}\n{ADDED}");
        decoder.on_progress(&big);
        assert_eq!(decoder.last_index(), big.len());

        decoder.reset();
        assert_eq!(decoder.last_index(), 0);

        let candidates = decoder.on_progress(&format!("{MODIFIED}\n{ADDED}"));
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_round_trip_many_objects() {
        let events: Vec<(WatchEventType, Value)> = (0..25)
            .map(|i| {
                let t = match i % 3 {
                    0 => WatchEventType::Added,
                    1 => WatchEventType::Modified,
                    _ => WatchEventType::Deleted,
                };
                (t, json!({"metadata": {"name": format!("node-{i}")}, "spec": {"n": i}}))
            })
            .collect();

        let body = events
            .iter()
            .map(|(t, o)| json!({"type": t, "object": o}).to_string())
            .collect::<Vec<_>>()
            .join("\n");

        let candidates = ProgressDecoder::new().on_progress(&body);
        assert_eq!(decode_all(&candidates), events);
    }

    #[test]
    fn test_split_middle_fragments_are_wrapped() {
        let candidates = split_boundary_candidates("{\"x\":1}\n{\"y\":2}\n{\"z\":3}");
        assert_eq!(candidates, vec!["{\"x\":1}", "{\"y\":2}", "{\"z\":3}"]);
    }

    #[test]
    fn test_delimited_framer_feeds_cumulative_buffer() {
        let mut framer = DelimitedFramer::new();
        let first = framer.push(&format!("{ADDED}\n{MODIFIED}")).unwrap();
        assert_eq!(first.len(), 2);

        let second = framer.push(ADDED).unwrap();
        assert_eq!(second, vec![ADDED.to_string()]);

        framer.reset();
        assert_eq!(framer.last_index(), 0);
        assert_eq!(framer.push(MODIFIED).unwrap(), vec![MODIFIED.to_string()]);
    }
}
