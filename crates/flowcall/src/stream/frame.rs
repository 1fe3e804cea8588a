use serde::Deserialize;

use super::decode::{decode_frame, is_done_sentinel, DONE_SENTINEL};

const SEPARATOR: &str = "\n\ndata: ";
const PREFIX: &str = "data: ";
const BOUNDARY: &str = "\n\n";

/// Split one chunk of event-stream text into frame payloads.
///
/// Frames are separated by `"\n\ndata: "`. The first frame keeps its `"data: "` prefix after
/// the split, so a leading prefix is stripped from every piece. Pieces that are empty once
/// trimmed are dropped.
pub fn split_frames(chunk: &str) -> Vec<&str> {
    chunk
        .split(SEPARATOR)
        .map(payload)
        .filter(|frame| !frame.is_empty())
        .collect()
}

/// How frames relate to the chunks a transport delivers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FramingMode {
    /// Every chunk holds only whole frames; nothing is carried between chunks
    ChunkAligned,
    /// A trailing frame is held back only while it is still truncated
    #[default]
    Buffered,
}

/// Turns a sequence of chunks into frames according to a [`FramingMode`]
#[derive(Debug, Default)]
pub struct Framer {
    mode: FramingMode,
    pending: String,
}

impl Framer {
    pub fn new(mode: FramingMode) -> Self {
        Self {
            mode,
            pending: String::new(),
        }
    }

    pub fn mode(&self) -> FramingMode {
        self.mode
    }

    /// Feed one chunk and take every frame it completes
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        match self.mode {
            FramingMode::ChunkAligned => to_owned(split_frames(chunk)),
            FramingMode::Buffered => {
                let mut frames = Vec::new();
                // a chunk opening a new event closes whatever partial frame is held
                if chunk.trim_start().starts_with(PREFIX) && !self.pending.trim().is_empty() {
                    frames.extend(self.finish());
                }
                self.pending.push_str(chunk);

                // everything before the last blank line is complete
                if let Some(end) = self.pending.rfind(BOUNDARY) {
                    let complete: String = self.pending.drain(..end).collect();
                    frames.extend(to_owned(split_frames(&complete)));
                }

                let tail = payload(&self.pending);
                if is_whole(tail) {
                    frames.push(tail.to_string());
                    self.pending.clear();
                }
                frames
            }
        }
    }

    /// Flush whatever is still held once the chunk sequence has ended
    pub fn finish(&mut self) -> Vec<String> {
        let rest = std::mem::take(&mut self.pending);
        to_owned(split_frames(&rest))
    }
}

/// Leading whitespace and one `data: ` prefix removed, then trimmed
fn payload(piece: &str) -> &str {
    let piece = piece.trim_start();
    piece.strip_prefix(PREFIX).unwrap_or(piece).trim()
}

/// Whether a frame without a following boundary can be emitted now. Only input that ran out
/// mid-value (or mid-prefix) waits for more; anything else is final, malformed or not.
fn is_whole(frame: &str) -> bool {
    if is_done_sentinel(frame) {
        return true;
    }
    if frame.is_empty()
        || PREFIX.trim_end().starts_with(frame)
        || DONE_SENTINEL.starts_with(frame)
    {
        return false;
    }
    match decode_frame(frame) {
        Ok(_) => true,
        Err(err) => !err.source.is_eof(),
    }
}

fn to_owned(frames: Vec<&str>) -> Vec<String> {
    frames.into_iter().map(String::from).collect()
}
