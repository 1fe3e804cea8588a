use crate::errors::FrameParseError;
use crate::models::response::StreamChunk;

/// Sentinel some backends send as the last frame of a stream
pub const DONE_SENTINEL: &str = "[DONE]";

pub fn is_done_sentinel(frame: &str) -> bool {
    frame == DONE_SENTINEL
}

/// Parse one frame payload. A failure only concerns this frame.
pub fn decode_frame(frame: &str) -> Result<StreamChunk, FrameParseError> {
    serde_json::from_str(frame).map_err(|source| FrameParseError {
        frame: frame.to_string(),
        source,
    })
}
