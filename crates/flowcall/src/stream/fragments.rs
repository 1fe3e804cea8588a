use futures::stream::{FusedStream, Stream, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::{debug, warn};

use super::decode::{decode_frame, is_done_sentinel};
use super::extract::extract_delta;
use super::frame::{Framer, FramingMode};
use crate::errors::{ProtocolViolation, WorkflowResult};
use crate::transport::ChunkStream;

enum State {
    AwaitingChunk,
    HasBufferedFrames {
        frames: VecDeque<String>,
        upstream_done: bool,
    },
    Exhausted,
    Failed,
}

/// Text fragments of a streamed workflow response, in arrival order.
///
/// Single pass and pull driven: the underlying chunk stream is only polled once every frame
/// of the previous chunk has been consumed. Malformed frames are logged and skipped. A transport
/// failure or an event without choices ends the stream after yielding the error.
pub struct FragmentStream {
    chunks: ChunkStream,
    framer: Framer,
    state: State,
    dropped_frames: usize,
}

impl FragmentStream {
    pub fn new(chunks: ChunkStream, framing: FramingMode) -> Self {
        Self {
            chunks,
            framer: Framer::new(framing),
            state: State::AwaitingChunk,
            dropped_frames: 0,
        }
    }

    /// Number of frames skipped so far because they were not valid JSON
    pub fn dropped_frames(&self) -> usize {
        self.dropped_frames
    }
}

fn next_fragment(
    frames: &mut VecDeque<String>,
    dropped_frames: &mut usize,
) -> Option<Result<String, ProtocolViolation>> {
    while let Some(frame) = frames.pop_front() {
        if is_done_sentinel(&frame) {
            debug!("Skipping end of stream sentinel");
            continue;
        }
        match decode_frame(&frame) {
            Ok(chunk) => return Some(extract_delta(&chunk).map(String::from)),
            Err(err) => {
                *dropped_frames += 1;
                warn!(frame = %err.frame, error = %err.source, "Dropping malformed stream frame");
            }
        }
    }
    None
}

impl Stream for FragmentStream {
    type Item = WorkflowResult<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        loop {
            match &mut this.state {
                State::Exhausted | State::Failed => return Poll::Ready(None),
                State::HasBufferedFrames {
                    frames,
                    upstream_done,
                } => {
                    let upstream_done = *upstream_done;
                    match next_fragment(frames, &mut this.dropped_frames) {
                        Some(Ok(text)) => return Poll::Ready(Some(Ok(text))),
                        Some(Err(violation)) => {
                            this.state = State::Failed;
                            return Poll::Ready(Some(Err(violation.into())));
                        }
                        None if upstream_done => this.state = State::Exhausted,
                        None => this.state = State::AwaitingChunk,
                    }
                }
                State::AwaitingChunk => match this.chunks.poll_next_unpin(cx) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(Some(Ok(chunk))) => {
                        this.state = State::HasBufferedFrames {
                            frames: this.framer.push(&chunk).into(),
                            upstream_done: false,
                        };
                    }
                    Poll::Ready(Some(Err(err))) => {
                        this.state = State::Failed;
                        return Poll::Ready(Some(Err(err.into())));
                    }
                    Poll::Ready(None) => {
                        this.state = State::HasBufferedFrames {
                            frames: this.framer.finish().into(),
                            upstream_done: true,
                        };
                    }
                },
            }
        }
    }
}

impl FusedStream for FragmentStream {
    fn is_terminated(&self) -> bool {
        matches!(self.state, State::Exhausted | State::Failed)
    }
}
