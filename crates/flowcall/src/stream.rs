pub mod decode;
pub mod extract;
pub mod fragments;
pub mod frame;

pub use decode::decode_frame;
pub use extract::{extract_delta, extract_final};
pub use fragments::FragmentStream;
pub use frame::{split_frames, Framer, FramingMode};
