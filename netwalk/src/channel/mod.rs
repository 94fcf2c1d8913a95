//! Driving a device shell: expect-style prompt waits over a transcript
//! that keeps every line the device printed, escape codes removed.

mod buffer;
mod patterns;
mod pty;

pub use buffer::Transcript;
pub use patterns::{SessionPatterns, literal};
pub use pty::{PtyChannel, PtyConfig};
