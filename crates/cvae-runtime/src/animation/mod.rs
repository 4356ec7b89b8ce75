//! Paced multi-frame sequences.
//!
//! An animation is started from an [`AnimationRequest`] and consumed in one of three ways:
//! * pulled frame by frame as a [`FrameStream`] iterator,
//! * pushed into an [`OutStream`] with [`FrameStream::drive`],
//! * run on a worker thread, frames arriving on a [`JobHandle`] channel.
//!
//! Every style honours the same [`CancelToken`] and [`AnimationConfig`] pacing.
mod config;
mod job;
mod stream;
mod streaming;

pub use config::{AnimationConfig, DEFAULT_FRAME_COUNT, DEFAULT_FRAME_DELAY, DEFAULT_WALK_RATE};
pub use job::JobHandle;
pub use stream::{AnimationRequest, FrameStream, MotionKind};
pub use streaming::{
    CallbackEmitter, CancelToken, ChannelEmitter, CollectEmitter, EmitControl, EmitError, Emitter,
    OutStream,
};
