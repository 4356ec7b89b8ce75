//! Model sessions and paced animations on top of `cvae-core`.
//!
//! The flow is:
//! 1. Point a [`ModelSession`] at a `manifest.json` and [`load`](ModelSession::load) it
//!    with a [`DecoderLoader`].
//! 2. Call [`ModelSession::generate_one`] for a single frame.
//! 3. Start a [`FrameStream`] with [`ModelSession::animate_free_walk`] or
//!    [`ModelSession::animate_interpolate`], or hand it to a worker with
//!    [`ModelSession::spawn_animation`].
//! 4. Stop early through the [`CancelToken`] you passed in or [`JobHandle::cancel`].
//!
//! [`BurnDecoder`] is a ready-made decoder backed by a small burn MLP.
mod animation;
mod burn_decoder;
mod error;
mod host;
mod loader;
mod manifest;
mod session;


pub use animation::*;
pub use burn_decoder::{
    BurnDecoder, BurnDecoderLoader, MlpDecoder, MlpDecoderConfig, config_path, save_decoder,
};
pub use error::RuntimeError;
pub use host::{DecoderAccessor, DecoderHost};
pub use loader::DecoderLoader;
pub use manifest::Manifest;
pub use session::{ModelSession, SessionBuilder};

pub use cvae_core;
