use super::config::AnimationConfig;
use super::streaming::{CancelToken, OutStream};
use crate::error::RuntimeError;
use crate::session::{Loaded, ModelSession};
use cvae_core::{Frame, LabelVector, LatentSampler, LatentVector};
use std::iter::FusedIterator;

/// How the conditioning inputs evolve from one frame to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum MotionKind {
    /// Fixed label, latent drifting toward fresh random targets.
    FreeWalk,
    /// Fixed latent, label morphing into the next class of the alphabet.
    Interpolate,
}

/// Everything needed to start an animation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationRequest {
    pub kind: MotionKind,
    pub label: String,
    /// Starting latent; sampled when `None`.
    pub latent: Option<LatentVector>,
}

impl AnimationRequest {
    pub fn free_walk(label: impl Into<String>) -> Self {
        Self {
            kind: MotionKind::FreeWalk,
            label: label.into(),
            latent: None,
        }
    }

    pub fn interpolate(label: impl Into<String>) -> Self {
        Self {
            kind: MotionKind::Interpolate,
            label: label.into(),
            latent: None,
        }
    }

    pub fn with_latent(mut self, latent: LatentVector) -> Self {
        self.latent = Some(latent);
        self
    }
}

#[derive(Debug, Clone, Copy)]
enum Motion {
    FreeWalk { cursor: usize },
    Interpolate { from: usize, to: usize },
}

/// Lazily produced, paced sequence of animation frames.
///
/// Yields at most `frame_count` items and is not restartable. The first error
/// (decoder failure, encoding failure or cancellation) is yielded once and
/// ends the stream.
pub struct FrameStream<'a> {
    session: &'a ModelSession,
    loaded: &'a Loaded,
    kind: MotionKind,
    motion: Motion,
    sampler: LatentSampler,
    latent: LatentVector,
    config: AnimationConfig,
    cancel: CancelToken,
    index: usize,
    finished: bool,
}

impl<'a> FrameStream<'a> {
    pub(crate) fn start(
        session: &'a ModelSession,
        loaded: &'a Loaded,
        request: &AnimationRequest,
        cancel: CancelToken,
    ) -> Result<Self, RuntimeError> {
        let cursor = loaded.registry.require(&request.label)?;
        let mut sampler = session.fork_sampler();
        let latent = request.latent.unwrap_or_else(|| sampler.sample());
        let motion = match request.kind {
            MotionKind::FreeWalk => Motion::FreeWalk { cursor },
            MotionKind::Interpolate => Motion::Interpolate {
                from: cursor,
                to: loaded.registry.next_index(cursor),
            },
        };
        let config = *session.config();
        log::info!(
            "Starting {} animation for '{}' ({} frames, {:?} apart)",
            request.kind,
            request.label,
            config.frame_count,
            config.frame_delay
        );

        Ok(Self {
            session,
            loaded,
            kind: request.kind,
            motion,
            sampler,
            latent,
            config,
            cancel,
            index: 0,
            finished: false,
        })
    }

    pub fn kind(&self) -> MotionKind {
        self.kind
    }

    /// Frames yielded so far.
    pub fn delivered(&self) -> usize {
        self.index
    }

    pub fn remaining(&self) -> usize {
        if self.finished {
            0
        } else {
            self.config.frame_count.saturating_sub(self.index)
        }
    }

    /// Pushes every frame into `out`. Returns the number of frames delivered.
    ///
    /// An emitter that refuses a frame stops the animation with [`RuntimeError::Cancelled`].
    pub fn drive(self, out: &OutStream<Frame>) -> Result<usize, RuntimeError> {
        let mut delivered = 0;
        for frame in self {
            let frame = frame?;
            if let Err(e) = out.emit(frame) {
                log::debug!("Emitter refused frame: {e}");
                return Err(RuntimeError::Cancelled);
            }
            delivered += 1;
        }
        Ok(delivered)
    }

    fn label_vector(&self) -> LabelVector {
        let registry = &self.loaded.registry;
        match self.motion {
            Motion::FreeWalk { cursor } => registry.one_hot(cursor),
            Motion::Interpolate { from, to } => {
                let t = self.index as f32 / self.config.frame_count as f32;
                registry.blend(from, to, t)
            }
        }
    }

    fn finish(&mut self, error: RuntimeError) -> Option<Result<Frame, RuntimeError>> {
        self.finished = true;
        Some(Err(error))
    }
}

impl Iterator for FrameStream<'_> {
    type Item = Result<Frame, RuntimeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.index >= self.config.frame_count {
            self.finished = true;
            return None;
        }
        if self.cancel.is_cancelled() {
            log::info!("Animation cancelled after {} frames", self.index);
            return self.finish(RuntimeError::Cancelled);
        }

        if self.index > 0 {
            if !self.config.frame_delay.is_zero() {
                std::thread::sleep(self.config.frame_delay);
                if self.cancel.is_cancelled() {
                    log::info!("Animation cancelled after {} frames", self.index);
                    return self.finish(RuntimeError::Cancelled);
                }
            }
            if let Motion::FreeWalk { .. } = self.motion {
                self.latent = self.sampler.step(&self.latent, self.config.walk_rate);
            }
        }

        let labels = self.label_vector();
        match self
            .session
            .render(self.loaded, self.index, self.latent, labels)
        {
            Ok(frame) => {
                self.index += 1;
                Some(Ok(frame))
            }
            Err(e) => {
                log::warn!("Animation aborted at frame {}: {e}", self.index);
                self.finish(e)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // A trailing error item may follow the remaining frames.
        (0, Some(self.remaining() + 1))
    }
}

impl FusedIterator for FrameStream<'_> {}
