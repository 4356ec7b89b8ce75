use derive_more::Deref;
use std::fmt::{Debug, Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Error returned when emitting an item fails.
/// The item is handed back so the caller decides what to do with it.
pub struct EmitError<T> {
    pub reason: String,
    pub item: T,
}

impl<T> EmitError<T> {
    pub fn new(reason: impl Into<String>, item: T) -> Self {
        Self {
            reason: reason.into(),
            item,
        }
    }
}

impl<T> Debug for EmitError<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmitError")
            .field("reason", &self.reason)
            .finish_non_exhaustive()
    }
}

impl<T> Display for EmitError<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "emit failed: {}", self.reason)
    }
}

/// What a callback wants after seeing a frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EmitControl {
    Continue,
    Stop,
}

/// The sending side of a frame stream.
pub trait Emitter<T>: Send + Sync + 'static {
    fn emit(&self, item: T) -> Result<(), EmitError<T>>;
}

/// Shared stop flag for an animation. Clones observe the same flag, and a
/// cancelled token never resets.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Buffers every frame it is given until [`take`](Self::take) drains it.
pub struct CollectEmitter<T>(Mutex<Vec<T>>);

impl<T> CollectEmitter<T> {
    pub fn new() -> Self {
        Self(Mutex::new(Vec::new()))
    }

    /// Items emitted since the last call, in emission order.
    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl<T> Default for CollectEmitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Emitter<T> for CollectEmitter<T> {
    fn emit(&self, item: T) -> Result<(), EmitError<T>> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(item);
        Ok(())
    }
}

/// Emitter backed by a crossbeam channel. Blocks while a bounded channel is full
/// and fails once the receiver is gone.
pub struct ChannelEmitter<T> {
    tx: crossbeam::channel::Sender<T>,
}

impl<T: Send + 'static> ChannelEmitter<T> {
    pub fn new(tx: crossbeam::channel::Sender<T>) -> Self {
        Self { tx }
    }
}

impl<T: Send + 'static> Emitter<T> for ChannelEmitter<T> {
    fn emit(&self, item: T) -> Result<(), EmitError<T>> {
        self.tx
            .send(item)
            .map_err(|crossbeam::channel::SendError(item)| {
                EmitError::new("channel is disconnected", item)
            })
    }
}

/// Per-frame callback. Returning [`EmitControl::Stop`] ends the animation.
pub struct CallbackEmitter<F>(Mutex<F>);

impl<F> CallbackEmitter<F> {
    pub fn new(callback: F) -> Self {
        Self(Mutex::new(callback))
    }
}

impl<T, F> Emitter<T> for CallbackEmitter<F>
where
    T: 'static,
    F: FnMut(&T) -> EmitControl + Send + 'static,
{
    fn emit(&self, item: T) -> Result<(), EmitError<T>> {
        let mut callback = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        match callback(&item) {
            EmitControl::Continue => Ok(()),
            EmitControl::Stop => Err(EmitError::new("stopped by callback", item)),
        }
    }
}

/// Lightweight cloneable wrapper exposing an [`Emitter`] implementation.
#[derive(Deref)]
pub struct OutStream<T> {
    emitter: Arc<dyn Emitter<T>>,
}

impl<T> Clone for OutStream<T> {
    fn clone(&self) -> Self {
        Self {
            emitter: self.emitter.clone(),
        }
    }
}

impl<T> OutStream<T> {
    /// Create a new [`OutStream`] from a raw emitter trait object.
    pub fn new(emitter: Arc<dyn Emitter<T>>) -> Self {
        Self { emitter }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn collect_emitter_drains_in_order() {
        let emitter = CollectEmitter::new();
        emitter.emit('a').unwrap();
        emitter.emit('b').unwrap();
        assert_eq!(emitter.take(), vec!['a', 'b']);
        assert!(emitter.take().is_empty());
    }

    #[test]
    fn channel_emitter_fails_once_receiver_is_dropped() {
        let (tx, rx) = crossbeam::channel::unbounded();
        let emitter = ChannelEmitter::new(tx);
        emitter.emit(1).unwrap();
        assert_eq!(rx.recv().unwrap(), 1);
        drop(rx);
        let err = emitter.emit(2).unwrap_err();
        assert_eq!(err.item, 2);
    }

    #[test]
    fn callback_can_stop_the_stream() {
        let emitter = CallbackEmitter::new(|item: &u32| {
            if *item < 2 {
                EmitControl::Continue
            } else {
                EmitControl::Stop
            }
        });
        assert!(emitter.emit(1u32).is_ok());
        assert_eq!(emitter.emit(2u32).unwrap_err().item, 2);
    }
}
