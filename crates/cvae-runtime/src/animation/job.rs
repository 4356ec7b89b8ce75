use super::streaming::CancelToken;
use crate::error::RuntimeError;
use crossbeam::channel::Receiver;
use std::thread::JoinHandle;

/// A background animation owned by a worker thread.
///
/// Frames arrive on [`stream`](Self::stream). The channel disconnects once the
/// worker finishes, so iterating it ends with the animation.
pub struct JobHandle<S> {
    pub id: String,
    pub stream: Receiver<S>,
    cancel: CancelToken,
    worker: JoinHandle<Result<usize, RuntimeError>>,
}

impl<S> JobHandle<S> {
    pub(crate) fn new(
        id: String,
        stream: Receiver<S>,
        cancel: CancelToken,
        worker: JoinHandle<Result<usize, RuntimeError>>,
    ) -> Self {
        Self {
            id,
            stream,
            cancel,
            worker,
        }
    }

    /// Asks the worker to stop before its next frame.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Waits for the worker and returns how many frames it delivered.
    ///
    /// Frames not yet read from [`stream`](Self::stream) are dropped with the handle.
    pub fn join(self) -> Result<usize, RuntimeError> {
        let id = self.id;
        self.worker.join().unwrap_or_else(|panic| {
            Err(RuntimeError::ThreadPanicked(format!(
                "animation {id}: {panic:?}"
            )))
        })
    }
}
