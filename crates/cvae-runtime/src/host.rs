use crate::error::RuntimeError;
use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::thread::JoinHandle;

type BoxAny = Box<dyn Any + Send>;

struct Call<D> {
    f: Box<dyn FnOnce(&mut D) -> BoxAny + Send>,
    ret: crossbeam::channel::Sender<BoxAny>,
}

/// Owns a decoder on a dedicated thread and runs closures against it one at a time.
///
/// Every stream of a session goes through the same host, so decoder calls never
/// overlap even when several animations run concurrently.
pub struct DecoderHost<D> {
    accessor: DecoderAccessor<D>,
    abort_tx: crossbeam::channel::Sender<()>,
    join_handle: Option<JoinHandle<D>>,
}

impl<D: Send + 'static> DecoderHost<D> {
    pub fn spawn(decoder: D) -> Self {
        let (abort_tx, abort_rx) = crossbeam::channel::unbounded::<()>();
        let (tx, rx) = crossbeam::channel::unbounded::<Call<D>>();
        let join_handle = std::thread::spawn(move || {
            let mut d = decoder;
            loop {
                crossbeam::channel::select! {
                    recv(rx) -> msg => {
                        match msg {
                            Ok(Call { f, ret }) => {
                                let r = f(&mut d);
                                let _ = ret.send(r);
                            }
                            Err(_) => break,
                        }
                    }
                    recv(abort_rx) -> _ => {
                        break;
                    }
                }
            }
            log::debug!("Decoder host stopped");
            d
        });
        Self {
            accessor: DecoderAccessor { tx },
            abort_tx,
            join_handle: Some(join_handle),
        }
    }

    pub fn accessor(&self) -> DecoderAccessor<D> {
        self.accessor.clone()
    }

    /// Stops the host thread and hands the decoder back.
    pub fn into_decoder(mut self) -> Result<D, RuntimeError> {
        let _ = self.abort_tx.send(());
        let handle = self.join_handle.take().ok_or(RuntimeError::HostUnavailable)?;
        handle
            .join()
            .map_err(|e| RuntimeError::ThreadPanicked(format!("{e:?}")))
    }
}

impl<D> std::ops::Deref for DecoderHost<D> {
    type Target = DecoderAccessor<D>;

    fn deref(&self) -> &Self::Target {
        &self.accessor
    }
}

impl<D> Drop for DecoderHost<D> {
    fn drop(&mut self) {
        let _ = self.abort_tx.send(());
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }
}

/// Cloneable handle for submitting work to a [`DecoderHost`].
pub struct DecoderAccessor<D> {
    tx: crossbeam::channel::Sender<Call<D>>,
}

impl<D> Clone for DecoderAccessor<D> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<D> Debug for DecoderAccessor<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderAccessor")
            .field("pending", &self.tx.len())
            .finish()
    }
}

impl<D> DecoderAccessor<D> {
    /// Runs `f` on the host thread and waits for its result.
    ///
    /// Fails with [`RuntimeError::HostUnavailable`] once the host has stopped,
    /// including when a previous closure panicked on it.
    pub fn with<R: Send + 'static>(
        &self,
        f: impl FnOnce(&mut D) -> R + Send + 'static,
    ) -> Result<R, RuntimeError> {
        let (ret_tx, ret_rx) = crossbeam::channel::bounded(1);
        self.tx
            .send(Call {
                f: Box::new(move |d| Box::new(f(d)) as BoxAny),
                ret: ret_tx,
            })
            .map_err(|_| RuntimeError::HostUnavailable)?;
        let r = ret_rx.recv().map_err(|_| RuntimeError::HostUnavailable)?;
        r.downcast::<R>()
            .map(|r| *r)
            .map_err(|_| RuntimeError::Unexpected("decoder host returned a foreign value".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calls_run_against_the_hosted_value() {
        let host = DecoderHost::spawn(Vec::<u32>::new());
        host.with(|v| v.push(1)).unwrap();
        host.accessor().with(|v| v.push(2)).unwrap();
        assert_eq!(host.with(|v| v.len()).unwrap(), 2);
        assert_eq!(host.into_decoder().unwrap(), vec![1, 2]);
    }

    #[test]
    fn accessor_fails_after_host_is_dropped() {
        let host = DecoderHost::spawn(0u8);
        let accessor = host.accessor();
        drop(host);
        assert!(matches!(
            accessor.with(|v| *v),
            Err(RuntimeError::HostUnavailable)
        ));
    }

    #[test]
    fn panicking_call_takes_the_host_down() {
        let host = DecoderHost::spawn(0u8);
        let accessor = host.accessor();
        let result = accessor.with(|_| -> u8 { panic!("decoder exploded") });
        assert!(matches!(result, Err(RuntimeError::HostUnavailable)));
        assert!(matches!(
            accessor.with(|v| *v),
            Err(RuntimeError::HostUnavailable)
        ));
    }
}
