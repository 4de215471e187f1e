//! Cached view of the engine's voice list.
//!
//! Platforms populate their voice list on their own schedule: some have it
//! ready immediately, some only after a voices-changed notification, and some
//! never notify at all. [`VoiceDirectory`] hides that behind a single
//! readiness signal that resolves once, either when the list becomes
//! non-empty or when a bounded wait runs out.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, Weak};
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;

use crate::engine::{EngineEvent, SpeechEngine, VoiceDescriptor};

/// Shared, cheaply cloneable voice cache.
#[derive(Clone)]
pub struct VoiceDirectory {
    inner: Arc<DirectoryInner>,
}

struct DirectoryInner {
    engine: Arc<dyn SpeechEngine>,
    voices: RwLock<Vec<VoiceDescriptor>>,
    ready: watch::Sender<bool>,
    timeout: Duration,
}

impl VoiceDirectory {
    /// Load the current voice list and start listening for changes.
    ///
    /// Must be called from within a tokio runtime. The readiness timeout
    /// starts counting now.
    pub fn spawn(engine: Arc<dyn SpeechEngine>, timeout: Duration) -> Self {
        // Subscribe before the first read so a change in between is not missed.
        let events = engine.subscribe();
        let (ready, _) = watch::channel(false);

        let directory = Self {
            inner: Arc::new(DirectoryInner {
                engine,
                voices: RwLock::new(Vec::new()),
                ready,
                timeout,
            }),
        };
        directory.refresh();

        tokio::spawn(watch_engine(Arc::downgrade(&directory.inner), events, timeout));
        directory
    }

    /// Re-read the engine's voice list. Returns the number of voices.
    pub fn refresh(&self) -> usize {
        let voices = self.inner.engine.voices();
        let count = voices.len();
        *self
            .inner
            .voices
            .write()
            .unwrap_or_else(PoisonError::into_inner) = voices;

        if count > 0 {
            self.mark_ready();
        }
        count
    }

    /// Snapshot of the cached voices.
    pub fn voices(&self) -> Vec<VoiceDescriptor> {
        self.inner
            .voices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_ready(&self) -> bool {
        *self.inner.ready.borrow()
    }

    /// Resolves once the directory is ready. Completes immediately if it
    /// already is; every caller observes the same single transition.
    pub fn ready(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.inner.ready.subscribe();
        async move {
            // A dropped directory can never become ready; stop waiting.
            let _ = rx.wait_for(|ready| *ready).await;
        }
    }

    fn mark_ready(&self) {
        let changed = self.inner.ready.send_if_modified(|ready| {
            if *ready {
                false
            } else {
                *ready = true;
                true
            }
        });
        if !changed {
            return;
        }

        let count = self.voices().len();
        if count == 0 {
            tracing::warn!(
                timeout_ms = self.inner.timeout.as_millis(),
                "Voice list still empty after timeout; using engine default voice"
            );
        } else {
            tracing::info!(count, "Speech voices loaded");
        }
    }
}

/// Background listener: refreshes on voices-changed and enforces the
/// readiness timeout. Exits once the directory or the engine goes away.
async fn watch_engine(
    directory: Weak<DirectoryInner>,
    mut events: broadcast::Receiver<EngineEvent>,
    timeout: Duration,
) {
    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);
    let mut timed_out = false;

    loop {
        tokio::select! {
            () = &mut deadline, if !timed_out => {
                timed_out = true;
                let Some(inner) = directory.upgrade() else { return };
                VoiceDirectory { inner }.mark_ready();
            }
            event = events.recv() => {
                match event {
                    Ok(EngineEvent::VoicesChanged) | Err(RecvError::Lagged(_)) => {}
                    Ok(_) => continue,
                    Err(RecvError::Closed) => return,
                }
                let Some(inner) = directory.upgrade() else { return };
                let count = VoiceDirectory { inner }.refresh();
                tracing::debug!(count, "Voice list changed");
            }
        }
    }
}
