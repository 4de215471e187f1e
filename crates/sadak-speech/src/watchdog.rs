//! Per-utterance hang detection.
//!
//! Some engines never report completion for an utterance (a dropped audio
//! device, a synthesizer that silently gives up). A [`Watchdog`] bounds how
//! long the controller waits before forcing a reset.

use std::pin::Pin;
use std::time::Duration;

use tokio::time::{Instant, Sleep};

use crate::engine::UtteranceId;

/// A single-shot timer bound to one utterance.
///
/// Disarming consumes the watchdog, so it cannot be disarmed twice.
#[derive(Debug)]
pub struct Watchdog {
    utterance: UtteranceId,
    timeout: Duration,
    sleep: Pin<Box<Sleep>>,
}

impl Watchdog {
    /// Start a timer for `utterance` that expires after `timeout`.
    #[must_use]
    pub fn arm(utterance: UtteranceId, timeout: Duration) -> Self {
        tracing::trace!(%utterance, timeout_ms = timeout.as_millis(), "Watchdog armed");
        Self {
            utterance,
            timeout,
            sleep: Box::pin(tokio::time::sleep(timeout)),
        }
    }

    /// Stop the timer, returning the utterance it guarded.
    pub fn disarm(self) -> UtteranceId {
        tracing::trace!(utterance = %self.utterance, "Watchdog disarmed");
        self.utterance
    }

    pub const fn utterance(&self) -> UtteranceId {
        self.utterance
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn deadline(&self) -> Instant {
        self.sleep.deadline()
    }
}

/// Resolve when the watchdog in `slot` fires.
///
/// Pending forever while the slot is empty, so it can sit in a `select!`
/// arm unconditionally. The slot is left untouched; the caller decides what
/// to do with the expired watchdog.
pub async fn expired(slot: &mut Option<Watchdog>) -> UtteranceId {
    match slot {
        Some(watchdog) => {
            watchdog.sleep.as_mut().await;
            watchdog.utterance
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fires_after_timeout() {
        let start = Instant::now();
        let mut slot = Some(Watchdog::arm(UtteranceId(7), Duration::from_secs(15)));

        assert_eq!(
            slot.as_ref().map(Watchdog::deadline),
            Some(start + Duration::from_secs(15))
        );

        let fired = expired(&mut slot).await;

        assert_eq!(fired, UtteranceId(7));
        assert!(start.elapsed() >= Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_slot_never_fires() {
        let mut slot: Option<Watchdog> = None;
        let result =
            tokio::time::timeout(Duration::from_secs(3600), expired(&mut slot)).await;
        assert!(result.is_err());
    }

    #[test]
    fn empty_slot_is_pending_without_a_runtime() {
        let mut slot: Option<Watchdog> = None;
        let mut fired = tokio_test::task::spawn(expired(&mut slot));
        tokio_test::assert_pending!(fired.poll());
        tokio_test::assert_pending!(fired.poll());
    }

    #[tokio::test]
    async fn disarm_returns_guarded_utterance() {
        let watchdog = Watchdog::arm(UtteranceId(3), Duration::from_millis(500));
        assert_eq!(watchdog.utterance(), UtteranceId(3));
        assert_eq!(watchdog.timeout(), Duration::from_millis(500));
        assert_eq!(watchdog.disarm(), UtteranceId(3));
    }
}
