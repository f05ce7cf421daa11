//! Reconnecting to the web interface after a failed polling session.
//!
//! [`ColorStream::run`] gives up on the first fault. [`supervise`] runs it
//! again after a pause, so an unreachable or restarting DisplayCAL does not
//! turn into a hot error loop.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::color::Color;
use crate::stream::{ColorStream, Stage, StreamError};

/// Configuration for reconnection backoff.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt.
    pub initial_delay: Duration,
    /// Maximum delay between reconnection attempts.
    pub max_delay: Duration,
    /// Multiplier applied to delay after each failure. 1.0 keeps it fixed.
    pub multiplier: f64,
}

impl ReconnectConfig {
    /// The same pause before every attempt.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            initial_delay: delay,
            max_delay: delay,
            multiplier: 1.0,
        }
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self::fixed(Duration::from_secs(1))
    }
}

/// Reconnection state machine with exponential backoff.
#[derive(Debug)]
pub struct ReconnectState {
    config: ReconnectConfig,
    current_delay: Duration,
    last_attempt: Option<Instant>,
    consecutive_failures: u32,
}

impl ReconnectState {
    /// Create a new reconnection state with the given config.
    pub fn new(config: ReconnectConfig) -> Self {
        Self {
            current_delay: config.initial_delay,
            config,
            last_attempt: None,
            consecutive_failures: 0,
        }
    }

    /// Time left before the next attempt; zero before any failure.
    pub fn remaining(&self) -> Duration {
        match self.last_attempt {
            None => Duration::ZERO,
            Some(last) => self.current_delay.saturating_sub(last.elapsed()),
        }
    }

    /// Record a failed attempt and advance the backoff.
    ///
    /// The delay that applies to the next attempt is the one in effect when
    /// the failure happened; the multiplier takes effect on the one after.
    pub fn record_failure(&mut self) {
        if self.consecutive_failures > 0 {
            let next = self.current_delay.as_secs_f64() * self.config.multiplier;
            // NaN, negative or overflowing products fall back to the cap.
            self.current_delay = Duration::try_from_secs_f64(next)
                .unwrap_or(self.config.max_delay)
                .min(self.config.max_delay);
        }
        self.consecutive_failures += 1;
        self.last_attempt = Some(Instant::now());
    }

    /// Record a session that made progress and reset the backoff.
    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.current_delay = self.config.initial_delay;
        self.last_attempt = None;
    }

    /// Number of consecutive failed attempts.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Current backoff delay before the next attempt.
    pub fn current_delay(&self) -> Duration {
        self.current_delay
    }
}

/// Run `stream` until cancelled, reconnecting after each failed session.
///
/// A session that delivered at least one color resets the backoff before
/// its failure is counted. Returns only on a terminal error: cancellation
/// (during a session or during the pause) or a closed channel.
pub async fn supervise(
    stream: &mut ColorStream,
    cancel: &CancellationToken,
    out: &mpsc::Sender<Color>,
    config: ReconnectConfig,
) -> StreamError {
    let mut state = ReconnectState::new(config);
    loop {
        let delivered_before = stream.delivered();
        let err = stream.run(cancel, out).await;
        if err.is_terminal() {
            return err;
        }

        if stream.delivered() > delivered_before {
            state.record_success();
        }
        state.record_failure();
        log::warn!(
            "read color: {err} (attempt {}, retry in {:.1}s)",
            state.consecutive_failures(),
            state.current_delay().as_secs_f64()
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => return StreamError::Cancelled(Stage::Backoff),
            () = tokio::time::sleep(state.remaining()) => {}
        }
    }
}
