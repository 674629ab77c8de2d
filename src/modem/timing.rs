//! Tunable timing heuristics.
//!
//! AT replies are not self-delimiting, so every capture loop decides "done"
//! from wall-clock observations. Real modules vary, hence one struct of
//! named knobs instead of literals scattered through the loops.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Overall bound for an ordinary command when the caller gives none.
    pub command_timeout: Duration,
    /// Window after the write during which a silent modem is polled slowly.
    pub grace_delay: Duration,
    /// Poll interval inside the grace window.
    pub grace_poll: Duration,
    /// Idle time after a terminal token before the reply counts as complete.
    pub quiescence: Duration,
    /// Poll interval once data has started to arrive.
    pub poll_interval: Duration,
    /// Pause after opening the link before the first command.
    pub startup_delay: Duration,
    /// How long to wait for the `>` prompt during submission.
    pub prompt_timeout: Duration,
    /// How long to wait for the submission verdict after Ctrl+Z.
    pub submit_timeout: Duration,
    /// Extra window after a submit success line for trailing output.
    pub submit_trailer: Duration,
    /// Pause between consecutive submissions.
    pub message_gap: Duration,
}

impl Timing {
    /// Sleep length for the current capture state.
    pub(crate) fn poll_delay(&self, received_any: bool, elapsed: Duration) -> Duration {
        if !received_any && elapsed < self.grace_delay {
            self.grace_poll
        } else {
            self.poll_interval
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(2),
            grace_delay: Duration::from_millis(300),
            grace_poll: Duration::from_millis(50),
            quiescence: Duration::from_millis(50),
            poll_interval: Duration::from_millis(10),
            startup_delay: Duration::from_secs(1),
            prompt_timeout: Duration::from_secs(5),
            submit_timeout: Duration::from_secs(10),
            submit_trailer: Duration::from_millis(200),
            message_gap: Duration::from_secs(1),
        }
    }
}
