//! Cooperative cancellation for long optimization runs.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

/// Cancellation signal checked between units of work.
///
/// Combines an optional external token (e.g. wired to Ctrl-C) with an
/// optional deadline. Cloning shares the token.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    token: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl Cancellation {
    /// Never cancelled.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Cancel when `token` is cancelled.
    #[must_use]
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Cancel once `deadline` has passed.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Cancel once `timeout` has elapsed from now.
    ///
    /// A timeout too large to represent as an [`Instant`] sets no deadline.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    /// Check whether work should stop.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}
