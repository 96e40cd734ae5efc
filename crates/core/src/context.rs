use std::time::{Duration, Instant};

use crate::{AppError, AppResult};

/// Carries the caller-supplied deadline into every outbound call.
///
/// The deadline is the only cancellation signal for provider and broker
/// round trips. An elapsed deadline surfaces as
/// [`AppError::ProviderUnavailable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    deadline: Option<Instant>,
}

impl CallContext {
    /// Creates a context without a deadline.
    #[must_use]
    pub fn background() -> Self {
        Self { deadline: None }
    }

    /// Creates a context that expires after the given timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Creates a context bound to an absolute deadline.
    #[must_use]
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    /// Returns the absolute deadline, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the time left before the deadline, if one is set.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Returns true when the deadline has already elapsed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining().is_some_and(|remaining| remaining.is_zero())
    }

    /// Fails fast when the deadline elapsed before `operation` could start.
    pub fn ensure_not_expired(&self, operation: &str) -> AppResult<()> {
        if self.is_expired() {
            return Err(AppError::ProviderUnavailable(format!(
                "deadline elapsed before {operation}"
            )));
        }

        Ok(())
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::background()
    }
}
