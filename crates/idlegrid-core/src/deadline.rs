//! Deadline descriptors handed to each renderer cycle.
//!
//! A deadline is queried live: the renderer asks for the remaining idle time
//! before every card, so host implementations should report the current
//! value rather than a snapshot taken at callback entry.

use std::time::Duration;

/// How much of the current idle period remains, and whether the invocation
/// was forced by a timeout instead of granted idle time.
pub trait Deadline {
    /// Estimated time left in the current idle period.
    fn time_remaining(&self) -> Duration;

    /// `true` when the host ran the callback because its wait bound expired.
    fn did_timeout(&self) -> bool;
}

impl<D: Deadline + ?Sized> Deadline for &D {
    fn time_remaining(&self) -> Duration {
        (**self).time_remaining()
    }

    fn did_timeout(&self) -> bool {
        (**self).did_timeout()
    }
}

/// A deadline with constant answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDeadline {
    pub remaining: Duration,
    pub did_timeout: bool,
}

impl FixedDeadline {
    /// Idle time granted by the host, not forced.
    #[must_use]
    pub const fn idle(remaining: Duration) -> Self {
        Self {
            remaining,
            did_timeout: false,
        }
    }

    /// Zero remaining time with the timeout flag set.
    ///
    /// This is what the timer fallback synthesizes on hosts without idle
    /// introspection; the renderer treats it as permission to proceed.
    #[must_use]
    pub const fn forced() -> Self {
        Self {
            remaining: Duration::ZERO,
            did_timeout: true,
        }
    }
}

impl Deadline for FixedDeadline {
    fn time_remaining(&self) -> Duration {
        self.remaining
    }

    fn did_timeout(&self) -> bool {
        self.did_timeout
    }
}
