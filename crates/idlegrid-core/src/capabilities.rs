//! Host capability flags, strategy selection, and test overrides.
//!
//! Two optional host capabilities decide which strategy implementations a
//! grid uses: a native idle-callback primitive and a native intersection
//! observer. They are detected once at construction; nothing re-detects
//! them while a grid runs.
//!
//! # Overrides
//!
//! A thread-local stack of [`CapabilityOverride`]s lets tests (and hosts
//! that want to exercise a fallback on purpose) force either flag without
//! touching the real environment.
//!
//! 1. **Thread isolation**: overrides on one thread never affect another.
//! 2. **Stack ordering**: later pushes win; dropping a guard restores the
//!    previous state.
//! 3. **Cleanup**: guards pop on drop, including during unwinding.
//!
//! ```
//! use idlegrid_core::capabilities::{with_capability_override, CapabilityOverride, HostCapabilities};
//!
//! with_capability_override(CapabilityOverride::bare(), || {
//!     let caps = HostCapabilities::native().with_overrides();
//!     assert!(!caps.idle_callback);
//!     assert!(!caps.intersection_observer);
//! });
//! ```

use std::cell::RefCell;
use std::time::Duration;

use crate::config::GridConfig;

/// Optional host features that change strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    /// Host can run callbacks during idle periods with a wait bound.
    pub idle_callback: bool,
    /// Host can report per-element viewport intersection changes.
    pub intersection_observer: bool,
}

impl HostCapabilities {
    /// Both native capabilities present.
    #[must_use]
    pub const fn native() -> Self {
        Self {
            idle_callback: true,
            intersection_observer: true,
        }
    }

    /// Neither native capability present.
    #[must_use]
    pub const fn bare() -> Self {
        Self {
            idle_callback: false,
            intersection_observer: false,
        }
    }

    /// Apply the thread's active overrides on top of `self`.
    #[must_use]
    pub fn with_overrides(self) -> Self {
        OVERRIDE_STACK.with(|stack| {
            stack
                .borrow()
                .iter()
                .fold(self, |caps, over| over.apply_to(caps))
        })
    }

    /// Scheduling strategy for these capabilities.
    #[must_use]
    pub fn scheduler_kind(&self, config: &GridConfig) -> SchedulerKind {
        if self.idle_callback {
            SchedulerKind::Idle {
                timeout: config.idle_timeout(),
            }
        } else {
            SchedulerKind::Timer {
                delay: config.fallback_delay(),
            }
        }
    }

    /// Visibility strategy for these capabilities.
    #[must_use]
    pub const fn visibility_kind(&self) -> VisibilityKind {
        if self.intersection_observer {
            VisibilityKind::Observed
        } else {
            VisibilityKind::AlwaysVisible
        }
    }
}

/// Which idle-scheduling primitive a grid uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerKind {
    /// Native idle callback, forced after `timeout`.
    Idle { timeout: Duration },
    /// Fixed-delay timer delivering a forced deadline.
    Timer { delay: Duration },
}

impl SchedulerKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle { .. } => "idle",
            Self::Timer { .. } => "timer",
        }
    }
}

/// Which visibility bookkeeping a grid uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityKind {
    /// Membership follows the host's intersection reports.
    Observed,
    /// Every card is visible from creation on.
    AlwaysVisible,
}

impl VisibilityKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Observed => "observed",
            Self::AlwaysVisible => "always-visible",
        }
    }
}

// ============================================================================
// Overrides
// ============================================================================

/// Per-flag override. `None` leaves the flag as detected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilityOverride {
    pub idle_callback: Option<bool>,
    pub intersection_observer: Option<bool>,
}

impl CapabilityOverride {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            idle_callback: None,
            intersection_observer: None,
        }
    }

    /// Force both fallbacks.
    #[must_use]
    pub const fn bare() -> Self {
        Self {
            idle_callback: Some(false),
            intersection_observer: Some(false),
        }
    }

    #[must_use]
    pub const fn idle_callback(mut self, value: Option<bool>) -> Self {
        self.idle_callback = value;
        self
    }

    #[must_use]
    pub const fn intersection_observer(mut self, value: Option<bool>) -> Self {
        self.intersection_observer = value;
        self
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.idle_callback.is_none() && self.intersection_observer.is_none()
    }

    #[must_use]
    pub fn apply_to(&self, mut caps: HostCapabilities) -> HostCapabilities {
        if let Some(v) = self.idle_callback {
            caps.idle_callback = v;
        }
        if let Some(v) = self.intersection_observer {
            caps.intersection_observer = v;
        }
        caps
    }
}

thread_local! {
    static OVERRIDE_STACK: RefCell<Vec<CapabilityOverride>> = const { RefCell::new(Vec::new()) };
}

/// Pops its override when dropped.
#[must_use]
pub struct OverrideGuard {
    _marker: std::marker::PhantomData<*const ()>,
}

impl Drop for OverrideGuard {
    fn drop(&mut self) {
        OVERRIDE_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Push an override onto this thread's stack.
pub fn push_override(over: CapabilityOverride) -> OverrideGuard {
    OVERRIDE_STACK.with(|stack| stack.borrow_mut().push(over));
    OverrideGuard {
        _marker: std::marker::PhantomData,
    }
}

/// Run `f` with `over` active.
pub fn with_capability_override<F, R>(over: CapabilityOverride, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = push_override(over);
    f()
}

/// Number of overrides active on this thread.
#[must_use]
pub fn override_depth() -> usize {
    OVERRIDE_STACK.with(|stack| stack.borrow().len())
}
