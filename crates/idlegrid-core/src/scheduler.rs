//! Host-driven idle scheduler.
//!
//! [`ManualScheduler`] queues callbacks instead of handing them to a real
//! host. Whoever owns it decides when an idle period happens and what the
//! deadline looks like, which makes grid runs deterministic and replayable
//! without a browser.
//!
//! The selected [`SchedulerKind`] is honored: under
//! [`SchedulerKind::Timer`] every callback receives
//! [`FixedDeadline::forced`], whatever deadline the caller supplies, just as
//! a timer fallback would synthesize it.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use crate::capabilities::SchedulerKind;
use crate::deadline::{Deadline, FixedDeadline};
use crate::host::{IdleCallback, IdleScheduler};

/// FIFO queue of idle callbacks, fired on demand.
pub struct ManualScheduler {
    kind: SchedulerKind,
    queue: RefCell<VecDeque<IdleCallback>>,
    fired: Cell<u64>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new(kind: SchedulerKind) -> Self {
        Self {
            kind,
            queue: RefCell::new(VecDeque::new()),
            fired: Cell::new(0),
        }
    }

    #[must_use]
    pub fn kind(&self) -> SchedulerKind {
        self.kind
    }

    /// Callbacks waiting to run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Callbacks run so far.
    #[must_use]
    pub fn fired(&self) -> u64 {
        self.fired.get()
    }

    /// Run the oldest callback with `deadline`. Returns `false` when the
    /// queue was empty.
    ///
    /// The callback may schedule further callbacks; they queue behind any
    /// already pending.
    pub fn fire_next(&self, deadline: &dyn Deadline) -> bool {
        // Release the queue borrow before invoking: the callback re-schedules.
        let Some(callback) = self.queue.borrow_mut().pop_front() else {
            return false;
        };
        self.fired.set(self.fired.get() + 1);
        match self.kind {
            SchedulerKind::Idle { .. } => callback(deadline),
            SchedulerKind::Timer { .. } => callback(&FixedDeadline::forced()),
        }
        true
    }

    /// Fire callbacks until the queue drains or `max_cycles` have run.
    ///
    /// `next_deadline` is asked for a fresh deadline per callback, with the
    /// 0-based position of that callback within this call. Returns the
    /// number of callbacks fired.
    pub fn run_until_idle<D, G>(&self, max_cycles: usize, mut next_deadline: G) -> usize
    where
        D: Deadline,
        G: FnMut(usize) -> D,
    {
        let mut fired = 0;
        while fired < max_cycles && self.pending() > 0 {
            let deadline = next_deadline(fired);
            self.fire_next(&deadline);
            fired += 1;
        }
        fired
    }
}

impl IdleScheduler for ManualScheduler {
    fn schedule_idle(&self, callback: IdleCallback) {
        self.queue.borrow_mut().push_back(callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use std::time::Duration;

    fn idle_kind() -> SchedulerKind {
        SchedulerKind::Idle {
            timeout: Duration::from_millis(500),
        }
    }

    #[test]
    fn fires_in_fifo_order() {
        let sched = ManualScheduler::new(idle_kind());
        let log = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let log = Rc::clone(&log);
            sched.schedule_idle(Box::new(move |_: &dyn Deadline| log.borrow_mut().push(i)));
        }
        assert_eq!(sched.pending(), 3);
        while sched.fire_next(&FixedDeadline::forced()) {}
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
        assert_eq!(sched.fired(), 3);
    }

    #[test]
    fn empty_queue_fires_nothing() {
        let sched = ManualScheduler::new(idle_kind());
        assert!(!sched.fire_next(&FixedDeadline::forced()));
        assert_eq!(sched.fired(), 0);
    }

    #[test]
    fn idle_kind_passes_caller_deadline() {
        let sched = ManualScheduler::new(idle_kind());
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        sched.schedule_idle(Box::new(move |d: &dyn Deadline| {
            *sink.borrow_mut() = Some((d.time_remaining(), d.did_timeout()));
        }));
        sched.fire_next(&FixedDeadline::idle(Duration::from_millis(20)));
        assert_eq!(*seen.borrow(), Some((Duration::from_millis(20), false)));
    }

    #[test]
    fn timer_kind_synthesizes_forced_deadline() {
        let sched = ManualScheduler::new(SchedulerKind::Timer {
            delay: Duration::from_millis(16),
        });
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        sched.schedule_idle(Box::new(move |d: &dyn Deadline| {
            *sink.borrow_mut() = Some((d.time_remaining(), d.did_timeout()));
        }));
        sched.fire_next(&FixedDeadline::idle(Duration::from_millis(20)));
        assert_eq!(*seen.borrow(), Some((Duration::ZERO, true)));
    }

    #[test]
    fn callbacks_may_reschedule() {
        let sched = Rc::new(ManualScheduler::new(idle_kind()));
        let inner = Rc::clone(&sched);
        sched.schedule_idle(Box::new(move |_: &dyn Deadline| {
            inner.schedule_idle(Box::new(|_: &dyn Deadline| {}));
        }));
        let fired = sched.run_until_idle(10, |_| FixedDeadline::forced());
        assert_eq!(fired, 2);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn run_until_idle_respects_cap() {
        let sched = ManualScheduler::new(idle_kind());
        for _ in 0..5 {
            sched.schedule_idle(Box::new(|_: &dyn Deadline| {}));
        }
        assert_eq!(sched.run_until_idle(2, |_| FixedDeadline::forced()), 2);
        assert_eq!(sched.pending(), 3);
    }
}
