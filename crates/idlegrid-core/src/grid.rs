//! Self-rescheduling driver for an [`IdleBatchRenderer`].
//!
//! [`IdleGrid::start`] schedules the first cycle. Each cycle runs the
//! renderer once and, if cards remain, schedules exactly one continuation
//! through the same [`IdleScheduler`]. Nothing is retained that could
//! cancel a scheduled cycle; a grid runs until its renderer completes or the
//! host stops invoking callbacks.
//!
//! At most one chain is live per grid: `start` while a cycle is pending
//! does nothing. The flag clears when a cycle finishes without scheduling a
//! continuation.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::debug;

use crate::deadline::Deadline;
use crate::host::{CardFactory, Container, IdleScheduler};
use crate::renderer::IdleBatchRenderer;
use crate::visibility::VisibilityTracker;

/// A renderer shared between its driver and the callbacks it scheduled.
pub type SharedRenderer<F, C, V> = Rc<RefCell<IdleBatchRenderer<F, C, V>>>;

/// Ties a renderer to the scheduling primitive chosen for the host.
pub struct IdleGrid<F, C, V>
where
    F: CardFactory,
{
    renderer: SharedRenderer<F, C, V>,
    scheduler: Rc<dyn IdleScheduler>,
    chain_live: Rc<Cell<bool>>,
}

impl<F, C, V> IdleGrid<F, C, V>
where
    F: CardFactory + 'static,
    C: Container<F::Node> + 'static,
    V: VisibilityTracker<F::Node> + 'static,
{
    pub fn new(renderer: IdleBatchRenderer<F, C, V>, scheduler: Rc<dyn IdleScheduler>) -> Self {
        Self {
            renderer: Rc::new(RefCell::new(renderer)),
            scheduler,
            chain_live: Rc::new(Cell::new(false)),
        }
    }

    /// Schedule the first cycle. Does nothing once the renderer is complete
    /// or while a cycle is already pending.
    pub fn start(&self) {
        if self.chain_live.get() || self.renderer.borrow().is_complete() {
            return;
        }
        self.chain_live.set(true);
        schedule_cycle(
            Rc::clone(&self.renderer),
            Rc::clone(&self.scheduler),
            Rc::clone(&self.chain_live),
        );
    }

    /// Whether a scheduled cycle has yet to finish the chain.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.chain_live.get()
    }

    /// The shared renderer, for inspection between cycles.
    #[must_use]
    pub fn renderer(&self) -> &SharedRenderer<F, C, V> {
        &self.renderer
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.renderer.borrow().is_complete()
    }

    #[must_use]
    pub fn created(&self) -> usize {
        self.renderer.borrow().next_index()
    }
}

fn schedule_cycle<F, C, V>(
    renderer: SharedRenderer<F, C, V>,
    scheduler: Rc<dyn IdleScheduler>,
    chain_live: Rc<Cell<bool>>,
) where
    F: CardFactory + 'static,
    C: Container<F::Node> + 'static,
    V: VisibilityTracker<F::Node> + 'static,
{
    let next = Rc::clone(&scheduler);
    scheduler.schedule_idle(Box::new(move |deadline: &dyn Deadline| {
        let report = renderer.borrow_mut().run_cycle(Some(deadline));
        if report.needs_continuation() {
            debug!(remaining = report.remaining, "scheduling continuation");
            schedule_cycle(renderer, next, chain_live);
        } else {
            chain_live.set(false);
        }
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::SchedulerKind;
    use crate::card::Card;
    use crate::config::GridConfig;
    use crate::deadline::FixedDeadline;
    use crate::scheduler::ManualScheduler;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    struct IndexFactory;

    impl CardFactory for IndexFactory {
        type Node = usize;

        fn create(&mut self, card: &Card) -> usize {
            card.index()
        }
    }

    #[derive(Default)]
    struct Appended(Vec<Vec<usize>>);

    impl Container<usize> for Appended {
        fn append_batch(&mut self, nodes: Vec<usize>) {
            self.0.push(nodes);
        }
    }

    struct NoTracking;

    impl VisibilityTracker<usize> for NoTracking {
        fn observe(&mut self, _card: &Card, _node: &usize) {}
    }

    fn idle_scheduler() -> Rc<ManualScheduler> {
        Rc::new(ManualScheduler::new(SchedulerKind::Idle {
            timeout: Duration::from_millis(500),
        }))
    }

    fn grid(
        max_cards: usize,
        sched: &Rc<ManualScheduler>,
    ) -> IdleGrid<IndexFactory, Appended, NoTracking> {
        let cfg = GridConfig::default().max_cards(max_cards);
        let renderer = IdleBatchRenderer::new(cfg, IndexFactory, Appended::default(), NoTracking);
        IdleGrid::new(renderer, Rc::clone(sched) as Rc<dyn IdleScheduler>)
    }

    #[test]
    fn start_schedules_one_cycle() {
        let sched = idle_scheduler();
        let g = grid(72, &sched);
        g.start();
        assert_eq!(sched.pending(), 1);
        assert_eq!(g.created(), 0);
    }

    #[test]
    fn short_deadline_schedules_exactly_one_continuation() {
        let sched = idle_scheduler();
        let g = grid(72, &sched);
        g.start();

        sched.fire_next(&FixedDeadline::idle(Duration::from_millis(2)));
        assert_eq!(g.created(), 0);
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn runs_to_completion_and_stops_scheduling() {
        let sched = idle_scheduler();
        let g = grid(72, &sched);
        g.start();

        let fired = sched.run_until_idle(100, |_| FixedDeadline::idle(Duration::from_millis(50)));
        assert_eq!(fired, 7);
        assert!(g.is_complete());
        assert_eq!(sched.pending(), 0);

        let r = g.renderer().borrow();
        assert_eq!(r.cards(), (0..72).collect::<Vec<_>>().as_slice());
        let sizes: Vec<usize> = r.container().0.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![11, 12, 12, 12, 12, 12, 1]);
    }

    #[test]
    fn alternating_budget_still_completes() {
        let sched = idle_scheduler();
        let g = grid(30, &sched);
        g.start();

        // Every other idle period is too short to do anything.
        sched.run_until_idle(100, |i| {
            FixedDeadline::idle(Duration::from_millis(if i % 2 == 0 { 1 } else { 20 }))
        });
        assert!(g.is_complete());
        assert_eq!(g.created(), 30);
    }

    #[test]
    fn timer_fallback_never_stalls() {
        let sched = Rc::new(ManualScheduler::new(SchedulerKind::Timer {
            delay: Duration::from_millis(16),
        }));
        let g = grid(72, &sched);
        g.start();

        // The caller's zero budget is replaced by the forced deadline.
        let fired = sched.run_until_idle(100, |_| FixedDeadline::idle(Duration::ZERO));
        assert_eq!(fired, 7);
        assert!(g.is_complete());
    }

    #[test]
    fn runs_under_trace_subscriber() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let sched = idle_scheduler();
            let g = grid(24, &sched);
            g.start();
            sched.fire_next(&FixedDeadline::idle(Duration::from_millis(1)));
            sched.run_until_idle(10, |_| FixedDeadline::forced());
            assert!(g.is_complete());
        });
    }

    #[test]
    fn second_start_mid_run_keeps_single_chain() {
        let sched = idle_scheduler();
        let g = grid(72, &sched);
        g.start();
        sched.fire_next(&FixedDeadline::forced());
        assert!(g.is_running());

        g.start();
        assert_eq!(sched.pending(), 1);
        sched.fire_next(&FixedDeadline::forced());
        assert_eq!(sched.pending(), 1);
        assert_eq!(g.created(), 23);
    }

    #[test]
    fn repeated_start_before_first_cycle_schedules_once() {
        let sched = idle_scheduler();
        let g = grid(10, &sched);
        g.start();
        g.start();
        g.start();
        assert_eq!(sched.pending(), 1);

        let fired = sched.run_until_idle(10, |_| FixedDeadline::forced());
        assert_eq!(fired, 1);
        assert!(g.is_complete());
        assert!(!g.is_running());
    }

    #[test]
    fn start_after_completion_is_noop() {
        let sched = idle_scheduler();
        let g = grid(5, &sched);
        g.start();
        sched.run_until_idle(10, |_| FixedDeadline::forced());
        assert!(g.is_complete());

        g.start();
        assert_eq!(sched.pending(), 0);
    }
}
