//! Idle-time batch renderer.
//!
//! [`IdleBatchRenderer`] produces cards one cycle at a time. A cycle keeps
//! creating cards until one of three things happens:
//!
//! - the cursor reaches `max_cards` ([`CycleStop::Exhausted`]),
//! - a non-forced deadline reports less than `min_idle_budget` remaining
//!   ([`CycleStop::OutOfIdleTime`]),
//! - the batch checkpoint fires ([`CycleStop::BatchBoundary`]).
//!
//! The checkpoint is evaluated after the cursor advances and fires when
//! `(cursor + 1) % batch_size == 0`, i.e. one card before each multiple of
//! `batch_size`. With 72 cards and a batch size of 12 the cycles produce
//! 11, 12, 12, 12, 12, 12 and 1 cards.
//!
//! Whatever was created in the cycle reaches the container in a single
//! [`Container::append_batch`] call. Re-scheduling is the caller's job; see
//! [`IdleGrid`](crate::grid::IdleGrid).

use std::ops::Range;

use tracing::{debug, debug_span, info, trace};

use crate::card::Card;
use crate::config::GridConfig;
use crate::deadline::Deadline;
use crate::host::{CardFactory, Container};
use crate::visibility::VisibilityTracker;

/// Why a cycle stopped producing cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStop {
    /// Every card exists.
    Exhausted,
    /// The batch checkpoint fired.
    BatchBoundary,
    /// The idle period ran short and the invocation was not forced.
    OutOfIdleTime,
}

impl CycleStop {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exhausted => "exhausted",
            Self::BatchBoundary => "batch_boundary",
            Self::OutOfIdleTime => "out_of_idle_time",
        }
    }
}

/// Outcome of one [`IdleBatchRenderer::run_cycle`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Indices created in this cycle (empty when nothing was created).
    pub created: Range<usize>,
    pub stop: CycleStop,
    /// Cards still to be created after this cycle.
    pub remaining: usize,
}

impl CycleReport {
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.created.len()
    }

    /// Whether another cycle has to be scheduled.
    #[must_use]
    pub fn needs_continuation(&self) -> bool {
        self.remaining > 0
    }
}

/// Renderer context: cursor, created cards, and the host collaborators.
pub struct IdleBatchRenderer<F, C, V>
where
    F: CardFactory,
{
    config: GridConfig,
    factory: F,
    container: C,
    tracker: V,
    cards: Vec<F::Node>,
    next_index: usize,
    cycles_run: u64,
}

impl<F, C, V> IdleBatchRenderer<F, C, V>
where
    F: CardFactory,
    C: Container<F::Node>,
    V: VisibilityTracker<F::Node>,
{
    /// Create a renderer with its cursor at 0.
    ///
    /// `config` is expected to be validated; a zero `batch_size` is treated
    /// as 1.
    pub fn new(config: GridConfig, factory: F, container: C, tracker: V) -> Self {
        Self {
            cards: Vec::new(),
            config,
            factory,
            container,
            tracker,
            next_index: 0,
            cycles_run: 0,
        }
    }

    /// Run one cycle against `deadline`.
    ///
    /// `None` means the host offers no idle introspection; the cycle then
    /// proceeds without any time check. After the cursor reaches
    /// `max_cards` this is a no-op: nothing is created and the container
    /// is not touched.
    pub fn run_cycle(&mut self, deadline: Option<&dyn Deadline>) -> CycleReport {
        let start = self.next_index;
        if self.is_complete() {
            return self.report(start, CycleStop::Exhausted);
        }

        self.cycles_run += 1;
        let _span = debug_span!("render_cycle", cycle = self.cycles_run, start).entered();

        let budget = self.config.min_idle_budget();
        let batch_size = self.config.batch_size.max(1);
        let mut staged = Vec::new();
        let mut stop = CycleStop::Exhausted;

        while self.next_index < self.config.max_cards {
            if let Some(deadline) = deadline {
                let remaining = deadline.time_remaining();
                if remaining < budget && !deadline.did_timeout() {
                    trace!(
                        remaining_us = remaining.as_micros() as u64,
                        "idle budget exhausted, yielding"
                    );
                    stop = CycleStop::OutOfIdleTime;
                    break;
                }
            }

            let card = Card::new(self.next_index);
            let node = self.factory.create(&card);
            self.cards.push(node.clone());
            self.tracker.observe(&card, &node);
            staged.push(node);
            self.next_index += 1;

            if (self.next_index + 1) % batch_size == 0 {
                stop = CycleStop::BatchBoundary;
                break;
            }
        }

        if !staged.is_empty() {
            self.container.append_batch(staged);
        }
        if self.next_index >= self.config.max_cards {
            // A checkpoint on the very last card still leaves nothing to do.
            stop = CycleStop::Exhausted;
        }

        let report = self.report(start, stop);
        debug!(
            created = report.created_count(),
            stop = stop.as_str(),
            remaining = report.remaining,
            "cycle finished"
        );
        if !report.needs_continuation() {
            info!(
                cards = self.next_index,
                cycles = self.cycles_run,
                "grid complete"
            );
        }
        report
    }

    fn report(&self, start: usize, stop: CycleStop) -> CycleReport {
        CycleReport {
            created: start..self.next_index,
            stop,
            remaining: self.remaining(),
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// Index the next created card will get.
    #[must_use]
    pub fn next_index(&self) -> usize {
        self.next_index
    }

    /// Cards still to be created.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.config.max_cards.saturating_sub(self.next_index)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.next_index >= self.config.max_cards
    }

    /// Created cards, in creation order.
    #[must_use]
    pub fn cards(&self) -> &[F::Node] {
        &self.cards
    }

    /// Cycles that did any work (no-op calls after completion excluded).
    #[must_use]
    pub fn cycles_run(&self) -> u64 {
        self.cycles_run
    }

    #[must_use]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    #[must_use]
    pub fn container(&self) -> &C {
        &self.container
    }

    #[must_use]
    pub fn tracker(&self) -> &V {
        &self.tracker
    }
}
