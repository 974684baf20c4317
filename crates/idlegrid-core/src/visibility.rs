//! Visible-set bookkeeping.
//!
//! # Invariants
//!
//! 1. **Latest report wins**: under [`ObservedVisibility`], a card is in the
//!    set iff the most recent [`VisibilityChange`] for it said
//!    `intersecting`. Reports within one batch are applied in order.
//! 2. **Fallback is permanent**: under [`AlwaysVisible`], a card enters the
//!    set when observed and is never removed.
//! 3. **Membership only**: the set is keyed by card index and carries no
//!    ordering; [`VisibleSet::sorted_indices`] sorts on read.
//!
//! The set lives behind [`SharedVisibleSet`] because the host reports
//! intersections from its own callbacks, outside any renderer cycle.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::card::Card;

/// Shared handle to a [`VisibleSet`]; single-threaded.
pub type SharedVisibleSet = Rc<RefCell<VisibleSet>>;

/// One intersection report from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityChange {
    pub index: usize,
    pub intersecting: bool,
}

impl VisibilityChange {
    #[must_use]
    pub const fn entered(index: usize) -> Self {
        Self {
            index,
            intersecting: true,
        }
    }

    #[must_use]
    pub const fn left(index: usize) -> Self {
        Self {
            index,
            intersecting: false,
        }
    }
}

/// Indices of cards currently considered visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleSet {
    members: HashSet<usize>,
}

impl VisibleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn shared() -> SharedVisibleSet {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn insert(&mut self, index: usize) -> bool {
        self.members.insert(index)
    }

    pub fn remove(&mut self, index: usize) -> bool {
        self.members.remove(&index)
    }

    /// Apply one report.
    pub fn apply(&mut self, change: VisibilityChange) {
        if change.intersecting {
            self.members.insert(change.index);
        } else {
            self.members.remove(&change.index);
        }
    }

    /// Apply a batch of reports in delivery order.
    pub fn apply_all(&mut self, changes: impl IntoIterator<Item = VisibilityChange>) {
        for change in changes {
            self.apply(change);
        }
    }

    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.members.contains(&index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    pub fn sorted_indices(&self) -> Vec<usize> {
        let mut out: Vec<usize> = self.members.iter().copied().collect();
        out.sort_unstable();
        out
    }
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Subscribes freshly created cards to visibility tracking.
pub trait VisibilityTracker<N> {
    fn observe(&mut self, card: &Card, node: &N);
}

impl<N, T: VisibilityTracker<N> + ?Sized> VisibilityTracker<N> for Box<T> {
    fn observe(&mut self, card: &Card, node: &N) {
        (**self).observe(card, node);
    }
}

/// A native intersection reporter. Registering a node must eventually lead
/// the host to call [`VisibleSet::apply_all`] on the shared set.
pub trait IntersectionSource<N> {
    fn observe(&mut self, node: &N);
}

/// Native path: forward every card to one shared intersection source.
pub struct ObservedVisibility<S> {
    source: S,
    visible: SharedVisibleSet,
}

impl<S> ObservedVisibility<S> {
    pub fn new(source: S, visible: SharedVisibleSet) -> Self {
        Self { source, visible }
    }

    /// The set the host's reports update.
    #[must_use]
    pub fn visible(&self) -> &SharedVisibleSet {
        &self.visible
    }
}

impl<N, S: IntersectionSource<N>> VisibilityTracker<N> for ObservedVisibility<S> {
    fn observe(&mut self, _card: &Card, node: &N) {
        self.source.observe(node);
    }
}

/// Fallback path: every card is visible as soon as it exists.
pub struct AlwaysVisible {
    visible: SharedVisibleSet,
}

impl AlwaysVisible {
    pub fn new(visible: SharedVisibleSet) -> Self {
        Self { visible }
    }
}

impl<N> VisibilityTracker<N> for AlwaysVisible {
    fn observe(&mut self, card: &Card, _node: &N) {
        self.visible.borrow_mut().insert(card.index());
    }
}
