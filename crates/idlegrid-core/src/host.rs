//! Collaborator traits implemented by the host environment.
//!
//! The renderer never touches a document directly. It asks a
//! [`CardFactory`] for a node per card, hands finished batches to a
//! [`Container`], and is re-invoked through an [`IdleScheduler`].

use crate::card::Card;
use crate::deadline::Deadline;

/// Builds the host node for one card.
pub trait CardFactory {
    /// Host representation of a rendered card. Cloning must be cheap: the
    /// renderer keeps one handle in its card list and stages another for
    /// insertion.
    type Node: Clone;

    fn create(&mut self, card: &Card) -> Self::Node;
}

/// Append-only target for rendered cards.
pub trait Container<N> {
    /// Insert all `nodes` in order, as a single host mutation.
    fn append_batch(&mut self, nodes: Vec<N>);
}

/// A callback awaiting an idle period.
pub type IdleCallback = Box<dyn FnOnce(&dyn Deadline)>;

/// The "run later, preferably when idle" primitive.
///
/// Implementations must invoke each callback exactly once, in the order
/// scheduled, and never re-enter a callback from inside `schedule_idle`.
pub trait IdleScheduler {
    fn schedule_idle(&self, callback: IdleCallback);
}

impl<S: IdleScheduler + ?Sized> IdleScheduler for std::rc::Rc<S> {
    fn schedule_idle(&self, callback: IdleCallback) {
        (**self).schedule_idle(callback);
    }
}

impl<F: CardFactory + ?Sized> CardFactory for Box<F> {
    type Node = F::Node;

    fn create(&mut self, card: &Card) -> Self::Node {
        (**self).create(card)
    }
}

impl<N, C: Container<N> + ?Sized> Container<N> for Box<C> {
    fn append_batch(&mut self, nodes: Vec<N>) {
        (**self).append_batch(nodes);
    }
}
