//! The `Window` trait: accumulates values per `(pane, key)` and fires when a watermark
//! passes a pane's end (spec.md §4.6).

use crate::context::WindowContext;
use crate::message::Payload;

use super::assigner::Pane;

pub trait Window: Send + 'static {
    /// Per-key grouping inside a pane; must be hashable so panes can share one accumulator
    /// map across all keys.
    type Key: std::hash::Hash + Eq + Clone + Send;
    /// The running aggregate kept per `(pane, key)`.
    type Acc: Default + Send;

    /// Extract the event timestamp (ms since epoch) used both for pane assignment and as
    /// this window's watermark proxy.
    fn timestamp(&self, value: &Payload) -> i64;

    /// Extract the grouping key.
    fn key(&self, value: &Payload) -> Self::Key;

    /// Fold one value into a pane's accumulator.
    fn add_to_window(&self, acc: &mut Self::Acc, value: Payload);

    /// Called once a pane's end has passed the watermark; the accumulator is removed from
    /// state immediately after this returns.
    fn window_complete(
        &mut self,
        ctx: &mut WindowContext<'_>,
        key: &Self::Key,
        pane: Pane,
        acc: Self::Acc,
    );
}
