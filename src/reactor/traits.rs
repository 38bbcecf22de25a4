//! The `Reactor` trait: a component that recombines named input streams into output streams
//! using ordinary `futures::Stream` combinators (spec.md §4.5).

use std::collections::HashMap;

use futures::stream::BoxStream;

use crate::context::ReactorContext;
use crate::message::Payload;

use super::subject::Subject;

pub type OutputStream = BoxStream<'static, Payload>;

pub trait Reactor: Send + 'static {
    /// Names of the input sources this reactor declares; each becomes a `Subject` that
    /// `build_dag` receives and that `ReactTo` bindings feed.
    fn sources(&self) -> Vec<String>;

    /// Build the pipeline once, at `Init` time. Returns one `(output stream name, stream)`
    /// pair per named output; every item the returned streams produce is re-emitted on that
    /// name (spec.md §4.5: "terminally subscribed to re-emit onto the reactor's own named
    /// output streams").
    fn build_dag(
        &mut self,
        ctx: &mut ReactorContext<'_>,
        sources: &HashMap<String, Subject>,
    ) -> Vec<(String, OutputStream)>;
}
