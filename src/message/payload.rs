//! Opaque, runtime-erased payloads carried by `Init`, `Emit`, `Wakeup`, and user messages.
//!
//! Components exchange values whose concrete type only the sender and the intended
//! receiver agree on; the runtime itself never inspects them. `Payload` is the erased
//! carrier and `downcast`/`downcast_ref` recover the concrete type at the receiving end.

use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

/// Marker trait for anything that can travel as an opaque message payload.
///
/// Blanket-implemented for every `'static + Send + Sync + Debug` type, so user code never
/// implements this by hand — it just moves ordinary values into a `Payload`.
pub trait Message: Any + Send + Sync + Debug {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Send + Sync + Debug> Message for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

// `Message: Debug` only guarantees every concrete implementor has a `Debug` impl; the trait
// object itself still needs one spelled out so `Arc<dyn Message>` (and anything that derives
// `Debug` while holding one, like `Envelope`) can be formatted.
impl Debug for dyn Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let this: &dyn Debug = self;
        this.fmt(f)
    }
}

/// An erased, cheaply-cloned payload.
pub type Payload = Arc<dyn Message>;

/// Wrap a concrete value as an opaque payload.
pub fn payload<T: Message>(value: T) -> Payload {
    Arc::new(value)
}

/// Attempt to recover the concrete type behind a payload.
pub fn downcast_ref<T: 'static>(payload: &Payload) -> Option<&T> {
    payload.as_any().downcast_ref::<T>()
}
