//! Events emitted by repository queries and package resolution.
//!
//! The registry never writes to a global logger for per-repository outcomes;
//! it reports them through an injected [`EventSink`], and each frontend decides
//! how to present them.

mod event;
mod sink;

use std::sync::Arc;

pub use event::*;
pub use sink::*;

/// Shared handle to an event sink.
pub type EventSinkHandle = Arc<dyn EventSink>;
