//! Seams to the program being traced.
//!
//! The tracer never reaches into a runtime directly. Everything it needs from
//! the host (type paths and method locations, source text, the trace hook
//! itself, the interactive console) comes through the traits in this module.
//! `NamespaceTable` and `SourceCatalog` are plain in-memory implementations
//! suitable for embedding hosts that can describe themselves up front.

mod console;
mod event;
mod namespace;
mod sources;

pub use console::{Console, Lifecycle, ToggleInput};
pub use event::{
    trace_hook, EventKind, FrameId, ParseEventKindError, TraceEvent, TraceHook, TraceHost,
};
pub use namespace::{MethodSource, Namespace, NamespaceTable, OwnerId};
pub use sources::{unit_index, SourceCatalog, SourceTable};
