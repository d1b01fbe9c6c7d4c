//! In-process breakpoint tracer.
//!
//! A host feeds execution events into a [`executor::TraceDispatcher`]; when
//! one lands on a registered breakpoint the dispatcher prints the location
//! and a source window, then blocks in a [`host::Console`] session with the
//! event's execution context live in the [`debugger::ContextBroker`]. When
//! the session ends the previous context is put back and the host resumes.

pub mod config;
pub mod debugger;
pub mod error;
pub mod executor;
pub mod host;
pub mod parser;
pub mod snippet;

pub use config::{Marker, TraceMode, TracerConfig};
pub use error::{HostError, Result, TracerError};
