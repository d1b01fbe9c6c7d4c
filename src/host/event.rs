use crate::debugger::ContextRef;
use crate::error::HostError;
use crate::host::OwnerId;
use std::rc::Rc;
use std::str::FromStr;
use thiserror::Error;

/// Kinds of execution events a host reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Line,
    Call,
    CCall,
    Return,
    CReturn,
    Class,
    End,
    Raise,
}

#[derive(Debug, Clone, Error)]
#[error("unknown trace event kind `{0}`")]
pub struct ParseEventKindError(pub String);

impl FromStr for EventKind {
    type Err = ParseEventKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line" => Ok(EventKind::Line),
            "call" => Ok(EventKind::Call),
            "c-call" => Ok(EventKind::CCall),
            "return" => Ok(EventKind::Return),
            "c-return" => Ok(EventKind::CReturn),
            "class" => Ok(EventKind::Class),
            "end" => Ok(EventKind::End),
            "raise" => Ok(EventKind::Raise),
            other => Err(ParseEventKindError(other.to_string())),
        }
    }
}

/// Opaque host frame handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FrameId(pub u64);

/// One traced instruction.
#[derive(Debug, Clone, Copy)]
pub struct TraceEvent<'a> {
    pub kind: EventKind,
    /// Raw unit id as the host encodes it.
    pub unit: &'a str,
    pub line: u32,
    pub frame: FrameId,
    pub context: &'a ContextRef,
    pub owner: Option<OwnerId>,
}

pub type TraceHook = Rc<dyn Fn(&TraceEvent<'_>)>;

/// Wrap a closure as a [`TraceHook`].
pub fn trace_hook<F>(f: F) -> TraceHook
where
    F: Fn(&TraceEvent<'_>) + 'static,
{
    Rc::new(f)
}

/// The host's execution-tracing facility.
pub trait TraceHost {
    /// Install `hook` as the active trace callback; `None` uninstalls.
    fn set_trace_hook(&self, hook: Option<TraceHook>) -> Result<(), HostError>;

    /// Hand window focus back to the host.
    fn release_focus(&self) -> Result<(), HostError> {
        Ok(())
    }
}
