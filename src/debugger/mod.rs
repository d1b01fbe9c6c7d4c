mod breakpoints;
mod context;
mod session;
mod state;

pub use breakpoints::{
    resolve, resolve_method, resolve_spec, BreakpointRegistry, Location, MethodLookup, ResolvedBreakpoint,
};
pub use context::{describe_slot, Binding, ContextBroker, ContextRef, ExecutionContext, Receiver};
pub use session::LineConsole;
pub use state::DebuggerState;
