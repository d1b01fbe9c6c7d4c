mod controller;
mod dispatcher;

pub use controller::{Controller, RunState};
pub use dispatcher::TraceDispatcher;
