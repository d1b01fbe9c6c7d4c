use super::dispatcher::TraceDispatcher;
use crate::debugger::DebuggerState;
use crate::host::{trace_hook, Lifecycle, SourceTable, ToggleInput, TraceHost};
use std::cell::Cell;
use std::rc::Rc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
}

/// Owns the tracer's lifecycle: installs and removes the dispatcher as the
/// host's trace hook.
pub struct Controller {
    state: Rc<DebuggerState>,
    host: Rc<dyn TraceHost>,
    dispatcher: Rc<TraceDispatcher>,
    run_state: Cell<RunState>,
}

impl Controller {
    pub fn new(
        state: Rc<DebuggerState>,
        host: Rc<dyn TraceHost>,
        sources: Rc<dyn SourceTable>,
    ) -> Self {
        let dispatcher = Rc::new(TraceDispatcher::new(state.clone(), sources));
        Self {
            state,
            host,
            dispatcher,
            run_state: Cell::new(RunState::Stopped),
        }
    }

    pub fn state(&self) -> &Rc<DebuggerState> {
        &self.state
    }

    pub fn run_state(&self) -> RunState {
        self.run_state.get()
    }

    pub fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }

    /// Install the trace hook. Returns false if tracing could not start.
    pub fn start(&self) -> bool {
        if self.run_state.get() == RunState::Running {
            return true;
        }

        self.state.resolve_pending();
        if self.state.config().require_breakpoints && self.state.registry().is_empty() {
            warn!("no breakpoints registered, not starting");
            return false;
        }

        let dispatcher = Rc::clone(&self.dispatcher);
        let hook = trace_hook(move |event| {
            dispatcher.dispatch(event);
        });
        if let Err(e) = self.host.set_trace_hook(Some(hook)) {
            error!(error = %e, "failed to install trace hook");
            return false;
        }

        self.state.set_enabled(true);
        self.run_state.set(RunState::Running);
        info!(breakpoints = self.state.registry().len(), "tracing started");
        true
    }

    /// Remove the trace hook. Returns false if the host refused; the tracer
    /// then stays enabled and `stop` may be retried.
    pub fn stop(&self) -> bool {
        if let Err(e) = self.host.set_trace_hook(None) {
            error!(error = %e, "failed to uninstall trace hook");
            return false;
        }
        self.state.set_enabled(false);
        self.run_state.set(RunState::Stopped);

        if self.state.config().focus_on_stop && !self.state.broker().console().is_enabled() {
            if let Err(e) = self.host.release_focus() {
                error!(error = %e, "failed to release focus");
                return false;
            }
        }

        info!("tracing stopped");
        true
    }

    pub fn toggle(&self) -> bool {
        if self.is_enabled() {
            self.stop()
        } else {
            self.start()
        }
    }
}

impl Lifecycle for Controller {
    fn on_data_init(&self) {
        let failures = self.state.resolve_pending();
        if !failures.is_empty() {
            warn!(count = failures.len(), "some breakpoints did not resolve");
        }
    }

    fn on_frame_tick(&self, input: &dyn ToggleInput) {
        if input.toggle_triggered() {
            self.toggle();
        }
    }
}
