use crate::debugger::ContextBroker;

/// The interactive console a suspension hands control to.
///
/// Methods take `&self`: a breakpoint can fire again while `open` is still
/// running, so implementations keep their own state behind `Cell`/`RefCell`.
pub trait Console {
    fn is_enabled(&self) -> bool;

    fn set_enabled(&self, enabled: bool);

    /// Run a session until the user ends it. The session reads and replaces
    /// the live context through `broker`.
    fn open(&self, broker: &ContextBroker);
}

/// Polled once per frame to decide whether tracing should flip on or off.
pub trait ToggleInput {
    fn toggle_triggered(&self) -> bool;
}

/// Host lifecycle notifications the tracer subscribes to at startup.
pub trait Lifecycle {
    /// Game data is loaded; every type a breakpoint can name now exists.
    fn on_data_init(&self);

    fn on_frame_tick(&self, input: &dyn ToggleInput);
}
