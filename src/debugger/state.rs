use super::breakpoints::{resolve, BreakpointRegistry, ResolvedBreakpoint};
use super::context::{ContextBroker, Receiver};
use crate::config::TracerConfig;
use crate::error::{Result, TracerError};
use crate::host::{Console, Namespace};
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::io::{self, Write};
use std::rc::Rc;
use tracing::{debug, warn};

/// Everything the tracer shares between the controller, the dispatcher and
/// the console: one registry, one live context slot, one enabled flag.
pub struct DebuggerState {
    config: TracerConfig,
    namespace: Rc<dyn Namespace>,
    registry: RefCell<BreakpointRegistry>,
    broker: ContextBroker,
    enabled: Cell<bool>,
    out: RefCell<Box<dyn Write>>,
}

impl DebuggerState {
    /// Build the state from configuration, writing diagnostics to stdout.
    pub fn init(
        config: TracerConfig,
        namespace: Rc<dyn Namespace>,
        console: Rc<dyn Console>,
    ) -> Rc<Self> {
        Self::init_with_output(config, namespace, console, Box::new(io::stdout()))
    }

    pub fn init_with_output(
        config: TracerConfig,
        namespace: Rc<dyn Namespace>,
        console: Rc<dyn Console>,
        out: Box<dyn Write>,
    ) -> Rc<Self> {
        let mut registry = BreakpointRegistry::new(config.breakpoints.clone());
        for (unit, lines) in &config.unit_breakpoints {
            for line in lines {
                registry.add_unit_line(unit, *line);
            }
        }

        Rc::new(Self {
            config,
            namespace,
            registry: RefCell::new(registry),
            broker: ContextBroker::new(console),
            enabled: Cell::new(false),
            out: RefCell::new(out),
        })
    }

    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    pub fn namespace(&self) -> &dyn Namespace {
        self.namespace.as_ref()
    }

    pub fn broker(&self) -> &ContextBroker {
        &self.broker
    }

    pub fn registry(&self) -> Ref<'_, BreakpointRegistry> {
        self.registry.borrow()
    }

    pub fn registry_mut(&self) -> RefMut<'_, BreakpointRegistry> {
        self.registry.borrow_mut()
    }

    /// The registry, or `None` while someone holds it mutably.
    pub(crate) fn try_registry(&self) -> Option<Ref<'_, BreakpointRegistry>> {
        self.registry.try_borrow().ok()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub(crate) fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    /// Resolve `spec` and record it. A failure leaves the registry untouched.
    pub fn add_breakpoint(&self, spec: &str) -> Result<ResolvedBreakpoint> {
        // lookups may run traced code, so the registry is only borrowed for the insert
        let resolved = resolve(self.namespace.as_ref(), spec)?;
        if self
            .registry
            .borrow_mut()
            .add_resolved(resolved.owner, resolved.line)
        {
            debug!(%spec, line = resolved.line, "breakpoint added");
        }
        Ok(resolved)
    }

    /// Resolve the configured raw specs. Specs that fail are logged, skipped
    /// and returned; the rest still register. Only the first call does any work.
    pub fn resolve_pending(&self) -> Vec<TracerError> {
        let pending = self.registry.borrow_mut().take_pending();
        let Some(specs) = pending else {
            return Vec::new();
        };

        let mut failures = Vec::new();
        for spec in &specs {
            if let Err(e) = self.add_breakpoint(spec) {
                warn!(%spec, error = %e, "skipping breakpoint");
                failures.push(e);
            }
        }
        debug!(
            total = specs.len(),
            failed = failures.len(),
            "breakpoints resolved"
        );
        failures
    }

    /// Register a breakpoint on the line after `line`, the host line the
    /// marker was called from.
    ///
    /// The owner is `receiver` itself when it is a type, otherwise the
    /// receiver's type.
    pub fn break_here(&self, receiver: &Receiver, line: u32) -> Result<u32> {
        let owner = receiver
            .owner()
            .ok_or_else(|| TracerError::MissingReceiverType(receiver.to_string()))?;
        let next = line.saturating_add(1);

        self.registry.borrow_mut().add_resolved(owner, next);
        debug!(%receiver, line = next, "marker breakpoint registered");
        Ok(next)
    }

    /// Write one block of diagnostic text followed by the configured line ending.
    pub(crate) fn emit(&self, text: &str) {
        let mut out = self.out.borrow_mut();
        if let Err(e) = write_block(out.as_mut(), text, &self.config.line_ending) {
            warn!(error = %e, "failed to write tracer output");
        }
    }
}

fn write_block(out: &mut dyn Write, text: &str, line_ending: &str) -> io::Result<()> {
    out.write_all(text.as_bytes())?;
    out.write_all(line_ending.as_bytes())?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debugger::breakpoints::Location as BpLocation;
    use crate::debugger::ContextBroker;
    use crate::host::{NamespaceTable, OwnerId};
    use crate::parser::MethodKind;

    struct NullConsole;

    impl Console for NullConsole {
        fn is_enabled(&self) -> bool {
            false
        }
        fn set_enabled(&self, _enabled: bool) {}
        fn open(&self, _broker: &ContextBroker) {}
    }

    fn state(config: TracerConfig) -> (Rc<DebuggerState>, OwnerId) {
        let mut ns = NamespaceTable::new();
        let scene = ns.define("Scene_Base");
        ns.define_method(scene, MethodKind::Instance, "update", "Scene_Base", 40);
        let state = DebuggerState::init_with_output(
            config,
            Rc::new(ns),
            Rc::new(NullConsole),
            Box::new(io::sink()),
        );
        (state, scene)
    }

    #[test]
    fn test_init_loads_raw_and_unit_breakpoints() {
        let mut config = TracerConfig::default();
        config.breakpoints.push("Scene_Base#update".to_string());
        config.unit_breakpoints.insert("Scene_Map".to_string(), vec![3, 3, 9]);
        let (state, scene) = state(config);

        assert_eq!(state.registry().pending().len(), 1);
        assert!(state.registry().contains(BpLocation::Unit("Scene_Map"), 9));

        assert!(state.resolve_pending().is_empty());
        assert!(state.registry().contains(BpLocation::Owner(scene), 41));
        assert_eq!(state.registry().len(), 3);
    }

    #[test]
    fn test_pending_resolution_runs_once_and_skips_failures() {
        let mut config = TracerConfig::default();
        config.breakpoints = vec!["Nope#update".to_string(), "Scene_Base#update".to_string()];
        let (state, scene) = state(config);

        let failures = state.resolve_pending();
        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0], TracerError::UnresolvedOwner { .. }));
        assert!(state.registry().is_resolved());
        assert_eq!(state.registry().entries(), vec![(scene, 41)]);

        assert!(state.resolve_pending().is_empty());
        assert_eq!(state.registry().len(), 1);
    }

    #[test]
    fn test_registry_busy_while_borrowed_mutably() {
        let (state, _) = state(TracerConfig::default());
        assert!(state.try_registry().is_some());
        let held = state.registry_mut();
        assert!(state.try_registry().is_none());
        drop(held);
        assert!(state.try_registry().is_some());
    }

    #[test]
    fn test_break_here_uses_next_host_line_and_receiver_type() {
        let (state, scene) = state(TracerConfig::default());
        let receiver = Receiver::Instance {
            owner: Some(scene),
            type_name: Some("Scene_Base".to_string()),
            identity: 7,
        };

        assert_eq!(state.break_here(&receiver, 12).unwrap(), 13);
        assert!(state.registry().contains(BpLocation::Owner(scene), 13));
        assert!(!state.registry().contains(BpLocation::Owner(scene), 12));
    }

    #[test]
    fn test_break_here_on_type_receiver() {
        let (state, scene) = state(TracerConfig::default());
        let receiver = Receiver::Type {
            owner: scene,
            name: "Scene_Base".to_string(),
        };
        let line = state.break_here(&receiver, 3).unwrap();
        assert_eq!(state.registry().lines_for(scene), vec![4]);
        assert_eq!(line, 4);
    }

    #[test]
    fn test_break_here_without_owner_fails() {
        let (state, _) = state(TracerConfig::default());
        let receiver = Receiver::Instance {
            owner: None,
            type_name: None,
            identity: 1,
        };
        assert!(matches!(
            state.break_here(&receiver, 3),
            Err(TracerError::MissingReceiverType(_))
        ));
        assert!(state.registry().is_empty());
    }
}
