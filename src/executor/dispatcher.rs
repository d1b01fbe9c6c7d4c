use crate::config::TraceMode;
use crate::debugger::{describe_slot, DebuggerState, Location};
use crate::host::{unit_index, EventKind, SourceTable, TraceEvent};
use crate::snippet::SnippetExtractor;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// The callback the host invokes for every traced instruction.
pub struct TraceDispatcher {
    state: Rc<DebuggerState>,
    sources: Rc<dyn SourceTable>,
    snippets: SnippetExtractor,
    mode: TraceMode,
}

impl TraceDispatcher {
    pub fn new(state: Rc<DebuggerState>, sources: Rc<dyn SourceTable>) -> Self {
        let snippets = SnippetExtractor::from_config(state.config());
        let mode = state.config().mode;
        Self {
            state,
            sources,
            snippets,
            mode,
        }
    }

    /// Whether events of `kind` can ever hit in the configured mode.
    #[inline]
    pub fn accepts(&self, kind: EventKind) -> bool {
        match self.mode {
            TraceMode::Owner => kind == EventKind::Line,
            TraceMode::SourceUnit => matches!(kind, EventKind::Call | EventKind::CCall),
        }
    }

    /// Handle one event. Returns true if it hit a breakpoint; in that case the
    /// call only returns once the console session has ended.
    pub fn dispatch(&self, event: &TraceEvent<'_>) -> bool {
        if !self.accepts(event.kind) {
            return false;
        }
        let Some(label) = self.matched_label(event) else {
            return false;
        };
        self.on_hit(&label, event);
        true
    }

    fn matched_label(&self, event: &TraceEvent<'_>) -> Option<String> {
        let Some(registry) = self.state.try_registry() else {
            debug!(line = event.line, "registry busy, event skipped");
            return None;
        };
        match self.mode {
            TraceMode::Owner => {
                let owner = event.owner?;
                if !registry.contains(Location::Owner(owner), event.line) {
                    return None;
                }
                let name = self.state.namespace().name_of(owner).unwrap_or("?");
                Some(name.to_string())
            }
            TraceMode::SourceUnit => {
                let name = self.sources.unit_name(unit_index(event.unit)?)?;
                if !registry.contains(Location::Unit(name), event.line) {
                    return None;
                }
                Some(name.to_string())
            }
        }
    }

    fn snippet(&self, event: &TraceEvent<'_>) -> Option<String> {
        let Some(text) = unit_index(event.unit).and_then(|i| self.sources.source_text(i)) else {
            warn!(unit = event.unit, "no source text for unit");
            return None;
        };
        // hosts report 1-based lines
        let Some(target) = (event.line as usize).checked_sub(1) else {
            warn!(unit = event.unit, "line 0 has no source");
            return None;
        };
        match self.snippets.render(text, target, self.state.config().wrap) {
            Ok(snippet) => Some(snippet),
            Err(e) => {
                warn!(unit = event.unit, error = %e, "cannot render snippet");
                None
            }
        }
    }

    fn on_hit(&self, label: &str, event: &TraceEvent<'_>) {
        let entering = event.context.describe();
        info!(location = %label, line = event.line, context = %entering, "breakpoint hit");

        self.state
            .emit(&format!("Breakpoint {}:{} in {}", label, event.line, entering));
        if let Some(snippet) = self.snippet(event) {
            self.state.emit(&snippet);
        }

        let broker = self.state.broker();
        let previous = broker.suspend(Rc::clone(event.context));
        broker.set(previous.clone());

        self.state.emit(&format!(
            "Resuming; context restored to {}",
            describe_slot(previous.as_ref())
        ));
    }
}
