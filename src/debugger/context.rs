use crate::host::{Console, FrameId, OwnerId};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Lexical binding captured at a program point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding {
    pub frame: FrameId,
    pub locals: Vec<(String, String)>,
}

/// The `self` of a program point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receiver {
    /// The receiver is itself a type or namespace.
    Type { owner: OwnerId, name: String },
    Instance {
        /// Owning type, if the host knows it.
        owner: Option<OwnerId>,
        /// Runtime type name; `None` for objects whose type has no accessible name.
        type_name: Option<String>,
        identity: u64,
    },
}

impl Receiver {
    /// The type a breakpoint placed from this receiver belongs to.
    pub fn owner(&self) -> Option<OwnerId> {
        match self {
            Receiver::Type { owner, .. } => Some(*owner),
            Receiver::Instance { owner, .. } => *owner,
        }
    }
}

impl fmt::Display for Receiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Receiver::Type { name, .. } => f.write_str(name),
            Receiver::Instance {
                type_name,
                identity,
                ..
            } => write!(
                f,
                "{} 0x{:014x}",
                type_name.as_deref().unwrap_or(""),
                identity << 1
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    pub receiver: Receiver,
    pub binding: Binding,
}

impl ExecutionContext {
    pub fn new(receiver: Receiver, binding: Binding) -> Self {
        Self { receiver, binding }
    }

    pub fn describe(&self) -> String {
        self.receiver.to_string()
    }
}

pub type ContextRef = Rc<ExecutionContext>;

/// Description of a live slot, including the empty top-level one.
pub fn describe_slot(slot: Option<&ContextRef>) -> String {
    match slot {
        Some(ctx) => ctx.describe(),
        None => "main".to_string(),
    }
}

/// Owns the context the console talks to.
///
/// Only one context is live at a time. Each suspension returns the context it
/// displaced; the caller keeps it on its own stack and puts it back with
/// [`ContextBroker::set`], so nested suspensions unwind in LIFO order without
/// a shared stack.
pub struct ContextBroker {
    live: RefCell<Option<ContextRef>>,
    console: Rc<dyn Console>,
}

impl ContextBroker {
    pub fn new(console: Rc<dyn Console>) -> Self {
        Self {
            live: RefCell::new(None),
            console,
        }
    }

    pub fn current(&self) -> Option<ContextRef> {
        self.live.borrow().clone()
    }

    pub fn set(&self, context: Option<ContextRef>) {
        *self.live.borrow_mut() = context;
    }

    pub fn console(&self) -> &dyn Console {
        self.console.as_ref()
    }

    /// Make `context` live and block in the console until the session ends.
    ///
    /// Returns the previously live context. The caller restores it.
    pub fn suspend(&self, context: ContextRef) -> Option<ContextRef> {
        let previous = self.live.replace(Some(context));
        let was_enabled = self.console.is_enabled();

        self.console.set_enabled(true);
        self.console.open(self);
        self.console.set_enabled(was_enabled);

        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct RecordingConsole {
        enabled: Cell<bool>,
        seen: RefCell<Vec<Option<ContextRef>>>,
        enabled_during_open: Cell<bool>,
    }

    impl Console for RecordingConsole {
        fn is_enabled(&self) -> bool {
            self.enabled.get()
        }

        fn set_enabled(&self, enabled: bool) {
            self.enabled.set(enabled);
        }

        fn open(&self, broker: &ContextBroker) {
            self.enabled_during_open.set(self.enabled.get());
            self.seen.borrow_mut().push(broker.current());
        }
    }

    fn instance(identity: u64) -> ContextRef {
        Rc::new(ExecutionContext::new(
            Receiver::Instance {
                owner: None,
                type_name: Some("Game_Actor".to_string()),
                identity,
            },
            Binding::default(),
        ))
    }

    #[test]
    fn test_describe_type_and_instance() {
        let ty = Receiver::Type {
            owner: OwnerId(0),
            name: "BattleManager".to_string(),
        };
        assert_eq!(ty.to_string(), "BattleManager");

        let obj = Receiver::Instance {
            owner: Some(OwnerId(1)),
            type_name: Some("Game_Actor".to_string()),
            identity: 0x1234,
        };
        assert_eq!(obj.to_string(), "Game_Actor 0x00000000002468");
    }

    #[test]
    fn test_describe_nameless_instance_keeps_identity() {
        let obj = Receiver::Instance {
            owner: None,
            type_name: None,
            identity: 8,
        };
        assert_eq!(obj.to_string(), " 0x00000000000010");
    }

    #[test]
    fn test_suspend_returns_previous_and_leaves_new_live() {
        let console = Rc::new(RecordingConsole {
            enabled: Cell::new(false),
            seen: RefCell::new(Vec::new()),
            enabled_during_open: Cell::new(false),
        });
        let broker = ContextBroker::new(console.clone());
        let first = instance(1);
        broker.set(Some(first.clone()));

        let second = instance(2);
        let previous = broker.suspend(second.clone());

        assert!(Rc::ptr_eq(previous.as_ref().unwrap(), &first));
        assert!(Rc::ptr_eq(broker.current().as_ref().unwrap(), &second));
        assert!(console.enabled_during_open.get());
        assert!(!console.is_enabled());

        let seen = console.seen.borrow();
        assert!(Rc::ptr_eq(seen[0].as_ref().unwrap(), &second));
    }

    #[test]
    fn test_describe_empty_slot() {
        assert_eq!(describe_slot(None), "main");
    }
}
