//! A toy host: a handful of scene types whose update methods are "executed"
//! by emitting line events, one frame at a time.

use break_tracer::debugger::{Binding, ContextRef, ExecutionContext, Receiver};
use break_tracer::host::{
    EventKind, FrameId, NamespaceTable, OwnerId, SourceCatalog, ToggleInput, TraceEvent,
    TraceHook, TraceHost,
};
use break_tracer::parser::MethodKind;
use break_tracer::HostError;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

const SCENE_BASE: &str = "\
class Scene_Base
  def update
    update_basic
    @frame_count += 1
    refresh if @frame_count % 60 == 0
  end

  def refresh
    @window.contents.clear
    @window.draw_text(0, 0, 200, 24, status_text)
  end
end";

const BATTLE_MANAGER: &str = "\
module BattleManager
  def self.setup(troop_id)
    @troop_id = troop_id
    init_members
  end

  def self.init_members
    @phase = :init
    @turn = 0
  end
end";

struct Method {
    owner: OwnerId,
    unit: usize,
    /// Signature line, 1-based.
    line: u32,
    body_lines: u32,
    receiver: ContextRef,
}

impl Method {
    fn new(owner: OwnerId, unit: usize, line: u32, body_lines: u32, receiver: ContextRef) -> Self {
        Self {
            owner,
            unit,
            line,
            body_lines,
            receiver,
        }
    }
}

pub struct DemoHost {
    hook: RefCell<Option<TraceHook>>,
    methods: Vec<Method>,
}

impl DemoHost {
    pub fn build() -> (Self, NamespaceTable, SourceCatalog) {
        let mut ns = NamespaceTable::new();
        let mut sources = SourceCatalog::new();

        let scene_unit = sources.push("Scene_Base", SCENE_BASE);
        let battle_unit = sources.push("BattleManager", BATTLE_MANAGER);

        let scene = ns.define("Scene_Base");
        ns.define_method(scene, MethodKind::Instance, "update", "Scene_Base", 2);
        ns.define_method(scene, MethodKind::Instance, "refresh", "Scene_Base", 8);
        let battle = ns.define("BattleManager");
        ns.define_method(battle, MethodKind::TypeLevel, "setup", "BattleManager", 2);
        ns.define_method(battle, MethodKind::TypeLevel, "init_members", "BattleManager", 7);

        let scene_self: ContextRef = Rc::new(ExecutionContext::new(
            Receiver::Instance {
                owner: Some(scene),
                type_name: Some("Scene_Base".to_string()),
                identity: 0x7f3a,
            },
            Binding {
                frame: FrameId(1),
                locals: vec![("@frame_count".to_string(), "0".to_string())],
            },
        ));
        let battle_self: ContextRef = Rc::new(ExecutionContext::new(
            Receiver::Type {
                owner: battle,
                name: "BattleManager".to_string(),
            },
            Binding {
                frame: FrameId(2),
                locals: vec![("troop_id".to_string(), "4".to_string())],
            },
        ));

        let methods = vec![
            Method::new(scene, scene_unit, 2, 3, scene_self.clone()),
            Method::new(scene, scene_unit, 8, 2, scene_self),
            Method::new(battle, battle_unit, 2, 2, battle_self.clone()),
            Method::new(battle, battle_unit, 7, 2, battle_self),
        ];

        let host = Self {
            hook: RefCell::new(None),
            methods,
        };
        (host, ns, sources)
    }

    fn emit(&self, event: &TraceEvent<'_>) {
        // clone so the hook may replace itself while running
        let hook = self.hook.borrow().clone();
        if let Some(hook) = hook {
            (*hook)(event);
        }
    }

    /// Run every method once, reporting a call event and one line event per body line.
    pub fn run_frame(&self) {
        for method in &self.methods {
            let unit = SourceCatalog::raw_id(method.unit);
            let mut event = TraceEvent {
                kind: EventKind::Call,
                unit: &unit,
                line: method.line,
                frame: method.receiver.binding.frame,
                context: &method.receiver,
                owner: Some(method.owner),
            };
            self.emit(&event);

            event.kind = EventKind::Line;
            for offset in 1..=method.body_lines {
                event.line = method.line + offset;
                self.emit(&event);
            }
        }
    }
}

impl TraceHost for DemoHost {
    fn set_trace_hook(&self, hook: Option<TraceHook>) -> Result<(), HostError> {
        *self.hook.borrow_mut() = hook;
        Ok(())
    }
}

/// Fires on the frames listed, standing in for a key press.
pub struct ScheduledToggle {
    frame: Cell<u32>,
    on: Vec<u32>,
}

impl ScheduledToggle {
    pub fn new(on: Vec<u32>) -> Self {
        Self {
            frame: Cell::new(0),
            on,
        }
    }

    pub fn advance(&self) {
        self.frame.set(self.frame.get() + 1);
    }
}

impl ToggleInput for ScheduledToggle {
    fn toggle_triggered(&self) -> bool {
        self.on.contains(&self.frame.get())
    }
}
