use crate::parser::MethodKind;
use rustc_hash::FxHashMap;

/// Identity of a type or namespace known to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(pub u32);

/// Where a method is defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSource {
    pub unit: String,
    /// Line of the method's signature.
    pub line: u32,
}

pub trait Namespace {
    /// Look up `name` inside `scope`, or among the top-level names when `scope` is `None`.
    fn child(&self, scope: Option<OwnerId>, name: &str) -> Option<OwnerId>;

    /// Fully qualified name, `None` for anonymous types.
    fn name_of(&self, owner: OwnerId) -> Option<&str>;

    fn type_method(&self, owner: OwnerId, method: &str) -> Option<MethodSource>;

    fn instance_method(&self, owner: OwnerId, method: &str) -> Option<MethodSource>;

    /// Walk a `::` path from the global root. On failure returns the first
    /// segment that did not resolve.
    fn resolve_path<'a>(&self, path: &'a [String]) -> Result<OwnerId, &'a str> {
        let mut scope = None;
        for segment in path {
            match self.child(scope, segment) {
                Some(owner) => scope = Some(owner),
                None => return Err(segment.as_str()),
            }
        }
        scope.ok_or("")
    }
}

#[derive(Debug, Default)]
struct TypeEntry {
    name: Option<String>,
    children: FxHashMap<String, OwnerId>,
    type_methods: FxHashMap<String, MethodSource>,
    instance_methods: FxHashMap<String, MethodSource>,
}

/// In-memory `Namespace` built up by the host before tracing starts.
#[derive(Debug, Default)]
pub struct NamespaceTable {
    types: Vec<TypeEntry>,
    roots: FxHashMap<String, OwnerId>,
}

impl NamespaceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define (or fetch) the top-level type `name`.
    pub fn define(&mut self, name: &str) -> OwnerId {
        if let Some(owner) = self.roots.get(name) {
            return *owner;
        }
        let owner = self.push(name.to_string());
        self.roots.insert(name.to_string(), owner);
        owner
    }

    /// Define (or fetch) `name` nested inside `parent`. `None` if `parent`
    /// does not belong to this table.
    pub fn define_in(&mut self, parent: OwnerId, name: &str) -> Option<OwnerId> {
        let scope = self.entry(parent)?;
        if let Some(owner) = scope.children.get(name) {
            return Some(*owner);
        }
        let qualified = match &scope.name {
            Some(prefix) => format!("{}::{}", prefix, name),
            None => name.to_string(),
        };
        let owner = self.push(qualified);
        self.entry_mut(parent)?
            .children
            .insert(name.to_string(), owner);
        Some(owner)
    }

    /// Attach a method to `owner`. Returns false if `owner` is not in this table.
    pub fn define_method(
        &mut self,
        owner: OwnerId,
        kind: MethodKind,
        method: &str,
        unit: &str,
        line: u32,
    ) -> bool {
        let Some(entry) = self.entry_mut(owner) else {
            return false;
        };
        let table = match kind {
            MethodKind::Instance => &mut entry.instance_methods,
            MethodKind::TypeLevel => &mut entry.type_methods,
        };
        table.insert(
            method.to_string(),
            MethodSource {
                unit: unit.to_string(),
                line,
            },
        );
        true
    }

    fn push(&mut self, qualified: String) -> OwnerId {
        let owner = OwnerId(self.types.len() as u32);
        self.types.push(TypeEntry {
            name: Some(qualified),
            ..TypeEntry::default()
        });
        owner
    }

    fn entry_mut(&mut self, owner: OwnerId) -> Option<&mut TypeEntry> {
        self.types.get_mut(owner.0 as usize)
    }

    fn entry(&self, owner: OwnerId) -> Option<&TypeEntry> {
        self.types.get(owner.0 as usize)
    }
}

impl Namespace for NamespaceTable {
    fn child(&self, scope: Option<OwnerId>, name: &str) -> Option<OwnerId> {
        match scope {
            Some(owner) => self.entry(owner)?.children.get(name).copied(),
            None => self.roots.get(name).copied(),
        }
    }

    fn name_of(&self, owner: OwnerId) -> Option<&str> {
        self.entry(owner)?.name.as_deref()
    }

    fn type_method(&self, owner: OwnerId, method: &str) -> Option<MethodSource> {
        self.entry(owner)?.type_methods.get(method).cloned()
    }

    fn instance_method(&self, owner: OwnerId, method: &str) -> Option<MethodSource> {
        self.entry(owner)?.instance_methods.get(method).cloned()
    }
}
