use crate::error::{Result, TracerError};
use crate::host::{MethodSource, Namespace, OwnerId};
use crate::parser::{parse_spec, BreakpointSpec, MethodKind};
use rustc_hash::{FxHashMap, FxHashSet};

/// What a breakpoint is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location<'a> {
    Owner(OwnerId),
    Unit(&'a str),
}

/// Outcome of looking a method up for a spec, in attempt order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodLookup {
    TypeLevel(MethodSource),
    InstanceLevel(MethodSource),
    NotFound,
}

/// `Owner.method` tries the type-level table first and falls back to the
/// instance table; `Owner#method` only looks at the instance table.
pub fn resolve_method(
    namespace: &dyn Namespace,
    owner: OwnerId,
    kind: MethodKind,
    method: &str,
) -> MethodLookup {
    if kind == MethodKind::TypeLevel {
        if let Some(source) = namespace.type_method(owner, method) {
            return MethodLookup::TypeLevel(source);
        }
    }
    match namespace.instance_method(owner, method) {
        Some(source) => MethodLookup::InstanceLevel(source),
        None => MethodLookup::NotFound,
    }
}

/// A spec after successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBreakpoint {
    pub owner: OwnerId,
    /// First line of the method body.
    pub line: u32,
    /// Which method table the spec resolved through.
    pub via: MethodKind,
}

/// Resolve one spec against `namespace` without touching any registry.
pub fn resolve_spec(namespace: &dyn Namespace, spec: &BreakpointSpec) -> Result<ResolvedBreakpoint> {
    let text = spec.to_string();
    let owner = namespace
        .resolve_path(&spec.path)
        .map_err(|segment| TracerError::UnresolvedOwner {
            spec: text.clone(),
            segment: segment.to_string(),
        })?;

    let (source, via) = match resolve_method(namespace, owner, spec.kind, &spec.method) {
        MethodLookup::TypeLevel(source) => (source, MethodKind::TypeLevel),
        MethodLookup::InstanceLevel(source) => (source, MethodKind::Instance),
        MethodLookup::NotFound => {
            return Err(TracerError::UnresolvedMethod {
                spec: text,
                method: spec.method.clone(),
            })
        }
    };

    Ok(ResolvedBreakpoint {
        owner,
        line: source.line + 1,
        via,
    })
}

/// Parse `spec` and resolve it against `namespace`.
pub fn resolve(namespace: &dyn Namespace, spec: &str) -> Result<ResolvedBreakpoint> {
    let parsed = parse_spec(spec)?;
    resolve_spec(namespace, &parsed)
}

/// Process-wide breakpoint table.
///
/// Starts out holding the raw spec strings from configuration. They are
/// handed out once by [`BreakpointRegistry::take_pending`]; resolved entries
/// can be added at any point, before or after that.
#[derive(Debug, Default)]
pub struct BreakpointRegistry {
    pending: Option<Vec<String>>,
    owners: FxHashMap<OwnerId, FxHashSet<u32>>,
    units: FxHashMap<String, FxHashSet<u32>>,
}

impl BreakpointRegistry {
    /// A registry still holding `specs` in raw form.
    pub fn new(specs: Vec<String>) -> Self {
        Self {
            pending: Some(specs),
            ..Self::default()
        }
    }

    /// A registry with nothing left to resolve.
    pub fn resolved() -> Self {
        Self::default()
    }

    pub fn is_resolved(&self) -> bool {
        self.pending.is_none()
    }

    /// Raw specs waiting for conversion.
    pub fn pending(&self) -> &[String] {
        self.pending.as_deref().unwrap_or(&[])
    }

    /// Record `(owner, line)`. Returns false if it was already present.
    pub fn add_resolved(&mut self, owner: OwnerId, line: u32) -> bool {
        self.owners.entry(owner).or_default().insert(line)
    }

    /// Record a source-unit breakpoint. Returns false if it was already present.
    pub fn add_unit_line(&mut self, unit: &str, line: u32) -> bool {
        self.units.entry(unit.to_string()).or_default().insert(line)
    }

    /// Hand over the raw specs for resolution. Only the first call returns
    /// them; the registry counts as resolved from then on.
    pub fn take_pending(&mut self) -> Option<Vec<String>> {
        self.pending.take()
    }

    pub fn contains(&self, location: Location<'_>, line: u32) -> bool {
        match location {
            Location::Owner(owner) => self
                .owners
                .get(&owner)
                .is_some_and(|lines| lines.contains(&line)),
            Location::Unit(unit) => self
                .units
                .get(unit)
                .is_some_and(|lines| lines.contains(&line)),
        }
    }

    pub fn remove(&mut self, owner: OwnerId, line: u32) -> bool {
        let Some(lines) = self.owners.get_mut(&owner) else {
            return false;
        };
        let removed = lines.remove(&line);
        if lines.is_empty() {
            self.owners.remove(&owner);
        }
        removed
    }

    pub fn remove_unit_line(&mut self, unit: &str, line: u32) -> bool {
        let Some(lines) = self.units.get_mut(unit) else {
            return false;
        };
        let removed = lines.remove(&line);
        if lines.is_empty() {
            self.units.remove(unit);
        }
        removed
    }

    /// Sorted trigger lines for `owner`.
    pub fn lines_for(&self, owner: OwnerId) -> Vec<u32> {
        let mut lines: Vec<u32> = self
            .owners
            .get(&owner)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        lines.sort_unstable();
        lines
    }

    /// Every resolved entry, ordered by owner then line.
    pub fn entries(&self) -> Vec<(OwnerId, u32)> {
        let mut all: Vec<(OwnerId, u32)> = self
            .owners
            .iter()
            .flat_map(|(owner, lines)| lines.iter().map(move |line| (*owner, *line)))
            .collect();
        all.sort_unstable();
        all
    }

    /// Resolved and source-unit entries; pending specs are not counted.
    pub fn len(&self) -> usize {
        self.owners.values().map(|l| l.len()).sum::<usize>()
            + self.units.values().map(|l| l.len()).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0 && self.pending().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NamespaceTable;

    fn namespace() -> (NamespaceTable, OwnerId, OwnerId) {
        let mut ns = NamespaceTable::new();
        let scene = ns.define("Scene_Base");
        ns.define_method(scene, MethodKind::Instance, "update", "Scene_Base", 40);
        let battle = ns.define("BattleManager");
        ns.define_method(battle, MethodKind::Instance, "process_turn", "BattleManager", 70);
        ns.define_method(battle, MethodKind::TypeLevel, "init_members", "BattleManager", 20);
        ns.define_method(battle, MethodKind::Instance, "init_members", "BattleManager", 90);
        (ns, scene, battle)
    }

    fn add(reg: &mut BreakpointRegistry, ns: &NamespaceTable, spec: &str) -> Result<ResolvedBreakpoint> {
        let bp = resolve(ns, spec)?;
        reg.add_resolved(bp.owner, bp.line);
        Ok(bp)
    }

    #[test]
    fn test_instance_spec_targets_first_body_line() {
        let (ns, scene, _) = namespace();
        let mut reg = BreakpointRegistry::resolved();
        let bp = add(&mut reg, &ns, "Scene_Base#update").unwrap();
        assert_eq!(bp.owner, scene);
        assert_eq!(bp.line, 41);
        assert!(reg.contains(Location::Owner(scene), 41));
        assert!(!reg.contains(Location::Owner(scene), 40));
    }

    #[test]
    fn test_duplicate_add_is_idempotent() {
        let (ns, scene, _) = namespace();
        let mut reg = BreakpointRegistry::resolved();
        add(&mut reg, &ns, "Scene_Base#update").unwrap();
        add(&mut reg, &ns, "Scene_Base#update").unwrap();
        assert!(!reg.add_resolved(scene, 41));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.lines_for(scene), vec![41]);
    }

    #[test]
    fn test_type_level_spec_falls_back_to_instance_method() {
        let (ns, _, battle) = namespace();
        let bp = resolve(&ns, "BattleManager.process_turn").unwrap();
        assert_eq!(bp.via, MethodKind::Instance);
        assert_eq!((bp.owner, bp.line), (battle, 71));
    }

    #[test]
    fn test_type_level_wins_when_both_exist() {
        let (ns, _, battle) = namespace();
        let mut reg = BreakpointRegistry::resolved();
        let bp = add(&mut reg, &ns, "BattleManager.init_members").unwrap();
        assert_eq!(bp.via, MethodKind::TypeLevel);
        assert_eq!(reg.lines_for(battle), vec![21]);
    }

    #[test]
    fn test_instance_spec_never_uses_type_table() {
        let mut ns = NamespaceTable::new();
        let owner = ns.define("DataManager");
        ns.define_method(owner, MethodKind::TypeLevel, "load", "DataManager", 5);
        let err = resolve(&ns, "DataManager#load").unwrap_err();
        assert!(matches!(err, TracerError::UnresolvedMethod { .. }));
    }

    #[test]
    fn test_missing_method_leaves_registry_unchanged() {
        let (ns, scene, _) = namespace();
        let mut reg = BreakpointRegistry::resolved();
        add(&mut reg, &ns, "Scene_Base#update").unwrap();

        let err = add(&mut reg, &ns, "BattleManager.setup").unwrap_err();
        assert!(matches!(err, TracerError::UnresolvedMethod { ref method, .. } if method == "setup"));
        assert_eq!(reg.entries(), vec![(scene, 41)]);
    }

    #[test]
    fn test_unknown_owner_segment() {
        let (ns, _, _) = namespace();
        let err = resolve(&ns, "Scene_Base::Window#refresh").unwrap_err();
        assert!(matches!(err, TracerError::UnresolvedOwner { ref segment, .. } if segment == "Window"));
    }

    #[test]
    fn test_malformed_spec_is_rejected_before_lookup() {
        let (ns, _, _) = namespace();
        assert!(matches!(
            resolve(&ns, "Scene_Base update"),
            Err(TracerError::InvalidSpec { .. })
        ));
    }

    #[test]
    fn test_pending_specs_are_handed_out_once() {
        let mut reg = BreakpointRegistry::new(vec!["Scene_Base#update".to_string()]);
        assert!(!reg.is_resolved());
        assert!(!reg.is_empty());

        assert_eq!(reg.take_pending(), Some(vec!["Scene_Base#update".to_string()]));
        assert!(reg.is_resolved());
        assert!(reg.take_pending().is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn test_add_before_resolution_keeps_pending() {
        let (ns, scene, _) = namespace();
        let mut reg = BreakpointRegistry::new(vec!["BattleManager.process_turn".to_string()]);
        add(&mut reg, &ns, "Scene_Base#update").unwrap();
        assert_eq!(reg.pending().len(), 1);
        assert!(reg.contains(Location::Owner(scene), 41));
    }

    #[test]
    fn test_unit_lines_and_removal() {
        let mut reg = BreakpointRegistry::resolved();
        assert!(reg.add_unit_line("Scene_Map", 12));
        assert!(!reg.add_unit_line("Scene_Map", 12));
        assert!(reg.contains(Location::Unit("Scene_Map"), 12));
        assert!(!reg.contains(Location::Unit("Scene_Title"), 12));

        assert!(reg.remove_unit_line("Scene_Map", 12));
        assert!(!reg.remove_unit_line("Scene_Map", 12));
        assert!(reg.is_empty());
    }
}
