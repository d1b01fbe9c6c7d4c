use std::fmt;

/// Which method table a spec points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    /// `Owner#method`
    Instance,
    /// `Owner.method`
    TypeLevel,
}

impl MethodKind {
    pub fn separator(self) -> char {
        match self {
            MethodKind::Instance => '#',
            MethodKind::TypeLevel => '.',
        }
    }
}

/// A parsed `Owner(::Nested)*{#|.}method` string, not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointSpec {
    pub path: Vec<String>,
    pub kind: MethodKind,
    pub method: String,
}

impl fmt::Display for BreakpointSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.path.join("::"),
            self.kind.separator(),
            self.method
        )
    }
}
