use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which trace events count and what a breakpoint is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceMode {
    /// Line events, keyed by the resolved owner type.
    #[default]
    Owner,
    /// Call / c-call events, keyed by the source unit's name.
    SourceUnit,
}

/// How the target line of a snippet is marked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    /// Overwrites the first N characters of the line with the glyph.
    Prefix(String),
    /// Appends the glyph to the line.
    Suffix(String),
}

impl Default for Marker {
    fn default() -> Self {
        Marker::Prefix(">>".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracerConfig {
    pub mode: TraceMode,
    /// Lines shown on each side of the target line.
    pub wrap: usize,
    pub marker: Marker,
    pub line_ending: String,
    /// Refuse to start while the registry is empty.
    pub require_breakpoints: bool,
    /// Release host focus on stop, unless a console session is open.
    pub focus_on_stop: bool,
    /// Raw `Owner#method` / `Owner.method` specs, resolved on data init.
    pub breakpoints: Vec<String>,
    /// Source-unit mode targets: unit name -> raw lines.
    pub unit_breakpoints: BTreeMap<String, Vec<u32>>,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            mode: TraceMode::Owner,
            wrap: 5,
            marker: Marker::default(),
            line_ending: "\n".to_string(),
            require_breakpoints: false,
            focus_on_stop: false,
            breakpoints: Vec::new(),
            unit_breakpoints: BTreeMap::new(),
        }
    }
}

impl TracerConfig {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
