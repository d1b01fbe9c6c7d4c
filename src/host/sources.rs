/// Read-only view of the host's script table.
pub trait SourceTable {
    /// Human readable name of the unit at `index`.
    fn unit_name(&self, index: usize) -> Option<&str>;

    /// Full decoded source text of the unit at `index`.
    fn source_text(&self, index: usize) -> Option<&str>;
}

/// Extract the numeric index a host encodes in a raw unit id (`{0042}`, `Section042`).
pub fn unit_index(raw: &str) -> Option<usize> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let digits = &raw[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}

#[derive(Debug, Clone)]
struct SourceUnit {
    name: String,
    text: String,
}

#[derive(Debug, Clone, Default)]
pub struct SourceCatalog {
    units: Vec<SourceUnit>,
}

impl SourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a unit and return its index.
    pub fn push(&mut self, name: impl Into<String>, text: impl Into<String>) -> usize {
        self.units.push(SourceUnit {
            name: name.into(),
            text: text.into(),
        });
        self.units.len() - 1
    }

    /// The raw id the host reports for the unit at `index`.
    pub fn raw_id(index: usize) -> String {
        format!("{{{:04}}}", index)
    }
}

impl SourceTable for SourceCatalog {
    fn unit_name(&self, index: usize) -> Option<&str> {
        self.units.get(index).map(|u| u.name.as_str())
    }

    fn source_text(&self, index: usize) -> Option<&str> {
        self.units.get(index).map(|u| u.text.as_str())
    }
}
