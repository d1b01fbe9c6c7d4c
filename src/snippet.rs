use crate::config::{Marker, TracerConfig};
use crate::error::{Result, TracerError};

/// Renders a window of source around a target line.
#[derive(Debug, Clone)]
pub struct SnippetExtractor {
    marker: Marker,
    line_ending: String,
}

impl SnippetExtractor {
    pub fn new(marker: Marker, line_ending: impl Into<String>) -> Self {
        Self {
            marker,
            line_ending: line_ending.into(),
        }
    }

    pub fn from_config(config: &TracerConfig) -> Self {
        Self::new(config.marker.clone(), config.line_ending.clone())
    }

    /// Lines `target - wrap ..= target + wrap` of `source` (0-based), clamped
    /// to the source, with the target line marked.
    pub fn render(&self, source: &str, target: usize, wrap: usize) -> Result<String> {
        let lines: Vec<&str> = source.lines().collect();
        if target >= lines.len() {
            return Err(TracerError::OutOfRangeLine {
                line: target,
                len: lines.len(),
            });
        }

        let first = target.saturating_sub(wrap);
        let last = target.saturating_add(wrap).min(lines.len() - 1);

        let window: Vec<String> = (first..=last)
            .map(|i| {
                if i == target {
                    self.mark(lines[i])
                } else {
                    lines[i].to_string()
                }
            })
            .collect();
        Ok(window.join(&self.line_ending))
    }

    fn mark(&self, line: &str) -> String {
        match &self.marker {
            Marker::Prefix(glyph) => {
                let rest: String = line.chars().skip(glyph.chars().count()).collect();
                format!("{}{}", glyph, rest)
            }
            Marker::Suffix(glyph) => format!("{}{}", line, glyph),
        }
    }
}

impl Default for SnippetExtractor {
    fn default() -> Self {
        Self::new(Marker::default(), "\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> String {
        (0..n)
            .map(|i| format!("    line{}", i))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_window_clamps_at_start() {
        let out = SnippetExtractor::default().render(&numbered(10), 0, 5).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], ">>  line0");
        assert_eq!(lines[5], "    line5");
    }

    #[test]
    fn test_window_clamps_at_end() {
        let out = SnippetExtractor::default().render(&numbered(10), 8, 5).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "    line3");
        assert_eq!(lines[5], ">>  line8");
        assert_eq!(lines[6], "    line9");
    }

    #[test]
    fn test_window_never_exceeds_bound() {
        let source = numbered(30);
        let extractor = SnippetExtractor::default();
        for wrap in 0..8 {
            for target in 0..30 {
                let out = extractor.render(&source, target, wrap).unwrap();
                let count = out.lines().count();
                assert!(count <= 2 * wrap + 1);
                assert_eq!(out.matches(">>").count(), 1);
            }
        }
    }

    #[test]
    fn test_suffix_marker_and_line_ending() {
        let extractor = SnippetExtractor::new(Marker::Suffix("  # <-".to_string()), "\r\n");
        let out = extractor.render("a\nb\nc", 1, 1).unwrap();
        assert_eq!(out, "a\r\nb  # <-\r\nc");
    }

    #[test]
    fn test_prefix_on_short_line() {
        let out = SnippetExtractor::default().render("x\n\ny", 1, 0).unwrap();
        assert_eq!(out, ">>");
    }

    #[test]
    fn test_out_of_range_target() {
        let err = SnippetExtractor::default().render("a\nb", 2, 5).unwrap_err();
        assert!(matches!(err, TracerError::OutOfRangeLine { line: 2, len: 2 }));
        assert!(SnippetExtractor::default().render("", 0, 0).is_err());
    }
}
