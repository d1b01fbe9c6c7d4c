use super::types::{BreakpointSpec, MethodKind};
use crate::error::{Result, TracerError};

fn is_ident(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Method names may carry one trailing `?`, `!` or `=`.
fn is_method_ident(name: &str) -> bool {
    let base = name
        .strip_suffix(['?', '!', '='])
        .unwrap_or(name);
    is_ident(base)
}

fn invalid(spec: &str, reason: &'static str) -> TracerError {
    TracerError::InvalidSpec {
        spec: spec.to_string(),
        reason,
    }
}

/// Parse `Ident(::Ident)* ('#' | '.') Ident`.
pub fn parse_spec(text: &str) -> Result<BreakpointSpec> {
    let trimmed = text.trim();

    let sep_pos = trimmed
        .rfind(['#', '.'])
        .ok_or_else(|| invalid(trimmed, "missing `#` or `.` before the method name"))?;

    let (owner, rest) = trimmed.split_at(sep_pos);
    let kind = if rest.starts_with('#') {
        MethodKind::Instance
    } else {
        MethodKind::TypeLevel
    };
    let method = &rest[1..];

    if owner.is_empty() {
        return Err(invalid(trimmed, "empty owner"));
    }
    if !is_method_ident(method) {
        return Err(invalid(trimmed, "method name is not an identifier"));
    }

    let mut path = Vec::new();
    for segment in owner.split("::") {
        if !is_ident(segment) {
            return Err(invalid(trimmed, "owner path segment is not an identifier"));
        }
        path.push(segment.to_string());
    }

    Ok(BreakpointSpec {
        path,
        kind,
        method: method.to_string(),
    })
}
