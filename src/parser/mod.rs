mod spec;
mod types;

pub use spec::parse_spec;
pub use types::{BreakpointSpec, MethodKind};
