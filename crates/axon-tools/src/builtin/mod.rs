//! Built-in tool implementations

pub mod calculate;
pub mod time;

use std::sync::Arc;

use crate::registry::ToolRegistry;

/// Register every built-in tool into the given registry
pub(crate) fn register_all(registry: &ToolRegistry) {
    registry.register("get_current_time", Arc::new(time::CurrentTime));
    registry.register("calculate", Arc::new(calculate::Calculate));
}
