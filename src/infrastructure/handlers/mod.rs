//! Component handlers
//!
//! Two handlers cover all component kinds: [`StructuredHandler`] for JSON
//! components and [`ProseHandler`] for markdown components. Both run the
//! same write protocol against the per-platform [`Layout`].

mod layout;
mod prose;
mod protocol;
mod structured;

use std::sync::Arc;

use crate::domain::ports::ComponentHandler;
use crate::domain::value_objects::ComponentKind;

pub use layout::Layout;
pub use prose::ProseHandler;
pub use structured::StructuredHandler;

/// Handlers for every component kind
pub fn default_handlers() -> Vec<Arc<dyn ComponentHandler>> {
    vec![Arc::new(StructuredHandler::new()), Arc::new(ProseHandler::new())]
}

/// First handler that accepts `kind`
pub fn handler_for(
    handlers: &[Arc<dyn ComponentHandler>],
    kind: ComponentKind,
) -> Option<Arc<dyn ComponentHandler>> {
    handlers.iter().find(|h| h.handles(kind)).cloned()
}
