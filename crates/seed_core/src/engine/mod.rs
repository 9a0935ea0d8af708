//! Build engine: registry, listener dispatch and the recursive builder.
//!
//! A build walks the definitions depth-first. Every entity is instantiated,
//! has its property values resolved (building nested definitions completely
//! first), gets its properties assigned, is registered and finally announced
//! to listeners. Notification order is therefore completion order: nested
//! entities before their parent, siblings in declaration order.

mod builder;
mod listener;
mod registry;

pub use builder::{BuildMetrics, BuildReport, EntityBuilder};
pub use listener::EntityCreatedListener;
pub use registry::{DuplicateNameError, EntityKey, EntityRegistry, LookupError};
pub use seed_metrics::{BuildEvent, Phase};
