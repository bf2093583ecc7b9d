//! Enumeration engine.
//!
//! Leaf-first: the attribute accessor types raw queries, the visitors turn
//! one region or cache into a descriptor, the enumerator drives the traversal
//! and the session owns the runtime lifecycle.

mod accessor;
mod enumerator;
mod session;
mod visitor;

pub use accessor::{AttributeAccessor, unknown_on_error};
pub use enumerator::{ClassificationPolicy, EnumerationOptions, TopologyEnumerator};
pub use session::RuntimeSession;
pub use visitor::{GlobalIndexCounter, visit_cache, visit_region};
