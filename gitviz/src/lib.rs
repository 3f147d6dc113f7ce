//! Reconstruct the object graph of a git repository and describe it in the
//! Graphviz DOT language.
//!
//! Objects are discovered through an [`ObjectStore`]: loose objects first,
//! then the entries of every pack, which also tell which objects are stored
//! as deltas. The resulting [`Graph`] is serialized with [`dot::document`]
//! and handed to a [`render::Renderer`].
pub mod dot;
pub mod graph;
pub mod hash;
#[cfg(feature = "logger")]
pub mod logger;
pub mod object;
pub mod pack;
pub mod render;
pub mod store;

pub use graph::Graph;
pub use hash::ObjectHash;
pub use object::{Kind, Object};
pub use store::{GitStore, ObjectStore};
