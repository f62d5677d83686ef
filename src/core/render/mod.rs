//! In-memory scene graph.
//!
//! The renderer consumes [`Scene::flatten`]; the layer shell only creates,
//! positions, reparents and destroys nodes.

pub mod node;
pub mod scene;
pub mod layer;

pub use node::{NodeId, NodeKind, SceneNode};
pub use scene::{FlattenedSurface, Scene};
