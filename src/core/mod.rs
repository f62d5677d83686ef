pub mod errors;
pub mod layer;
pub mod output;
pub mod render;
pub mod seat;
pub mod signal;
pub mod state;
pub mod view;
pub mod wayland;

/// Identifier of a layer surface.
pub type SurfaceId = u32;

// Re-export key types
pub use errors::{CoreError, Result};
pub use output::{OutputId, OutputInfo, OutputMode};
pub use state::{LayerSurfaceRequest, ShellEvent, ShellState};
