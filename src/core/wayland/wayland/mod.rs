//! Core protocol globals for running the shell standalone.
//!
//! An embedding compositor brings its own and forwards commits, surface
//! destruction and output binds instead.

pub mod compositor;
pub mod output;
pub mod shm;

pub use compositor::{register_compositor, BufferState, CompositorProtocolState};
pub use output::{register_output, OutputGlobal};
pub use shm::register_shm;
