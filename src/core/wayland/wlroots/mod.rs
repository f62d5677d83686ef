//! wlroots protocol support
//!
//! Server-side bindings come from `wayland-protocols-wlr`.

pub mod layer_shell;
pub use layer_shell::{commit_error_code, register_layer_shell, LayerShellState, LayerSurfaceData};
