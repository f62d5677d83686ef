//! Wayland protocol implementations.
//!
//! The layer shell lives in `wlroots`. `wayland` carries the minimal core
//! globals used when the shell runs on its own; an embedding compositor
//! forwards `wl_surface` commits and `wl_output` binds from its own.

pub mod wayland;
pub mod wlroots;
