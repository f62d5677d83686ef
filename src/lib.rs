// kiosk-layers
//
// Layer-shell placement and surface lifecycle core for a single-application
// Wayland kiosk compositor. Protocol glue lives in core/wayland, everything
// else is plain state driven from one dispatch thread.

pub mod config;
pub mod core;
pub mod prelude;
pub mod util;

pub use config::ShellConfig;

#[cfg(test)]
mod tests;
