//! Common imports used throughout kiosk-layers.

pub use crate::config::ShellConfig;
pub use crate::core::layer::{Anchor, KeyboardInteractivity, LayerBand, Margins};
pub use crate::core::output::{OutputId, OutputInfo, OutputMode};
pub use crate::core::state::{LayerSurfaceRequest, ShellEvent, ShellState};
pub use crate::core::SurfaceId;
pub use crate::util::geometry::Rect;

pub type Result<T> = std::result::Result<T, crate::core::errors::CoreError>;
