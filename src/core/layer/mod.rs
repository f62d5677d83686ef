//! Layer shell core: bands, per-surface state, per-output registries and the
//! arrangement pass.

pub mod arrange;
pub mod band;
pub mod controller;
pub mod registry;
pub mod surface;


pub use arrange::{arrange_layers, ArrangementResult, LayerConfigure};
pub use band::LayerBand;
pub use controller::{LayerSurfaceController, Lifecycle};
pub use registry::{LayerRegistry, LayerSlot};
pub use surface::{
    Anchor, Committed, KeyboardInteractivity, LayerSurface, LayerSurfaceAttributes, MapChange, Margins,
};
