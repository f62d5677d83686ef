//! Seat state consumed by the layer shell.

use crate::core::layer::band::LayerBand;
use crate::core::SurfaceId;

/// Layer surface currently holding keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerFocus {
    pub surface: SurfaceId,
    pub band: LayerBand,
}

/// Pointer location and layer keyboard focus of the single seat.
#[derive(Debug)]
pub struct Seat {
    pub name: String,
    /// Pointer position in layout coordinates
    pub pointer: (f64, f64),
    focused_layer: Option<LayerFocus>,
}

impl Seat {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pointer: (0.0, 0.0),
            focused_layer: None,
        }
    }

    pub fn set_pointer_location(&mut self, x: f64, y: f64) {
        self.pointer = (x, y);
    }

    pub fn focused_layer(&self) -> Option<LayerFocus> {
        self.focused_layer
    }

    pub fn has_keyboard_focus(&self, surface: SurfaceId) -> bool {
        self.focused_layer.is_some_and(|f| f.surface == surface)
    }

    /// Whether a surface mapping in `band` may take focus from the incumbent.
    /// Ties keep the incumbent.
    pub fn can_claim_focus(&self, band: LayerBand) -> bool {
        match self.focused_layer {
            Some(incumbent) => incumbent.band < band,
            None => true,
        }
    }

    /// Returns true if focus changed.
    pub fn set_focused_layer(&mut self, focus: Option<LayerFocus>) -> bool {
        if self.focused_layer == focus {
            return false;
        }
        self.focused_layer = focus;
        true
    }

    /// Drops focus if `surface` holds it. Returns true if it did.
    pub fn clear_focus_if(&mut self, surface: SurfaceId) -> bool {
        if self.has_keyboard_focus(surface) {
            self.focused_layer = None;
            return true;
        }
        false
    }

    /// Keeps focus tracking in step with a band change.
    pub fn update_band(&mut self, surface: SurfaceId, band: LayerBand) {
        if let Some(focus) = self.focused_layer.as_mut().filter(|f| f.surface == surface) {
            focus.band = band;
        }
    }
}
