use crate::core::errors::{CoreError, Result};

/// Fixed stacking band of a layer surface.
///
/// The derived ordering is both the z-order (low to high) and the order in
/// which bands are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayerBand {
    Background,
    Bottom,
    Top,
    Overlay,
}

impl LayerBand {
    /// Arrangement and stacking order.
    pub const ALL: [LayerBand; 4] = [
        LayerBand::Background,
        LayerBand::Bottom,
        LayerBand::Top,
        LayerBand::Overlay,
    ];

    /// Parses the raw `zwlr_layer_shell_v1.layer` value.
    pub fn from_raw(value: u32) -> Result<Self> {
        match value {
            0 => Ok(LayerBand::Background),
            1 => Ok(LayerBand::Bottom),
            2 => Ok(LayerBand::Top),
            3 => Ok(LayerBand::Overlay),
            other => Err(CoreError::InvalidLayer(other)),
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Only these bands may take keyboard focus when mapped.
    pub fn takes_focus_on_map(self) -> bool {
        matches!(self, LayerBand::Top | LayerBand::Overlay)
    }

    pub fn name(self) -> &'static str {
        match self {
            LayerBand::Background => "background",
            LayerBand::Bottom => "bottom",
            LayerBand::Top => "top",
            LayerBand::Overlay => "overlay",
        }
    }
}

impl std::fmt::Display for LayerBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
