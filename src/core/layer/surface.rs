//! Client-side layer surface state.
//!
//! Mirrors what a `zwlr_layer_surface_v1` client has requested: attributes
//! are double-buffered (`pending` is written by requests, `current` is
//! replaced wholesale on commit) and configure serials are tracked until the
//! client acknowledges them.

use bitflags::bitflags;

use crate::core::errors::{CoreError, Result};
use crate::core::layer::band::LayerBand;

bitflags! {
    /// Edges a layer surface is anchored to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Anchor: u32 {
        const TOP = 1;
        const BOTTOM = 2;
        const LEFT = 4;
        const RIGHT = 8;
    }
}

bitflags! {
    /// Attributes that changed in the last commit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Committed: u32 {
        const DESIRED_SIZE = 1 << 0;
        const ANCHOR = 1 << 1;
        const EXCLUSIVE_ZONE = 1 << 2;
        const MARGIN = 1 << 3;
        const KEYBOARD_INTERACTIVITY = 1 << 4;
        const LAYER = 1 << 5;
    }
}

impl Anchor {
    /// Edge the exclusive zone applies to: a single anchored edge, or an edge
    /// together with both perpendicular edges. Anything else has none.
    pub fn exclusive_edge(self) -> Option<Anchor> {
        let horizontal = Anchor::LEFT | Anchor::RIGHT;
        let vertical = Anchor::TOP | Anchor::BOTTOM;

        [Anchor::TOP, Anchor::BOTTOM]
            .into_iter()
            .find(|&edge| self == edge || self == edge | horizontal)
            .or_else(|| {
                [Anchor::LEFT, Anchor::RIGHT]
                    .into_iter()
                    .find(|&edge| self == edge || self == edge | vertical)
            })
    }
}

/// Keyboard interactivity requested by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyboardInteractivity {
    #[default]
    None,
    Exclusive,
    OnDemand,
}

impl KeyboardInteractivity {
    pub fn from_raw(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Exclusive),
            2 => Some(Self::OnDemand),
            _ => None,
        }
    }
}

/// Margins in surface-local coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Margins {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Margins {
    pub fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self { top, right, bottom, left }
    }
}

/// One set of double-buffered layer surface attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSurfaceAttributes {
    pub desired_width: u32,
    pub desired_height: u32,
    pub anchor: Anchor,
    /// Positive values reserve space, 0 avoids other zones, -1 ignores them.
    pub exclusive_zone: i32,
    pub margin: Margins,
    pub keyboard_interactivity: KeyboardInteractivity,
    pub layer: LayerBand,
}

impl LayerSurfaceAttributes {
    pub fn new(layer: LayerBand) -> Self {
        Self {
            desired_width: 0,
            desired_height: 0,
            anchor: Anchor::empty(),
            exclusive_zone: 0,
            margin: Margins::default(),
            keyboard_interactivity: KeyboardInteractivity::None,
            layer,
        }
    }

    fn diff(&self, other: &Self) -> Committed {
        let mut committed = Committed::empty();
        if (self.desired_width, self.desired_height) != (other.desired_width, other.desired_height) {
            committed |= Committed::DESIRED_SIZE;
        }
        if self.anchor != other.anchor {
            committed |= Committed::ANCHOR;
        }
        if self.exclusive_zone != other.exclusive_zone {
            committed |= Committed::EXCLUSIVE_ZONE;
        }
        if self.margin != other.margin {
            committed |= Committed::MARGIN;
        }
        if self.keyboard_interactivity != other.keyboard_interactivity {
            committed |= Committed::KEYBOARD_INTERACTIVITY;
        }
        if self.layer != other.layer {
            committed |= Committed::LAYER;
        }
        committed
    }

    fn validate(&self) -> Result<()> {
        let horizontal = Anchor::LEFT | Anchor::RIGHT;
        let vertical = Anchor::TOP | Anchor::BOTTOM;
        if self.desired_width == 0 && !self.anchor.contains(horizontal) {
            return Err(CoreError::InvalidSize(
                "width 0 requested without anchoring to both left and right edges",
            ));
        }
        if self.desired_height == 0 && !self.anchor.contains(vertical) {
            return Err(CoreError::InvalidSize(
                "height 0 requested without anchoring to both top and bottom edges",
            ));
        }
        Ok(())
    }
}

/// Change of the underlying surface's mapped state caused by a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapChange {
    None,
    Map,
    Unmap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingConfigure {
    serial: u32,
    width: u32,
    height: u32,
}

/// State of one `zwlr_layer_surface_v1` object.
#[derive(Debug, Clone)]
pub struct LayerSurface {
    pub namespace: String,
    pub pending: LayerSurfaceAttributes,
    pub current: LayerSurfaceAttributes,
    /// Attributes changed by the most recent commit
    pub committed: Committed,
    /// Set by the initial commit; cleared again when the surface unmaps
    pub initialized: bool,
    /// True only while handling the initial commit
    pub initial_commit: bool,
    /// Whether the client acknowledged a configure since initialization
    pub configured: bool,
    /// Whether the underlying surface has a buffer and is presentable
    pub mapped: bool,
    /// Size sent in the most recent configure
    pub last_configured: Option<(u32, u32)>,
    pending_configures: Vec<PendingConfigure>,
}

impl LayerSurface {
    pub fn new(namespace: impl Into<String>, pending: LayerSurfaceAttributes) -> Self {
        let current = LayerSurfaceAttributes::new(pending.layer);
        Self {
            namespace: namespace.into(),
            pending,
            current,
            committed: Committed::empty(),
            initialized: false,
            initial_commit: false,
            configured: false,
            mapped: false,
            last_configured: None,
            pending_configures: Vec::new(),
        }
    }

    /// Applies the pending attributes.
    ///
    /// A failed commit leaves the state untouched.
    pub fn commit(&mut self, has_buffer: bool) -> Result<MapChange> {
        self.pending.validate()?;

        if !self.initialized {
            if has_buffer {
                return Err(CoreError::protocol_violation(
                    "buffer attached on the initial commit",
                ));
            }
            self.committed = self.pending.diff(&self.current);
            self.current = self.pending.clone();
            self.initialized = true;
            self.initial_commit = true;
            return Ok(MapChange::None);
        }

        if has_buffer && !self.configured {
            return Err(CoreError::protocol_violation(
                "buffer attached before the first configure was acknowledged",
            ));
        }

        self.initial_commit = false;
        self.committed = self.pending.diff(&self.current);
        self.current = self.pending.clone();

        let change = match (self.mapped, has_buffer) {
            (false, true) => MapChange::Map,
            (true, false) => MapChange::Unmap,
            _ => MapChange::None,
        };
        self.mapped = has_buffer;
        if change == MapChange::Unmap {
            self.reset();
        }
        Ok(change)
    }

    /// An unmapped layer surface goes back to the state it had right after
    /// creation and must repeat the initial commit handshake.
    fn reset(&mut self) {
        self.initialized = false;
        self.configured = false;
        self.last_configured = None;
        self.pending_configures.clear();
    }

    pub fn needs_configure(&self, width: u32, height: u32) -> bool {
        self.last_configured != Some((width, height))
    }

    /// Records a configure sent to the client.
    pub fn configure(&mut self, serial: u32, width: u32, height: u32) {
        self.pending_configures.push(PendingConfigure { serial, width, height });
        self.last_configured = Some((width, height));
    }

    /// Acknowledges `serial` and every configure sent before it.
    pub fn ack_configure(&mut self, serial: u32) -> Result<(u32, u32)> {
        let Some(pos) = self.pending_configures.iter().position(|c| c.serial == serial) else {
            return Err(CoreError::protocol_violation(format!(
                "wrong configure serial {}",
                serial
            )));
        };
        let acked = self.pending_configures[pos];
        self.pending_configures.drain(..=pos);
        self.configured = true;
        Ok((acked.width, acked.height))
    }

    pub fn has_pending_configure(&self) -> bool {
        !self.pending_configures.is_empty()
    }

    pub fn is_keyboard_interactive(&self) -> bool {
        self.current.keyboard_interactivity != KeyboardInteractivity::None
    }
}
