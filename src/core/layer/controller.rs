//! Layer surface controller state machine.
//!
//! ```text
//! Created -> Initializing -> Unmapped <-> Mapped
//!                 \              \          /
//!                  +--------------+-> Destroyed
//! ```
//!
//! `Initializing` is left exactly once, on the initial commit. Nothing leaves
//! `Destroyed`.

use crate::contract_violation;
use crate::core::layer::band::LayerBand;
use crate::core::layer::surface::LayerSurface;
use crate::core::output::OutputId;
use crate::core::render::node::NodeId;
use crate::core::signal::Subscription;
use crate::core::state::ShellState;
use crate::core::SurfaceId;
use crate::util::geometry::Rect;

/// Lifecycle state of a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Initializing,
    Unmapped,
    Mapped,
    Destroyed,
}

/// Binds one layer surface to one output.
#[derive(Debug)]
pub struct LayerSurfaceController {
    pub id: SurfaceId,
    /// Owning output. Never changes.
    pub output: OutputId,
    pub band: LayerBand,
    /// Last observed mapped state of the underlying surface
    pub mapped: bool,
    /// Scene node positioned by the arranger
    pub placement: NodeId,
    pub surface: LayerSurface,
    geometry: Option<Rect>,
    lifecycle: Lifecycle,
    subscription: Option<Subscription<ShellState>>,
}

impl LayerSurfaceController {
    pub fn new(id: SurfaceId, output: OutputId, band: LayerBand, placement: NodeId, surface: LayerSurface) -> Self {
        Self {
            id,
            output,
            band,
            mapped: false,
            placement,
            surface,
            geometry: None,
            lifecycle: Lifecycle::Created,
            subscription: None,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_destroyed(&self) -> bool {
        self.lifecycle == Lifecycle::Destroyed
    }

    /// Geometry from the last arrangement pass; `None` before the first one.
    pub fn geometry(&self) -> Option<Rect> {
        self.geometry
    }

    pub(crate) fn set_geometry(&mut self, geometry: Rect) {
        self.geometry = Some(geometry);
    }

    fn ensure_alive(&self, transition: &str) -> bool {
        if self.lifecycle == Lifecycle::Destroyed {
            contract_violation!("{} attempted on destroyed layer surface {}", transition, self.id);
            return false;
        }
        true
    }

    /// Takes ownership of the signal subscription; wiring is complete.
    pub fn attach(&mut self, subscription: Subscription<ShellState>) {
        if !self.ensure_alive("attach") {
            return;
        }
        if self.lifecycle != Lifecycle::Created {
            contract_violation!("layer surface {} attached twice", self.id);
            return;
        }
        self.subscription = Some(subscription);
        self.lifecycle = Lifecycle::Initializing;
    }

    /// Leaves `Initializing`. Returns true the first time only.
    pub fn complete_initial_commit(&mut self) -> bool {
        if !self.ensure_alive("initial commit") {
            return false;
        }
        if self.lifecycle == Lifecycle::Initializing {
            self.lifecycle = Lifecycle::Unmapped;
            return true;
        }
        false
    }

    /// Returns false if the transition was refused.
    pub fn map(&mut self) -> bool {
        if !self.ensure_alive("map") {
            return false;
        }
        match self.lifecycle {
            Lifecycle::Unmapped | Lifecycle::Mapped => {
                self.mapped = true;
                self.lifecycle = Lifecycle::Mapped;
                true
            }
            other => {
                contract_violation!("map of layer surface {} in state {:?}", self.id, other);
                false
            }
        }
    }

    /// Returns true if the controller was mapped.
    pub fn unmap(&mut self) -> bool {
        if !self.ensure_alive("unmap") {
            return false;
        }
        let was_mapped = self.lifecycle == Lifecycle::Mapped;
        self.mapped = false;
        if was_mapped {
            self.lifecycle = Lifecycle::Unmapped;
        }
        was_mapped
    }

    /// Records a new band; the caller reparents the placement.
    pub fn set_band(&mut self, band: LayerBand) -> bool {
        if !self.ensure_alive("band change") {
            return false;
        }
        self.band = band;
        true
    }

    /// Final transition. Drops the signal subscription.
    pub fn destroy(&mut self) -> bool {
        if !self.ensure_alive("destroy") {
            return false;
        }
        self.mapped = false;
        self.lifecycle = Lifecycle::Destroyed;
        self.subscription = None;
        true
    }
}
