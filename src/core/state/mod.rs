//! Global shell state.
//!
//! `ShellState` owns everything the layer shell knows about: outputs and
//! their layer registries, layer surface controllers, the scene graph, the
//! seat and the application views. All of it is driven from a single
//! dispatch thread; consequences of one event (reparenting, arrangement,
//! focus) are complete before the triggering call returns.

use std::collections::HashMap;

use crate::config::ShellConfig;
use crate::core::layer::LayerSurfaceController;
use crate::core::output::{Output, OutputArena, OutputId};
use crate::core::render::Scene;
use crate::core::seat::Seat;
use crate::core::signal::{SignalHub, SurfaceSignal};
use crate::core::view::{View, ViewId};
use crate::core::wayland::wayland::CompositorProtocolState;
use crate::core::wayland::wlroots::layer_shell::LayerShellState;
use crate::core::SurfaceId;
use crate::util::geometry::Rect;

// Sub-modules containing ShellState impl blocks
mod layers;
mod outputs;
mod views;

pub use layers::LayerSurfaceRequest;

// ============================================================================
// Events
// ============================================================================

/// Events produced by the shell for the embedding compositor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    /// An output's usable area changed
    UsableAreaChanged { output: OutputId, area: Rect },
    /// Layer keyboard focus moved; `None` when released
    KeyboardFocusChanged { surface: Option<SurfaceId> },
    /// A layer surface must be sent a configure
    LayerSurfaceConfigure { surface: SurfaceId, serial: u32, width: u32, height: u32 },
    /// A layer surface was destroyed by the compositor and its client must
    /// be told
    LayerSurfaceClosed { surface: SurfaceId },
}

// ============================================================================
// Shell State
// ============================================================================

pub struct ShellState {
    pub config: ShellConfig,
    pub outputs: OutputArena,
    pub scene: Scene,
    pub seat: Seat,

    /// Live layer surface controllers
    pub layers: HashMap<SurfaceId, LayerSurfaceController>,
    /// Per-surface signal handlers, owned through the controllers' subscriptions
    pub signals: SignalHub<ShellState>,

    /// Application views in stacking order, bottom first
    pub views: Vec<View>,

    /// zwlr_layer_shell_v1 protocol objects
    pub layer_shell: LayerShellState,
    /// wl_surface objects of the standalone compositor globals
    pub compositor: CompositorProtocolState,

    events: Vec<ShellEvent>,
    serial: u32,
    next_surface_id: SurfaceId,
    next_view_id: ViewId,
}

impl Default for ShellState {
    fn default() -> Self {
        Self::new(ShellConfig::default())
    }
}

impl ShellState {
    pub fn new(config: ShellConfig) -> Self {
        let seat = Seat::new(config.seat_name.clone());
        Self {
            config,
            outputs: OutputArena::new(),
            scene: Scene::new(),
            seat,
            layers: HashMap::new(),
            signals: SignalHub::new(),
            views: Vec::new(),
            layer_shell: LayerShellState::default(),
            compositor: CompositorProtocolState::default(),
            events: Vec::new(),
            serial: 1,
            next_surface_id: 1,
            next_view_id: 1,
        }
    }

    pub fn next_serial(&mut self) -> u32 {
        bump_serial(&mut self.serial)
    }

    fn next_surface_id(&mut self) -> SurfaceId {
        let id = self.next_surface_id;
        self.next_surface_id = self.next_surface_id.wrapping_add(1).max(1);
        id
    }

    fn next_view_id(&mut self) -> ViewId {
        let id = self.next_view_id;
        self.next_view_id = self.next_view_id.wrapping_add(1).max(1);
        id
    }

    pub fn output(&self, id: OutputId) -> Option<&Output> {
        self.outputs.get(id)
    }

    pub fn layer_surface(&self, id: SurfaceId) -> Option<&LayerSurfaceController> {
        self.layers.get(&id)
    }

    /// Drains the events produced since the last call.
    pub fn take_events(&mut self) -> Vec<ShellEvent> {
        std::mem::take(&mut self.events)
    }

    /// Runs the handler `surface` registered for `signal`, if any.
    ///
    /// The handler is copied out of the hub before it runs, so it may freely
    /// drop the surface's subscription.
    pub fn emit(&mut self, surface: SurfaceId, signal: SurfaceSignal) -> bool {
        match self.signals.handler(surface, signal) {
            Some(handler) => {
                handler(self, surface);
                true
            }
            None => {
                tracing::trace!("No {:?} handler for layer surface {}", signal, surface);
                false
            }
        }
    }
}

impl std::fmt::Debug for ShellState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellState")
            .field("outputs", &self.outputs.len())
            .field("layers", &self.layers.len())
            .field("views", &self.views.len())
            .field("pending_events", &self.events.len())
            .finish()
    }
}

pub(crate) fn bump_serial(serial: &mut u32) -> u32 {
    let current = *serial;
    *serial = serial.wrapping_add(1).max(1);
    current
}
