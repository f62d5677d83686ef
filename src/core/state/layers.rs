//! Layer surface creation and lifecycle transitions.
//!
//! The handlers at the bottom of this file are what a controller subscribes
//! to its surface's signals; they are plain functions so the subscription
//! can be dropped from inside one of them.

use crate::contract_violation;
use crate::core::errors::{CoreError, Result};
use crate::core::layer::{
    Anchor, KeyboardInteractivity, LayerBand, LayerSurface, LayerSurfaceAttributes, MapChange, Margins,
};
use crate::core::seat::LayerFocus;
use crate::core::signal::{Handler, SurfaceSignal};

use super::*;

/// Everything a client asks for when creating a layer surface.
#[derive(Debug, Clone)]
pub struct LayerSurfaceRequest {
    pub namespace: String,
    /// Raw band value; validated by the factory
    pub layer: u32,
    /// Explicit output, or `None` to let the shell pick one
    pub output: Option<OutputId>,
    pub desired_width: u32,
    pub desired_height: u32,
    pub anchor: Anchor,
    pub exclusive_zone: i32,
    pub margin: Margins,
    pub keyboard_interactivity: KeyboardInteractivity,
}

impl LayerSurfaceRequest {
    pub fn new(namespace: impl Into<String>, layer: u32) -> Self {
        Self {
            namespace: namespace.into(),
            layer,
            output: None,
            desired_width: 0,
            desired_height: 0,
            anchor: Anchor::empty(),
            exclusive_zone: 0,
            margin: Margins::default(),
            keyboard_interactivity: KeyboardInteractivity::None,
        }
    }

    fn attributes(&self, layer: LayerBand) -> LayerSurfaceAttributes {
        LayerSurfaceAttributes {
            desired_width: self.desired_width,
            desired_height: self.desired_height,
            anchor: self.anchor,
            exclusive_zone: self.exclusive_zone,
            margin: self.margin,
            keyboard_interactivity: self.keyboard_interactivity,
            layer,
        }
    }
}

const LAYER_SURFACE_HANDLERS: [(SurfaceSignal, Handler<ShellState>); 5] = [
    (SurfaceSignal::Map, handle_map),
    (SurfaceSignal::Unmap, handle_unmap),
    (SurfaceSignal::Commit, handle_commit),
    (SurfaceSignal::OutputDestroy, handle_output_destroy),
    (SurfaceSignal::Destroy, handle_destroy),
];

impl ShellState {
    // =========================================================================
    // Factory
    // =========================================================================

    /// Creates a layer surface controller.
    ///
    /// On error nothing is left behind: no controller, no scene node, no
    /// registry entry and no signal handlers.
    pub fn new_layer_surface(&mut self, request: LayerSurfaceRequest) -> Result<SurfaceId> {
        let output_id = self.resolve_output(request.output)?;
        let band = LayerBand::from_raw(request.layer)?;

        if let Some(max) = self.config.max_layer_surfaces {
            if self.layers.len() >= max {
                return Err(CoreError::ResourceExhausted("layer surface limit reached"));
            }
        }
        self.layers
            .try_reserve(1)
            .map_err(|_| CoreError::ResourceExhausted("layer surface controller"))?;

        let id = self.next_surface_id();
        let parent = self
            .outputs
            .get(output_id)
            .map(|o| o.layers.parent_node(band))
            .ok_or(CoreError::UnknownOutput(output_id))?;
        let placement = self.scene.create_surface_node(parent, id)?;
        self.scene.set_visible(placement, false);

        let subscription = match self.signals.subscribe(id, &LAYER_SURFACE_HANDLERS) {
            Some(subscription) => subscription,
            None => {
                self.scene.destroy(placement);
                return Err(CoreError::ResourceExhausted("layer surface signal subscription"));
            }
        };

        let bound = self
            .outputs
            .get_mut(output_id)
            .ok_or(CoreError::UnknownOutput(output_id))
            .and_then(|o| o.layers.bind(band, id));
        if let Err(e) = bound {
            self.scene.destroy(placement);
            return Err(e);
        }

        let surface = LayerSurface::new(request.namespace.clone(), request.attributes(band));
        let mut controller = LayerSurfaceController::new(id, output_id, band, placement, surface);
        controller.attach(subscription);
        self.layers.insert(id, controller);

        tracing::debug!(
            "New layer surface {}: namespace={} layer={} anchor={:?} size={}x{} margin={:?} output={}",
            id,
            request.namespace,
            band,
            request.anchor,
            request.desired_width,
            request.desired_height,
            request.margin,
            output_id
        );
        Ok(id)
    }

    /// Explicit output if live and enabled; otherwise the usable output under
    /// the pointer, then the most recently added usable one.
    fn resolve_output(&self, requested: Option<OutputId>) -> Result<OutputId> {
        if let Some(id) = requested {
            // A mode-less output still hosts surfaces; they arrange once a
            // mode arrives.
            return match self.outputs.get(id) {
                Some(output) if output.enabled => Ok(id),
                _ => Err(CoreError::UnknownOutput(id)),
            };
        }
        let (x, y) = self.seat.pointer;
        self.outputs
            .output_at(x, y)
            .or_else(|| self.outputs.most_recent())
            .ok_or(CoreError::NoOutputAvailable)
    }

    // =========================================================================
    // Client requests
    // =========================================================================

    fn live_controller_mut(&mut self, id: SurfaceId) -> Result<&mut LayerSurfaceController> {
        let controller = self.layers.get_mut(&id).ok_or(CoreError::UnknownSurface(id))?;
        if controller.is_destroyed() {
            return Err(CoreError::ControllerDestroyed(id));
        }
        Ok(controller)
    }

    /// Double-buffered attributes applied on the next commit.
    pub fn layer_pending_mut(&mut self, id: SurfaceId) -> Result<&mut LayerSurfaceAttributes> {
        Ok(&mut self.live_controller_mut(id)?.surface.pending)
    }

    /// Requests a band change, applied on the next commit.
    pub fn set_layer_surface_layer(&mut self, id: SurfaceId, layer: u32) -> Result<()> {
        let band = LayerBand::from_raw(layer)?;
        self.layer_pending_mut(id)?.layer = band;
        Ok(())
    }

    pub fn ack_layer_configure(&mut self, id: SurfaceId, serial: u32) -> Result<()> {
        let controller = self.live_controller_mut(id)?;
        if !controller.surface.initialized {
            return Err(CoreError::NotInitialized(id));
        }
        let (width, height) = controller.surface.ack_configure(serial)?;
        tracing::trace!("Layer surface {} acked configure {} ({}x{})", id, serial, width, height);
        Ok(())
    }

    /// Applies a commit of the underlying surface.
    ///
    /// A band change takes effect first, then map or unmap is signalled, then
    /// the commit itself.
    pub fn commit_layer_surface(&mut self, id: SurfaceId, has_buffer: bool) -> Result<()> {
        let controller = self.live_controller_mut(id)?;
        let change = controller.surface.commit(has_buffer)?;
        let requested_band = controller.surface.current.layer;
        if requested_band != controller.band {
            self.change_band(id, requested_band);
        }
        match change {
            MapChange::Map => {
                self.emit(id, SurfaceSignal::Map);
            }
            MapChange::Unmap => {
                self.emit(id, SurfaceSignal::Unmap);
            }
            MapChange::None => {}
        }
        self.emit(id, SurfaceSignal::Commit);
        Ok(())
    }

    /// The client destroyed the layer surface.
    pub fn destroy_layer_surface(&mut self, id: SurfaceId) -> Result<()> {
        if !self.layers.contains_key(&id) {
            return Err(CoreError::UnknownSurface(id));
        }
        self.emit(id, SurfaceSignal::Destroy);
        Ok(())
    }

    // =========================================================================
    // Helpers shared by the handlers
    // =========================================================================

    fn set_layer_focus(&mut self, focus: Option<LayerFocus>) {
        if self.seat.set_focused_layer(focus) {
            let surface = focus.map(|f| f.surface);
            tracing::debug!("Layer keyboard focus now {:?}", surface);
            self.events.push(ShellEvent::KeyboardFocusChanged { surface });
        }
    }

    fn release_layer_focus(&mut self, id: SurfaceId) {
        if self.seat.clear_focus_if(id) {
            tracing::debug!("Layer surface {} released keyboard focus", id);
            self.events.push(ShellEvent::KeyboardFocusChanged { surface: None });
        }
    }

    /// Moves a controller to the end of another band. Reparents its scene
    /// node on top of the new band; the controller itself is kept.
    fn change_band(&mut self, id: SurfaceId, band: LayerBand) {
        let Some(controller) = self.layers.get_mut(&id) else {
            return;
        };
        let Some(output) = self.outputs.get_mut(controller.output) else {
            contract_violation!("layer surface {} outlived output {}", id, controller.output);
            return;
        };

        if let Err(e) = output.layers.move_to(id, band) {
            tracing::warn!("Failed to move layer surface {} to {}: {}", id, band, e);
            return;
        }
        let parent = output.layers.parent_node(band);
        if let Err(e) = self.scene.reparent(controller.placement, parent) {
            contract_violation!("failed to reparent layer surface {}: {}", id, e);
        }

        tracing::debug!("Layer surface {} moved from {} to {}", id, controller.band, band);
        controller.set_band(band);
        self.seat.update_band(id, band);
    }

    /// Tears down a controller that has been removed from the map.
    fn release_controller(&mut self, mut controller: LayerSurfaceController) {
        if let Some(output) = self.outputs.get_mut(controller.output) {
            output.layers.unbind(controller.id);
        }
        self.scene.destroy(controller.placement);
        controller.destroy();
    }
}

// ============================================================================
// Signal handlers
// ============================================================================

fn handle_map(state: &mut ShellState, id: SurfaceId) {
    let Some(controller) = state.layers.get_mut(&id) else {
        contract_violation!("map signalled for unknown layer surface {}", id);
        return;
    };
    if !controller.map() {
        return;
    }
    state.scene.set_visible(controller.placement, true);

    let (band, output) = (controller.band, controller.output);
    let interactive = controller.surface.is_keyboard_interactive();
    tracing::debug!("Layer surface {} mapped on {}", id, band);

    if interactive && band.takes_focus_on_map() && state.seat.can_claim_focus(band) {
        state.set_layer_focus(Some(LayerFocus { surface: id, band }));
    }
    state.arrange_layers(output);
}

fn handle_unmap(state: &mut ShellState, id: SurfaceId) {
    let Some(controller) = state.layers.get_mut(&id) else {
        contract_violation!("unmap signalled for unknown layer surface {}", id);
        return;
    };
    let was_mapped = controller.unmap();
    state.scene.set_visible(controller.placement, false);
    let output = controller.output;
    tracing::debug!("Layer surface {} unmapped", id);

    state.release_layer_focus(id);
    if was_mapped && state.config.rearrange_on_unmap {
        state.arrange_layers(output);
    }
}

fn handle_commit(state: &mut ShellState, id: SurfaceId) {
    let Some(controller) = state.layers.get_mut(&id) else {
        contract_violation!("commit signalled for unknown layer surface {}", id);
        return;
    };
    if controller.is_destroyed() {
        contract_violation!("commit on destroyed layer surface {}", id);
        return;
    }

    let first = controller.complete_initial_commit() || controller.surface.initial_commit;
    let changed = !controller.surface.committed.is_empty();
    let map_mismatch = controller.surface.mapped != controller.mapped;
    let requested_band = controller.surface.current.layer;
    let band_changed = requested_band != controller.band;
    let output = controller.output;

    if band_changed {
        state.change_band(id, requested_band);
    }

    if map_mismatch {
        if state.layers.get(&id).is_some_and(|c| c.surface.mapped) {
            handle_map(state, id);
        } else {
            handle_unmap(state, id);
        }
    }

    if first || changed || map_mismatch {
        state.arrange_layers(output);
    } else {
        tracing::trace!("Commit on layer surface {} changed nothing", id);
    }
}

fn handle_output_destroy(state: &mut ShellState, id: SurfaceId) {
    let Some(mut controller) = state.layers.remove(&id) else {
        contract_violation!("output destroy signalled for unknown layer surface {}", id);
        return;
    };
    if controller.mapped {
        controller.unmap();
    }
    state.release_layer_focus(id);

    let output = controller.output;
    state.release_controller(controller);
    state.events.push(ShellEvent::LayerSurfaceClosed { surface: id });
    tracing::debug!("Layer surface {} closed with output {}", id, output);
}

fn handle_destroy(state: &mut ShellState, id: SurfaceId) {
    let Some(controller) = state.layers.get(&id) else {
        contract_violation!("destroy signalled for unknown layer surface {}", id);
        return;
    };
    let mapped = controller.mapped;
    let output = controller.output;
    if mapped {
        handle_unmap(state, id);
    }

    let Some(controller) = state.layers.remove(&id) else {
        return;
    };
    state.release_layer_focus(id);
    state.release_controller(controller);
    tracing::debug!("Layer surface {} destroyed", id);

    if state.outputs.contains(output) {
        state.arrange_layers(output);
    }
}
