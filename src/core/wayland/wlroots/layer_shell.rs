//! wlr-layer-shell-unstable-v1 protocol implementation.
//!
//! Lets shell clients (panels, wallpapers, lock screens, notifications)
//! place surfaces in one of the four layers of an output. Requests are
//! translated into [`ShellState`] operations; configure and closed events
//! produced by the shell are delivered by [`ShellState::flush_events`].
//!
//! Whoever owns `wl_surface` and `wl_output` (the standalone globals in
//! `core::wayland::wayland` or an embedding compositor) forwards commits,
//! surface destruction and output binds through
//! [`ShellState::handle_surface_commit`], [`ShellState::handle_surface_destroyed`]
//! and [`ShellState::bind_output`].

use std::collections::HashMap;

use wayland_protocols_wlr::layer_shell::v1::server::{
    zwlr_layer_shell_v1::{self, ZwlrLayerShellV1},
    zwlr_layer_surface_v1::{self, ZwlrLayerSurfaceV1},
};
use wayland_server::backend::protocol::WEnum;
use wayland_server::backend::{ClientId, GlobalId, ObjectId};
use wayland_server::protocol::{wl_output::WlOutput, wl_surface::WlSurface};
use wayland_server::{Client, DataInit, Dispatch, DisplayHandle, GlobalDispatch, New, Resource};

use crate::core::errors::CoreError;
use crate::core::layer::{Anchor, KeyboardInteractivity};
use crate::core::output::OutputId;
use crate::core::state::{LayerSurfaceRequest, ShellEvent, ShellState};
use crate::core::SurfaceId;

// ============================================================================
// Protocol State
// ============================================================================

/// Protocol objects tracked alongside the shell state.
#[derive(Debug, Default)]
pub struct LayerShellState {
    /// Layer surface resources by shell surface id
    resources: HashMap<SurfaceId, ZwlrLayerSurfaceV1>,
    /// wl_surface -> layer surface having that role
    roles: HashMap<ObjectId, SurfaceId>,
    /// Bound wl_output resources
    outputs: HashMap<ObjectId, OutputId>,
}

impl LayerShellState {
    /// Shell output behind a bound wl_output.
    pub fn output_for(&self, wl_output: &ObjectId) -> Option<OutputId> {
        self.outputs.get(wl_output).copied()
    }

    pub fn resource(&self, surface: SurfaceId) -> Option<&ZwlrLayerSurfaceV1> {
        self.resources.get(&surface)
    }

    pub fn surface_for(&self, wl_surface: &ObjectId) -> Option<SurfaceId> {
        self.roles.get(wl_surface).copied()
    }

    fn forget(&mut self, surface: SurfaceId, wl_surface: &ObjectId) {
        self.resources.remove(&surface);
        if self.roles.get(wl_surface) == Some(&surface) {
            self.roles.remove(wl_surface);
        }
    }
}

/// Data stored with each zwlr_layer_surface_v1 resource.
#[derive(Debug, Clone)]
pub struct LayerSurfaceData {
    /// Shell surface id; `None` when creation was rejected
    pub surface: Option<SurfaceId>,
    /// The wl_surface given the layer role
    pub wl_surface: ObjectId,
}

pub fn register_layer_shell(display: &DisplayHandle, version: u32) -> GlobalId {
    display.create_global::<ShellState, ZwlrLayerShellV1, ()>(version, ())
}

/// Protocol error posted for a commit the shell rejected; `None` when the
/// client is not at fault.
pub fn commit_error_code(error: &CoreError) -> Option<zwlr_layer_surface_v1::Error> {
    if !error.is_client_error() {
        return None;
    }
    Some(match error {
        CoreError::InvalidSize(_) => zwlr_layer_surface_v1::Error::InvalidSize,
        _ => zwlr_layer_surface_v1::Error::InvalidSurfaceState,
    })
}

fn raw_value<T: Into<u32>>(value: WEnum<T>) -> u32 {
    match value {
        WEnum::Value(v) => v.into(),
        WEnum::Unknown(v) => v,
    }
}

// ============================================================================
// Layer Shell Global
// ============================================================================

impl GlobalDispatch<ZwlrLayerShellV1, ()> for ShellState {
    fn bind(
        _state: &mut Self,
        _handle: &DisplayHandle,
        _client: &Client,
        resource: New<ZwlrLayerShellV1>,
        _global_data: &(),
        data_init: &mut DataInit<'_, Self>,
    ) {
        data_init.init(resource, ());
        tracing::debug!("Bound zwlr_layer_shell_v1");
    }
}

impl Dispatch<ZwlrLayerShellV1, ()> for ShellState {
    fn request(
        state: &mut Self,
        _client: &Client,
        resource: &ZwlrLayerShellV1,
        request: zwlr_layer_shell_v1::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        data_init: &mut DataInit<'_, Self>,
    ) {
        match request {
            zwlr_layer_shell_v1::Request::GetLayerSurface { id, surface, output, layer, namespace } => {
                let wl_surface = surface.id();
                if state.layer_shell.roles.contains_key(&wl_surface) {
                    data_init.init(id, LayerSurfaceData { surface: None, wl_surface });
                    resource.post_error(zwlr_layer_shell_v1::Error::AlreadyConstructed, "wl_surface already has a layer role");
                    return;
                }

                let layer = raw_value(layer);
                let mut request = LayerSurfaceRequest::new(namespace, layer);
                let created = match output {
                    Some(wl_output) => match state.layer_shell.output_for(&wl_output.id()) {
                        Some(output_id) => {
                            request.output = Some(output_id);
                            state.new_layer_surface(request)
                        }
                        None => Err(CoreError::NoOutputAvailable),
                    },
                    None => state.new_layer_surface(request),
                };

                match created {
                    Ok(surface_id) => {
                        let layer_surface = data_init.init(
                            id,
                            LayerSurfaceData { surface: Some(surface_id), wl_surface: wl_surface.clone() },
                        );
                        state.layer_shell.resources.insert(surface_id, layer_surface);
                        state.layer_shell.roles.insert(wl_surface, surface_id);
                    }
                    Err(e) => {
                        tracing::warn!("Rejected layer surface (layer={}): {}", layer, e);
                        let layer_surface = data_init.init(id, LayerSurfaceData { surface: None, wl_surface });
                        layer_surface.closed();
                    }
                }
            }
            zwlr_layer_shell_v1::Request::Destroy => {
                tracing::debug!("zwlr_layer_shell_v1 destroyed");
            }
            _ => {}
        }
    }
}

// ============================================================================
// Layer Surface
// ============================================================================

impl Dispatch<ZwlrLayerSurfaceV1, LayerSurfaceData> for ShellState {
    fn request(
        state: &mut Self,
        _client: &Client,
        resource: &ZwlrLayerSurfaceV1,
        request: zwlr_layer_surface_v1::Request,
        data: &LayerSurfaceData,
        _dhandle: &DisplayHandle,
        _data_init: &mut DataInit<'_, Self>,
    ) {
        let Some(surface_id) = data.surface else {
            // Rejected at creation; only destruction is meaningful.
            return;
        };
        if let zwlr_layer_surface_v1::Request::Destroy = request {
            tracing::debug!("Layer surface {}: destroy", surface_id);
            state.close_layer_resource(surface_id, &data.wl_surface);
            return;
        }
        if !state.layers.contains_key(&surface_id) {
            // Closed by the compositor; requests are ignored until destroy.
            return;
        }

        match request {
            zwlr_layer_surface_v1::Request::SetSize { width, height } => {
                tracing::trace!("Layer surface {}: set_size {}x{}", surface_id, width, height);
                if let Ok(pending) = state.layer_pending_mut(surface_id) {
                    pending.desired_width = width;
                    pending.desired_height = height;
                }
            }
            zwlr_layer_surface_v1::Request::SetAnchor { anchor } => {
                let anchor = match anchor {
                    WEnum::Value(v) => Anchor::from_bits_truncate(v.bits()),
                    WEnum::Unknown(v) => {
                        resource.post_error(zwlr_layer_surface_v1::Error::InvalidAnchor, format!("invalid anchor 0x{:x}", v));
                        return;
                    }
                };
                if let Ok(pending) = state.layer_pending_mut(surface_id) {
                    pending.anchor = anchor;
                }
            }
            zwlr_layer_surface_v1::Request::SetExclusiveZone { zone } => {
                if let Ok(pending) = state.layer_pending_mut(surface_id) {
                    pending.exclusive_zone = zone;
                }
            }
            zwlr_layer_surface_v1::Request::SetMargin { top, right, bottom, left } => {
                if let Ok(pending) = state.layer_pending_mut(surface_id) {
                    pending.margin = crate::core::layer::Margins::new(top, right, bottom, left);
                }
            }
            zwlr_layer_surface_v1::Request::SetKeyboardInteractivity { keyboard_interactivity } => {
                let raw = raw_value(keyboard_interactivity);
                let Some(interactivity) = KeyboardInteractivity::from_raw(raw) else {
                    resource.post_error(
                        zwlr_layer_surface_v1::Error::InvalidKeyboardInteractivity,
                        format!("invalid keyboard interactivity {}", raw),
                    );
                    return;
                };
                if let Ok(pending) = state.layer_pending_mut(surface_id) {
                    pending.keyboard_interactivity = interactivity;
                }
            }
            zwlr_layer_surface_v1::Request::SetLayer { layer } => {
                let layer = raw_value(layer);
                if let Err(e) = state.set_layer_surface_layer(surface_id, layer) {
                    resource.post_error(zwlr_layer_shell_v1::Error::InvalidLayer, e.to_string());
                }
            }
            zwlr_layer_surface_v1::Request::AckConfigure { serial } => {
                if let Err(e) = state.ack_layer_configure(surface_id, serial) {
                    resource.post_error(zwlr_layer_surface_v1::Error::InvalidSurfaceState, e.to_string());
                }
            }
            zwlr_layer_surface_v1::Request::GetPopup { .. } => {
                tracing::debug!("Layer surface {}: get_popup ignored", surface_id);
            }
            _ => {}
        }
    }

    fn destroyed(state: &mut Self, _client: ClientId, _resource: &ZwlrLayerSurfaceV1, data: &LayerSurfaceData) {
        if let Some(surface_id) = data.surface {
            state.close_layer_resource(surface_id, &data.wl_surface);
        }
    }
}

// ============================================================================
// Compositor entry points
// ============================================================================

impl ShellState {
    /// Tears down the controller behind a layer surface resource, if it is
    /// still alive, and forgets the resource. Safe to call more than once.
    fn close_layer_resource(&mut self, surface: SurfaceId, wl_surface: &ObjectId) {
        if self.layers.contains_key(&surface) {
            if let Err(e) = self.destroy_layer_surface(surface) {
                tracing::warn!("Failed to destroy layer surface {}: {}", surface, e);
            }
        }
        self.layer_shell.forget(surface, wl_surface);
    }

    /// Forwards a wl_surface commit. Returns false if the surface has no
    /// layer role.
    pub fn handle_surface_commit(&mut self, wl_surface: &WlSurface, has_buffer: bool) -> bool {
        let Some(surface) = self.layer_shell.surface_for(&wl_surface.id()) else {
            return false;
        };
        if !self.layers.contains_key(&surface) {
            return true;
        }
        if let Err(e) = self.commit_layer_surface(surface, has_buffer) {
            tracing::warn!("Layer surface {}: rejected commit: {}", surface, e);
            if let (Some(code), Some(resource)) = (commit_error_code(&e), self.layer_shell.resource(surface)) {
                resource.post_error(code, e.to_string());
            }
        }
        true
    }

    /// The wl_surface went away; its layer surface goes with it.
    pub fn handle_surface_destroyed(&mut self, wl_surface: &WlSurface) {
        let id = wl_surface.id();
        if let Some(surface) = self.layer_shell.surface_for(&id) {
            self.close_layer_resource(surface, &id);
        }
    }

    /// Associates a bound wl_output resource with a shell output.
    pub fn bind_output(&mut self, wl_output: &WlOutput, output: OutputId) {
        self.layer_shell.outputs.insert(wl_output.id(), output);
    }

    pub fn unbind_output(&mut self, wl_output: &WlOutput) {
        self.layer_shell.outputs.remove(&wl_output.id());
    }

    /// Sends pending configure and closed events to their clients and returns
    /// the events meant for the compositor.
    pub fn flush_events(&mut self) -> Vec<ShellEvent> {
        let mut remaining = Vec::new();
        for event in self.take_events() {
            match event {
                ShellEvent::LayerSurfaceConfigure { surface, serial, width, height } => {
                    if let Some(resource) = self.layer_shell.resource(surface) {
                        resource.configure(serial, width, height);
                    }
                }
                ShellEvent::LayerSurfaceClosed { surface } => {
                    if let Some(resource) = self.layer_shell.resource(surface) {
                        resource.closed();
                    }
                }
                other => remaining.push(other),
            }
        }
        remaining
    }
}
