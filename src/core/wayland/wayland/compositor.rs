//! wl_compositor, wl_surface and wl_region.
//!
//! Only what the layer shell needs: whether a buffer is attached at commit
//! time, and surface destruction. Buffers are never read; they are released
//! as soon as the commit carrying them is applied.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use wayland_server::backend::{ClientId, GlobalId, ObjectId};
use wayland_server::protocol::{wl_buffer::WlBuffer, wl_callback, wl_compositor, wl_region, wl_surface};
use wayland_server::{Client, DataInit, Dispatch, DisplayHandle, GlobalDispatch, New, Resource};

use crate::core::state::ShellState;

/// Buffer attachment of one wl_surface, double-buffered like the rest of
/// its state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BufferState {
    pending: Option<bool>,
    attached: bool,
}

impl BufferState {
    pub fn attach(&mut self, has_buffer: bool) {
        self.pending = Some(has_buffer);
    }

    /// Applies the pending attachment. A commit without an attach keeps the
    /// current buffer.
    pub fn commit(&mut self) -> bool {
        if let Some(pending) = self.pending.take() {
            self.attached = pending;
        }
        self.attached
    }

    pub fn has_buffer(&self) -> bool {
        self.attached
    }
}

#[derive(Debug, Default)]
struct SurfaceRecord {
    buffer: BufferState,
    pending_buffer: Option<WlBuffer>,
    frame_callbacks: Vec<wl_callback::WlCallback>,
}

/// Live wl_surface objects.
#[derive(Debug, Default)]
pub struct CompositorProtocolState {
    surfaces: HashMap<ObjectId, SurfaceRecord>,
}

impl CompositorProtocolState {
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

pub fn register_compositor(display: &DisplayHandle) -> GlobalId {
    display.create_global::<ShellState, wl_compositor::WlCompositor, ()>(4, ())
}

fn frame_time() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u32)
        .unwrap_or(0)
}

impl GlobalDispatch<wl_compositor::WlCompositor, ()> for ShellState {
    fn bind(
        _state: &mut Self,
        _handle: &DisplayHandle,
        _client: &Client,
        resource: New<wl_compositor::WlCompositor>,
        _global_data: &(),
        data_init: &mut DataInit<'_, Self>,
    ) {
        data_init.init(resource, ());
        tracing::debug!("Bound wl_compositor");
    }
}

impl Dispatch<wl_compositor::WlCompositor, ()> for ShellState {
    fn request(
        state: &mut Self,
        _client: &Client,
        _resource: &wl_compositor::WlCompositor,
        request: wl_compositor::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        data_init: &mut DataInit<'_, Self>,
    ) {
        match request {
            wl_compositor::Request::CreateSurface { id } => {
                let surface = data_init.init(id, ());
                tracing::trace!("wl_surface {:?} created", surface.id());
                state.compositor.surfaces.insert(surface.id(), SurfaceRecord::default());
            }
            wl_compositor::Request::CreateRegion { id } => {
                data_init.init(id, ());
            }
            _ => {}
        }
    }
}

impl Dispatch<wl_surface::WlSurface, ()> for ShellState {
    fn request(
        state: &mut Self,
        _client: &Client,
        resource: &wl_surface::WlSurface,
        request: wl_surface::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        data_init: &mut DataInit<'_, Self>,
    ) {
        let id = resource.id();
        match request {
            wl_surface::Request::Attach { buffer, .. } => {
                if let Some(record) = state.compositor.surfaces.get_mut(&id) {
                    record.buffer.attach(buffer.is_some());
                    record.pending_buffer = buffer;
                }
            }
            wl_surface::Request::Frame { callback } => {
                let callback = data_init.init(callback, ());
                if let Some(record) = state.compositor.surfaces.get_mut(&id) {
                    record.frame_callbacks.push(callback);
                }
            }
            wl_surface::Request::Commit => {
                let Some(record) = state.compositor.surfaces.get_mut(&id) else {
                    return;
                };
                let has_buffer = record.buffer.commit();
                let buffer = record.pending_buffer.take();
                let callbacks = std::mem::take(&mut record.frame_callbacks);

                state.handle_surface_commit(resource, has_buffer);

                if let Some(buffer) = buffer {
                    buffer.release();
                }
                let time = frame_time();
                for callback in callbacks {
                    callback.done(time);
                }
            }
            // Damage, regions, transform, scale and offset do not affect
            // placement.
            _ => {}
        }
    }

    fn destroyed(state: &mut Self, _client: ClientId, resource: &wl_surface::WlSurface, _data: &()) {
        state.compositor.surfaces.remove(&resource.id());
        state.handle_surface_destroyed(resource);
    }
}

impl Dispatch<wl_region::WlRegion, ()> for ShellState {
    fn request(
        _state: &mut Self,
        _client: &Client,
        _resource: &wl_region::WlRegion,
        _request: wl_region::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        _data_init: &mut DataInit<'_, Self>,
    ) {
    }
}

impl Dispatch<wl_callback::WlCallback, ()> for ShellState {
    fn request(
        _state: &mut Self,
        _client: &Client,
        _resource: &wl_callback::WlCallback,
        _request: wl_callback::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        _data_init: &mut DataInit<'_, Self>,
    ) {
    }
}
