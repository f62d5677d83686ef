//! wl_shm, just enough for clients to create buffers.
//!
//! Pools are never mapped; the shell only cares whether a buffer is attached.

use wayland_server::backend::GlobalId;
use wayland_server::protocol::{wl_buffer, wl_shm, wl_shm_pool};
use wayland_server::{Client, DataInit, Dispatch, DisplayHandle, GlobalDispatch, New, Resource};

use crate::core::state::ShellState;

pub fn register_shm(display: &DisplayHandle) -> GlobalId {
    display.create_global::<ShellState, wl_shm::WlShm, ()>(1, ())
}

impl GlobalDispatch<wl_shm::WlShm, ()> for ShellState {
    fn bind(
        _state: &mut Self,
        _handle: &DisplayHandle,
        _client: &Client,
        resource: New<wl_shm::WlShm>,
        _global_data: &(),
        data_init: &mut DataInit<'_, Self>,
    ) {
        let shm = data_init.init(resource, ());
        shm.format(wl_shm::Format::Argb8888);
        shm.format(wl_shm::Format::Xrgb8888);
    }
}

impl Dispatch<wl_shm::WlShm, ()> for ShellState {
    fn request(
        _state: &mut Self,
        _client: &Client,
        _resource: &wl_shm::WlShm,
        request: wl_shm::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        data_init: &mut DataInit<'_, Self>,
    ) {
        if let wl_shm::Request::CreatePool { id, fd, size } = request {
            let pool = data_init.init(id, ());
            drop(fd);
            tracing::trace!("wl_shm pool {:?} created ({} bytes)", pool.id(), size);
        }
    }
}

impl Dispatch<wl_shm_pool::WlShmPool, ()> for ShellState {
    fn request(
        _state: &mut Self,
        _client: &Client,
        _resource: &wl_shm_pool::WlShmPool,
        request: wl_shm_pool::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        data_init: &mut DataInit<'_, Self>,
    ) {
        if let wl_shm_pool::Request::CreateBuffer { id, width, height, .. } = request {
            let buffer = data_init.init(id, ());
            tracing::trace!("wl_buffer {:?} created ({}x{})", buffer.id(), width, height);
        }
    }
}

impl Dispatch<wl_buffer::WlBuffer, ()> for ShellState {
    fn request(
        _state: &mut Self,
        _client: &Client,
        _resource: &wl_buffer::WlBuffer,
        _request: wl_buffer::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        _data_init: &mut DataInit<'_, Self>,
    ) {
    }
}
