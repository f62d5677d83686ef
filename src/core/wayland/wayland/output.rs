//! wl_output globals for shell outputs.
//!
//! Binding one associates the resource with its shell output, so
//! `get_layer_surface` can name it.

use wayland_server::backend::{ClientId, GlobalId};
use wayland_server::protocol::wl_output::{self, Subpixel, Transform, WlOutput};
use wayland_server::{Client, DataInit, Dispatch, DisplayHandle, GlobalDispatch, New, Resource};

use crate::core::output::{Output, OutputId};
use crate::core::state::ShellState;

/// Global data: the shell output a wl_output global advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputGlobal {
    pub output: OutputId,
}

pub fn register_output(display: &DisplayHandle, output: OutputId) -> GlobalId {
    display.create_global::<ShellState, WlOutput, OutputGlobal>(3, OutputGlobal { output })
}

impl GlobalDispatch<WlOutput, OutputGlobal> for ShellState {
    fn bind(
        state: &mut Self,
        _handle: &DisplayHandle,
        _client: &Client,
        resource: New<WlOutput>,
        global_data: &OutputGlobal,
        data_init: &mut DataInit<'_, Self>,
    ) {
        let wl_output = data_init.init(resource, global_data.output);
        match state.output(global_data.output) {
            Some(output) => send_output_info(&wl_output, output),
            None => tracing::warn!("wl_output bound for stale output {}", global_data.output),
        }
        state.bind_output(&wl_output, global_data.output);
        tracing::debug!("Bound wl_output v{} for output {}", wl_output.version(), global_data.output);
    }
}

impl Dispatch<WlOutput, OutputId> for ShellState {
    fn request(
        _state: &mut Self,
        _client: &Client,
        _resource: &WlOutput,
        _request: wl_output::Request,
        _data: &OutputId,
        _dhandle: &DisplayHandle,
        _data_init: &mut DataInit<'_, Self>,
    ) {
        // release is a destructor; cleanup happens in destroyed()
    }

    fn destroyed(state: &mut Self, _client: ClientId, resource: &WlOutput, data: &OutputId) {
        state.unbind_output(resource);
        tracing::trace!("wl_output released for output {}", data);
    }
}

fn send_output_info(wl_output: &WlOutput, output: &Output) {
    wl_output.geometry(
        output.x,
        output.y,
        0,
        0,
        Subpixel::Unknown,
        "kiosk".to_string(),
        output.name.clone(),
        Transform::Normal,
    );
    if let Some(mode) = output.mode {
        wl_output.mode(
            wl_output::Mode::Current | wl_output::Mode::Preferred,
            mode.width as i32,
            mode.height as i32,
            mode.refresh as i32,
        );
    }
    if wl_output.version() >= 2 {
        wl_output.scale(output.scale.ceil().max(1.0) as i32);
        wl_output.done();
    }
}
