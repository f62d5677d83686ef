//! Headless layer shell server.
//!
//! Exposes `wl_compositor`, `wl_shm`, one virtual `wl_output` and
//! `zwlr_layer_shell_v1` on a fresh Wayland socket, and logs what the shell
//! reports. Shell clients (panels, launchers) can connect and get configured
//! and placed; nothing is rendered.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use wayland_server::backend::{ClientData, ClientId, DisconnectReason};
use wayland_server::{Display, ListeningSocket};

use kiosk_layers::core::wayland::wayland::{register_compositor, register_output, register_shm};
use kiosk_layers::core::wayland::wlroots::register_layer_shell;
use kiosk_layers::prelude::*;
use kiosk_layers::util::logging;

struct ClientState;

impl ClientData for ClientState {
    fn initialized(&self, client_id: ClientId) {
        tracing::info!("Client {:?} connected", client_id);
    }

    fn disconnected(&self, client_id: ClientId, reason: DisconnectReason) {
        tracing::info!("Client {:?} disconnected: {:?}", client_id, reason);
    }
}

fn output_size() -> (u32, u32) {
    std::env::var("KIOSK_OUTPUT_SIZE")
        .ok()
        .and_then(|s| {
            let (w, h) = s.split_once('x')?;
            Some((w.parse().ok()?, h.parse().ok()?))
        })
        .unwrap_or((1920, 1080))
}

fn main() -> Result<()> {
    logging::init("info,kiosk_layers=debug")?;

    let mut state = ShellState::new(ShellConfig::default());
    let mut display: Display<ShellState> = Display::new().context("failed to create display")?;
    let mut handle = display.handle();
    register_compositor(&handle);
    register_shm(&handle);
    register_layer_shell(&handle, state.config.layer_shell_version);

    let (width, height) = output_size();
    let output = state.add_output(OutputInfo::new("HEADLESS-1", width, height))?;
    register_output(&handle, output);
    tracing::info!("Virtual output {} is {}x{}", output, width, height);

    let socket = ListeningSocket::bind_auto("wayland", 1..33).context("failed to bind socket")?;
    if let Some(name) = socket.socket_name() {
        tracing::info!("Listening on {}", name.to_string_lossy());
    }

    loop {
        if let Some(stream) = socket.accept()? {
            handle
                .insert_client(stream, Arc::new(ClientState))
                .context("failed to insert client")?;
        }

        display.dispatch_clients(&mut state)?;
        let events = state.flush_events();
        for event in &events {
            tracing::info!("{:?}", event);
        }
        if !events.is_empty() {
            tracing::debug!("{} visible layer surfaces\n{}", state.scene.flatten().len(), state.scene.dump());
        }
        display.flush_clients()?;

        std::thread::sleep(Duration::from_millis(5));
    }
}
