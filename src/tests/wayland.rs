use rstest::rstest;
use wayland_protocols_wlr::layer_shell::v1::server::zwlr_layer_surface_v1;
use wayland_server::Display;

use crate::core::errors::CoreError;
use crate::core::layer::{Anchor, LayerBand};
use crate::core::output::OutputInfo;
use crate::core::state::{LayerSurfaceRequest, ShellEvent, ShellState};
use crate::core::wayland::wayland::{register_compositor, register_output, register_shm, BufferState};
use crate::core::wayland::wlroots::{commit_error_code, register_layer_shell};
use crate::util::geometry::Rect;
use crate::util::logging;

#[test]
fn test_register_layer_shell_global() {
    logging::init_for_tests();
    let display = Display::<ShellState>::new().unwrap();
    let handle = display.handle();

    let a = register_layer_shell(&handle, 4);
    let b = register_layer_shell(&handle, 1);
    assert_ne!(a, b);
    handle.remove_global::<ShellState>(b);
}

#[test]
fn test_flush_routes_client_events() {
    logging::init_for_tests();
    let mut state = ShellState::default();
    let output = state.add_output(OutputInfo::new("DP-1", 1280, 720)).unwrap();

    let id = state
        .new_layer_surface(LayerSurfaceRequest {
            desired_height: 24,
            anchor: Anchor::TOP | Anchor::LEFT | Anchor::RIGHT,
            exclusive_zone: 24,
            ..LayerSurfaceRequest::new("panel", LayerBand::Top as u32)
        })
        .unwrap();
    state.commit_layer_surface(id, false).unwrap();

    // Surfaces created without a protocol object have nothing to send; only
    // compositor-facing events come back.
    let events = state.flush_events();
    assert_eq!(
        events,
        vec![ShellEvent::UsableAreaChanged { output, area: Rect::new(0, 0, 1280, 720) }]
    );
    assert!(state.layer_shell.resource(id).is_none());
    assert!(state.flush_events().is_empty());

    state.remove_output(output).unwrap();
    assert!(state.flush_events().is_empty());
    assert!(state.layer_surface(id).is_none());
}

#[test]
fn test_register_core_globals() {
    logging::init_for_tests();
    let display = Display::<ShellState>::new().unwrap();
    let handle = display.handle();
    let mut state = ShellState::default();
    let output = state.add_output(OutputInfo::new("DP-1", 1280, 720)).unwrap();

    let globals = [
        register_compositor(&handle),
        register_shm(&handle),
        register_output(&handle, output),
        register_layer_shell(&handle, 4),
    ];
    for (i, a) in globals.iter().enumerate() {
        for b in &globals[i + 1..] {
            assert_ne!(a, b);
        }
    }
    assert!(state.compositor.is_empty());
}

#[test]
fn test_buffer_state_is_double_buffered() {
    let mut buffer = BufferState::default();
    assert!(!buffer.commit());

    buffer.attach(true);
    assert!(!buffer.has_buffer());
    assert!(buffer.commit());

    // Commits without a new attach keep the current buffer.
    assert!(buffer.commit());
    assert!(buffer.has_buffer());

    buffer.attach(false);
    assert!(buffer.has_buffer());
    assert!(!buffer.commit());
    assert!(!buffer.has_buffer());
}

#[rstest]
#[case::bad_size(CoreError::InvalidSize("width is zero"), Some(zwlr_layer_surface_v1::Error::InvalidSize))]
#[case::bad_ack(CoreError::protocol_violation("unknown serial"), Some(zwlr_layer_surface_v1::Error::InvalidSurfaceState))]
#[case::ack_before_commit(CoreError::NotInitialized(3), Some(zwlr_layer_surface_v1::Error::InvalidSurfaceState))]
#[case::bad_layer(CoreError::InvalidLayer(7), Some(zwlr_layer_surface_v1::Error::InvalidSurfaceState))]
#[case::exhausted(CoreError::ResourceExhausted("scene nodes"), None)]
#[case::no_output(CoreError::NoOutputAvailable, None)]
#[case::destroyed(CoreError::ControllerDestroyed(3), None)]
fn test_commit_error_code(#[case] error: CoreError, #[case] expected: Option<zwlr_layer_surface_v1::Error>) {
    assert_eq!(commit_error_code(&error), expected);
}
