use crate::config::ShellConfig;
use crate::core::errors::CoreError;
use crate::core::layer::{Anchor, KeyboardInteractivity, LayerBand, Lifecycle};
use crate::core::output::{OutputId, OutputInfo, OutputMode};
use crate::core::state::{LayerSurfaceRequest, ShellEvent, ShellState};
use crate::core::view::{ViewKind, XdgToplevel};
use crate::core::SurfaceId;
use crate::util::geometry::Rect;
use crate::util::logging;

const FULL: Rect = Rect { x: 0, y: 0, width: 1920, height: 1080 };

fn shell(config: ShellConfig) -> (ShellState, OutputId) {
    logging::init_for_tests();
    let mut state = ShellState::new(config);
    let output = state.add_output(OutputInfo::new("DP-1", 1920, 1080)).unwrap();
    assert_eq!(
        state.take_events(),
        vec![ShellEvent::UsableAreaChanged { output, area: FULL }]
    );
    (state, output)
}

fn bar(band: LayerBand, height: u32, zone: i32) -> LayerSurfaceRequest {
    LayerSurfaceRequest {
        desired_height: height,
        anchor: Anchor::TOP | Anchor::LEFT | Anchor::RIGHT,
        exclusive_zone: zone,
        ..LayerSurfaceRequest::new("bar", band as u32)
    }
}

fn launcher(band: LayerBand) -> LayerSurfaceRequest {
    LayerSurfaceRequest {
        desired_width: 400,
        desired_height: 300,
        keyboard_interactivity: KeyboardInteractivity::Exclusive,
        ..LayerSurfaceRequest::new("launcher", band as u32)
    }
}

fn last_configure(events: &[ShellEvent], surface: SurfaceId) -> Option<u32> {
    events.iter().rev().find_map(|e| match *e {
        ShellEvent::LayerSurfaceConfigure { surface: s, serial, .. } if s == surface => Some(serial),
        _ => None,
    })
}

fn usable_changes(events: &[ShellEvent]) -> Vec<Rect> {
    events
        .iter()
        .filter_map(|e| match *e {
            ShellEvent::UsableAreaChanged { area, .. } => Some(area),
            _ => None,
        })
        .collect()
}

/// Initial commit, ack of the resulting configure, then a commit with a
/// buffer. Returns every event produced on the way.
fn map(state: &mut ShellState, id: SurfaceId) -> Vec<ShellEvent> {
    state.commit_layer_surface(id, false).unwrap();
    let mut events = state.take_events();
    let serial = last_configure(&events, id).expect("initial commit must be configured");
    state.ack_layer_configure(id, serial).unwrap();
    state.commit_layer_surface(id, true).unwrap();
    events.extend(state.take_events());
    events
}

fn usable(state: &ShellState, output: OutputId) -> Rect {
    state.output(output).unwrap().usable_area
}

// ============================================================================
// Arrangement
// ============================================================================

#[test]
fn test_background_bar_reserves_space() {
    let (mut state, output) = shell(ShellConfig::default());

    let bar_id = state.new_layer_surface(bar(LayerBand::Background, 40, 40)).unwrap();
    let events = map(&mut state, bar_id);
    assert_eq!(usable(&state, output), Rect::new(0, 40, 1920, 1040));
    assert_eq!(usable_changes(&events), vec![Rect::new(0, 40, 1920, 1040)]);
    assert_eq!(state.layer_surface(bar_id).unwrap().geometry(), Some(Rect::new(0, 0, 1920, 40)));

    // A zone-0 fill surface in the bottom band leaves the usable area alone.
    let fill = state
        .new_layer_surface(LayerSurfaceRequest {
            anchor: Anchor::all(),
            ..LayerSurfaceRequest::new("wallpaper", LayerBand::Bottom as u32)
        })
        .unwrap();
    let events = map(&mut state, fill);
    assert!(usable_changes(&events).is_empty());
    assert_eq!(usable(&state, output), Rect::new(0, 40, 1920, 1040));
    assert_eq!(state.layer_surface(fill).unwrap().geometry(), Some(Rect::new(0, 40, 1920, 1040)));
}

#[test]
fn test_arrange_twice_notifies_once() {
    let (mut state, output) = shell(ShellConfig::default());
    let id = state.new_layer_surface(bar(LayerBand::Top, 30, 30)).unwrap();
    map(&mut state, id);

    state.set_output_mode(output, Some(OutputMode::new(1280, 720)), 1.0).unwrap();
    let events = state.take_events();
    assert_eq!(usable_changes(&events), vec![Rect::new(0, 30, 1280, 690)]);
    assert!(last_configure(&events, id).is_some());

    state.arrange_layers(output);
    state.arrange_layers(output);
    assert!(state.take_events().is_empty());
    assert_eq!(usable(&state, output), Rect::new(0, 30, 1280, 690));
}

#[test]
fn test_bands_shrink_in_order() {
    let (mut state, output) = shell(ShellConfig::default());
    let overlay = state.new_layer_surface(bar(LayerBand::Overlay, 10, 10)).unwrap();
    let top = state.new_layer_surface(bar(LayerBand::Top, 10, 10)).unwrap();
    let bottom = state.new_layer_surface(bar(LayerBand::Bottom, 10, 10)).unwrap();
    let background = state.new_layer_surface(bar(LayerBand::Background, 10, 10)).unwrap();
    for id in [overlay, top, bottom, background] {
        map(&mut state, id);
    }
    state.arrange_layers(output);

    let y = |id| state.layer_surface(id).and_then(|c| c.geometry()).map(|g| g.y);
    assert_eq!(y(background), Some(0));
    assert_eq!(y(bottom), Some(10));
    assert_eq!(y(top), Some(20));
    assert_eq!(y(overlay), Some(30));
    assert_eq!(usable(&state, output), Rect::new(0, 40, 1920, 1040));
    assert!(FULL.contains_rect(&usable(&state, output)));
}

#[test]
fn test_oversized_zone_stays_inside_output() {
    let (mut state, output) = shell(ShellConfig::default());
    let id = state.new_layer_surface(bar(LayerBand::Top, 30, 4000)).unwrap();
    map(&mut state, id);
    let area = usable(&state, output);
    assert!(FULL.contains_rect(&area));
    assert_eq!(area.height, 0);
}

#[test]
fn test_output_without_mode_defers_arrangement() {
    let (mut state, output) = shell(ShellConfig::default());
    let id = state.new_layer_surface(bar(LayerBand::Top, 30, 30)).unwrap();

    state.set_output_mode(output, None, 1.0).unwrap();
    state.commit_layer_surface(id, false).unwrap();
    assert!(state.take_events().is_empty());
    assert!(state.layer_surface(id).unwrap().geometry().is_none());

    state.set_output_mode(output, Some(OutputMode::new(800, 600)), 1.0).unwrap();
    let events = state.take_events();
    assert!(last_configure(&events, id).is_some());
    assert_eq!(usable_changes(&events), vec![Rect::new(0, 0, 800, 600)]);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_unmap_reclaims_space_eagerly() {
    let (mut state, output) = shell(ShellConfig::default());
    let id = state.new_layer_surface(bar(LayerBand::Top, 30, 30)).unwrap();
    map(&mut state, id);
    assert_eq!(usable(&state, output), Rect::new(0, 30, 1920, 1050));

    state.commit_layer_surface(id, false).unwrap();
    assert_eq!(usable(&state, output), FULL);
    assert_eq!(usable_changes(&state.take_events()), vec![FULL]);
    assert_eq!(state.layer_surface(id).unwrap().lifecycle(), Lifecycle::Unmapped);

    // Mapping again repeats the handshake.
    let events = map(&mut state, id);
    assert!(last_configure(&events, id).is_some());
    assert_eq!(usable(&state, output), Rect::new(0, 30, 1920, 1050));
}

#[test]
fn test_unmap_can_defer_rearrangement() {
    let config = ShellConfig { rearrange_on_unmap: false, ..ShellConfig::default() };
    let (mut state, output) = shell(config);
    let id = state.new_layer_surface(bar(LayerBand::Top, 30, 30)).unwrap();
    map(&mut state, id);

    state.commit_layer_surface(id, false).unwrap();
    assert!(!state.layer_surface(id).unwrap().mapped);
    assert_eq!(usable(&state, output), Rect::new(0, 30, 1920, 1050));

    // The next initial commit re-arranges.
    state.commit_layer_surface(id, false).unwrap();
    assert_eq!(usable(&state, output), FULL);
}

#[test]
fn test_noop_commit_does_nothing() {
    let (mut state, _output) = shell(ShellConfig::default());
    let id = state.new_layer_surface(bar(LayerBand::Top, 30, 30)).unwrap();
    map(&mut state, id);

    state.commit_layer_surface(id, true).unwrap();
    assert!(state.take_events().is_empty());
}

#[test]
fn test_client_destroy_releases_everything() {
    let (mut state, output) = shell(ShellConfig::default());
    let nodes_before = state.scene.nodes.len();
    let id = state.new_layer_surface(bar(LayerBand::Top, 30, 30)).unwrap();
    map(&mut state, id);
    assert!(state.signals.is_subscribed(id));

    state.destroy_layer_surface(id).unwrap();
    assert!(state.layer_surface(id).is_none());
    assert!(!state.signals.is_subscribed(id));
    assert!(state.output(output).unwrap().layers.is_empty());
    assert_eq!(state.scene.nodes.len(), nodes_before);
    assert_eq!(usable(&state, output), FULL);

    assert_eq!(state.destroy_layer_surface(id), Err(CoreError::UnknownSurface(id)));
    assert_eq!(state.commit_layer_surface(id, false), Err(CoreError::UnknownSurface(id)));
}

#[test]
fn test_band_change_reparents() {
    let (mut state, output) = shell(ShellConfig::default());
    let id = state.new_layer_surface(bar(LayerBand::Top, 30, 30)).unwrap();
    map(&mut state, id);
    let placement = state.layer_surface(id).unwrap().placement;

    state.set_layer_surface_layer(id, LayerBand::Background as u32).unwrap();
    state.commit_layer_surface(id, true).unwrap();

    let controller = state.layer_surface(id).unwrap();
    assert_eq!(controller.band, LayerBand::Background);
    assert_eq!(controller.placement, placement);
    let layers = &state.output(output).unwrap().layers;
    assert_eq!(layers.surfaces(LayerBand::Background), &[id]);
    assert!(layers.surfaces(LayerBand::Top).is_empty());
    assert_eq!(
        state.scene.node(placement).unwrap().parent,
        Some(layers.parent_node(LayerBand::Background))
    );

    assert_eq!(state.set_layer_surface_layer(id, 9), Err(CoreError::InvalidLayer(9)));
}

#[test]
fn test_protocol_violations_are_rejected() {
    let (mut state, _output) = shell(ShellConfig::default());
    let id = state.new_layer_surface(bar(LayerBand::Top, 30, 30)).unwrap();

    let err = state.ack_layer_configure(id, 1).unwrap_err();
    assert_eq!(err, CoreError::NotInitialized(id));
    assert!(err.is_client_error());

    let err = state.commit_layer_surface(id, true).unwrap_err();
    assert!(err.is_client_error());
    state.commit_layer_surface(id, false).unwrap();
    let events = state.take_events();
    let serial = last_configure(&events, id).unwrap();

    assert!(state.ack_layer_configure(id, serial + 100).is_err());
    assert!(state.commit_layer_surface(id, true).is_err());
    state.ack_layer_configure(id, serial).unwrap();
    assert!(state.commit_layer_surface(id, true).is_ok());
}

// ============================================================================
// Focus
// ============================================================================

fn focus_changes(events: &[ShellEvent]) -> Vec<Option<SurfaceId>> {
    events
        .iter()
        .filter_map(|e| match *e {
            ShellEvent::KeyboardFocusChanged { surface } => Some(surface),
            _ => None,
        })
        .collect()
}

#[test]
fn test_focus_ties_keep_incumbent() {
    let (mut state, _output) = shell(ShellConfig::default());
    let a = state.new_layer_surface(launcher(LayerBand::Top)).unwrap();
    let b = state.new_layer_surface(launcher(LayerBand::Top)).unwrap();
    let c = state.new_layer_surface(launcher(LayerBand::Overlay)).unwrap();

    assert_eq!(focus_changes(&map(&mut state, a)), vec![Some(a)]);
    assert!(focus_changes(&map(&mut state, b)).is_empty());
    assert!(state.seat.has_keyboard_focus(a));
    assert_eq!(focus_changes(&map(&mut state, c)), vec![Some(c)]);

    state.commit_layer_surface(c, false).unwrap();
    assert_eq!(focus_changes(&state.take_events()), vec![None]);
}

#[test]
fn test_low_bands_never_take_focus() {
    let (mut state, _output) = shell(ShellConfig::default());
    let id = state.new_layer_surface(launcher(LayerBand::Bottom)).unwrap();
    assert!(focus_changes(&map(&mut state, id)).is_empty());
    assert!(state.seat.focused_layer().is_none());

    let passive = state.new_layer_surface(bar(LayerBand::Overlay, 30, 0)).unwrap();
    assert!(focus_changes(&map(&mut state, passive)).is_empty());
}

#[test]
fn test_band_raised_in_mapping_commit_takes_focus() {
    let (mut state, output) = shell(ShellConfig::default());
    let id = state.new_layer_surface(launcher(LayerBand::Bottom)).unwrap();
    state.commit_layer_surface(id, false).unwrap();
    let serial = last_configure(&state.take_events(), id).unwrap();
    state.ack_layer_configure(id, serial).unwrap();

    state.set_layer_surface_layer(id, LayerBand::Overlay as u32).unwrap();
    state.commit_layer_surface(id, true).unwrap();

    let controller = state.layer_surface(id).unwrap();
    assert_eq!(controller.band, LayerBand::Overlay);
    assert!(controller.mapped);
    assert_eq!(focus_changes(&state.take_events()), vec![Some(id)]);
    assert_eq!(state.seat.focused_layer().map(|f| f.band), Some(LayerBand::Overlay));
    assert_eq!(state.output(output).unwrap().layers.surfaces(LayerBand::Overlay), &[id]);
}

// ============================================================================
// Factory
// ============================================================================

#[test]
fn test_explicit_output_without_mode() {
    let (mut state, output) = shell(ShellConfig::default());
    state.set_output_mode(output, None, 1.0).unwrap();

    let request = LayerSurfaceRequest { output: Some(output), ..bar(LayerBand::Top, 30, 30) };
    let id = state.new_layer_surface(request).unwrap();
    assert_eq!(state.layer_surface(id).unwrap().output, output);

    // Without an explicit output there is nothing usable to fall back to.
    assert_eq!(
        state.new_layer_surface(bar(LayerBand::Top, 30, 30)),
        Err(CoreError::NoOutputAvailable)
    );

    state.commit_layer_surface(id, false).unwrap();
    assert!(state.take_events().is_empty());
    state.set_output_mode(output, Some(OutputMode::new(1920, 1080)), 1.0).unwrap();
    assert!(last_configure(&state.take_events(), id).is_some());
}

#[test]
fn test_output_resolution() {
    let (mut state, left) = shell(ShellConfig::default());
    let right = state.add_output(OutputInfo::new("DP-2", 1280, 1024).at(1920, 0)).unwrap();

    state.seat.set_pointer_location(100.0, 100.0);
    let a = state.new_layer_surface(bar(LayerBand::Top, 30, 30)).unwrap();
    assert_eq!(state.layer_surface(a).unwrap().output, left);

    state.seat.set_pointer_location(9000.0, 9000.0);
    let b = state.new_layer_surface(bar(LayerBand::Top, 30, 30)).unwrap();
    assert_eq!(state.layer_surface(b).unwrap().output, right);

    let explicit = LayerSurfaceRequest { output: Some(left), ..bar(LayerBand::Top, 30, 30) };
    let c = state.new_layer_surface(explicit).unwrap();
    assert_eq!(state.layer_surface(c).unwrap().output, left);
}

#[test]
fn test_rejections_leave_nothing_behind() {
    let (mut state, output) = shell(ShellConfig::default());
    let nodes = state.scene.nodes.len();

    let bad_layer = LayerSurfaceRequest::new("bad", 7);
    assert_eq!(state.new_layer_surface(bad_layer), Err(CoreError::InvalidLayer(7)));

    state.remove_output(output).unwrap();
    let stale = LayerSurfaceRequest { output: Some(output), ..bar(LayerBand::Top, 30, 30) };
    assert_eq!(state.new_layer_surface(stale), Err(CoreError::UnknownOutput(output)));
    assert_eq!(
        state.new_layer_surface(bar(LayerBand::Top, 30, 30)),
        Err(CoreError::NoOutputAvailable)
    );

    assert!(state.layers.is_empty());
    assert!(state.signals.is_empty());
    assert!(state.scene.nodes.len() < nodes);
}

#[test]
fn test_surface_limit_is_resource_exhaustion() {
    let config = ShellConfig { max_layer_surfaces: Some(1), ..ShellConfig::default() };
    let (mut state, output) = shell(config);
    let nodes = state.scene.nodes.len();

    state.new_layer_surface(bar(LayerBand::Top, 30, 30)).unwrap();
    let err = state.new_layer_surface(bar(LayerBand::Top, 30, 30)).unwrap_err();
    assert!(matches!(err, CoreError::ResourceExhausted(_)));
    assert!(!err.is_client_error());

    assert_eq!(state.layers.len(), 1);
    assert_eq!(state.signals.len(), 5);
    assert_eq!(state.output(output).unwrap().layers.len(), 1);
    assert_eq!(state.scene.nodes.len(), nodes + 1);
}

// ============================================================================
// Outputs
// ============================================================================

#[test]
fn test_output_removal_closes_every_layer_once() {
    let (mut state, output) = shell(ShellConfig::default());
    let other = state.add_output(OutputInfo::new("DP-2", 1280, 1024).at(1920, 0)).unwrap();
    state.take_events();

    let ids = [
        state.new_layer_surface(bar(LayerBand::Background, 30, 30)).unwrap(),
        state.new_layer_surface(launcher(LayerBand::Overlay)).unwrap(),
        state.new_layer_surface(LayerSurfaceRequest { output: Some(output), ..bar(LayerBand::Top, 30, 30) }).unwrap(),
    ];
    let survivor = state
        .new_layer_surface(LayerSurfaceRequest { output: Some(other), ..bar(LayerBand::Top, 30, 30) })
        .unwrap();
    assert!(ids.iter().all(|id| state.layer_surface(*id).unwrap().output == output));
    map(&mut state, ids[0]);
    map(&mut state, ids[1]);
    assert!(state.seat.has_keyboard_focus(ids[1]));

    state.remove_output(output).unwrap();
    let events = state.take_events();
    let closed: Vec<SurfaceId> = events
        .iter()
        .filter_map(|e| match *e {
            ShellEvent::LayerSurfaceClosed { surface } => Some(surface),
            _ => None,
        })
        .collect();
    assert_eq!(closed.len(), ids.len());
    assert!(ids.iter().all(|id| closed.contains(id)));
    assert_eq!(focus_changes(&events), vec![None]);

    assert!(state.output(output).is_none());
    assert_eq!(state.layers.len(), 1);
    assert!(state.layer_surface(survivor).is_some());
    assert_eq!(state.signals.len(), 5);
    assert_eq!(state.remove_output(output), Err(CoreError::UnknownOutput(output)));
}

#[test]
fn test_disable_and_enable_output() {
    let (mut state, output) = shell(ShellConfig::default());
    let id = state.new_layer_surface(bar(LayerBand::Top, 30, 30)).unwrap();
    map(&mut state, id);

    state.disable_output(output).unwrap();
    assert!(state.layer_surface(id).is_none());
    assert!(state.output(output).unwrap().layers.is_empty());
    assert_eq!(
        state.take_events(),
        vec![ShellEvent::LayerSurfaceClosed { surface: id }]
    );
    assert_eq!(
        state.new_layer_surface(LayerSurfaceRequest { output: Some(output), ..bar(LayerBand::Top, 30, 30) }),
        Err(CoreError::UnknownOutput(output))
    );

    state.enable_output(output).unwrap();
    assert_eq!(usable_changes(&state.take_events()), vec![FULL]);
    assert!(state.new_layer_surface(bar(LayerBand::Top, 30, 30)).is_ok());
}

#[test]
#[cfg_attr(debug_assertions, should_panic)]
fn test_arrange_on_stale_output_is_contract_violation() {
    let (mut state, output) = shell(ShellConfig::default());
    state.remove_output(output).unwrap();
    state.arrange_layers(output);
}

// ============================================================================
// Views
// ============================================================================

#[test]
fn test_views_follow_usable_area() {
    let (mut state, output) = shell(ShellConfig::default());
    let view = state
        .add_view(output, ViewKind::Xdg(XdgToplevel { surface: 500, ..Default::default() }))
        .unwrap();
    assert_eq!(state.view(view).unwrap().geometry(), FULL);

    let id = state.new_layer_surface(bar(LayerBand::Top, 30, 30)).unwrap();
    map(&mut state, id);
    assert_eq!(state.view(view).unwrap().geometry(), Rect::new(0, 30, 1920, 1050));
    assert_eq!(state.view_surface_at(10.0, 10.0), None);
    assert_eq!(state.view_surface_at(10.0, 40.0), Some((500, 10.0, 10.0)));

    let x11 = state.add_view(output, ViewKind::Xwayland(Default::default())).unwrap();
    let activated = |id| match &state.view(id).unwrap().kind {
        ViewKind::Xdg(t) => t.activated,
        ViewKind::Xwayland(w) => w.activated,
    };
    assert!(activated(x11));
    assert!(!activated(view));

    assert!(state.remove_view(view).is_some());
    assert!(state.view(view).is_none());
}
