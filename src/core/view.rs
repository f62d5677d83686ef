//! Application views.
//!
//! A view is either an xdg toplevel or an Xwayland window. Behaviour that
//! differs between the two goes through a static [`ViewImpl`] table selected
//! by the variant, so callers never match on the kind themselves.

use crate::core::output::OutputId;
use crate::core::SurfaceId;
use crate::util::geometry::Rect;

pub type ViewId = u32;

/// Subsurface of an xdg toplevel, positioned relative to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subsurface {
    pub surface: SurfaceId,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// xdg-shell toplevel state
#[derive(Debug, Clone, Default)]
pub struct XdgToplevel {
    pub title: Option<String>,
    pub app_id: String,
    pub surface: SurfaceId,
    /// Bottom first
    pub subsurfaces: Vec<Subsurface>,
    pub width: u32,
    pub height: u32,
    pub activated: bool,
    pub maximized: bool,
    pub closed: bool,
}

/// Xwayland window state
#[derive(Debug, Clone, Default)]
pub struct XwaylandWindow {
    pub title: Option<String>,
    pub surface: SurfaceId,
    pub width: u32,
    pub height: u32,
    pub activated: bool,
    pub maximized: bool,
    pub closed: bool,
}

#[derive(Debug, Clone)]
pub enum ViewKind {
    Xdg(XdgToplevel),
    Xwayland(XwaylandWindow),
}

/// Per-kind view behaviour.
pub struct ViewImpl {
    pub get_title: fn(&View) -> Option<&str>,
    /// Current size of the view's main surface
    pub get_geometry: fn(&View) -> (u32, u32),
    pub activate: fn(&mut View, bool),
    /// Resizes the view to fill `width` x `height`
    pub maximize: fn(&mut View, u32, u32),
    pub destroy: fn(&mut View),
    /// Visits every surface of the view with its view-local offset
    pub for_each_surface: fn(&View, &mut dyn FnMut(SurfaceId, i32, i32)),
    /// Topmost surface at view-local coordinates, with surface-local ones
    pub hit_test: fn(&View, f64, f64) -> Option<(SurfaceId, f64, f64)>,
}

/// An application view placed on an output.
#[derive(Debug, Clone)]
pub struct View {
    pub id: ViewId,
    pub output: OutputId,
    /// Position in output-local coordinates
    pub x: i32,
    pub y: i32,
    pub kind: ViewKind,
}

impl View {
    pub fn new(id: ViewId, output: OutputId, kind: ViewKind) -> Self {
        Self { id, output, x: 0, y: 0, kind }
    }

    fn vtable(&self) -> &'static ViewImpl {
        match self.kind {
            ViewKind::Xdg(_) => &XDG_VIEW_IMPL,
            ViewKind::Xwayland(_) => &XWAYLAND_VIEW_IMPL,
        }
    }

    pub fn title(&self) -> Option<&str> {
        (self.vtable().get_title)(self)
    }

    /// Geometry in output-local coordinates.
    pub fn geometry(&self) -> Rect {
        let (width, height) = (self.vtable().get_geometry)(self);
        Rect::new(self.x, self.y, width, height)
    }

    pub fn activate(&mut self, activate: bool) {
        (self.vtable().activate)(self, activate)
    }

    /// Fills `area`, given in output-local coordinates.
    pub fn maximize(&mut self, area: Rect) {
        self.x = area.x;
        self.y = area.y;
        (self.vtable().maximize)(self, area.width, area.height)
    }

    pub fn destroy(&mut self) {
        (self.vtable().destroy)(self)
    }

    pub fn for_each_surface(&self, f: &mut dyn FnMut(SurfaceId, i32, i32)) {
        (self.vtable().for_each_surface)(self, f)
    }

    /// Surface under an output-local point.
    pub fn surface_at(&self, x: f64, y: f64) -> Option<(SurfaceId, f64, f64)> {
        (self.vtable().hit_test)(self, x - self.x as f64, y - self.y as f64)
    }
}

fn hit_rect(width: u32, height: u32, sx: f64, sy: f64) -> bool {
    Rect::new(0, 0, width, height).contains_point(sx, sy)
}

// ============================================================================
// xdg toplevel
// ============================================================================

fn xdg(view: &View) -> Option<&XdgToplevel> {
    match &view.kind {
        ViewKind::Xdg(toplevel) => Some(toplevel),
        _ => None,
    }
}

fn xdg_mut(view: &mut View) -> Option<&mut XdgToplevel> {
    match &mut view.kind {
        ViewKind::Xdg(toplevel) => Some(toplevel),
        _ => None,
    }
}

fn xdg_get_title(view: &View) -> Option<&str> {
    xdg(view).and_then(|t| t.title.as_deref())
}

fn xdg_get_geometry(view: &View) -> (u32, u32) {
    xdg(view).map_or((0, 0), |t| (t.width, t.height))
}

fn xdg_activate(view: &mut View, activate: bool) {
    if let Some(t) = xdg_mut(view) {
        t.activated = activate;
    }
}

fn xdg_maximize(view: &mut View, width: u32, height: u32) {
    if let Some(t) = xdg_mut(view) {
        t.width = width;
        t.height = height;
        t.maximized = true;
    }
}

fn xdg_destroy(view: &mut View) {
    if let Some(t) = xdg_mut(view) {
        t.subsurfaces.clear();
        t.activated = false;
        t.closed = true;
    }
}

fn xdg_for_each_surface(view: &View, f: &mut dyn FnMut(SurfaceId, i32, i32)) {
    if let Some(t) = xdg(view) {
        f(t.surface, 0, 0);
        for sub in &t.subsurfaces {
            f(sub.surface, sub.x, sub.y);
        }
    }
}

fn xdg_hit_test(view: &View, sx: f64, sy: f64) -> Option<(SurfaceId, f64, f64)> {
    let t = xdg(view)?;
    // Subsurfaces stack above the main surface; topmost first.
    for sub in t.subsurfaces.iter().rev() {
        let (lx, ly) = (sx - sub.x as f64, sy - sub.y as f64);
        if hit_rect(sub.width, sub.height, lx, ly) {
            return Some((sub.surface, lx, ly));
        }
    }
    hit_rect(t.width, t.height, sx, sy).then_some((t.surface, sx, sy))
}

static XDG_VIEW_IMPL: ViewImpl = ViewImpl {
    get_title: xdg_get_title,
    get_geometry: xdg_get_geometry,
    activate: xdg_activate,
    maximize: xdg_maximize,
    destroy: xdg_destroy,
    for_each_surface: xdg_for_each_surface,
    hit_test: xdg_hit_test,
};

// ============================================================================
// Xwayland
// ============================================================================

fn xwayland(view: &View) -> Option<&XwaylandWindow> {
    match &view.kind {
        ViewKind::Xwayland(window) => Some(window),
        _ => None,
    }
}

fn xwayland_mut(view: &mut View) -> Option<&mut XwaylandWindow> {
    match &mut view.kind {
        ViewKind::Xwayland(window) => Some(window),
        _ => None,
    }
}

fn xwayland_get_title(view: &View) -> Option<&str> {
    xwayland(view).and_then(|w| w.title.as_deref())
}

fn xwayland_get_geometry(view: &View) -> (u32, u32) {
    xwayland(view).map_or((0, 0), |w| (w.width, w.height))
}

fn xwayland_activate(view: &mut View, activate: bool) {
    if let Some(w) = xwayland_mut(view) {
        w.activated = activate;
    }
}

fn xwayland_maximize(view: &mut View, width: u32, height: u32) {
    if let Some(w) = xwayland_mut(view) {
        w.width = width;
        w.height = height;
        w.maximized = true;
    }
}

fn xwayland_destroy(view: &mut View) {
    if let Some(w) = xwayland_mut(view) {
        w.activated = false;
        w.closed = true;
    }
}

fn xwayland_for_each_surface(view: &View, f: &mut dyn FnMut(SurfaceId, i32, i32)) {
    if let Some(w) = xwayland(view) {
        f(w.surface, 0, 0);
    }
}

fn xwayland_hit_test(view: &View, sx: f64, sy: f64) -> Option<(SurfaceId, f64, f64)> {
    let w = xwayland(view)?;
    hit_rect(w.width, w.height, sx, sy).then_some((w.surface, sx, sy))
}

static XWAYLAND_VIEW_IMPL: ViewImpl = ViewImpl {
    get_title: xwayland_get_title,
    get_geometry: xwayland_get_geometry,
    activate: xwayland_activate,
    maximize: xwayland_maximize,
    destroy: xwayland_destroy,
    for_each_surface: xwayland_for_each_surface,
    hit_test: xwayland_hit_test,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::output::{Output, OutputArena};
    use crate::core::layer::LayerRegistry;

    fn output_id() -> OutputId {
        let mut arena = OutputArena::new();
        arena.insert(Output {
            name: "view-test".into(),
            x: 0,
            y: 0,
            mode: None,
            scale: 1.0,
            enabled: true,
            usable_area: Rect::default(),
            node: 0,
            views_node: 0,
            layers: LayerRegistry::default(),
            added_seq: 0,
        })
    }

    fn xdg_view() -> View {
        View::new(
            1,
            output_id(),
            ViewKind::Xdg(XdgToplevel {
                title: Some("kiosk".into()),
                surface: 10,
                subsurfaces: vec![Subsurface { surface: 11, x: 20, y: 20, width: 50, height: 50 }],
                width: 640,
                height: 480,
                ..Default::default()
            }),
        )
    }

    #[test]
    fn test_dispatch_by_kind() {
        let mut view = xdg_view();
        assert_eq!(view.title(), Some("kiosk"));
        view.maximize(Rect::new(0, 40, 1920, 1040));
        assert_eq!(view.geometry(), Rect::new(0, 40, 1920, 1040));
        assert!(matches!(&view.kind, ViewKind::Xdg(t) if t.maximized));

        let mut x11 = View::new(2, output_id(), ViewKind::Xwayland(XwaylandWindow { surface: 20, ..Default::default() }));
        assert_eq!(x11.title(), None);
        x11.activate(true);
        x11.maximize(Rect::new(0, 0, 800, 600));
        assert!(matches!(&x11.kind, ViewKind::Xwayland(w) if w.activated && w.maximized && w.width == 800));
        x11.destroy();
        assert!(matches!(&x11.kind, ViewKind::Xwayland(w) if w.closed && !w.activated));
    }

    #[test]
    fn test_surfaces_and_hit_test() {
        let mut view = xdg_view();
        view.x = 100;
        view.y = 100;

        let mut seen = Vec::new();
        view.for_each_surface(&mut |surface, x, y| seen.push((surface, x, y)));
        assert_eq!(seen, vec![(10, 0, 0), (11, 20, 20)]);

        assert_eq!(view.surface_at(130.0, 130.0), Some((11, 10.0, 10.0)));
        assert_eq!(view.surface_at(105.0, 105.0), Some((10, 5.0, 5.0)));
        assert_eq!(view.surface_at(50.0, 50.0), None);

        view.destroy();
        let mut count = 0;
        view.for_each_surface(&mut |_, _, _| count += 1);
        assert_eq!(count, 1);
    }
}
