//! Placement of layer surfaces inside an output.

use crate::core::layer::surface::{Anchor, LayerSurfaceAttributes};
use crate::core::render::node::NodeId;
use crate::core::render::scene::Scene;
use crate::util::geometry::Rect;

/// Position and extent along one axis.
fn place_axis(
    bounds_start: i32,
    bounds_len: u32,
    desired: u32,
    anchor_start: bool,
    anchor_end: bool,
    margin_start: i32,
    margin_end: i32,
) -> (i64, i64) {
    let start = bounds_start as i64;
    let len = bounds_len as i64;
    let desired = desired as i64;

    if desired == 0 {
        return (start + margin_start as i64, len - (margin_start as i64 + margin_end as i64));
    }
    let pos = match (anchor_start, anchor_end) {
        (true, false) => start + margin_start as i64,
        (false, true) => start + len - desired - margin_end as i64,
        _ => start + len / 2 - desired / 2,
    };
    (pos, desired)
}

fn to_rect(x: i64, y: i64, width: i64, height: i64) -> Rect {
    let clamp = |v: i64| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
    Rect::from_signed(clamp(x), clamp(y), clamp(width), clamp(height))
}

/// Shrinks `usable` by the space a surface reserves on its exclusive edge.
fn apply_exclusive_zone(attrs: &LayerSurfaceAttributes, full: &Rect, usable: &mut Rect) {
    if attrs.exclusive_zone <= 0 {
        return;
    }
    let Some(edge) = attrs.anchor.exclusive_edge() else {
        return;
    };

    let (x, y) = (usable.x as i64, usable.y as i64);
    let (w, h) = (usable.width as i64, usable.height as i64);
    let zone = attrs.exclusive_zone as i64;
    let margin = attrs.margin;

    let shrunk = if edge == Anchor::TOP {
        let amount = zone + margin.top as i64;
        to_rect(x, y + amount, w, h - amount)
    } else if edge == Anchor::BOTTOM {
        to_rect(x, y, w, h - (zone + margin.bottom as i64))
    } else if edge == Anchor::LEFT {
        let amount = zone + margin.left as i64;
        to_rect(x + amount, y, w - amount, h)
    } else {
        to_rect(x, y, w - (zone + margin.right as i64), h)
    };
    *usable = shrunk.clamp_to(full);
}

impl Scene {
    /// Positions the placement node of a layer surface and returns its
    /// geometry in output-local coordinates.
    ///
    /// Mapped surfaces with a positive exclusive zone shrink `usable`, which
    /// always stays inside `full`.
    pub fn configure_layer_surface(
        &mut self,
        node: NodeId,
        attrs: &LayerSurfaceAttributes,
        mapped: bool,
        full: &Rect,
        usable: &mut Rect,
    ) -> Rect {
        let bounds = if attrs.exclusive_zone == -1 { *full } else { *usable };
        let anchor = attrs.anchor;
        let margin = attrs.margin;

        let (x, width) = place_axis(
            bounds.x,
            bounds.width,
            attrs.desired_width,
            anchor.contains(Anchor::LEFT),
            anchor.contains(Anchor::RIGHT),
            margin.left,
            margin.right,
        );
        let (y, height) = place_axis(
            bounds.y,
            bounds.height,
            attrs.desired_height,
            anchor.contains(Anchor::TOP),
            anchor.contains(Anchor::BOTTOM),
            margin.top,
            margin.bottom,
        );
        let geometry = to_rect(x, y, width, height);

        self.set_geometry(node, geometry);

        if mapped {
            apply_exclusive_zone(attrs, full, usable);
        }
        geometry
    }
}
