//! Application view layout.
//!
//! Every view is maximized to the usable area of its output and re-laid-out
//! whenever that area changes.

use crate::core::errors::{CoreError, Result};
use crate::core::view::ViewKind;

use super::*;

impl ShellState {
    /// Adds a view on top of the others on `output`, maximizes it and makes
    /// it the active one.
    pub fn add_view(&mut self, output: OutputId, kind: ViewKind) -> Result<ViewId> {
        let usable = match self.outputs.get(output) {
            Some(o) if o.is_usable() => o.usable_area,
            _ => return Err(CoreError::UnknownOutput(output)),
        };
        self.views
            .try_reserve(1)
            .map_err(|_| CoreError::ResourceExhausted("view"))?;

        let id = self.next_view_id();
        let mut view = View::new(id, output, kind);
        view.maximize(usable);
        for other in self.views.iter_mut() {
            other.activate(false);
        }
        view.activate(true);
        tracing::debug!("View {} ({:?}) added on output {}", id, view.title(), output);
        self.views.push(view);
        Ok(id)
    }

    pub fn view(&self, id: ViewId) -> Option<&View> {
        self.views.iter().find(|v| v.id == id)
    }

    pub fn remove_view(&mut self, id: ViewId) -> Option<View> {
        let pos = self.views.iter().position(|v| v.id == id)?;
        let mut view = self.views.remove(pos);
        view.destroy();
        tracing::debug!("View {} removed", id);
        Some(view)
    }

    /// Lays out the application views of one output inside its usable area.
    pub fn arrange_views(&mut self, output: OutputId) {
        let Some(usable) = self.outputs.get(output).map(|o| o.usable_area) else {
            return;
        };
        for view in self.views.iter_mut().filter(|v| v.output == output) {
            view.maximize(usable);
        }
    }

    /// Topmost view surface under a layout point.
    pub fn view_surface_at(&self, x: f64, y: f64) -> Option<(SurfaceId, f64, f64)> {
        let output_id = self.outputs.output_at(x, y)?;
        let output = self.outputs.get(output_id)?;
        let (lx, ly) = (x - output.x as f64, y - output.y as f64);
        self.views
            .iter()
            .rev()
            .filter(|v| v.output == output_id)
            .find_map(|v| v.surface_at(lx, ly))
    }
}
