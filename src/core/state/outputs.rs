//! Output lifecycle and layer arrangement.

use crate::contract_violation;
use crate::core::errors::{CoreError, Result};
use crate::core::layer::{arrange_layers, LayerRegistry};
use crate::core::output::{OutputInfo, OutputMode};
use crate::core::render::NodeId;
use crate::core::signal::SurfaceSignal;

use super::*;

impl ShellState {
    /// Registers a ready output and builds its scene trees.
    ///
    /// z-order inside the output: background, bottom, views, top, overlay.
    pub fn add_output(&mut self, info: OutputInfo) -> Result<OutputId> {
        let node = self.scene.create_tree(self.scene.root_id)?;
        self.scene.set_position(node, info.x, info.y);

        let (bands, views_node) = match create_output_trees(&mut self.scene, node) {
            Ok(trees) => trees,
            Err(e) => {
                self.scene.destroy(node);
                return Err(e);
            }
        };

        let name = info.name.clone();
        let id = self.outputs.insert(Output {
            name: info.name,
            x: info.x,
            y: info.y,
            mode: info.mode,
            scale: info.scale,
            enabled: true,
            usable_area: Rect::default(),
            node,
            views_node,
            layers: LayerRegistry::new(bands),
            added_seq: 0,
        });
        tracing::info!("Output {} ({}) added at {},{}", id, name, info.x, info.y);

        self.arrange_layers(id);
        Ok(id)
    }

    /// Applies a new mode and scale, then re-arranges.
    pub fn set_output_mode(&mut self, id: OutputId, mode: Option<OutputMode>, scale: f32) -> Result<()> {
        let output = self.outputs.get_mut(id).ok_or(CoreError::UnknownOutput(id))?;
        output.mode = mode;
        output.scale = scale;
        tracing::info!("Output {} mode set to {:?} at scale {}", id, mode, scale);

        self.arrange_layers(id);
        Ok(())
    }

    /// Destroys every layer surface on the output and stops placing new ones
    /// there. The output keeps its slot and handle.
    pub fn disable_output(&mut self, id: OutputId) -> Result<()> {
        let output = self.outputs.get(id).ok_or(CoreError::UnknownOutput(id))?;
        if !output.enabled {
            return Ok(());
        }
        tracing::info!("Output {} disabled", id);
        self.close_output_layers(id);
        if let Some(output) = self.outputs.get_mut(id) {
            output.enabled = false;
        }
        Ok(())
    }

    pub fn enable_output(&mut self, id: OutputId) -> Result<()> {
        let output = self.outputs.get_mut(id).ok_or(CoreError::UnknownOutput(id))?;
        if output.enabled {
            return Ok(());
        }
        output.enabled = true;
        tracing::info!("Output {} enabled", id);

        self.arrange_layers(id);
        Ok(())
    }

    /// Destroys the output's layer surfaces, then the output itself. Every
    /// handle to it is stale afterwards.
    pub fn remove_output(&mut self, id: OutputId) -> Result<()> {
        if !self.outputs.contains(id) {
            return Err(CoreError::UnknownOutput(id));
        }
        self.close_output_layers(id);

        for view in self.views.iter_mut().filter(|v| v.output == id) {
            view.destroy();
        }
        self.views.retain(|v| v.output != id);

        if let Some(output) = self.outputs.remove(id) {
            self.scene.destroy(output.node);
            tracing::info!("Output {} ({}) removed", id, output.name);
        }
        Ok(())
    }

    /// Sends `OutputDestroy` to every layer surface of the output, each
    /// exactly once, leaving the registry empty.
    fn close_output_layers(&mut self, id: OutputId) {
        let Some(output) = self.outputs.get(id) else {
            return;
        };
        let surfaces: Vec<SurfaceId> = output.layers.iter().map(|(_, surface)| surface).collect();
        tracing::debug!("Closing {} layer surfaces on output {}", surfaces.len(), id);

        for surface in surfaces {
            if !self.emit(surface, SurfaceSignal::OutputDestroy) {
                contract_violation!("layer surface {} on output {} has no destroy handler", surface, id);
            }
        }

        if let Some(output) = self.outputs.get_mut(id) {
            let leftover = output.layers.drain();
            if !leftover.is_empty() {
                contract_violation!("layer surfaces {:?} survived the destruction of output {}", leftover, id);
            }
        }
    }

    /// Recomputes the placement of every layer surface on the output and its
    /// usable area. Application views are re-laid-out when the usable area
    /// changed.
    pub fn arrange_layers(&mut self, id: OutputId) {
        let Some(output) = self.outputs.get(id) else {
            contract_violation!("arrange requested for stale output {}", id);
            return;
        };
        if !output.enabled {
            return;
        }
        let Some(full) = output.full_area() else {
            tracing::trace!("Output {} has no mode, nothing to arrange", id);
            return;
        };

        let serial = &mut self.serial;
        let result = arrange_layers(full, &output.layers, &mut self.layers, &mut self.scene, || {
            super::bump_serial(serial)
        });

        for configure in result.configures {
            self.events.push(ShellEvent::LayerSurfaceConfigure {
                surface: configure.surface,
                serial: configure.serial,
                width: configure.width,
                height: configure.height,
            });
        }

        let Some(output) = self.outputs.get_mut(id) else {
            return;
        };
        if output.usable_area == result.usable {
            tracing::trace!("Usable area of output {} unchanged ({})", id, result.usable);
            return;
        }
        output.usable_area = result.usable;
        tracing::debug!("Usable area of output {} is now {}", id, result.usable);

        self.events.push(ShellEvent::UsableAreaChanged { output: id, area: result.usable });
        self.arrange_views(id);
    }
}

/// Band trees indexed by `LayerBand::index`, and the views tree.
fn create_output_trees(scene: &mut Scene, node: NodeId) -> Result<([NodeId; 4], NodeId)> {
    let background = scene.create_tree(node)?;
    let bottom = scene.create_tree(node)?;
    let views = scene.create_tree(node)?;
    let top = scene.create_tree(node)?;
    let overlay = scene.create_tree(node)?;
    Ok(([background, bottom, top, overlay], views))
}
