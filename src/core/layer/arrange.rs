//! Usable area computation.

use std::collections::HashMap;

use crate::contract_violation;
use crate::core::layer::controller::LayerSurfaceController;
use crate::core::layer::registry::LayerRegistry;
use crate::core::render::Scene;
use crate::core::SurfaceId;
use crate::util::geometry::Rect;

/// A configure that must be sent to a layer surface client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerConfigure {
    pub surface: SurfaceId,
    pub serial: u32,
    pub width: u32,
    pub height: u32,
}

/// Outcome of one arrangement pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrangementResult {
    pub usable: Rect,
    pub configures: Vec<LayerConfigure>,
}

/// Places every initialized layer surface of one output, bands low to high
/// and insertion order within a band, shrinking the usable area as mapped
/// surfaces reserve space.
///
/// Running it twice without intervening changes yields the same usable area
/// and no further configures.
pub fn arrange_layers(
    full: Rect,
    registry: &LayerRegistry,
    controllers: &mut HashMap<SurfaceId, LayerSurfaceController>,
    scene: &mut Scene,
    mut next_serial: impl FnMut() -> u32,
) -> ArrangementResult {
    let mut usable = full;
    let mut configures = Vec::new();

    for (band, id) in registry.iter() {
        let Some(controller) = controllers.get_mut(&id) else {
            contract_violation!("layer surface {} bound to {} without a controller", id, band);
            continue;
        };
        if controller.is_destroyed() || !controller.surface.initialized {
            continue;
        }

        let geometry = scene.configure_layer_surface(
            controller.placement,
            &controller.surface.current,
            controller.mapped,
            &full,
            &mut usable,
        );
        controller.set_geometry(geometry);

        if controller.surface.needs_configure(geometry.width, geometry.height) {
            let serial = next_serial();
            controller.surface.configure(serial, geometry.width, geometry.height);
            configures.push(LayerConfigure {
                surface: id,
                serial,
                width: geometry.width,
                height: geometry.height,
            });
        }
    }

    ArrangementResult { usable, configures }
}
