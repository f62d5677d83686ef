//! Per-output layer slots.

use crate::core::errors::{CoreError, Result};
use crate::core::layer::band::LayerBand;
use crate::core::render::node::NodeId;
use crate::core::SurfaceId;

/// One stacking band on one output.
#[derive(Debug, Clone, Default)]
pub struct LayerSlot {
    /// Scene tree that parents every surface of the band
    pub node: NodeId,
    /// Bound layer surfaces in insertion order
    pub surfaces: Vec<SurfaceId>,
}

/// The four layer slots of an output.
///
/// Insertion order within a slot is the arrangement order: the first bound
/// surface consumes reserved space first.
#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    slots: [LayerSlot; 4],
}

impl LayerRegistry {
    /// `nodes` are the band parent trees, indexed by [`LayerBand::index`].
    pub fn new(nodes: [NodeId; 4]) -> Self {
        Self {
            slots: nodes.map(|node| LayerSlot { node, surfaces: Vec::new() }),
        }
    }

    pub fn parent_node(&self, band: LayerBand) -> NodeId {
        self.slots[band.index()].node
    }

    pub fn surfaces(&self, band: LayerBand) -> &[SurfaceId] {
        &self.slots[band.index()].surfaces
    }

    /// All bound surfaces, bands in arrangement order.
    pub fn iter(&self) -> impl Iterator<Item = (LayerBand, SurfaceId)> + '_ {
        LayerBand::ALL
            .into_iter()
            .flat_map(move |band| self.surfaces(band).iter().map(move |&id| (band, id)))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().map(|s| s.surfaces.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, surface: SurfaceId) -> bool {
        self.band_of(surface).is_some()
    }

    pub fn band_of(&self, surface: SurfaceId) -> Option<LayerBand> {
        LayerBand::ALL
            .into_iter()
            .find(|&band| self.surfaces(band).contains(&surface))
    }

    /// Appends `surface` to the band. Reserves first so a failed allocation
    /// leaves the registry unchanged.
    pub fn bind(&mut self, band: LayerBand, surface: SurfaceId) -> Result<()> {
        let slot = &mut self.slots[band.index()];
        slot.surfaces
            .try_reserve(1)
            .map_err(|_| CoreError::ResourceExhausted("layer registry slot"))?;
        slot.surfaces.push(surface);
        Ok(())
    }

    /// Returns true if the surface was bound.
    pub fn unbind(&mut self, surface: SurfaceId) -> bool {
        for slot in &mut self.slots {
            if let Some(pos) = slot.surfaces.iter().position(|&id| id == surface) {
                slot.surfaces.remove(pos);
                return true;
            }
        }
        false
    }

    /// Moves a surface to the end of another band.
    pub fn move_to(&mut self, surface: SurfaceId, band: LayerBand) -> Result<()> {
        match self.band_of(surface) {
            Some(current) if current == band => return Ok(()),
            Some(_) => {}
            None => return Err(CoreError::UnknownSurface(surface)),
        }
        self.slots[band.index()]
            .surfaces
            .try_reserve(1)
            .map_err(|_| CoreError::ResourceExhausted("layer registry slot"))?;
        self.unbind(surface);
        self.slots[band.index()].surfaces.push(surface);
        Ok(())
    }

    /// Empties every slot, returning the surfaces in arrangement order.
    pub fn drain(&mut self) -> Vec<SurfaceId> {
        let mut drained = Vec::with_capacity(self.len());
        for slot in &mut self.slots {
            drained.append(&mut slot.surfaces);
        }
        drained
    }
}
