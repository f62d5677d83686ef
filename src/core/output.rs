//! Output tracking.
//!
//! Outputs are stored in a generational arena. Everything else in the core
//! refers to an output through an [`OutputId`]; removing an output bumps the
//! generation of its slot, which invalidates every outstanding handle at once
//! without visiting the holders.

use crate::core::layer::LayerRegistry;
use crate::core::render::node::NodeId;
use crate::util::geometry::Rect;

// ============================================================================
// Handles
// ============================================================================

/// Handle to an output in the [`OutputArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputId {
    index: u32,
    generation: u32,
}

impl OutputId {
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl std::fmt::Display for OutputId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

// ============================================================================
// Output State
// ============================================================================

/// Display mode in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputMode {
    pub width: u32,
    pub height: u32,
    /// Refresh rate in mHz
    pub refresh: u32,
}

impl OutputMode {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, refresh: 60000 }
    }
}

/// Description of a newly ready output.
#[derive(Debug, Clone)]
pub struct OutputInfo {
    pub name: String,
    /// Position in the output layout
    pub x: i32,
    pub y: i32,
    pub mode: Option<OutputMode>,
    pub scale: f32,
}

impl OutputInfo {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            x: 0,
            y: 0,
            mode: Some(OutputMode::new(width, height)),
            scale: 1.0,
        }
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }
}

/// An output as seen by the layer shell.
#[derive(Debug)]
pub struct Output {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub mode: Option<OutputMode>,
    pub scale: f32,
    pub enabled: bool,
    /// Area left for application views once layer surfaces reserved theirs.
    /// Output-local coordinates.
    pub usable_area: Rect,
    /// Scene tree holding everything shown on this output
    pub node: NodeId,
    /// Scene tree for application views, between the bottom and top bands
    pub views_node: NodeId,
    pub layers: LayerRegistry,
    /// Monotonic insertion stamp, used to pick a fallback output
    pub(crate) added_seq: u64,
}

impl Output {
    /// Effective resolution: the mode divided by the scale, at the local origin.
    /// `None` while no mode is set.
    pub fn full_area(&self) -> Option<Rect> {
        let mode = self.mode?;
        let scale = if self.scale > 0.0 { self.scale } else { 1.0 };
        let width = (mode.width as f32 / scale).round() as u32;
        let height = (mode.height as f32 / scale).round() as u32;
        Some(Rect::new(0, 0, width, height))
    }

    /// Full area in layout coordinates.
    pub fn layout_geometry(&self) -> Option<Rect> {
        self.full_area().map(|r| Rect::new(self.x, self.y, r.width, r.height))
    }

    pub fn is_usable(&self) -> bool {
        self.enabled && self.mode.is_some()
    }
}

// ============================================================================
// Arena
// ============================================================================

#[derive(Debug)]
struct Slot {
    generation: u32,
    output: Option<Output>,
}

/// Generational storage for outputs.
#[derive(Debug, Default)]
pub struct OutputArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    next_seq: u64,
}

impl OutputArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mut output: Output) -> OutputId {
        self.next_seq += 1;
        output.added_seq = self.next_seq;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.output = Some(output);
            return OutputId { index, generation: slot.generation };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot { generation: 0, output: Some(output) });
        OutputId { index, generation: 0 }
    }

    /// Removes the output and invalidates every handle to it.
    pub fn remove(&mut self, id: OutputId) -> Option<Output> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let output = slot.output.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(output)
    }

    pub fn get(&self, id: OutputId) -> Option<&Output> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.output.as_ref()
    }

    pub fn get_mut(&mut self, id: OutputId) -> Option<&mut Output> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.output.as_mut()
    }

    pub fn contains(&self, id: OutputId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OutputId, &Output)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.output.as_ref().map(|output| {
                (OutputId { index: index as u32, generation: slot.generation }, output)
            })
        })
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.output.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Usable output whose layout geometry contains the point.
    pub fn output_at(&self, x: f64, y: f64) -> Option<OutputId> {
        self.iter()
            .filter(|(_, o)| o.is_usable())
            .find(|(_, o)| o.layout_geometry().is_some_and(|g| g.contains_point(x, y)))
            .map(|(id, _)| id)
    }

    /// Most recently added usable output.
    pub fn most_recent(&self) -> Option<OutputId> {
        self.iter()
            .filter(|(_, o)| o.is_usable())
            .max_by_key(|(_, o)| o.added_seq)
            .map(|(id, _)| id)
    }
}
