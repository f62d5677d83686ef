use crate::core::SurfaceId;
use crate::util::geometry::Rect;

/// Identifier of a node in the [`Scene`](super::Scene).
pub type NodeId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Container; only groups and offsets its children
    Tree,
    /// Displays one surface
    Surface(SurfaceId),
}

/// One node of the scene graph.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    /// Position relative to the parent, and size
    pub local: Rect,
    pub visible: bool,
    /// Children in stacking order, bottom first
    pub children: Vec<NodeId>,
}

impl SceneNode {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            parent: None,
            local: Rect::default(),
            visible: true,
            children: Vec::new(),
        }
    }

    pub fn surface(&self) -> Option<SurfaceId> {
        match self.kind {
            NodeKind::Surface(surface) => Some(surface),
            NodeKind::Tree => None,
        }
    }

    /// Bounds in scene coordinates, given the parent's absolute origin.
    pub fn absolute(&self, origin: (i32, i32)) -> Rect {
        Rect {
            x: origin.0 + self.local.x,
            y: origin.1 + self.local.y,
            ..self.local
        }
    }
}
