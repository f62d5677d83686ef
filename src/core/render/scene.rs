use std::collections::HashMap;

use crate::core::errors::{CoreError, Result};
use crate::core::render::node::{NodeId, NodeKind, SceneNode};
use crate::core::SurfaceId;
use crate::util::geometry::Rect;

/// A visible surface with its bounds in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlattenedSurface {
    pub surface: SurfaceId,
    pub bounds: Rect,
}

/// Scene graph: one root, output trees below it, band trees below those.
#[derive(Debug)]
pub struct Scene {
    pub nodes: HashMap<NodeId, SceneNode>,
    pub root_id: NodeId,
    next_node_id: NodeId,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(0, SceneNode::new(0, NodeKind::Tree));
        Self {
            nodes,
            root_id: 0,
            next_node_id: 1,
        }
    }

    fn alloc(&mut self, parent: NodeId, kind: NodeKind) -> Result<NodeId> {
        if !self.nodes.contains_key(&parent) {
            return Err(CoreError::MissingSceneNode(parent));
        }
        self.nodes
            .try_reserve(1)
            .map_err(|_| CoreError::ResourceExhausted("scene node"))?;

        let id = self.next_node_id;
        self.next_node_id += 1;

        let mut node = SceneNode::new(id, kind);
        node.parent = Some(parent);
        self.nodes.insert(id, node);
        if let Some(parent) = self.nodes.get_mut(&parent) {
            parent.children.push(id);
        }
        Ok(id)
    }

    /// Creates an empty container node on top of `parent`'s children.
    pub fn create_tree(&mut self, parent: NodeId) -> Result<NodeId> {
        self.alloc(parent, NodeKind::Tree)
    }

    /// Creates a node displaying `surface` on top of `parent`'s children.
    pub fn create_surface_node(&mut self, parent: NodeId, surface: SurfaceId) -> Result<NodeId> {
        self.alloc(parent, NodeKind::Surface(surface))
    }

    pub fn node(&self, node_id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&node_id)
    }

    pub fn contains(&self, node_id: NodeId) -> bool {
        self.nodes.contains_key(&node_id)
    }

    pub fn set_position(&mut self, node_id: NodeId, x: i32, y: i32) {
        if let Some(node) = self.nodes.get_mut(&node_id) {
            node.local.x = x;
            node.local.y = y;
        }
    }

    /// Position relative to the parent and size in one go.
    pub fn set_geometry(&mut self, node_id: NodeId, geometry: Rect) {
        if let Some(node) = self.nodes.get_mut(&node_id) {
            node.local = geometry;
        }
    }

    pub fn set_visible(&mut self, node_id: NodeId, visible: bool) {
        if let Some(node) = self.nodes.get_mut(&node_id) {
            node.visible = visible;
        }
    }

    /// Moves `node_id` to the top of `new_parent`'s children.
    pub fn reparent(&mut self, node_id: NodeId, new_parent: NodeId) -> Result<()> {
        if !self.nodes.contains_key(&new_parent) {
            return Err(CoreError::MissingSceneNode(new_parent));
        }
        if self.is_ancestor(node_id, new_parent) {
            return Err(CoreError::protocol_violation(format!(
                "cannot reparent node {} below its own descendant {}",
                node_id, new_parent
            )));
        }
        let old_parent = self
            .nodes
            .get(&node_id)
            .ok_or(CoreError::MissingSceneNode(node_id))?
            .parent;

        if let Some(old) = old_parent.and_then(|p| self.nodes.get_mut(&p)) {
            old.children.retain(|&id| id != node_id);
        }
        if let Some(parent) = self.nodes.get_mut(&new_parent) {
            parent.children.push(node_id);
        }
        if let Some(node) = self.nodes.get_mut(&node_id) {
            node.parent = Some(new_parent);
        }
        Ok(())
    }

    fn is_ancestor(&self, ancestor: NodeId, mut node_id: NodeId) -> bool {
        loop {
            if node_id == ancestor {
                return true;
            }
            match self.nodes.get(&node_id).and_then(|n| n.parent) {
                Some(parent) => node_id = parent,
                None => return false,
            }
        }
    }

    /// Removes a node and its whole subtree.
    pub fn destroy(&mut self, node_id: NodeId) {
        if node_id == self.root_id {
            return;
        }
        let Some(node) = self.nodes.remove(&node_id) else {
            return;
        };
        if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|&id| id != node_id);
        }

        let mut pending = node.children;
        while let Some(child) = pending.pop() {
            if let Some(child) = self.nodes.remove(&child) {
                pending.extend(child.children);
            }
        }
    }

    /// Visible surfaces in z-order, bottom first. Hidden trees hide their
    /// whole subtree.
    pub fn flatten(&self) -> Vec<FlattenedSurface> {
        let mut out = Vec::new();
        let mut stack = vec![(self.root_id, (0, 0))];
        while let Some((node_id, origin)) = stack.pop() {
            let Some(node) = self.nodes.get(&node_id) else {
                continue;
            };
            if !node.visible {
                continue;
            }
            let bounds = node.absolute(origin);
            if let Some(surface) = node.surface() {
                out.push(FlattenedSurface { surface, bounds });
            }
            stack.extend(node.children.iter().rev().map(|&child| (child, (bounds.x, bounds.y))));
        }
        out
    }

    /// Indented tree listing for debug logs.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.root_id, 0usize)];
        while let Some((node_id, depth)) = stack.pop() {
            let Some(node) = self.nodes.get(&node_id) else {
                continue;
            };
            let label = match node.kind {
                NodeKind::Tree => "tree".to_string(),
                NodeKind::Surface(surface) => format!("surface {}", surface),
            };
            let hidden = if node.visible { "" } else { " (hidden)" };
            out.push_str(&format!("{:indent$}#{} {} {}{}\n", "", node.id, label, node.local, hidden, indent = depth * 2));
            stack.extend(node.children.iter().rev().map(|&child| (child, depth + 1)));
        }
        out
    }
}
