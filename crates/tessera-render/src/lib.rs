// crates/tessera-render/src/lib.rs

use glam::DVec2;
use serde::Serialize;
use std::fmt::Write;
use tessera_core::{HostSurface, NodeId, NodeKind, Rectangle, SurfaceError, SurfaceResult};
use tracing::trace;

/// A node as the host sees it.
#[derive(Debug, Clone, Serialize)]
pub struct SurfaceNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub text: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub position: DVec2,
    pub size: DVec2,
}

/// In-memory host surface: keeps the node tree and the last placed geometry.
///
/// Stands in for a real render target in headless runs and tests.
#[derive(Debug, Clone)]
pub struct RetainedSurface {
    nodes: Vec<Option<SurfaceNode>>,
}

impl Default for RetainedSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RetainedSurface {
    pub const ROOT: NodeId = 0;

    pub fn new() -> Self {
        let root = SurfaceNode {
            id: Self::ROOT,
            kind: NodeKind::Root,
            text: None,
            parent: None,
            children: Vec::new(),
            position: DVec2::ZERO,
            size: DVec2::ZERO,
        };
        Self { nodes: vec![Some(root)] }
    }

    pub fn node(&self, id: NodeId) -> Option<&SurfaceNode> {
        self.nodes.get(id).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> SurfaceResult<&mut SurfaceNode> {
        self.nodes
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or(SurfaceError::UnknownNode(id))
    }

    /// Number of live nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    /// Live nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &SurfaceNode> {
        self.nodes.iter().flatten()
    }

    fn remove_subtree(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id).and_then(Option::take) {
            for child in node.children {
                self.remove_subtree(child);
            }
        }
    }

    /// Renders the tree with box-drawing connectors, one node per line.
    pub fn dump_tree(&self) -> String {
        let mut output = String::new();
        self.dump_node(&mut output, Self::ROOT, "", None);
        output
    }

    fn dump_node(&self, output: &mut String, id: NodeId, prefix: &str, is_last: Option<bool>) {
        let Some(node) = self.node(id) else {
            return;
        };

        let connector = match is_last {
            None => "",
            Some(true) => "└── ",
            Some(false) => "├── ",
        };
        let label = match &node.kind {
            NodeKind::Root => "Root",
            NodeKind::Container => "Container",
            NodeKind::Text(_) => "Text",
            NodeKind::Placeholder => "Placeholder",
        };

        let _ = write!(output, "{}{}{}", prefix, connector, label);
        if let Some(text) = &node.text {
            let _ = write!(output, " \"{}\"", text);
        }
        let _ = writeln!(
            output,
            " pos:({},{}) size:({},{})",
            node.position.x, node.position.y, node.size.x, node.size.y
        );

        let child_prefix = match is_last {
            None => String::new(),
            Some(true) => format!("{}    ", prefix),
            Some(false) => format!("{}│   ", prefix),
        };
        let count = node.children.len();
        for (index, &child) in node.children.iter().enumerate() {
            self.dump_node(output, child, &child_prefix, Some(index + 1 == count));
        }
    }
}

impl HostSurface for RetainedSurface {
    fn root(&self) -> NodeId {
        Self::ROOT
    }

    fn attach(&mut self, parent: NodeId, kind: NodeKind) -> SurfaceResult<NodeId> {
        let id = self.nodes.len();
        self.node_mut(parent)?.children.push(id);

        let text = match &kind {
            NodeKind::Text(text) => Some(text.clone()),
            _ => None,
        };
        self.nodes.push(Some(SurfaceNode {
            id,
            kind,
            text,
            parent: Some(parent),
            children: Vec::new(),
            position: DVec2::ZERO,
            size: DVec2::ZERO,
        }));
        trace!("Attached node {} under {}", id, parent);
        Ok(id)
    }

    fn detach(&mut self, parent: NodeId, node: NodeId) -> SurfaceResult<()> {
        if self.node(node).is_none() {
            return Err(SurfaceError::UnknownNode(node));
        }
        let siblings = &mut self.node_mut(parent)?.children;
        let index = siblings
            .iter()
            .position(|&child| child == node)
            .ok_or(SurfaceError::NotAChild { parent, node })?;
        siblings.remove(index);

        self.remove_subtree(node);
        trace!("Detached node {} from {}", node, parent);
        Ok(())
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> SurfaceResult<()> {
        self.node_mut(node)?.text = Some(text.to_string());
        Ok(())
    }

    fn place(&mut self, node: NodeId, rectangle: Rectangle) -> SurfaceResult<()> {
        let entry = self.node_mut(node)?;
        entry.position = rectangle.origin().into();
        entry.size = rectangle.size().into();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::Size;

    #[test]
    fn test_attach_and_detach_subtree() {
        let mut surface = RetainedSurface::new();
        let container = surface.attach(RetainedSurface::ROOT, NodeKind::Container).unwrap();
        surface.attach(container, NodeKind::Text("a".into())).unwrap();
        surface.attach(container, NodeKind::Placeholder).unwrap();
        assert_eq!(surface.node_count(), 4);

        surface.detach(RetainedSurface::ROOT, container).unwrap();
        assert_eq!(surface.node_count(), 1);
        assert!(surface.node(RetainedSurface::ROOT).unwrap().children.is_empty());
    }

    #[test]
    fn test_detach_from_wrong_parent() {
        let mut surface = RetainedSurface::new();
        let a = surface.attach(RetainedSurface::ROOT, NodeKind::Container).unwrap();
        let b = surface.attach(RetainedSurface::ROOT, NodeKind::Placeholder).unwrap();
        assert_eq!(surface.detach(a, b), Err(SurfaceError::NotAChild { parent: a, node: b }));
        assert_eq!(surface.detach(a, 99), Err(SurfaceError::UnknownNode(99)));
    }

    #[test]
    fn test_place_records_geometry() {
        let mut surface = RetainedSurface::new();
        let node = surface.attach(RetainedSurface::ROOT, NodeKind::Placeholder).unwrap();
        surface
            .place(node, Rectangle::from_origin_size((10.0, 20.0), Size::new(30.0, 40.0)))
            .unwrap();
        let node = surface.node(node).unwrap();
        assert_eq!(node.position, DVec2::new(10.0, 20.0));
        assert_eq!(node.size, DVec2::new(30.0, 40.0));
    }

    #[test]
    fn test_dump_tree() {
        let mut surface = RetainedSurface::new();
        let row = surface.attach(RetainedSurface::ROOT, NodeKind::Container).unwrap();
        let text = surface.attach(row, NodeKind::Text("Hi".into())).unwrap();
        let nested = surface.attach(row, NodeKind::Container).unwrap();
        let leaf = surface.attach(nested, NodeKind::Placeholder).unwrap();
        surface
            .place(text, Rectangle::from_origin_size((0.0, 0.0), Size::new(16.0, 16.0)))
            .unwrap();
        surface
            .place(leaf, Rectangle::from_origin_size((16.0, 0.0), Size::new(5.0, 5.0)))
            .unwrap();

        insta::assert_snapshot!(surface.dump_tree(), @r###"
        Root pos:(0,0) size:(0,0)
        └── Container pos:(0,0) size:(0,0)
            ├── Text "Hi" pos:(0,0) size:(16,16)
            └── Container pos:(0,0) size:(0,0)
                └── Placeholder pos:(16,0) size:(5,5)
        "###);
    }
}
