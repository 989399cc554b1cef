// crates/tessera-core/src/surface.rs
use crate::Rectangle;
use serde::Serialize;

/// Handle of a node owned by a host surface.
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("Unknown surface node: {0}")]
    UnknownNode(NodeId),
    #[error("Node {node} is not a child of node {parent}")]
    NotAChild { parent: NodeId, node: NodeId },
}

pub type SurfaceResult<T> = std::result::Result<T, SurfaceError>;

/// What a widget puts on the surface when it mounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Root,
    Container,
    Text(String),
    Placeholder,
}

/// The external render surface widgets attach themselves to.
///
/// Layout never calls into the surface; widgets only touch it when mounting,
/// unmounting, changing content, or when a caller syncs geometry.
pub trait HostSurface {
    /// The node every main widget is mounted under.
    fn root(&self) -> NodeId;

    /// Creates a node of the given kind as the last child of `parent`.
    fn attach(&mut self, parent: NodeId, kind: NodeKind) -> SurfaceResult<NodeId>;

    /// Removes `node` (and everything below it) from `parent`.
    fn detach(&mut self, parent: NodeId, node: NodeId) -> SurfaceResult<()>;

    fn set_text(&mut self, node: NodeId, text: &str) -> SurfaceResult<()>;

    /// Moves and resizes `node` to `rectangle`.
    fn place(&mut self, node: NodeId, rectangle: Rectangle) -> SurfaceResult<()>;
}
