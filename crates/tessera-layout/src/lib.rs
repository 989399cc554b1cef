// crates/tessera-layout/src/lib.rs

use std::fmt;
use tessera_core::{
    HorizontalAlignment, HostSurface, NodeId, NodeKind, Point, Rectangle, Size, SizeConstraints,
    VerticalAlignment, WidgetError, WidgetId, WidgetResult,
};
use tracing::{debug, warn};

pub mod center;
pub mod children;
pub mod column;
pub mod expanded;
pub mod flex;
pub mod padding;
pub mod placeholder;
pub mod row;
pub mod sized_box;
pub mod text;
pub mod text_measure;

pub use center::Center;
pub use children::Children;
pub use column::Column;
pub use expanded::Expanded;
pub use padding::{Insets, Padding};
pub use placeholder::Placeholder;
pub use row::Row;
pub use sized_box::SizedBox;
pub use text::Text;
pub use text_measure::*;

/// A child that `add_child` did not take, handed back with the reason.
#[derive(thiserror::Error)]
#[error("{error}")]
pub struct ChildRejected {
    pub child: Box<dyn Widget>,
    #[source]
    pub error: WidgetError,
}

impl fmt::Debug for ChildRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildRejected")
            .field("child", &self.child.widget_id())
            .field("error", &self.error)
            .finish()
    }
}

impl From<ChildRejected> for WidgetError {
    fn from(rejected: ChildRejected) -> Self {
        rejected.error
    }
}

/// A node in the widget tree.
///
/// Constraints travel down through `apply_size_constraints`, sizes come back
/// up, and every widget keeps the rectangle of its most recent layout.
/// Containers own their children exclusively; there is no way back up.
pub trait Widget {
    fn widget_id(&self) -> WidgetId;

    /// Short type name, used by tree dumps and logs.
    fn kind(&self) -> &'static str;

    /// Chooses a size within `constraints`, stores it in the rectangle
    /// (origin untouched) and returns it.
    fn apply_size_constraints(&mut self, constraints: SizeConstraints) -> WidgetResult<Size>;

    /// Share of the leftover main-axis space claimed inside a `Row` or `Column`.
    fn flex_factor(&self) -> u16 {
        0
    }

    fn rectangle(&self) -> &Rectangle;

    /// Moves the widget without measuring it again.
    fn set_origin(&mut self, origin: Point);

    fn mount_to(&mut self, host: &mut dyn HostSurface, parent: NodeId) -> WidgetResult<()>;

    fn unmount_from(&mut self, host: &mut dyn HostSurface, parent: NodeId) -> WidgetResult<()>;

    /// The surface node this widget currently owns, if mounted.
    fn mounted_node(&self) -> Option<NodeId>;

    fn children(&self) -> &[Box<dyn Widget>] {
        &[]
    }

    fn children_mut(&mut self) -> &mut [Box<dyn Widget>] {
        &mut []
    }

    /// Fails if `add_child` would not take another child.
    fn accepts_child(&self) -> WidgetResult<()> {
        Err(WidgetError::NotAContainer(self.widget_id()))
    }

    /// Appends `child`, mounting it if this widget is mounted. A child that
    /// is not taken comes back inside the error, unmounted.
    fn add_child(&mut self, child: Box<dyn Widget>, _host: &mut dyn HostSurface) -> Result<(), ChildRejected> {
        Err(ChildRejected {
            child,
            error: WidgetError::NotAContainer(self.widget_id()),
        })
    }

    /// Removes the direct child with the given ID. Returns `Ok(None)` when
    /// there is no such child. On error the child stays where it was.
    fn remove_child(
        &mut self,
        _child_id: WidgetId,
        _host: &mut dyn HostSurface,
    ) -> WidgetResult<Option<Box<dyn Widget>>> {
        Err(WidgetError::NotAContainer(self.widget_id()))
    }

    fn set_value(&mut self, _value: &str, _host: &mut dyn HostSurface) -> WidgetResult<()> {
        Err(WidgetError::ValueNotSupported(self.widget_id()))
    }

    fn value(&self) -> Option<String> {
        None
    }

    fn set_horizontal_alignment(&mut self, _alignment: HorizontalAlignment) -> WidgetResult<()> {
        Err(WidgetError::AlignmentNotSupported(self.widget_id()))
    }

    fn set_vertical_alignment(&mut self, _alignment: VerticalAlignment) -> WidgetResult<()> {
        Err(WidgetError::AlignmentNotSupported(self.widget_id()))
    }

    /// Pushes the rectangles of this mounted subtree to the host.
    fn sync_geometry(&self, host: &mut dyn HostSurface) -> WidgetResult<()> {
        if let Some(node) = self.mounted_node() {
            host.place(node, *self.rectangle())?;
        }
        for child in self.children() {
            child.sync_geometry(host)?;
        }
        Ok(())
    }
}

/// Depth-first search for the widget with `widget_id`, the root included.
pub fn find_widget_mut<'a>(widget: &'a mut dyn Widget, widget_id: WidgetId) -> Option<&'a mut dyn Widget> {
    if widget.widget_id() == widget_id {
        return Some(widget);
    }
    widget
        .children_mut()
        .iter_mut()
        .find_map(|child| find_widget_mut(child.as_mut(), widget_id))
}

pub fn find_widget<'a>(widget: &'a dyn Widget, widget_id: WidgetId) -> Option<&'a dyn Widget> {
    if widget.widget_id() == widget_id {
        return Some(widget);
    }
    widget
        .children()
        .iter()
        .find_map(|child| find_widget(child.as_ref(), widget_id))
}

/// ID of the widget whose direct child is `widget_id`, searching below `widget`.
pub fn find_parent_id(widget: &dyn Widget, widget_id: WidgetId) -> Option<WidgetId> {
    if widget.children().iter().any(|child| child.widget_id() == widget_id) {
        return Some(widget.widget_id());
    }
    widget
        .children()
        .iter()
        .find_map(|child| find_parent_id(child.as_ref(), widget_id))
}

/// Every widget ID in the subtree, in traversal order.
pub fn collect_widget_ids(widget: &dyn Widget) -> Vec<WidgetId> {
    let mut ids = vec![widget.widget_id()];
    for child in widget.children() {
        ids.extend(collect_widget_ids(child.as_ref()));
    }
    ids
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mount {
    pub parent: NodeId,
    pub node: NodeId,
}

/// State every widget carries: identity, geometry, last constraints and mount.
#[derive(Debug, Clone)]
pub struct WidgetFrame {
    pub widget_id: WidgetId,
    pub rectangle: Rectangle,
    pub constraints: SizeConstraints,
    pub mount: Option<Mount>,
}

impl WidgetFrame {
    pub fn new(widget_id: WidgetId) -> Self {
        Self {
            widget_id,
            rectangle: Rectangle::ZERO,
            constraints: SizeConstraints::unbounded(),
            mount: None,
        }
    }

    pub fn node(&self) -> Option<NodeId> {
        self.mount.map(|mount| mount.node)
    }

    /// Attaches a node of `kind` under `parent`. A widget that is already
    /// mounted is detached from its old parent first.
    ///
    /// The mount is only recorded once the host call succeeded.
    pub fn mount(&mut self, host: &mut dyn HostSurface, parent: NodeId, kind: NodeKind) -> WidgetResult<NodeId> {
        if let Some(previous) = self.mount {
            warn!(
                "Widget {} mounted twice, moving it from node {} to node {}",
                self.widget_id, previous.parent, parent
            );
            host.detach(previous.parent, previous.node)?;
            self.mount = None;
        }
        let node = host.attach(parent, kind)?;
        self.mount = Some(Mount { parent, node });
        debug!("Mounted widget {} as node {} under node {}", self.widget_id, node, parent);
        Ok(node)
    }

    pub fn unmount(&mut self, host: &mut dyn HostSurface, parent: NodeId) -> WidgetResult<()> {
        match self.mount {
            Some(mount) => {
                host.detach(parent, mount.node)?;
                self.mount = None;
                debug!("Unmounted widget {} (node {})", self.widget_id, mount.node);
            }
            None => debug!("Widget {} is not mounted, nothing to unmount", self.widget_id),
        }
        Ok(())
    }
}
