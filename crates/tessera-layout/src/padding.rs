// crates/tessera-layout/src/padding.rs
use crate::{ChildRejected, Children, Widget, WidgetFrame};
use tessera_core::{
    HostSurface, NodeId, NodeKind, Point, Rectangle, Size, SizeConstraints, WidgetId, WidgetResult,
};
use tracing::warn;

/// Insets on each side of a `Padding` widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Insets {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Insets {
    pub const fn uniform(value: f64) -> Self {
        Self {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }

    /// Total horizontal and vertical inset.
    pub fn size(&self) -> Size {
        Size::new(self.left + self.right, self.top + self.bottom)
    }
}

/// Surrounds a single child with empty space.
pub struct Padding {
    frame: WidgetFrame,
    child: Children,
    insets: Insets,
}

impl Padding {
    pub fn new(widget_id: WidgetId, insets: Insets) -> Self {
        Self {
            frame: WidgetFrame::new(widget_id),
            child: Children::single(widget_id),
            insets,
        }
    }

    pub fn insets(&self) -> Insets {
        self.insets
    }

    fn layout_child(&mut self) -> WidgetResult<Size> {
        let constraints = self.frame.constraints;
        let inset = self.insets.size();

        let content = match self.child.first_mut() {
            Some(child) => {
                let child_size = child.apply_size_constraints(constraints.shrink(inset))?;
                let origin = self.frame.rectangle.origin();
                child.set_origin(Point::new(origin.x + self.insets.left, origin.y + self.insets.top));
                child_size
            }
            None => Size::ZERO,
        };

        let size = constraints.constrain(content + inset);
        self.frame.rectangle = self.frame.rectangle.with_size(size);
        Ok(size)
    }

    fn relayout_after_change(&mut self) {
        if let Err(e) = self.layout_child() {
            warn!("Padding {}: relayout failed: {}", self.frame.widget_id, e);
        }
    }
}

impl Widget for Padding {
    fn widget_id(&self) -> WidgetId {
        self.frame.widget_id
    }

    fn kind(&self) -> &'static str {
        "Padding"
    }

    fn apply_size_constraints(&mut self, constraints: SizeConstraints) -> WidgetResult<Size> {
        constraints.validate()?;
        self.frame.constraints = constraints;
        self.layout_child()
    }

    fn rectangle(&self) -> &Rectangle {
        &self.frame.rectangle
    }

    fn set_origin(&mut self, origin: Point) {
        let delta = origin - self.frame.rectangle.origin();
        self.frame.rectangle = self.frame.rectangle.with_origin(origin);
        self.child.translate(delta);
    }

    fn mount_to(&mut self, host: &mut dyn HostSurface, parent: NodeId) -> WidgetResult<()> {
        let node = self.frame.mount(host, parent, NodeKind::Container)?;
        self.child.mount(host, node)
    }

    fn unmount_from(&mut self, host: &mut dyn HostSurface, parent: NodeId) -> WidgetResult<()> {
        self.child.unmount(host, self.frame.node())?;
        self.frame.unmount(host, parent)
    }

    fn mounted_node(&self) -> Option<NodeId> {
        self.frame.node()
    }

    fn children(&self) -> &[Box<dyn Widget>] {
        self.child.as_slice()
    }

    fn children_mut(&mut self) -> &mut [Box<dyn Widget>] {
        self.child.as_mut_slice()
    }

    fn accepts_child(&self) -> WidgetResult<()> {
        self.child.accepts()
    }

    fn add_child(&mut self, child: Box<dyn Widget>, host: &mut dyn HostSurface) -> Result<(), ChildRejected> {
        self.child.insert(child, host, self.frame.node())?;
        self.relayout_after_change();
        Ok(())
    }

    fn remove_child(
        &mut self,
        child_id: WidgetId,
        host: &mut dyn HostSurface,
    ) -> WidgetResult<Option<Box<dyn Widget>>> {
        let removed = self.child.remove(child_id, host, self.frame.node())?;
        if removed.is_some() {
            self.relayout_after_change();
        }
        Ok(removed)
    }
}
