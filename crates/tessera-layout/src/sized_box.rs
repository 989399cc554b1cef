// crates/tessera-layout/src/sized_box.rs
use crate::{ChildRejected, Children, Widget, WidgetFrame};
use tessera_core::{
    HostSurface, NodeId, NodeKind, Point, Rectangle, Size, SizeConstraints, WidgetId, WidgetResult,
};
use tracing::warn;

/// Takes a fixed size, within its constraints, and forces it on its child.
pub struct SizedBox {
    frame: WidgetFrame,
    child: Children,
    desired_size: Size,
}

impl SizedBox {
    pub fn new(widget_id: WidgetId, desired_size: Size) -> Self {
        Self {
            frame: WidgetFrame::new(widget_id),
            child: Children::single(widget_id),
            desired_size,
        }
    }

    pub fn desired_size(&self) -> Size {
        self.desired_size
    }

    fn layout_child(&mut self) -> WidgetResult<Size> {
        let size = self.frame.constraints.constrain(self.desired_size);
        self.frame.rectangle = self.frame.rectangle.with_size(size);

        if let Some(child) = self.child.first_mut() {
            child.apply_size_constraints(SizeConstraints::tight(size))?;
            child.set_origin(self.frame.rectangle.origin());
        }
        Ok(size)
    }

    fn relayout_after_change(&mut self) {
        if let Err(e) = self.layout_child() {
            warn!("SizedBox {}: relayout failed: {}", self.frame.widget_id, e);
        }
    }
}

impl Widget for SizedBox {
    fn widget_id(&self) -> WidgetId {
        self.frame.widget_id
    }

    fn kind(&self) -> &'static str {
        "SizedBox"
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
        self.frame.rectangle = self.frame.rectangle.with_origin(origin);
        if let Some(child) = self.child.first_mut() {
            child.set_origin(origin);
        }
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
