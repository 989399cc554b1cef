// crates/tessera-layout/src/expanded.rs
use crate::{ChildRejected, Children, Widget, WidgetFrame};
use tessera_core::{
    HostSurface, NodeId, NodeKind, Point, Rectangle, Size, SizeConstraints, WidgetId, WidgetResult,
};
use tracing::warn;

/// Wraps a single child and fills all the space it is offered.
///
/// Inside a `Row` or `Column` this turns any widget into a flexible one.
pub struct Expanded {
    frame: WidgetFrame,
    child: Children,
    flex_factor: u16,
}

impl Expanded {
    pub fn new(widget_id: WidgetId, flex_factor: u16) -> Self {
        Self {
            frame: WidgetFrame::new(widget_id),
            child: Children::single(widget_id),
            flex_factor,
        }
    }

    fn layout_child(&mut self) -> WidgetResult<Size> {
        let size = self.frame.constraints.maximum();
        self.frame.rectangle = self.frame.rectangle.with_size(size);

        if let Some(child) = self.child.first_mut() {
            child.apply_size_constraints(SizeConstraints::tight(size))?;
            child.set_origin(self.frame.rectangle.origin());
        }
        Ok(size)
    }

    fn relayout_after_change(&mut self) {
        if let Err(e) = self.layout_child() {
            warn!("Expanded {}: relayout failed: {}", self.frame.widget_id, e);
        }
    }
}

impl Widget for Expanded {
    fn widget_id(&self) -> WidgetId {
        self.frame.widget_id
    }

    fn kind(&self) -> &'static str {
        "Expanded"
    }

    fn apply_size_constraints(&mut self, constraints: SizeConstraints) -> WidgetResult<Size> {
        constraints.validate()?;
        self.frame.constraints = constraints;
        self.layout_child()
    }

    fn flex_factor(&self) -> u16 {
        self.flex_factor
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
