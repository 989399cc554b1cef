// crates/tessera-layout/src/center.rs
use crate::{ChildRejected, Children, Widget, WidgetFrame};
use tessera_core::{
    HostSurface, NodeId, NodeKind, Point, Rectangle, Size, SizeConstraints, WidgetId, WidgetResult,
};
use tracing::{trace, warn};

/// Centres a single child inside itself.
///
/// The child is measured loosely against the incoming maximum; the center
/// then takes the child's size clamped into its own constraints, so under a
/// tight constraint it fills the space and the child floats in the middle.
pub struct Center {
    frame: WidgetFrame,
    child: Children,
}

impl Center {
    pub fn new(widget_id: WidgetId) -> Self {
        Self {
            frame: WidgetFrame::new(widget_id),
            child: Children::single(widget_id),
        }
    }

    fn layout_child(&mut self) -> WidgetResult<Size> {
        let constraints = self.frame.constraints;
        let origin = self.frame.rectangle.origin();

        let size = match self.child.first_mut() {
            Some(child) => {
                let child_size = child.apply_size_constraints(SizeConstraints::loose(constraints.maximum()))?;
                let size = constraints.constrain(child_size);
                let child_origin = Point::new(
                    origin.x + ((size.width - child_size.width) * 0.5).max(0.0),
                    origin.y + ((size.height - child_size.height) * 0.5).max(0.0),
                );
                child.set_origin(child_origin);
                trace!("Center {}: child at {:?}", self.frame.widget_id, child_origin);
                size
            }
            None => constraints.minimum(),
        };

        self.frame.rectangle = self.frame.rectangle.with_size(size);
        Ok(size)
    }

    fn relayout_after_change(&mut self) {
        if let Err(e) = self.layout_child() {
            warn!("Center {}: relayout failed: {}", self.frame.widget_id, e);
        }
    }
}

impl Widget for Center {
    fn widget_id(&self) -> WidgetId {
        self.frame.widget_id
    }

    fn kind(&self) -> &'static str {
        "Center"
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
