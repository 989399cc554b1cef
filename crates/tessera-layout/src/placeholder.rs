// crates/tessera-layout/src/placeholder.rs
use crate::{Widget, WidgetFrame};
use tessera_core::{HostSurface, NodeId, NodeKind, Point, Rectangle, Size, SizeConstraints, WidgetId, WidgetResult};

/// A leaf that asks for a fixed desired size. Handy for sketching layouts.
#[derive(Debug, Clone)]
pub struct Placeholder {
    frame: WidgetFrame,
    desired_size: Size,
    flex_factor: u16,
}

impl Placeholder {
    pub fn new(widget_id: WidgetId, desired_size: Size) -> Self {
        Self {
            frame: WidgetFrame::new(widget_id),
            desired_size,
            flex_factor: 0,
        }
    }

    pub fn with_flex_factor(mut self, flex_factor: u16) -> Self {
        self.flex_factor = flex_factor;
        self
    }

    pub fn desired_size(&self) -> Size {
        self.desired_size
    }
}

impl Widget for Placeholder {
    fn widget_id(&self) -> WidgetId {
        self.frame.widget_id
    }

    fn kind(&self) -> &'static str {
        "Placeholder"
    }

    fn apply_size_constraints(&mut self, constraints: SizeConstraints) -> WidgetResult<Size> {
        constraints.validate()?;
        self.frame.constraints = constraints;
        let size = constraints.constrain(self.desired_size);
        self.frame.rectangle = self.frame.rectangle.with_size(size);
        Ok(size)
    }

    fn flex_factor(&self) -> u16 {
        self.flex_factor
    }

    fn rectangle(&self) -> &Rectangle {
        &self.frame.rectangle
    }

    fn set_origin(&mut self, origin: Point) {
        self.frame.rectangle = self.frame.rectangle.with_origin(origin);
    }

    fn mount_to(&mut self, host: &mut dyn HostSurface, parent: NodeId) -> WidgetResult<()> {
        self.frame.mount(host, parent, NodeKind::Placeholder)?;
        Ok(())
    }

    fn unmount_from(&mut self, host: &mut dyn HostSurface, parent: NodeId) -> WidgetResult<()> {
        self.frame.unmount(host, parent)
    }

    fn mounted_node(&self) -> Option<NodeId> {
        self.frame.node()
    }
}
