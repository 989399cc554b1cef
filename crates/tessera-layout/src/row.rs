// crates/tessera-layout/src/row.rs
use crate::flex::{self, Axis};
use crate::{ChildRejected, Children, Widget, WidgetFrame};
use tessera_core::{
    HostSurface, NodeId, NodeKind, Point, Rectangle, Size, SizeConstraints, VerticalAlignment, WidgetId,
    WidgetResult,
};
use tracing::{debug, warn};

/// Lays out its children left to right.
///
/// Children without a flex factor keep their natural width; children with
/// one share whatever width is left, in proportion to their factors.
pub struct Row {
    frame: WidgetFrame,
    children: Children,
    spacing: f64,
    vertical_alignment: VerticalAlignment,
}

impl Row {
    pub fn new(widget_id: WidgetId) -> Self {
        Self {
            frame: WidgetFrame::new(widget_id),
            children: Children::new(widget_id),
            spacing: 0.0,
            vertical_alignment: VerticalAlignment::default(),
        }
    }

    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_vertical_alignment(mut self, vertical_alignment: VerticalAlignment) -> Self {
        self.vertical_alignment = vertical_alignment;
        self
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn vertical_alignment(&self) -> VerticalAlignment {
        self.vertical_alignment
    }

    /// Runs the full layout against the cached constraints.
    fn layout_children(&mut self) -> WidgetResult<Size> {
        let size = flex::layout(
            self.children.as_mut_slice(),
            Axis::Horizontal,
            self.spacing,
            self.vertical_alignment.into(),
            self.frame.constraints,
            self.frame.rectangle.origin(),
        )?;
        self.frame.rectangle = self.frame.rectangle.with_size(size);
        Ok(size)
    }

    /// Relayout after the child list changed. The change itself already
    /// happened, so a failure is only logged.
    fn relayout_after_change(&mut self) {
        if let Err(e) = self.layout_children() {
            warn!("Row {}: relayout failed: {}", self.frame.widget_id, e);
        }
    }
}

impl Widget for Row {
    fn widget_id(&self) -> WidgetId {
        self.frame.widget_id
    }

    fn kind(&self) -> &'static str {
        "Row"
    }

    fn apply_size_constraints(&mut self, constraints: SizeConstraints) -> WidgetResult<Size> {
        constraints.validate()?;
        self.frame.constraints = constraints;
        self.layout_children()
    }

    fn rectangle(&self) -> &Rectangle {
        &self.frame.rectangle
    }

    fn set_origin(&mut self, origin: Point) {
        let delta = origin - self.frame.rectangle.origin();
        self.frame.rectangle = self.frame.rectangle.with_origin(origin);
        self.children.translate(delta);
    }

    fn mount_to(&mut self, host: &mut dyn HostSurface, parent: NodeId) -> WidgetResult<()> {
        let node = self.frame.mount(host, parent, NodeKind::Container)?;
        self.children.mount(host, node)
    }

    fn unmount_from(&mut self, host: &mut dyn HostSurface, parent: NodeId) -> WidgetResult<()> {
        self.children.unmount(host, self.frame.node())?;
        self.frame.unmount(host, parent)
    }

    fn mounted_node(&self) -> Option<NodeId> {
        self.frame.node()
    }

    fn children(&self) -> &[Box<dyn Widget>] {
        self.children.as_slice()
    }

    fn children_mut(&mut self) -> &mut [Box<dyn Widget>] {
        self.children.as_mut_slice()
    }

    fn accepts_child(&self) -> WidgetResult<()> {
        self.children.accepts()
    }

    fn add_child(&mut self, child: Box<dyn Widget>, host: &mut dyn HostSurface) -> Result<(), ChildRejected> {
        debug!("Row {}: adding child {}", self.frame.widget_id, child.widget_id());
        self.children.insert(child, host, self.frame.node())?;
        self.relayout_after_change();
        Ok(())
    }

    fn remove_child(
        &mut self,
        child_id: WidgetId,
        host: &mut dyn HostSurface,
    ) -> WidgetResult<Option<Box<dyn Widget>>> {
        let removed = self.children.remove(child_id, host, self.frame.node())?;
        if removed.is_some() {
            self.relayout_after_change();
        }
        Ok(removed)
    }

    fn set_vertical_alignment(&mut self, vertical_alignment: VerticalAlignment) -> WidgetResult<()> {
        self.vertical_alignment = vertical_alignment;
        self.layout_children().map(|_| ())
    }
}
