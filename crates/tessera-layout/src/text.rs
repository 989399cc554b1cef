// crates/tessera-layout/src/text.rs
use crate::{TextMeasure, Widget, WidgetFrame};
use std::rc::Rc;
use tessera_core::{HostSurface, NodeId, NodeKind, Point, Rectangle, Size, SizeConstraints, WidgetId, WidgetResult};
use tracing::trace;

/// A leaf showing a string. Its intrinsic size comes from a `TextMeasure`.
pub struct Text {
    frame: WidgetFrame,
    text: String,
    intrinsic_size: Size,
    measure: Rc<dyn TextMeasure>,
    flex_factor: u16,
}

impl Text {
    pub fn new(widget_id: WidgetId, text: impl Into<String>, measure: Rc<dyn TextMeasure>) -> Self {
        let text = text.into();
        let intrinsic_size = measure.measure(&text);
        Self {
            frame: WidgetFrame::new(widget_id),
            text,
            intrinsic_size,
            measure,
            flex_factor: 0,
        }
    }

    pub fn with_flex_factor(mut self, flex_factor: u16) -> Self {
        self.flex_factor = flex_factor;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn intrinsic_size(&self) -> Size {
        self.intrinsic_size
    }
}

impl Widget for Text {
    fn widget_id(&self) -> WidgetId {
        self.frame.widget_id
    }

    fn kind(&self) -> &'static str {
        "Text"
    }

    fn apply_size_constraints(&mut self, constraints: SizeConstraints) -> WidgetResult<Size> {
        constraints.validate()?;
        self.frame.constraints = constraints;
        let size = constraints.constrain(self.intrinsic_size);
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
        self.frame.mount(host, parent, NodeKind::Text(self.text.clone()))?;
        Ok(())
    }

    fn unmount_from(&mut self, host: &mut dyn HostSurface, parent: NodeId) -> WidgetResult<()> {
        self.frame.unmount(host, parent)
    }

    fn mounted_node(&self) -> Option<NodeId> {
        self.frame.node()
    }

    /// Replaces the text and re-measures against the last constraints.
    fn set_value(&mut self, value: &str, host: &mut dyn HostSurface) -> WidgetResult<()> {
        self.text = value.to_string();
        self.intrinsic_size = self.measure.measure(&self.text);
        trace!("Text {} re-measured to {:?}", self.frame.widget_id, self.intrinsic_size);

        if let Some(node) = self.frame.node() {
            host.set_text(node, &self.text)?;
        }
        self.apply_size_constraints(self.frame.constraints)?;
        Ok(())
    }

    fn value(&self) -> Option<String> {
        Some(self.text.clone())
    }
}
