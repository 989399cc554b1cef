// crates/tessera-runtime/src/id_provider.rs
use tessera_core::WidgetId;

/// Hands out increasing widget IDs, starting at 1.
#[derive(Debug, Default)]
pub struct WidgetIdProvider {
    last_widget_id: WidgetId,
}

impl WidgetIdProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_widget_id(&mut self) -> WidgetId {
        self.last_widget_id += 1;
        self.last_widget_id
    }

    /// Records an ID chosen elsewhere so it is never handed out again.
    pub fn observe(&mut self, widget_id: WidgetId) {
        self.last_widget_id = self.last_widget_id.max(widget_id);
    }
}
