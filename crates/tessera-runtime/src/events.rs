// crates/tessera-runtime/src/events.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tessera_core::{WidgetError, WidgetId, WidgetResult};

/// Widget events an application can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WidgetEventType {
    Clicked,
    GainedFocus,
    LostFocus,
    ValueChanged,
}

impl WidgetEventType {
    /// Parses a protocol tag such as `"WidgetEventType::Clicked"`.
    pub fn from_tag(tag: &str) -> WidgetResult<Self> {
        match tag.strip_prefix("WidgetEventType::").unwrap_or(tag) {
            "Clicked" => Ok(Self::Clicked),
            "GainedFocus" => Ok(Self::GainedFocus),
            "LostFocus" => Ok(Self::LostFocus),
            "ValueChanged" => Ok(Self::ValueChanged),
            _ => Err(WidgetError::MalformedCommand(format!("unknown widget event type `{}`", tag))),
        }
    }
}

/// An application payload to deliver when `event_type` happens on a widget.
#[derive(Debug, Clone, PartialEq)]
pub struct EventObservation {
    pub event_type: WidgetEventType,
    pub payload: Value,
}

/// Receives the payload of every observation that fires.
pub type EventHandler = Box<dyn FnMut(WidgetId, &Value)>;
