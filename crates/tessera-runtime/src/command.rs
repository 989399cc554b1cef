// crates/tessera-runtime/src/command.rs
use crate::{WidgetEventType, WidgetType};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tessera_core::{HorizontalAlignment, VerticalAlignment, WidgetError, WidgetId, WidgetResult};

/// A command to the widget manager.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Creates a detached widget with the given ID and type.
    CreateWidget(WidgetId, WidgetType),
    /// Moves a detached widget into a container.
    AddChild {
        parent_widget_id: WidgetId,
        child_widget_id: WidgetId,
    },
    /// Takes a child out of its container. It becomes detached again, or
    /// is destroyed when `destroy_child_widget` is set.
    RemoveChild {
        parent_widget_id: WidgetId,
        child_widget_id: WidgetId,
        destroy_child_widget: bool,
    },
    /// Sets the value of a widget, e.g. the string of a `Text`.
    SetValue(WidgetId, String),
    /// Makes a detached widget the one bound to the viewport.
    SetMainWidget(WidgetId),
    /// Delivers `payload` to the event handler whenever the event happens.
    AddEventObservation(WidgetId, WidgetEventType, Value),
    /// Stops delivering payloads for one event type of a widget.
    RemoveEventObservation(WidgetId, WidgetEventType),
    /// Drops a widget, its whole subtree and their observations.
    Destroy(WidgetId),
    /// Takes every child out of a container, detaching or destroying them.
    RemoveChildren {
        parent_widget_id: WidgetId,
        destroy_child_widgets: bool,
    },
    SetHorizontalAlignment(WidgetId, HorizontalAlignment),
    SetVerticalAlignment(WidgetId, VerticalAlignment),
}

#[derive(Deserialize)]
struct ChildParameters {
    parent_widget_id: WidgetId,
    child_widget_id: WidgetId,
    #[serde(default)]
    destroy_child_widget: bool,
}

#[derive(Deserialize)]
struct ChildrenParameters {
    parent_widget_id: WidgetId,
    #[serde(default)]
    destroy_child_widgets: bool,
}

fn malformed(message: impl Into<String>) -> WidgetError {
    WidgetError::MalformedCommand(message.into())
}

fn widget_id_at(items: &[Value], index: usize) -> WidgetResult<WidgetId> {
    items
        .get(index)
        .and_then(Value::as_u64)
        .and_then(|id| WidgetId::try_from(id).ok())
        .ok_or_else(|| malformed(format!("expected a widget ID at position {}", index)))
}

fn str_at(items: &[Value], index: usize) -> WidgetResult<&str> {
    items
        .get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(format!("expected a string at position {}", index)))
}

fn parameters_at<T: DeserializeOwned>(items: &[Value], index: usize) -> WidgetResult<T> {
    let value = items
        .get(index)
        .ok_or_else(|| malformed("missing parent/child parameters"))?;
    serde_json::from_value(value.clone()).map_err(|e| malformed(e.to_string()))
}

/// Reads a tagged enum value such as `"VerticalAlignment::Top"`; the prefix is optional.
fn tagged_at<T: DeserializeOwned>(items: &[Value], index: usize, prefix: &str) -> WidgetResult<T> {
    let tag = str_at(items, index)?;
    let name = tag.strip_prefix(prefix).unwrap_or(tag);
    serde_json::from_value(Value::String(name.to_string()))
        .map_err(|_| malformed(format!("unknown value `{}`", tag)))
}

impl Command {
    /// The widget that receives the command.
    pub fn widget_id(&self) -> WidgetId {
        match self {
            Command::CreateWidget(widget_id, _) => *widget_id,
            Command::AddChild { parent_widget_id, .. } => *parent_widget_id,
            Command::RemoveChild { parent_widget_id, .. } => *parent_widget_id,
            Command::RemoveChildren { parent_widget_id, .. } => *parent_widget_id,
            Command::SetValue(widget_id, _) => *widget_id,
            Command::SetMainWidget(widget_id) => *widget_id,
            Command::AddEventObservation(widget_id, _, _) => *widget_id,
            Command::RemoveEventObservation(widget_id, _) => *widget_id,
            Command::Destroy(widget_id) => *widget_id,
            Command::SetHorizontalAlignment(widget_id, _) => *widget_id,
            Command::SetVerticalAlignment(widget_id, _) => *widget_id,
        }
    }

    /// Parses a string-tagged command tuple, e.g.
    /// `["Command::CreateWidget", 1, "WidgetType::Text", "Hello"]` or
    /// `["Command::AddChild", {"parent_widget_id": 1, "child_widget_id": 2}]`.
    pub fn from_tuple(tuple: &Value) -> WidgetResult<Self> {
        let items = tuple
            .as_array()
            .ok_or_else(|| malformed("a command must be a JSON array"))?;
        let tag = str_at(items, 0)?;

        match tag {
            "Command::CreateWidget" => {
                let widget_id = widget_id_at(items, 1)?;
                let widget_type = WidgetType::from_tag(str_at(items, 2)?, items.get(3))?;
                Ok(Command::CreateWidget(widget_id, widget_type))
            }
            "Command::AddChild" => {
                let parameters: ChildParameters = parameters_at(items, 1)?;
                Ok(Command::AddChild {
                    parent_widget_id: parameters.parent_widget_id,
                    child_widget_id: parameters.child_widget_id,
                })
            }
            "Command::RemoveChild" => {
                let parameters: ChildParameters = parameters_at(items, 1)?;
                Ok(Command::RemoveChild {
                    parent_widget_id: parameters.parent_widget_id,
                    child_widget_id: parameters.child_widget_id,
                    destroy_child_widget: parameters.destroy_child_widget,
                })
            }
            "Command::RemoveChildren" => {
                let parameters: ChildrenParameters = parameters_at(items, 1)?;
                Ok(Command::RemoveChildren {
                    parent_widget_id: parameters.parent_widget_id,
                    destroy_child_widgets: parameters.destroy_child_widgets,
                })
            }
            "Command::Destroy" => Ok(Command::Destroy(widget_id_at(items, 1)?)),
            "Command::SetValue" => {
                let widget_id = widget_id_at(items, 1)?;
                let value = match items.get(2) {
                    Some(Value::String(value)) => value.clone(),
                    Some(other) => other.to_string(),
                    None => return Err(malformed("SetValue needs a value")),
                };
                Ok(Command::SetValue(widget_id, value))
            }
            "Command::SetMainWidget" => Ok(Command::SetMainWidget(widget_id_at(items, 1)?)),
            "Command::AddEventObservation" => {
                let widget_id = widget_id_at(items, 1)?;
                let event_type = WidgetEventType::from_tag(str_at(items, 2)?)?;
                let payload = items.get(3).cloned().unwrap_or(Value::Null);
                Ok(Command::AddEventObservation(widget_id, event_type, payload))
            }
            "Command::RemoveEventObservation" => {
                let widget_id = widget_id_at(items, 1)?;
                let event_type = WidgetEventType::from_tag(str_at(items, 2)?)?;
                Ok(Command::RemoveEventObservation(widget_id, event_type))
            }
            "Command::SetHorizontalAlignment" => Ok(Command::SetHorizontalAlignment(
                widget_id_at(items, 1)?,
                tagged_at(items, 2, "HorizontalAlignment::")?,
            )),
            "Command::SetVerticalAlignment" => Ok(Command::SetVerticalAlignment(
                widget_id_at(items, 1)?,
                tagged_at(items, 2, "VerticalAlignment::")?,
            )),
            other => Err(WidgetError::UnsupportedCommand(other.to_string())),
        }
    }
}
