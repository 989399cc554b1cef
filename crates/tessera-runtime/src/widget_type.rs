// crates/tessera-runtime/src/widget_type.rs
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::rc::Rc;
use tessera_core::{HorizontalAlignment, Size, VerticalAlignment, WidgetError, WidgetId, WidgetResult};
use tessera_layout::{
    Center, Column, Expanded, Insets, Padding, Placeholder, Row, SizedBox, Text, TextMeasure, Widget,
};

/// The kind of widget a `CreateWidget` command builds.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetType {
    Text(String),
    Placeholder {
        desired_size: Size,
        flex_factor: u16,
    },
    Row {
        spacing: f64,
        vertical_alignment: VerticalAlignment,
    },
    Column {
        spacing: f64,
        horizontal_alignment: HorizontalAlignment,
    },
    Expanded {
        flex_factor: u16,
    },
    Center,
    Padding(Insets),
    SizedBox {
        desired_size: Size,
    },
}

#[derive(Deserialize)]
struct PlaceholderOptions {
    width: f64,
    height: f64,
    #[serde(default)]
    flex_factor: u16,
}

#[derive(Default, Deserialize)]
struct RowOptions {
    #[serde(default)]
    spacing: f64,
    #[serde(default)]
    vertical_alignment: VerticalAlignment,
}

#[derive(Default, Deserialize)]
struct ColumnOptions {
    #[serde(default)]
    spacing: f64,
    #[serde(default)]
    horizontal_alignment: HorizontalAlignment,
}

#[derive(Deserialize)]
struct ExpandedOptions {
    #[serde(default = "default_flex_factor")]
    flex_factor: u16,
}

impl Default for ExpandedOptions {
    fn default() -> Self {
        Self {
            flex_factor: default_flex_factor(),
        }
    }
}

fn default_flex_factor() -> u16 {
    1
}

const DEFAULT_PADDING: f64 = 15.0;

/// `padding` sets every side; `left`, `top`, `right` and `bottom` override it.
#[derive(Deserialize)]
struct PaddingOptions {
    #[serde(default = "default_padding")]
    padding: f64,
    left: Option<f64>,
    top: Option<f64>,
    right: Option<f64>,
    bottom: Option<f64>,
}

impl Default for PaddingOptions {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING,
            left: None,
            top: None,
            right: None,
            bottom: None,
        }
    }
}

impl PaddingOptions {
    fn insets(&self) -> Insets {
        Insets {
            left: self.left.unwrap_or(self.padding),
            top: self.top.unwrap_or(self.padding),
            right: self.right.unwrap_or(self.padding),
            bottom: self.bottom.unwrap_or(self.padding),
        }
    }
}

fn default_padding() -> f64 {
    DEFAULT_PADDING
}

#[derive(Deserialize)]
struct SizedBoxOptions {
    width: f64,
    height: f64,
}

/// Deserializes an optional options object; a missing or null one means defaults.
fn parse_options<T: DeserializeOwned + Default>(payload: Option<&Value>) -> WidgetResult<T> {
    match payload {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => parse_required(value),
    }
}

fn parse_required<T: DeserializeOwned>(value: &Value) -> WidgetResult<T> {
    serde_json::from_value(value.clone()).map_err(|e| WidgetError::MalformedCommand(e.to_string()))
}

impl WidgetType {
    /// Parses a protocol tag such as `"WidgetType::Row"` plus its optional payload.
    pub fn from_tag(tag: &str, payload: Option<&Value>) -> WidgetResult<Self> {
        match tag {
            "WidgetType::Text" => {
                let text = match payload {
                    None | Some(Value::Null) => String::new(),
                    Some(Value::String(text)) => text.clone(),
                    Some(other) => other.to_string(),
                };
                Ok(WidgetType::Text(text))
            }
            "WidgetType::Placeholder" => {
                let value = payload.ok_or_else(|| {
                    WidgetError::MalformedCommand("a placeholder needs a width and a height".to_string())
                })?;
                let options: PlaceholderOptions = parse_required(value)?;
                Ok(WidgetType::Placeholder {
                    desired_size: Size::new(options.width, options.height),
                    flex_factor: options.flex_factor,
                })
            }
            "WidgetType::Row" => {
                let options: RowOptions = parse_options(payload)?;
                Ok(WidgetType::Row {
                    spacing: options.spacing,
                    vertical_alignment: options.vertical_alignment,
                })
            }
            "WidgetType::Column" => {
                let options: ColumnOptions = parse_options(payload)?;
                Ok(WidgetType::Column {
                    spacing: options.spacing,
                    horizontal_alignment: options.horizontal_alignment,
                })
            }
            "WidgetType::Expanded" => {
                let options: ExpandedOptions = parse_options(payload)?;
                Ok(WidgetType::Expanded {
                    flex_factor: options.flex_factor,
                })
            }
            "WidgetType::Center" => Ok(WidgetType::Center),
            "WidgetType::Padding" => {
                let options: PaddingOptions = parse_options(payload)?;
                Ok(WidgetType::Padding(options.insets()))
            }
            "WidgetType::SizedBox" => {
                let value = payload.ok_or_else(|| {
                    WidgetError::MalformedCommand("a sized box needs a width and a height".to_string())
                })?;
                let options: SizedBoxOptions = parse_required(value)?;
                Ok(WidgetType::SizedBox {
                    desired_size: Size::new(options.width, options.height),
                })
            }
            other => Err(WidgetError::UnsupportedWidgetType(other.to_string())),
        }
    }

    pub fn build(self, widget_id: WidgetId, measure: &Rc<dyn TextMeasure>) -> Box<dyn Widget> {
        match self {
            WidgetType::Text(text) => Box::new(Text::new(widget_id, text, Rc::clone(measure))),
            WidgetType::Placeholder {
                desired_size,
                flex_factor,
            } => Box::new(Placeholder::new(widget_id, desired_size).with_flex_factor(flex_factor)),
            WidgetType::Row {
                spacing,
                vertical_alignment,
            } => Box::new(
                Row::new(widget_id)
                    .with_spacing(spacing)
                    .with_vertical_alignment(vertical_alignment),
            ),
            WidgetType::Column {
                spacing,
                horizontal_alignment,
            } => Box::new(
                Column::new(widget_id)
                    .with_spacing(spacing)
                    .with_horizontal_alignment(horizontal_alignment),
            ),
            WidgetType::Expanded { flex_factor } => Box::new(Expanded::new(widget_id, flex_factor)),
            WidgetType::Center => Box::new(Center::new(widget_id)),
            WidgetType::Padding(insets) => Box::new(Padding::new(widget_id, insets)),
            WidgetType::SizedBox { desired_size } => Box::new(SizedBox::new(widget_id, desired_size)),
        }
    }
}
