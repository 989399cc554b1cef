// crates/tessera-core/src/alignment.rs
use serde::{Deserialize, Serialize};

/// Placement of a child along the cross axis of a `Row`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerticalAlignment {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// Placement of a child along the cross axis of a `Column`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HorizontalAlignment {
    Left,
    #[default]
    Center,
    Right,
}

/// Axis-neutral form of the two alignments above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossAlignment {
    Start,
    Center,
    End,
}

impl CrossAlignment {
    /// Offset of a child of extent `child` inside a line of extent `line`.
    pub fn offset(self, line: f64, child: f64) -> f64 {
        let free = (line - child).max(0.0);
        match self {
            CrossAlignment::Start => 0.0,
            CrossAlignment::Center => 0.5 * free,
            CrossAlignment::End => free,
        }
    }
}

impl From<VerticalAlignment> for CrossAlignment {
    fn from(alignment: VerticalAlignment) -> Self {
        match alignment {
            VerticalAlignment::Top => CrossAlignment::Start,
            VerticalAlignment::Middle => CrossAlignment::Center,
            VerticalAlignment::Bottom => CrossAlignment::End,
        }
    }
}

impl From<HorizontalAlignment> for CrossAlignment {
    fn from(alignment: HorizontalAlignment) -> Self {
        match alignment {
            HorizontalAlignment::Left => CrossAlignment::Start,
            HorizontalAlignment::Center => CrossAlignment::Center,
            HorizontalAlignment::Right => CrossAlignment::End,
        }
    }
}
