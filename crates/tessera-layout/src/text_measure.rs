// crates/tessera-layout/src/text_measure.rs
use tessera_core::Size;
use unicode_width::UnicodeWidthStr;

/// Supplies the intrinsic size of a piece of text.
///
/// The engine does no shaping of its own; whatever sits behind this trait
/// (a font system, a terminal grid) decides how large text is.
pub trait TextMeasure {
    fn measure(&self, text: &str) -> Size;
}

/// Fixed-pitch measurement: every terminal column is `char_width` wide and
/// every line `line_height` tall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasure {
    pub char_width: f64,
    pub line_height: f64,
}

impl MonospaceMeasure {
    pub fn new(char_width: f64, line_height: f64) -> Self {
        Self {
            char_width,
            line_height,
        }
    }
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self::new(8.0, 16.0)
    }
}

impl TextMeasure for MonospaceMeasure {
    fn measure(&self, text: &str) -> Size {
        // `lines()` yields nothing for "", which still occupies one line.
        let (columns, lines) = text
            .lines()
            .fold((0usize, 0usize), |(columns, lines), line| (columns.max(line.width()), lines + 1));

        Size::new(
            columns as f64 * self.char_width,
            lines.max(1) as f64 * self.line_height,
        )
    }
}
