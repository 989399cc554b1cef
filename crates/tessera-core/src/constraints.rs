// crates/tessera-core/src/constraints.rs
use crate::{Size, WidgetError, WidgetResult};
use serde::{Deserialize, Serialize};

/// Finite stand-in for an unbounded extent, so layout arithmetic never sees infinities.
pub const UNBOUNDED_EXTENT: f64 = 1.0e12;

/// The legal size range handed from a parent to a child.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeConstraints {
    minimum: Size,
    maximum: Size,
}

impl Default for SizeConstraints {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl SizeConstraints {
    pub fn new(minimum: Size, maximum: Size) -> WidgetResult<Self> {
        let constraints = Self { minimum, maximum };
        constraints.validate()?;
        Ok(constraints)
    }

    /// Minimum and maximum both equal `size`.
    pub fn tight(size: Size) -> Self {
        Self {
            minimum: size,
            maximum: size,
        }
    }

    /// Minimum zero, maximum `size`.
    pub fn loose(size: Size) -> Self {
        Self {
            minimum: Size::ZERO,
            maximum: size,
        }
    }

    pub fn unbounded() -> Self {
        Self {
            minimum: Size::ZERO,
            maximum: Size::new(UNBOUNDED_EXTENT, UNBOUNDED_EXTENT),
        }
    }

    pub fn minimum(&self) -> Size {
        self.minimum
    }

    pub fn maximum(&self) -> Size {
        self.maximum
    }

    pub fn is_tight(&self) -> bool {
        self.minimum == self.maximum
    }

    /// Rejects NaN, negative minimums and a minimum above the maximum on either axis.
    ///
    /// Constructors already uphold this; values that arrive through
    /// deserialization have to be checked again.
    pub fn validate(&self) -> WidgetResult<()> {
        let Self { minimum, maximum } = *self;
        let axis_ok = |min: f64, max: f64| !min.is_nan() && !max.is_nan() && min >= 0.0 && min <= max;

        if axis_ok(minimum.width, maximum.width) && axis_ok(minimum.height, maximum.height) {
            Ok(())
        } else {
            Err(WidgetError::InvalidConstraint { minimum, maximum })
        }
    }

    /// Shrinks both bounds by `delta`, flooring each axis at zero.
    pub fn shrink(&self, delta: impl Into<Size>) -> Self {
        let delta = delta.into();
        let shrink_axis = |value: f64, by: f64| (value - by).max(0.0);

        Self {
            minimum: Size::new(
                shrink_axis(self.minimum.width, delta.width),
                shrink_axis(self.minimum.height, delta.height),
            ),
            maximum: Size::new(
                shrink_axis(self.maximum.width, delta.width),
                shrink_axis(self.maximum.height, delta.height),
            ),
        }
    }

    /// Clamps `size` into this range.
    pub fn constrain(&self, size: Size) -> Size {
        size.clamp(self.minimum, self.maximum)
    }
}
