// crates/tessera-layout/src/flex.rs
//! Two-pass flex layout shared by `Row` and `Column`.
//!
//! Pass one measures every child against a loose constraint and sums the
//! main-axis extent of the children without a flex factor, spacing included.
//! The container then picks its own size: shrink to content when no child
//! flexes, otherwise the full incoming maximum. Pass two hands the leftover
//! main-axis space to the flexible children in proportion to their factors
//! and places every child along the main axis, aligned on the cross axis.

use crate::Widget;
use tessera_core::{CrossAlignment, Point, Size, SizeConstraints, WidgetResult};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn main(self, size: Size) -> f64 {
        match self {
            Axis::Horizontal => size.width,
            Axis::Vertical => size.height,
        }
    }

    pub fn cross(self, size: Size) -> f64 {
        match self {
            Axis::Horizontal => size.height,
            Axis::Vertical => size.width,
        }
    }

    pub fn size(self, main: f64, cross: f64) -> Size {
        match self {
            Axis::Horizontal => Size::new(main, cross),
            Axis::Vertical => Size::new(cross, main),
        }
    }

    pub fn point(self, main: f64, cross: f64) -> Point {
        match self {
            Axis::Horizontal => Point::new(main, cross),
            Axis::Vertical => Point::new(cross, main),
        }
    }

    fn main_of(self, point: Point) -> f64 {
        match self {
            Axis::Horizontal => point.x,
            Axis::Vertical => point.y,
        }
    }

    fn cross_of(self, point: Point) -> f64 {
        match self {
            Axis::Horizontal => point.y,
            Axis::Vertical => point.x,
        }
    }
}

/// Totals gathered by the measuring pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Measurement {
    /// Main-axis extent of the non-flexible children plus all spacing.
    pub fixed_main: f64,
    pub max_cross: f64,
    pub flex_factor_sum: u32,
}

/// Lays out `children` inside a container at `origin` and returns the
/// container's size.
///
/// The size is floored at `constraints.minimum()` but never capped at the
/// maximum: content that does not fit overflows.
pub fn layout(
    children: &mut [Box<dyn Widget>],
    axis: Axis,
    spacing: f64,
    alignment: CrossAlignment,
    constraints: SizeConstraints,
    origin: Point,
) -> WidgetResult<Size> {
    constraints.validate()?;

    let (measurement, measured) = measure(children, axis, spacing, constraints)?;

    let own_size = if measurement.flex_factor_sum == 0 {
        axis.size(measurement.fixed_main, measurement.max_cross)
    } else {
        axis.size(axis.main(constraints.maximum()), measurement.max_cross)
    }
    .max(constraints.minimum());

    let remaining = (axis.main(own_size) - measurement.fixed_main).max(0.0);
    debug!(
        "Flex layout ({:?}): {} children, fixed={}, flex_sum={}, remaining={}, size={:?}",
        axis,
        children.len(),
        measurement.fixed_main,
        measurement.flex_factor_sum,
        remaining,
        own_size
    );

    let mut cursor = axis.main_of(origin);
    let cross_origin = axis.cross_of(origin);
    let line = axis.cross(own_size);

    for (child, measured_size) in children.iter_mut().zip(measured) {
        let flex_factor = child.flex_factor();

        let child_size = if flex_factor == 0 {
            measured_size
        } else {
            let share = remaining * (f64::from(flex_factor) / f64::from(measurement.flex_factor_sum));
            let expanded = axis.size(share, axis.cross(measured_size));
            child.apply_size_constraints(SizeConstraints::tight(expanded))?;
            expanded
        };

        let offset = alignment.offset(line, axis.cross(child_size));
        let child_origin = axis.point(cursor, cross_origin + offset);
        child.set_origin(child_origin);
        trace!("Placed widget {} at {:?} with size {:?}", child.widget_id(), child_origin, child_size);

        cursor += axis.main(child_size) + spacing;
    }

    Ok(own_size)
}

/// The measuring pass. Returns the totals and each child's provisional size.
pub fn measure(
    children: &mut [Box<dyn Widget>],
    axis: Axis,
    spacing: f64,
    constraints: SizeConstraints,
) -> WidgetResult<(Measurement, Vec<Size>)> {
    let child_constraints = SizeConstraints::loose(constraints.maximum());
    let mut measurement = Measurement::default();
    let mut measured = Vec::with_capacity(children.len());

    for (index, child) in children.iter_mut().enumerate() {
        let size = child.apply_size_constraints(child_constraints)?;
        measurement.max_cross = measurement.max_cross.max(axis.cross(size));

        if index > 0 {
            measurement.fixed_main += spacing;
        }

        match child.flex_factor() {
            0 => measurement.fixed_main += axis.main(size),
            flex_factor => measurement.flex_factor_sum += u32::from(flex_factor),
        }

        measured.push(size);
    }

    Ok((measurement, measured))
}
