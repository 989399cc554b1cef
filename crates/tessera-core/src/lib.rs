// crates/tessera-core/src/lib.rs
pub mod alignment;
pub mod constraints;
pub mod geometry;
pub mod surface;

pub use alignment::*;
pub use constraints::*;
pub use geometry::*;
pub use surface::*;

/// Process-assigned widget identifier.
pub type WidgetId = usize;

#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    #[error("No widget with ID {0}")]
    UnknownWidgetReference(WidgetId),

    #[error("Event observation for widget {0} requested before an event handler was registered")]
    MissingEventHandler(WidgetId),

    #[error("Unsupported widget type: {0}")]
    UnsupportedWidgetType(String),

    #[error("Unsupported command: {0}")]
    UnsupportedCommand(String),

    #[error("Invalid size constraints: minimum {minimum:?} exceeds maximum {maximum:?}")]
    InvalidConstraint { minimum: Size, maximum: Size },

    #[error("Malformed command: {0}")]
    MalformedCommand(String),

    #[error("A widget with ID {0} exists already")]
    WidgetExistsAlready(WidgetId),

    #[error("Widget {0} is already attached to a parent")]
    ChildAlreadyAttached(WidgetId),

    #[error("Widget {child} cannot be added to its own descendant {parent}")]
    WouldCreateCycle { parent: WidgetId, child: WidgetId },

    #[error("Widget {0} cannot hold child widgets")]
    NotAContainer(WidgetId),

    #[error("Widget {0} already holds its single child")]
    ChildSlotOccupied(WidgetId),

    #[error("Widget {0} does not accept values")]
    ValueNotSupported(WidgetId),

    #[error("Widget {0} has no alignment on that axis")]
    AlignmentNotSupported(WidgetId),

    #[error("Host surface error: {0}")]
    Surface(#[from] SurfaceError),
}

pub type WidgetResult<T> = std::result::Result<T, WidgetError>;
