//! Paint error types

use thiserror::Error;
use vellum_core::ShapingError;

use crate::backend::BackendError;

/// Misuse of the begin/end bracket
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStateError {
    #[error("render session is already open")]
    AlreadyOpen,

    #[error("render session is not open")]
    NotOpen,

    /// Another session holds the same render target open
    #[error("render target is already being rendered by another session")]
    TargetBusy,
}

/// Which stack an imbalance was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackKind {
    Clip,
    Layer,
}

impl std::fmt::Display for StackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StackKind::Clip => f.write_str("clip"),
            StackKind::Layer => f.write_str("layer"),
        }
    }
}

/// Unbalanced push/pop on the transform or clip/layer stacks
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackImbalanceError {
    #[error("pop_transform without a matching push_transform")]
    TransformUnderflow,

    #[error("pop_clip without a matching push_clip")]
    ClipUnderflow,

    #[error("pop_layer without a matching push_layer")]
    LayerUnderflow,

    /// The top of the clip/layer stack is not what the pop expected
    #[error("expected a {expected} on top of the clip/layer stack, found a {found}")]
    Mismatch { expected: StackKind, found: StackKind },

    /// Entries left on the stacks when the bracket ended; they were unwound
    #[error(
        "render ended with {transforms} transform(s), {clips} clip(s) and {layers} layer(s) still pushed"
    )]
    UnbalancedAtEnd {
        transforms: usize,
        clips: usize,
        layers: usize,
    },
}

/// Misuse of the path geometry build/close state machine
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryStateError {
    #[error("geometry is closed and can no longer be modified")]
    Closed,

    #[error("geometry must be closed before it can be queried or drawn")]
    NotClosed,

    #[error("geometry is already closed")]
    AlreadyClosed,

    #[error("segments require a start point")]
    NotStarted,
}

/// Why a resource handle was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// The resource was explicitly released
    Released,
    /// The resource was created by a different device
    ForeignDevice,
    /// The handle does not name a resource of the expected kind
    KindMismatch,
}

impl std::fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidReason::Released => f.write_str("resource was released"),
            InvalidReason::ForeignDevice => f.write_str("resource belongs to another device"),
            InvalidReason::KindMismatch => f.write_str("resource has the wrong kind"),
        }
    }
}

/// Paint errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PaintError {
    #[error(transparent)]
    Session(#[from] SessionStateError),

    #[error(transparent)]
    Stack(#[from] StackImbalanceError),

    #[error(transparent)]
    Geometry(#[from] GeometryStateError),

    #[error("invalid resource: {0}")]
    ResourceInvalid(InvalidReason),

    /// The backend context behind the device is gone
    #[error("render device lost")]
    DeviceLost,

    /// A single backend call was rejected; nothing is retried
    #[error("backend error: {0}")]
    Backend(BackendError),

    #[error(transparent)]
    Shaping(#[from] ShapingError),

    #[error("device has no text shaper")]
    MissingTextShaper,

    #[error("bitmap data is {actual} bytes, expected {expected}")]
    InvalidBitmapData { expected: usize, actual: usize },
}

impl From<BackendError> for PaintError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::DeviceLost => PaintError::DeviceLost,
            other => PaintError::Backend(other),
        }
    }
}

impl PaintError {
    /// True for errors caused by calling into the session in the wrong phase.
    pub fn is_state_error(&self) -> bool {
        matches!(
            self,
            PaintError::Session(_) | PaintError::Stack(_) | PaintError::Geometry(_)
        )
    }
}

/// Result type for paint operations
pub type Result<T> = std::result::Result<T, PaintError>;
