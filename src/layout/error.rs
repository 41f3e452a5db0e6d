//! Error types for the layout engine

use thiserror::Error;

use super::types::WidgetId;

/// Conditions the engine refuses to act on.
///
/// Every operation that returns one of these has left the sheet unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// Reference to a widget that is not on the sheet
    #[error("unknown widget '{id}'")]
    UnknownWidget { id: WidgetId },

    /// Attempt to attach a widget to itself
    #[error("cannot attach widget '{id}' to itself")]
    SelfAttach { id: WidgetId },

    /// A widget with this id already exists
    #[error("widget '{id}' already exists")]
    DuplicateWidget { id: WidgetId },
}

impl LayoutError {
    /// Create an unknown widget error
    pub fn unknown(id: &WidgetId) -> Self {
        Self::UnknownWidget { id: id.clone() }
    }

    /// Create a self-attach error
    pub fn self_attach(id: &WidgetId) -> Self {
        Self::SelfAttach { id: id.clone() }
    }

    /// Create a duplicate widget error
    pub fn duplicate(id: &WidgetId) -> Self {
        Self::DuplicateWidget { id: id.clone() }
    }

    /// The widget the error refers to
    pub fn id(&self) -> &WidgetId {
        match self {
            Self::UnknownWidget { id } | Self::SelfAttach { id } | Self::DuplicateWidget { id } => {
                id
            }
        }
    }
}
