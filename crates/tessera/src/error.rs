//! Error types for the component layer.

use tessera_core::SignalError;

use crate::component::ComponentId;

/// Result type alias for component operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the component layer.
///
/// Every variant is a caller error: a stated precondition was violated.
/// Operations check their preconditions before mutating anything, so a
/// returned error never leaves a structure half-updated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The component is already a member of the group.
    #[error("component {component:?} has already been added to this group")]
    DuplicateComponent { component: ComponentId },

    /// The component is the group itself or one of its ancestors.
    #[error("component {component:?} would become its own descendant")]
    CyclicMembership { component: ComponentId },

    /// The component is not a member of the group.
    #[error("component is not a member of this group")]
    ComponentNotFound,

    /// An index or position fell outside a structure's valid domain.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A component declared fewer than one lane.
    #[error("components must declare at least one lane, got {lanes}")]
    InvalidLaneCount { lanes: usize },

    /// Signal bookkeeping error.
    #[error(transparent)]
    Signal(#[from] SignalError),
}

impl Error {
    /// Create an index error.
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }
}

/// Returns `Ok(())` if `index` lies in `[0, len)`.
pub fn check_index(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(Error::out_of_range(index, len))
    }
}
