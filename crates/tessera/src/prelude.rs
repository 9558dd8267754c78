//! Prelude module for Tessera.
//!
//! ```
//! use tessera::prelude::*;
//! ```

// ============================================================================
// Components
// ============================================================================

pub use crate::component::{Component, ComponentId, HolderType, ViewHolder};
pub use crate::group::ComponentGroup;
pub use crate::list_component::ListComponent;

// ============================================================================
// Observation
// ============================================================================

pub use crate::observer::{
    ComponentDataObserver, ComponentGroupObserver, DataChange, GroupChange,
    register_data_observer, unregister_data_observer,
};
pub use tessera_core::{ConnectionId, Signal};

// ============================================================================
// Indexing and errors
// ============================================================================

pub use crate::error::{Error, Result};
pub use crate::range_list::{Range, RangedValue};
