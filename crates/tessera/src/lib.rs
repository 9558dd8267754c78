//! Tessera - composable, range-indexed component trees.
//!
//! A list-style surface shows one flat sequence of items. Tessera lets that
//! sequence be assembled from self-contained [`Component`]s arranged in a
//! tree of [`ComponentGroup`]s. Each group lays its children end to end,
//! resolves flat positions to the owning leaf and re-emits child changes in
//! its own coordinates, so a renderer only ever talks to the root.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tessera::prelude::*;
//!
//! struct CellHolder;
//!
//! let header = Arc::new(
//!     ListComponent::<(), &str>::new(HolderType::of::<CellHolder>()).with_data(["Header"]),
//! );
//! let grid = Arc::new(
//!     ListComponent::<(), u32>::new(HolderType::of::<CellHolder>())
//!         .with_lanes(3)
//!         .with_data(0..6),
//! );
//!
//! let root = ComponentGroup::new();
//! root.add_component(header.clone()).unwrap();
//! root.add_component(grid.clone()).unwrap();
//!
//! assert_eq!(root.count(), 7);
//! assert_eq!(root.number_lanes().unwrap(), 3);
//! // The header spans the whole row; grid cells take one lane each.
//! assert_eq!(root.span_size(0).unwrap(), 3);
//! assert_eq!(root.span_size(1).unwrap(), 1);
//! assert_eq!(root.find_component_offset(&*grid), Some(1));
//! ```

pub mod component;
pub mod debug;
pub mod error;
pub mod group;
pub mod list_component;
pub mod observer;
pub mod prelude;
pub mod range_list;

pub use tessera_core::{ConnectionId, PerfSpan, Signal, SignalError, TreeFormatOptions, TreeStyle};

pub use component::{Component, ComponentId, ComponentSignals, HolderType, Item, Presenter, ViewHolder};
pub use debug::ComponentTreeDebug;
pub use error::{Error, Result, check_index};
pub use group::{ComponentGroup, GroupSignals};
pub use list_component::{ItemCallback, ListComponent, MoveCallback};
pub use observer::{ComponentDataObserver, ComponentGroupObserver, DataChange, GroupChange};
pub use range_list::{Range, RangeIndexedList, RangedValue};
