//! Change payloads and observer interfaces.
//!
//! Components announce item changes as [`DataChange`] values on
//! [`ComponentSignals::data`](crate::ComponentSignals::data). Groups also
//! announce membership changes as [`GroupChange`] values on their
//! structural signal.
//!
//! Consumers can connect closures to those signals directly, or implement
//! [`ComponentDataObserver`] / [`ComponentGroupObserver`] and register an
//! observer object.
//!
//! ```
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use tessera::observer::{register_data_observer, ComponentDataObserver};
//! use tessera::{ComponentGroup, HolderType, ListComponent};
//!
//! #[derive(Default)]
//! struct InsertLog(Mutex<Vec<(usize, usize)>>);
//!
//! impl ComponentDataObserver for InsertLog {
//!     fn on_item_range_inserted(&self, start: usize, count: usize) {
//!         self.0.lock().push((start, count));
//!     }
//! }
//!
//! struct RowHolder;
//!
//! let root = ComponentGroup::new();
//! let log = Arc::new(InsertLog::default());
//! register_data_observer(&root, log.clone());
//!
//! let rows = Arc::new(ListComponent::<(), String>::new(HolderType::of::<RowHolder>()));
//! root.add_component(rows.clone()).unwrap();
//! rows.append_data(vec!["a".into(), "b".into()]);
//!
//! assert_eq!(*log.0.lock(), vec![(0, 0), (0, 2)]);
//! ```

use std::fmt;
use std::sync::Arc;

use tessera_core::ConnectionId;

use crate::component::{Component, ComponentId};
use crate::error::Result;

/// A change to a component's items, in the emitter's coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataChange {
    /// Anything may have changed, including the count.
    Changed,
    /// `count` items starting at `start` changed in place.
    RangeChanged { start: usize, count: usize },
    /// `count` items were inserted at `start`.
    RangeInserted { start: usize, count: usize },
    /// `count` items starting at `start` were removed.
    RangeRemoved { start: usize, count: usize },
    /// The item at `from` moved to `to`.
    Moved { from: usize, to: usize },
}

impl DataChange {
    /// Returns this change with every position shifted right by `by`.
    ///
    /// [`DataChange::Changed`] carries no positions and is returned as is.
    pub fn offset(self, by: usize) -> Self {
        match self {
            Self::Changed => Self::Changed,
            Self::RangeChanged { start, count } => Self::RangeChanged {
                start: start + by,
                count,
            },
            Self::RangeInserted { start, count } => Self::RangeInserted {
                start: start + by,
                count,
            },
            Self::RangeRemoved { start, count } => Self::RangeRemoved {
                start: start + by,
                count,
            },
            Self::Moved { from, to } => Self::Moved {
                from: from + by,
                to: to + by,
            },
        }
    }

    /// Invokes the matching callback on `observer`.
    pub fn dispatch(&self, observer: &dyn ComponentDataObserver) {
        match *self {
            Self::Changed => observer.on_changed(),
            Self::RangeChanged { start, count } => observer.on_item_range_changed(start, count),
            Self::RangeInserted { start, count } => observer.on_item_range_inserted(start, count),
            Self::RangeRemoved { start, count } => observer.on_item_range_removed(start, count),
            Self::Moved { from, to } => observer.on_item_moved(from, to),
        }
    }
}

/// A change to a group's membership.
#[derive(Clone)]
pub enum GroupChange {
    /// The set of children changed.
    Changed,
    /// A child was removed from the group.
    ComponentRemoved(Arc<dyn Component>),
}

impl fmt::Debug for GroupChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Changed => f.write_str("Changed"),
            Self::ComponentRemoved(component) => f
                .debug_tuple("ComponentRemoved")
                .field(&ComponentId::of(&**component))
                .finish(),
        }
    }
}

impl PartialEq for GroupChange {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Changed, Self::Changed) => true,
            (Self::ComponentRemoved(a), Self::ComponentRemoved(b)) => {
                ComponentId::of(&**a) == ComponentId::of(&**b)
            }
            _ => false,
        }
    }
}

impl Eq for GroupChange {}

/// Receives item changes from a component.
///
/// Every method defaults to doing nothing; override what you need.
pub trait ComponentDataObserver: Send + Sync {
    /// Anything may have changed.
    fn on_changed(&self) {}

    /// `count` items starting at `start` changed in place.
    fn on_item_range_changed(&self, _start: usize, _count: usize) {}

    /// `count` items were inserted at `start`.
    fn on_item_range_inserted(&self, _start: usize, _count: usize) {}

    /// `count` items starting at `start` were removed.
    fn on_item_range_removed(&self, _start: usize, _count: usize) {}

    /// The item at `from` moved to `to`.
    fn on_item_moved(&self, _from: usize, _to: usize) {}
}

/// Receives membership changes from a group.
pub trait ComponentGroupObserver: Send + Sync {
    /// The set of children changed.
    fn on_changed(&self) {}

    /// `component` was removed from the group.
    fn on_component_removed(&self, _component: &Arc<dyn Component>) {}
}

impl GroupChange {
    /// Invokes the matching callback on `observer`.
    pub fn dispatch(&self, observer: &dyn ComponentGroupObserver) {
        match self {
            Self::Changed => observer.on_changed(),
            Self::ComponentRemoved(component) => observer.on_component_removed(component),
        }
    }
}

/// Registers `observer` for `component`'s item changes.
pub fn register_data_observer(
    component: &dyn Component,
    observer: Arc<dyn ComponentDataObserver>,
) -> ConnectionId {
    component
        .signals()
        .data
        .connect(move |change| change.dispatch(&*observer))
}

/// Removes an observer previously registered with [`register_data_observer`].
pub fn unregister_data_observer(component: &dyn Component, id: ConnectionId) -> Result<()> {
    component.signals().data.try_disconnect(id)?;
    Ok(())
}
