//! The component contract.
//!
//! A [`Component`] contributes `count()` items to the flat item sequence.
//! For each local index in `[0, count)` it answers three questions: which
//! presenter handles the item, which data item it shows, and which view
//! holder type renders it. Components report their own mutations on
//! [`ComponentSignals`], always in local coordinates; the enclosing
//! [`ComponentGroup`](crate::ComponentGroup) translates them for its parent.
//!
//! # Implementing a leaf
//!
//! ```
//! use std::sync::Arc;
//! use tessera::{Component, ComponentSignals, HolderType, Item, Presenter, Result};
//!
//! struct Spacer {
//!     signals: ComponentSignals,
//! }
//!
//! struct SpacerHolder;
//!
//! impl Component for Spacer {
//!     fn count(&self) -> usize {
//!         1
//!     }
//!
//!     fn presenter(&self, index: usize) -> Result<Option<Presenter>> {
//!         tessera::check_index(index, self.count())?;
//!         Ok(None)
//!     }
//!
//!     fn item(&self, index: usize) -> Result<Option<Item>> {
//!         tessera::check_index(index, self.count())?;
//!         Ok(None)
//!     }
//!
//!     fn holder_type(&self, index: usize) -> Result<HolderType> {
//!         tessera::check_index(index, self.count())?;
//!         Ok(HolderType::of::<SpacerHolder>())
//!     }
//!
//!     fn signals(&self) -> &ComponentSignals {
//!         &self.signals
//!     }
//! }
//!
//! let spacer = Spacer { signals: ComponentSignals::new() };
//! assert_eq!(spacer.number_lanes().unwrap(), 1);
//! assert!(spacer.item(1).is_err());
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use tessera_core::Signal;

use crate::error::Result;
use crate::group::ComponentGroup;
use crate::observer::DataChange;

/// Type-erased presenter handed to a view holder alongside its item.
pub type Presenter = Arc<dyn Any + Send + Sync>;

/// Type-erased data item for a single position.
pub type Item = Arc<dyn Any + Send + Sync>;

/// Reference identity of a component.
///
/// Two components holding identical data are still distinct; identity is
/// the address of the component itself, stable for as long as it is alive.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(usize);

impl ComponentId {
    /// Returns the identity of `component`.
    pub fn of(component: &dyn Component) -> Self {
        Self(component as *const dyn Component as *const () as usize)
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({:#x})", self.0)
    }
}

/// Identifies the view holder type that renders an item.
///
/// Rendering surfaces key view pools on this value, so two positions with
/// equal holder types can share recycled views.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HolderType {
    id: TypeId,
    name: &'static str,
}

impl HolderType {
    /// Returns the holder type for `H`.
    pub fn of<H: 'static>() -> Self {
        Self {
            id: TypeId::of::<H>(),
            name: std::any::type_name::<H>(),
        }
    }

    /// The `TypeId` of the holder.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The full type name of the holder.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if this is the holder type for `H`.
    pub fn is<H: 'static>(&self) -> bool {
        self.id == TypeId::of::<H>()
    }
}

impl fmt::Debug for HolderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HolderType").field(&self.name).finish()
    }
}

/// Binds one item of a component to a view.
///
/// Rendering surfaces create holders from a [`HolderType`] and call
/// [`bind`](ViewHolder::bind) with the presenter and item reported for the
/// position being shown. The component layer never instantiates holders.
pub trait ViewHolder<P, I>: Send {
    /// Updates the holder's view for `item`.
    fn bind(&mut self, presenter: Option<&P>, item: &I);

    /// Called when the view is about to be reused for another position.
    fn on_view_recycled(&mut self) {}
}

/// Signals emitted by every component.
///
/// All payloads are in the emitting component's local coordinates.
pub struct ComponentSignals {
    /// Emitted after the component's items change.
    pub data: Signal<DataChange>,
}

impl Default for ComponentSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentSignals {
    /// Creates a new set of component signals.
    pub fn new() -> Self {
        Self { data: Signal::new() }
    }

    /// Reports that any or all items may have changed, including the count.
    pub fn notify_data_changed(&self) {
        self.data.emit(DataChange::Changed);
    }

    /// Reports that `count` items starting at `start` changed in place.
    pub fn notify_item_range_changed(&self, start: usize, count: usize) {
        self.data.emit(DataChange::RangeChanged { start, count });
    }

    /// Reports that `count` items were inserted at `start`.
    pub fn notify_item_range_inserted(&self, start: usize, count: usize) {
        self.data.emit(DataChange::RangeInserted { start, count });
    }

    /// Reports that `count` items starting at `start` were removed.
    pub fn notify_item_range_removed(&self, start: usize, count: usize) {
        self.data.emit(DataChange::RangeRemoved { start, count });
    }

    /// Reports that the item at `from` now sits at `to`.
    pub fn notify_item_moved(&self, from: usize, to: usize) {
        self.data.emit(DataChange::Moved { from, to });
    }
}

/// A self-contained unit contributing zero or more items.
///
/// # Implementation Requirements
///
/// `count` must match the indices `presenter`, `item` and `holder_type`
/// accept, at every moment, including immediately after a notification is
/// emitted. Queries outside `[0, count)` return
/// [`Error::IndexOutOfRange`](crate::Error::IndexOutOfRange).
///
/// A count of 0 is valid: the component stays in its group, subscribed and
/// stateful, but renders nothing.
pub trait Component: Send + Sync + 'static {
    /// Number of addressable items.
    fn count(&self) -> usize;

    /// The presenter for the item at `index`.
    fn presenter(&self, index: usize) -> Result<Option<Presenter>>;

    /// The data item at `index`.
    fn item(&self, index: usize) -> Result<Option<Item>>;

    /// The view holder type that renders the item at `index`.
    fn holder_type(&self, index: usize) -> Result<HolderType>;

    /// The component's change signals.
    fn signals(&self) -> &ComponentSignals;

    // -------------------------------------------------------------------------
    // Layout
    // -------------------------------------------------------------------------

    /// How many parallel lanes (grid columns or rows) the component spans.
    fn number_lanes(&self) -> Result<usize> {
        Ok(1)
    }

    /// How many lanes the item at `index` occupies.
    fn span_size(&self, _index: usize) -> Result<usize> {
        Ok(1)
    }

    // -------------------------------------------------------------------------
    // Visibility hooks, invoked by the rendering surface
    // -------------------------------------------------------------------------

    /// The item at `index` entered the viewport.
    fn on_item_visible(&self, _index: usize) -> Result<()> {
        Ok(())
    }

    /// The item at `index` left the viewport.
    fn on_item_not_visible(&self, _index: usize) -> Result<()> {
        Ok(())
    }

    /// The item at `index` reached the top of the viewport.
    fn on_item_at_top(&self, _index: usize) -> Result<()> {
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Reordering
    // -------------------------------------------------------------------------

    /// Whether the item at `index` may be picked up for dragging.
    fn can_pick_up_item(&self, _index: usize) -> Result<bool> {
        Ok(false)
    }

    /// Whether the item dragged from `from` may be dropped at `to`.
    fn can_drop_item(&self, _from: usize, _to: usize) -> Result<bool> {
        Ok(true)
    }

    /// A drag finished, moving the item at `from` to `to`.
    fn on_items_moved(&self, _from: usize, _to: usize) -> Result<()> {
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------

    /// Returns the group if this component is one.
    fn as_group(&self) -> Option<&ComponentGroup> {
        None
    }

    /// The concrete type name, for diagnostics.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
