//! A homogeneous list leaf.
//!
//! [`ListComponent`] shows a vector of data items, all bound by the same
//! view holder type and sharing one optional presenter. Every mutation
//! emits the matching granular change, so groups above it stay in sync
//! without re-querying the whole list.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tessera_core::logging::targets;

use crate::component::{Component, ComponentSignals, HolderType, Item, Presenter, ViewHolder};
use crate::error::{Error, Result, check_index};

/// Callback invoked after a drag moved an item from one index to another.
pub type MoveCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Callback invoked with the index of every item handed out by
/// [`Component::item`]. Lists use it to page in more data near the end.
pub type ItemCallback = Arc<dyn Fn(usize) + Send + Sync>;

/// A component showing one item per data element.
///
/// # Example
///
/// ```
/// use tessera::{Component, HolderType, ListComponent};
///
/// struct NameHolder;
///
/// let names = ListComponent::<(), String>::new(HolderType::of::<NameHolder>())
///     .with_lanes(2)
///     .with_data(vec!["ada".to_string(), "grace".to_string()]);
///
/// assert_eq!(names.count(), 2);
/// assert_eq!(names.number_lanes().unwrap(), 2);
/// assert!(names.holder_type(1).unwrap().is::<NameHolder>());
/// ```
pub struct ListComponent<P, T> {
    data: RwLock<Vec<Arc<T>>>,
    presenter: Option<Arc<P>>,
    holder_type: HolderType,
    lanes: usize,
    reorderable: AtomicBool,
    move_callback: RwLock<Option<MoveCallback>>,
    item_callback: RwLock<Option<ItemCallback>>,
    signals: ComponentSignals,
}

impl<P, T> ListComponent<P, T>
where
    P: Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    /// Creates an empty list rendered by `holder_type`.
    pub fn new(holder_type: HolderType) -> Self {
        Self {
            data: RwLock::new(Vec::new()),
            presenter: None,
            holder_type,
            lanes: 1,
            reorderable: AtomicBool::new(false),
            move_callback: RwLock::new(None),
            item_callback: RwLock::new(None),
            signals: ComponentSignals::new(),
        }
    }

    /// Creates an empty list rendered by the view holder `H`.
    pub fn for_holder<H: ViewHolder<P, T> + 'static>() -> Self {
        Self::new(HolderType::of::<H>())
    }

    /// Sets the presenter shared by every item.
    pub fn with_presenter(mut self, presenter: impl Into<Arc<P>>) -> Self {
        self.presenter = Some(presenter.into());
        self
    }

    /// Sets the number of lanes, for grid-like lists.
    pub fn with_lanes(mut self, lanes: usize) -> Self {
        self.lanes = lanes;
        self
    }

    /// Sets the initial data without emitting anything.
    pub fn with_data(self, data: impl IntoIterator<Item = T>) -> Self {
        *self.data.write() = data.into_iter().map(Arc::new).collect();
        self
    }

    /// Sets whether items may be picked up for dragging.
    pub fn with_reorderable(self, reorderable: bool) -> Self {
        self.reorderable.store(reorderable, Ordering::Relaxed);
        self
    }

    /// Sets the callback invoked after a drag moved an item.
    pub fn with_move_callback<F>(self, callback: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        *self.move_callback.write() = Some(Arc::new(callback));
        self
    }

    /// Sets the callback invoked whenever an item is read.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use tessera::{Component, HolderType, ListComponent};
    ///
    /// let furthest = Arc::new(AtomicUsize::new(0));
    /// let seen = furthest.clone();
    /// let list = ListComponent::<(), u32>::new(HolderType::of::<()>())
    ///     .with_data(0..10)
    ///     .with_item_callback(move |index| {
    ///         seen.fetch_max(index, Ordering::Relaxed);
    ///     });
    ///
    /// list.item(8).unwrap();
    /// assert_eq!(furthest.load(Ordering::Relaxed), 8);
    /// ```
    pub fn with_item_callback<F>(self, callback: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        *self.item_callback.write() = Some(Arc::new(callback));
        self
    }

    /// Number of data items.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns `true` if the list holds no data.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Snapshot of the current data.
    pub fn data(&self) -> Vec<Arc<T>> {
        self.data.read().clone()
    }

    /// The data element at `index`.
    pub fn get(&self, index: usize) -> Option<Arc<T>> {
        self.data.read().get(index).cloned()
    }

    /// Replaces all data and reports a whole change.
    pub fn set_data(&self, data: impl IntoIterator<Item = T>) {
        *self.data.write() = data.into_iter().map(Arc::new).collect();
        self.signals.notify_data_changed();
    }

    /// Appends `data` and reports the inserted range.
    pub fn append_data(&self, data: impl IntoIterator<Item = T>) {
        let (start, count) = {
            let mut items = self.data.write();
            let start = items.len();
            items.extend(data.into_iter().map(Arc::new));
            (start, items.len() - start)
        };
        self.signals.notify_item_range_inserted(start, count);
    }

    /// Removes and returns the element at `index`.
    pub fn remove_at(&self, index: usize) -> Result<Arc<T>> {
        let removed = {
            let mut items = self.data.write();
            check_index(index, items.len())?;
            items.remove(index)
        };
        self.signals.notify_item_range_removed(index, 1);
        Ok(removed)
    }

    /// Sets whether items may be picked up for dragging.
    pub fn set_reorderable(&self, reorderable: bool) {
        self.reorderable.store(reorderable, Ordering::Relaxed);
    }

    /// Returns `true` if items may be picked up for dragging.
    pub fn is_reorderable(&self) -> bool {
        self.reorderable.load(Ordering::Relaxed)
    }

    /// Replaces the move callback. `None` clears it.
    pub fn set_move_callback(&self, callback: Option<MoveCallback>) {
        *self.move_callback.write() = callback;
    }

    /// Replaces the item callback. `None` clears it.
    pub fn set_item_callback(&self, callback: Option<ItemCallback>) {
        *self.item_callback.write() = callback;
    }
}

impl<P, T> ListComponent<P, T>
where
    P: Send + Sync + 'static,
    T: PartialEq + Send + Sync + 'static,
{
    /// Removes the first element equal to `item`.
    ///
    /// Returns `false`, without emitting, if no element matches.
    pub fn remove_data(&self, item: &T) -> bool {
        let index = {
            let mut items = self.data.write();
            let Some(index) = items.iter().position(|candidate| **candidate == *item) else {
                return false;
            };
            items.remove(index);
            index
        };
        self.signals.notify_item_range_removed(index, 1);
        true
    }
}

impl<P, T> fmt::Debug for ListComponent<P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListComponent")
            .field("len", &self.data.read().len())
            .field("holder_type", &self.holder_type)
            .field("lanes", &self.lanes)
            .field("reorderable", &self.reorderable.load(Ordering::Relaxed))
            .finish()
    }
}

impl<P, T> Component for ListComponent<P, T>
where
    P: Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    fn count(&self) -> usize {
        self.len()
    }

    fn presenter(&self, index: usize) -> Result<Option<Presenter>> {
        check_index(index, self.len())?;
        Ok(self
            .presenter
            .clone()
            .map(|presenter| presenter as Presenter))
    }

    fn item(&self, index: usize) -> Result<Option<Item>> {
        let item = {
            let items = self.data.read();
            check_index(index, items.len())?;
            items[index].clone()
        };
        // Runs unlocked so the callback may append more data.
        let callback = self.item_callback.read().clone();
        if let Some(callback) = callback {
            callback(index);
        }
        Ok(Some(item as Item))
    }

    fn holder_type(&self, index: usize) -> Result<HolderType> {
        check_index(index, self.len())?;
        Ok(self.holder_type)
    }

    fn signals(&self) -> &ComponentSignals {
        &self.signals
    }

    fn number_lanes(&self) -> Result<usize> {
        if self.lanes < 1 {
            return Err(Error::InvalidLaneCount { lanes: self.lanes });
        }
        Ok(self.lanes)
    }

    fn can_pick_up_item(&self, index: usize) -> Result<bool> {
        check_index(index, self.len())?;
        Ok(self.is_reorderable())
    }

    /// Relocates the item, runs the move callback and reports the move.
    fn on_items_moved(&self, from: usize, to: usize) -> Result<()> {
        {
            let mut items = self.data.write();
            check_index(from, items.len())?;
            check_index(to, items.len())?;
            let item = items.remove(from);
            items.insert(to, item);
        }
        tracing::trace!(target: targets::COMPONENT, from, to, "list item moved");

        let callback = self.move_callback.read().clone();
        if let Some(callback) = callback {
            callback(from, to);
        }
        self.signals.notify_item_moved(from, to);
        Ok(())
    }
}

static_assertions::assert_impl_all!(ListComponent<(), String>: Send, Sync);
