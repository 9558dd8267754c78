//! Hierarchical component groups.
//!
//! A [`ComponentGroup`] is a [`Component`] built from ordered child
//! components. It lays its children end to end in one flat item sequence,
//! resolves flat positions back to the owning child, and re-emits every
//! child notification translated into its own coordinates. Groups nest, so
//! a tree of groups presents one flat sequence at the root.
//!
//! # Bookkeeping
//!
//! Children live in a slot-map arena keyed by a stable [`ChildKey`]. The
//! group keeps three structures mutually consistent after every operation:
//!
//! - a [`RangeIndexedList`] of child keys, sized by each child's count;
//! - per child, its current sequence index and its signal connection;
//! - an identity map from [`ComponentId`] to child key.
//!
//! Each child's signal is connected to a slot holding a weak reference to
//! the group, so children never keep their parent alive.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tessera::{Component, ComponentGroup, HolderType, ListComponent};
//!
//! struct RowHolder;
//!
//! let header = Arc::new(ListComponent::<(), &str>::new(HolderType::of::<RowHolder>()));
//! header.set_data(vec!["Title"]);
//! let rows = Arc::new(ListComponent::<(), &str>::new(HolderType::of::<RowHolder>()));
//! rows.set_data(vec!["a", "b", "c"]);
//!
//! let root = ComponentGroup::new();
//! root.add_component(header.clone()).unwrap();
//! root.add_component(rows.clone()).unwrap();
//!
//! assert_eq!(root.count(), 4);
//! let item = root.item(2).unwrap().unwrap();
//! assert_eq!(item.downcast_ref::<&str>(), Some(&"b"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use slotmap::{SlotMap, new_key_type};
use tessera_core::logging::targets;
use tessera_core::{ConnectionId, PerfSpan, Signal};

use crate::component::{Component, ComponentId, ComponentSignals, HolderType, Item, Presenter};
use crate::error::{Error, Result, check_index};
use crate::observer::{ComponentGroupObserver, DataChange, GroupChange};
use crate::range_list::{Range, RangeIndexedList, RangedValue};

new_key_type! {
    /// Stable handle of a child within one group.
    pub struct ChildKey;
}

/// Signals emitted by a group about its membership.
pub struct GroupSignals {
    /// Emitted after a child is added or removed.
    pub structure: Signal<GroupChange>,
}

impl Default for GroupSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupSignals {
    /// Creates a new set of group signals.
    pub fn new() -> Self {
        Self {
            structure: Signal::new(),
        }
    }
}

struct ChildEntry {
    component: Arc<dyn Component>,
    /// Position in `GroupState::children`.
    index: usize,
    connection: ConnectionId,
}

#[derive(Default)]
struct GroupState {
    children: RangeIndexedList<ChildKey>,
    entries: SlotMap<ChildKey, ChildEntry>,
    keys: HashMap<ComponentId, ChildKey>,
}

impl GroupState {
    fn entry_at(&self, index: usize) -> Result<(&ChildEntry, Range)> {
        let ranged = self.children.get(index)?;
        Ok((&self.entries[*ranged.value], ranged.range))
    }

    fn ranged_component_at(&self, position: usize) -> Result<RangedValue<Arc<dyn Component>>> {
        let ranged = self.children.ranged_value_at(position)?;
        Ok(RangedValue::new(
            self.entries[*ranged.value].component.clone(),
            ranged.range,
        ))
    }

    fn key_of(&self, component: &dyn Component) -> Option<ChildKey> {
        self.keys.get(&ComponentId::of(component)).copied()
    }

    fn index_of(&self, component: &dyn Component) -> Option<usize> {
        let key = self.key_of(component)?;
        Some(self.entries[key].index)
    }

    /// Inserts `component` at sequence position `index`, connects its slot
    /// and returns the flat range it now occupies.
    fn insert_child(
        &mut self,
        index: usize,
        component: Arc<dyn Component>,
        group: Weak<GroupShared>,
    ) -> Result<Range> {
        let id = ComponentId::of(&*component);
        if self.keys.contains_key(&id) {
            return Err(Error::DuplicateComponent { component: id });
        }
        let len = self.children.len();
        if index > len {
            return Err(Error::out_of_range(index, len));
        }
        let start = if index < len {
            self.children.get(index)?.range.lower
        } else {
            self.children.span().upper
        };
        let count = component.count();

        for entry in self.entries.values_mut() {
            if entry.index >= index {
                entry.index += 1;
            }
        }
        let key = self.entries.insert_with_key(|key| ChildEntry {
            connection: connect_child(&*component, group, key),
            component,
            index,
        });
        self.children.add(index, key, count)?;
        self.keys.insert(id, key);
        Ok(Range::with_size(start, count))
    }

    /// Removes the child at `index`, disconnects its slot and returns it
    /// with the flat range it occupied.
    fn remove_index(&mut self, index: usize) -> Result<(Arc<dyn Component>, Range)> {
        let removed = self.children.remove(index)?;
        let Some(entry) = self.entries.remove(removed.value) else {
            return Err(Error::ComponentNotFound);
        };
        self.keys.remove(&ComponentId::of(&*entry.component));
        for other in self.entries.values_mut() {
            if other.index > index {
                other.index -= 1;
            }
        }
        entry.component.signals().data.disconnect(entry.connection);
        Ok((entry.component, removed.range))
    }
}

struct GroupShared {
    state: RwLock<GroupState>,
    signals: ComponentSignals,
    group_signals: GroupSignals,
}

impl GroupShared {
    /// Translates a change reported by the child behind `key`.
    fn on_child_change(&self, key: ChildKey, change: DataChange) {
        let translated = {
            let mut state = self.state.write();
            let Some(entry) = state.entries.get(key) else {
                // Removed while a dispatch to this slot was in flight.
                return;
            };
            let index = entry.index;
            let new_size = entry.component.count();
            let old_range = match state.children.set(index, key, new_size) {
                Ok(old) => old.range,
                Err(error) => {
                    tracing::error!(target: targets::GROUP, %error, index, "child index out of sync");
                    return;
                }
            };
            translate_child_change(change, old_range, new_size)
        };

        tracing::trace!(target: targets::GROUP, ?change, ?translated, "translated child change");
        for change in translated {
            self.signals.data.emit(change);
        }
    }
}

impl Drop for GroupShared {
    fn drop(&mut self) {
        for entry in self.state.get_mut().entries.values() {
            entry.component.signals().data.disconnect(entry.connection);
        }
    }
}

/// Translates a child's local change into the parent's coordinates.
///
/// `old_range` is where the child sat before the change and `new_size` its
/// count after. A whole-child change is normalized into a changed range
/// covering what both sizes share, followed by an insertion or removal of
/// the difference.
pub(crate) fn translate_child_change(
    change: DataChange,
    old_range: Range,
    new_size: usize,
) -> Vec<DataChange> {
    let lower = old_range.lower;
    let old_size = old_range.size();
    match change {
        DataChange::Changed if new_size == old_size => {
            vec![DataChange::RangeChanged {
                start: lower,
                count: new_size,
            }]
        }
        DataChange::Changed if new_size > old_size => vec![
            DataChange::RangeChanged {
                start: lower,
                count: old_size,
            },
            DataChange::RangeInserted {
                start: lower + old_size,
                count: new_size - old_size,
            },
        ],
        DataChange::Changed => vec![
            DataChange::RangeChanged {
                start: lower,
                count: new_size,
            },
            DataChange::RangeRemoved {
                start: lower + new_size,
                count: old_size - new_size,
            },
        ],
        other => vec![other.offset(lower)],
    }
}

/// A component made of ordered child components.
///
/// See the [module documentation](self) for an overview.
pub struct ComponentGroup {
    shared: Arc<GroupShared>,
}

impl Default for ComponentGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ComponentGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.read();
        f.debug_struct("ComponentGroup")
            .field("children", &state.children.len())
            .field("count", &state.children.span().upper)
            .finish()
    }
}

impl ComponentGroup {
    /// Creates an empty group.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(GroupShared {
                state: RwLock::new(GroupState::default()),
                signals: ComponentSignals::new(),
                group_signals: GroupSignals::new(),
            }),
        }
    }

    /// The group's membership signals.
    pub fn group_signals(&self) -> &GroupSignals {
        &self.shared.group_signals
    }

    /// Registers `observer` for membership changes.
    pub fn register_group_observer(&self, observer: Arc<dyn ComponentGroupObserver>) -> ConnectionId {
        self.shared
            .group_signals
            .structure
            .connect(move |change| change.dispatch(&*observer))
    }

    /// Removes an observer registered with
    /// [`register_group_observer`](Self::register_group_observer).
    pub fn unregister_group_observer(&self, id: ConnectionId) -> Result<()> {
        self.shared.group_signals.structure.try_disconnect(id)?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Membership
    // -------------------------------------------------------------------------

    /// Appends `component` to the group.
    pub fn add_component(&self, component: Arc<dyn Component>) -> Result<()> {
        let index = self.len();
        self.add_component_at(index, component)
    }

    /// Inserts `component` at sequence position `index`.
    ///
    /// Emits `RangeInserted` for the component's items, then the structural
    /// `Changed`.
    ///
    /// # Errors
    ///
    /// - [`Error::CyclicMembership`] if `component` is this group or contains it.
    /// - [`Error::DuplicateComponent`] if `component` is already a member.
    /// - [`Error::IndexOutOfRange`] if `index > len()`.
    pub fn add_component_at(&self, index: usize, component: Arc<dyn Component>) -> Result<()> {
        self.check_acyclic(&*component)?;
        let id = ComponentId::of(&*component);
        let range = self
            .shared
            .state
            .write()
            .insert_child(index, component, Arc::downgrade(&self.shared))?;
        self.announce_added(id, index, range);
        Ok(())
    }

    /// Appends every component in order.
    ///
    /// Stops at the first failure; components before it stay added.
    pub fn add_all<I>(&self, components: I) -> Result<()>
    where
        I: IntoIterator<Item = Arc<dyn Component>>,
    {
        let _span = PerfSpan::new("ComponentGroup::add_all");
        for component in components {
            self.add_component(component)?;
        }
        Ok(())
    }

    /// Replaces the child at `index` with `component`.
    ///
    /// Expressed as an insertion at `index` followed by the removal of the
    /// displaced child, so observers see both events. Returns the displaced
    /// child.
    pub fn replace_component(
        &self,
        index: usize,
        component: Arc<dyn Component>,
    ) -> Result<Arc<dyn Component>> {
        self.replace_where(|_| Ok(index), component)
    }

    /// Replaces the member `old` with `component`, in place.
    ///
    /// # Errors
    ///
    /// - [`Error::ComponentNotFound`] if `old` is not a member.
    /// - [`Error::DuplicateComponent`] if `component` already is.
    pub fn replace(
        &self,
        old: &dyn Component,
        component: Arc<dyn Component>,
    ) -> Result<Arc<dyn Component>> {
        self.replace_where(
            |state| state.index_of(old).ok_or(Error::ComponentNotFound),
            component,
        )
    }

    /// Resolves the target index and swaps in `component` under one write
    /// guard, so concurrent membership changes cannot shift the target.
    fn replace_where(
        &self,
        locate: impl FnOnce(&GroupState) -> Result<usize>,
        component: Arc<dyn Component>,
    ) -> Result<Arc<dyn Component>> {
        self.check_acyclic(&*component)?;
        let id = ComponentId::of(&*component);
        let (index, inserted, displaced, removed) = {
            let mut state = self.shared.state.write();
            let index = locate(&*state)?;
            if state.keys.contains_key(&id) {
                return Err(Error::DuplicateComponent { component: id });
            }
            check_index(index, state.children.len())?;
            let inserted = state.insert_child(index, component, Arc::downgrade(&self.shared))?;
            let (displaced, removed) = state.remove_index(index + 1)?;
            (index, inserted, displaced, removed)
        };

        self.announce_added(id, index, inserted);
        self.announce_removed(displaced.clone(), index + 1, removed);
        Ok(displaced)
    }

    /// Removes and returns the child at `index`.
    ///
    /// Emits `RangeRemoved` for the child's former range, then the
    /// structural `ComponentRemoved`.
    pub fn remove_at(&self, index: usize) -> Result<Arc<dyn Component>> {
        let (component, range) = self.shared.state.write().remove_index(index)?;
        self.announce_removed(component.clone(), index, range);
        Ok(component)
    }

    /// Removes `component` if it is a member. Returns whether it was.
    pub fn remove(&self, component: &dyn Component) -> bool {
        let removed = {
            let mut state = self.shared.state.write();
            let index = state.index_of(component);
            index.and_then(|index| state.remove_index(index).ok().map(|removed| (index, removed)))
        };
        match removed {
            Some((index, (component, range))) => {
                self.announce_removed(component, index, range);
                true
            }
            None => false,
        }
    }

    /// Rejects `component` if it is this group or has it somewhere below.
    fn check_acyclic(&self, component: &dyn Component) -> Result<()> {
        let own = ComponentId::of(self);
        let id = ComponentId::of(component);
        let reaches_self = id == own
            || component
                .as_group()
                .is_some_and(|group| group.find_offset_of(own).is_some());
        if reaches_self {
            return Err(Error::CyclicMembership { component: id });
        }
        Ok(())
    }

    fn announce_added(&self, id: ComponentId, index: usize, range: Range) {
        tracing::debug!(target: targets::GROUP, ?id, index, %range, "component added");
        self.shared
            .signals
            .notify_item_range_inserted(range.lower, range.size());
        self.shared.group_signals.structure.emit(GroupChange::Changed);
    }

    fn announce_removed(&self, component: Arc<dyn Component>, index: usize, range: Range) {
        tracing::debug!(
            target: targets::GROUP,
            id = ?ComponentId::of(&*component),
            index,
            %range,
            "component removed"
        );
        self.shared
            .signals
            .notify_item_range_removed(range.lower, range.size());
        self.shared
            .group_signals
            .structure
            .emit(GroupChange::ComponentRemoved(component));
    }

    /// Removes every child.
    ///
    /// Emits one structural `ComponentRemoved` per child, in order, then a
    /// single whole-group `Changed`.
    pub fn clear(&self) {
        let _span = PerfSpan::new("ComponentGroup::clear");
        let removed: Vec<ChildEntry> = {
            let mut state = self.shared.state.write();
            let order: Vec<ChildKey> = state.children.values().copied().collect();
            state.children.clear();
            state.keys.clear();
            let removed: Vec<ChildEntry> = order
                .into_iter()
                .filter_map(|key| state.entries.remove(key))
                .collect();
            state.entries.clear();
            removed
        };

        tracing::debug!(target: targets::GROUP, removed = removed.len(), "group cleared");
        for entry in removed {
            entry.component.signals().data.disconnect(entry.connection);
            self.shared
                .group_signals
                .structure
                .emit(GroupChange::ComponentRemoved(entry.component));
        }
        self.shared.signals.notify_data_changed();
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.shared.state.read().children.len()
    }

    /// Returns `true` if the group has no children.
    pub fn is_empty(&self) -> bool {
        self.shared.state.read().children.is_empty()
    }

    /// The child at sequence position `index`.
    pub fn get(&self, index: usize) -> Result<Arc<dyn Component>> {
        let state = self.shared.state.read();
        let (entry, _) = state.entry_at(index)?;
        Ok(entry.component.clone())
    }

    /// Returns `true` if `component` is a direct child.
    pub fn contains(&self, component: &dyn Component) -> bool {
        self.shared.state.read().key_of(component).is_some()
    }

    /// The sequence position of `component`, if it is a direct child.
    pub fn index_of(&self, component: &dyn Component) -> Option<usize> {
        self.shared.state.read().index_of(component)
    }

    /// The range `component` occupies in this group, if it is a direct child.
    pub fn range_of(&self, component: &dyn Component) -> Option<Range> {
        let state = self.shared.state.read();
        let key = state.key_of(component)?;
        let index = state.entries[key].index;
        state.children.get(index).ok().map(|ranged| ranged.range)
    }

    /// Snapshot of the direct children, in order.
    pub fn components(&self) -> Vec<Arc<dyn Component>> {
        self.ranged_components()
            .into_iter()
            .map(|ranged| ranged.value)
            .collect()
    }

    /// Snapshot of the direct children with their ranges, in order.
    pub fn ranged_components(&self) -> Vec<RangedValue<Arc<dyn Component>>> {
        let state = self.shared.state.read();
        state
            .children
            .iter()
            .map(|ranged| {
                RangedValue::new(state.entries[*ranged.value].component.clone(), ranged.range)
            })
            .collect()
    }

    /// The direct child covering flat `position`.
    pub fn component_at(&self, position: usize) -> Result<Arc<dyn Component>> {
        self.ranged_component_at(position).map(|ranged| ranged.value)
    }

    /// The direct child covering flat `position`, with its range.
    pub fn ranged_component_at(&self, position: usize) -> Result<RangedValue<Arc<dyn Component>>> {
        self.shared.state.read().ranged_component_at(position)
    }

    /// The deepest non-group component covering flat `position`.
    pub fn find_component_with_index(&self, position: usize) -> Result<Arc<dyn Component>> {
        self.find_ranged_component_with_index(position)
            .map(|ranged| ranged.value)
    }

    /// The deepest non-group component covering flat `position`, with its
    /// range in this group's coordinates.
    pub fn find_ranged_component_with_index(
        &self,
        position: usize,
    ) -> Result<RangedValue<Arc<dyn Component>>> {
        let ranged = self.ranged_component_at(position)?;
        let Some(group) = ranged.value.as_group() else {
            return Ok(ranged);
        };
        let lower = ranged.range.lower;
        let inner = group.find_ranged_component_with_index(position - lower)?;
        Ok(RangedValue::new(inner.value, inner.range.offset(lower)))
    }

    /// The offset of `target` in this group's coordinates, searching the
    /// whole subtree depth-first. `None` if `target` is not reachable.
    pub fn find_component_offset(&self, target: &dyn Component) -> Option<usize> {
        let target = ComponentId::of(target);
        self.find_offset_of(target)
    }

    fn find_offset_of(&self, target: ComponentId) -> Option<usize> {
        for ranged in self.ranged_components() {
            if ComponentId::of(&*ranged.value) == target {
                return Some(ranged.range.lower);
            }
            if let Some(offset) = ranged
                .value
                .as_group()
                .and_then(|group| group.find_offset_of(target))
            {
                return Some(ranged.range.lower + offset);
            }
        }
        None
    }
}

/// Connects the per-child slot that forwards `component`'s changes to the
/// group behind `group`.
fn connect_child(component: &dyn Component, group: Weak<GroupShared>, key: ChildKey) -> ConnectionId {
    component.signals().data.connect(move |change| {
        if let Some(group) = group.upgrade() {
            group.on_child_change(key, *change);
        }
    })
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn lcm(a: usize, b: usize) -> usize {
    a / gcd(a, b) * b
}

impl Component for ComponentGroup {
    fn count(&self) -> usize {
        self.shared.state.read().children.span().upper
    }

    fn presenter(&self, position: usize) -> Result<Option<Presenter>> {
        let ranged = self.ranged_component_at(position)?;
        ranged.value.presenter(position - ranged.range.lower)
    }

    fn item(&self, position: usize) -> Result<Option<Item>> {
        let ranged = self.ranged_component_at(position)?;
        ranged.value.item(position - ranged.range.lower)
    }

    fn holder_type(&self, position: usize) -> Result<HolderType> {
        let ranged = self.ranged_component_at(position)?;
        ranged.value.holder_type(position - ranged.range.lower)
    }

    fn signals(&self) -> &ComponentSignals {
        &self.shared.signals
    }

    /// The least common multiple of the children's lane counts, so one grid
    /// can give every child a whole number of lanes per child lane.
    fn number_lanes(&self) -> Result<usize> {
        let mut lanes = 1;
        for component in self.components() {
            let child_lanes = component.number_lanes()?;
            if child_lanes < 1 {
                return Err(Error::InvalidLaneCount { lanes: child_lanes });
            }
            lanes = lcm(lanes, child_lanes);
        }
        Ok(lanes)
    }

    fn span_size(&self, position: usize) -> Result<usize> {
        let lanes = self.number_lanes()?;
        let ranged = self.ranged_component_at(position)?;
        let child_lanes = ranged.value.number_lanes()?;
        let child_span = ranged.value.span_size(position - ranged.range.lower)?;
        Ok(child_span * (lanes / child_lanes))
    }

    fn on_item_visible(&self, position: usize) -> Result<()> {
        let ranged = self.ranged_component_at(position)?;
        ranged.value.on_item_visible(position - ranged.range.lower)
    }

    fn on_item_not_visible(&self, position: usize) -> Result<()> {
        let ranged = self.ranged_component_at(position)?;
        ranged.value.on_item_not_visible(position - ranged.range.lower)
    }

    fn on_item_at_top(&self, position: usize) -> Result<()> {
        let ranged = self.ranged_component_at(position)?;
        ranged.value.on_item_at_top(position - ranged.range.lower)
    }

    fn can_pick_up_item(&self, position: usize) -> Result<bool> {
        let ranged = self.ranged_component_at(position)?;
        ranged.value.can_pick_up_item(position - ranged.range.lower)
    }

    /// Drops are only allowed within the child the item came from.
    fn can_drop_item(&self, from: usize, to: usize) -> Result<bool> {
        let source = self.ranged_component_at(from)?;
        let target = self.ranged_component_at(to)?;
        if source.range != target.range {
            return Ok(false);
        }
        let lower = source.range.lower;
        source.value.can_drop_item(from - lower, to - lower)
    }

    fn on_items_moved(&self, from: usize, to: usize) -> Result<()> {
        let source = self.ranged_component_at(from)?;
        let target = self.ranged_component_at(to)?;
        if source.range != target.range {
            tracing::warn!(target: targets::GROUP, from, to, "ignoring move across components");
            return Ok(());
        }
        let lower = source.range.lower;
        source.value.on_items_moved(from - lower, to - lower)
    }

    fn as_group(&self) -> Option<&ComponentGroup> {
        Some(self)
    }
}

static_assertions::assert_impl_all!(ComponentGroup: Send, Sync);
