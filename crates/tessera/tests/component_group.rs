//! Integration tests for component groups.

use std::sync::Arc;

use parking_lot::Mutex;
use tessera::prelude::*;
use tessera::{ComponentSignals, Item, Presenter, check_index};

struct Row;

type Leaf = ListComponent<(), usize>;

fn leaf(count: usize) -> Arc<Leaf> {
    Arc::new(Leaf::new(HolderType::of::<Row>()).with_data(0..count))
}

fn record(component: &dyn Component) -> Arc<Mutex<Vec<DataChange>>> {
    let received = Arc::new(Mutex::new(Vec::new()));
    let recorder = received.clone();
    component
        .signals()
        .data
        .connect(move |change| recorder.lock().push(*change));
    received
}

fn take(received: &Mutex<Vec<DataChange>>) -> Vec<DataChange> {
    std::mem::take(&mut *received.lock())
}

#[derive(Default)]
struct StructureLog(Mutex<Vec<String>>);

impl ComponentGroupObserver for StructureLog {
    fn on_changed(&self) {
        self.0.lock().push("changed".into());
    }

    fn on_component_removed(&self, component: &Arc<dyn Component>) {
        self.0.lock().push(format!("removed {}", component.count()));
    }
}

/// A leaf that records visibility hooks and accepts drops anywhere.
struct HookRecorder {
    count: usize,
    calls: Mutex<Vec<String>>,
    signals: ComponentSignals,
}

impl HookRecorder {
    fn new(count: usize) -> Arc<Self> {
        Arc::new(Self {
            count,
            calls: Mutex::new(Vec::new()),
            signals: ComponentSignals::new(),
        })
    }
}

impl Component for HookRecorder {
    fn count(&self) -> usize {
        self.count
    }

    fn presenter(&self, index: usize) -> tessera::Result<Option<Presenter>> {
        check_index(index, self.count)?;
        Ok(Some(Arc::new("recorder")))
    }

    fn item(&self, index: usize) -> tessera::Result<Option<Item>> {
        check_index(index, self.count)?;
        Ok(Some(Arc::new(index * 100)))
    }

    fn holder_type(&self, index: usize) -> tessera::Result<HolderType> {
        check_index(index, self.count)?;
        Ok(HolderType::of::<HookRecorder>())
    }

    fn signals(&self) -> &ComponentSignals {
        &self.signals
    }

    fn on_item_visible(&self, index: usize) -> tessera::Result<()> {
        self.calls.lock().push(format!("visible {index}"));
        Ok(())
    }

    fn on_item_not_visible(&self, index: usize) -> tessera::Result<()> {
        self.calls.lock().push(format!("hidden {index}"));
        Ok(())
    }

    fn on_item_at_top(&self, index: usize) -> tessera::Result<()> {
        self.calls.lock().push(format!("top {index}"));
        Ok(())
    }

    fn can_pick_up_item(&self, _index: usize) -> tessera::Result<bool> {
        Ok(true)
    }

    fn on_items_moved(&self, from: usize, to: usize) -> tessera::Result<()> {
        self.calls.lock().push(format!("moved {from} {to}"));
        Ok(())
    }
}

#[test]
fn test_add_resize_remove_scenario() {
    let group = ComponentGroup::new();
    let received = record(&group);
    let a = leaf(3);
    let b = leaf(2);

    group.add_component_at(0, a.clone()).unwrap();
    assert_eq!(group.count(), 3);
    assert_eq!(take(&received), vec![DataChange::RangeInserted { start: 0, count: 3 }]);

    group.add_component_at(0, b.clone()).unwrap();
    assert_eq!(group.count(), 5);
    assert_eq!(group.range_of(&*a), Some(Range::new(2, 5)));
    assert_eq!(group.range_of(&*b), Some(Range::new(0, 2)));
    assert_eq!(take(&received), vec![DataChange::RangeInserted { start: 0, count: 2 }]);

    a.set_data(0..5);
    assert_eq!(group.count(), 8);
    assert_eq!(
        take(&received),
        vec![
            DataChange::RangeChanged { start: 2, count: 3 },
            DataChange::RangeInserted { start: 5, count: 2 },
        ]
    );

    assert!(group.remove(&*b));
    assert_eq!(group.count(), 5);
    assert_eq!(group.range_of(&*a), Some(Range::new(0, 5)));
    assert_eq!(take(&received), vec![DataChange::RangeRemoved { start: 0, count: 2 }]);
}

#[test]
fn test_whole_change_normalization() {
    let group = ComponentGroup::new();
    group.add_component(leaf(1)).unwrap();
    let child = leaf(4);
    group.add_component(child.clone()).unwrap();
    group.add_component(leaf(2)).unwrap();
    let received = record(&group);

    child.set_data(10..14);
    assert_eq!(take(&received), vec![DataChange::RangeChanged { start: 1, count: 4 }]);

    child.set_data(0..1);
    assert_eq!(
        take(&received),
        vec![
            DataChange::RangeChanged { start: 1, count: 1 },
            DataChange::RangeRemoved { start: 2, count: 3 },
        ]
    );
    assert_eq!(group.count(), 4);

    child.set_data(0..0);
    child.set_data(0..2);
    assert_eq!(
        take(&received),
        vec![
            DataChange::RangeChanged { start: 1, count: 0 },
            DataChange::RangeRemoved { start: 1, count: 1 },
            DataChange::RangeChanged { start: 1, count: 0 },
            DataChange::RangeInserted { start: 1, count: 2 },
        ]
    );
    assert_eq!(group.count(), 5);
}

#[test]
fn test_granular_child_changes_are_shifted() {
    let group = ComponentGroup::new();
    group.add_component(leaf(2)).unwrap();
    let child = leaf(3);
    group.add_component(child.clone()).unwrap();
    let received = record(&group);

    child.append_data([7, 8]);
    assert!(child.remove_data(&1));
    child.set_reorderable(true);
    child.on_items_moved(0, 2).unwrap();
    child.signals().notify_item_range_changed(1, 2);

    assert_eq!(
        take(&received),
        vec![
            DataChange::RangeInserted { start: 5, count: 2 },
            DataChange::RangeRemoved { start: 3, count: 1 },
            DataChange::Moved { from: 2, to: 4 },
            DataChange::RangeChanged { start: 3, count: 2 },
        ]
    );
    assert_eq!(group.count(), 6);
    assert_eq!(group.range_of(&*child), Some(Range::new(2, 6)));
}

#[test]
fn test_item_queries_delegate_with_local_index() {
    let group = ComponentGroup::new();
    let first = leaf(2);
    let recorder = HookRecorder::new(3);
    group.add_component(first.clone()).unwrap();
    group.add_component(recorder.clone()).unwrap();

    for position in 0..group.count() {
        let child = group.component_at(position).unwrap();
        let lower = group.range_of(&*child).unwrap().lower;
        let expected = child.item(position - lower).unwrap().unwrap();
        let actual = group.item(position).unwrap().unwrap();
        assert_eq!(expected.downcast_ref::<usize>(), actual.downcast_ref::<usize>());
        assert_eq!(
            group.holder_type(position).unwrap(),
            child.holder_type(position - lower).unwrap()
        );
    }

    let item = group.item(3).unwrap().unwrap();
    assert_eq!(item.downcast_ref::<usize>(), Some(&100));
    let item = group.item(1).unwrap().unwrap();
    assert_eq!(item.downcast_ref::<usize>(), Some(&1));
    assert!(group.presenter(0).unwrap().is_none());
    let presenter = group.presenter(4).unwrap().unwrap();
    assert_eq!(presenter.downcast_ref::<&str>(), Some(&"recorder"));
    assert!(group.holder_type(2).unwrap().is::<HookRecorder>());
    assert_eq!(
        group.item(5).err(),
        Some(Error::IndexOutOfRange { index: 5, len: 5 })
    );
}

#[test]
fn test_hooks_forward_to_owning_child() {
    let group = ComponentGroup::new();
    let before = HookRecorder::new(2);
    let after = HookRecorder::new(3);
    group.add_component(before.clone()).unwrap();
    group.add_component(after.clone()).unwrap();

    group.on_item_visible(3).unwrap();
    group.on_item_not_visible(1).unwrap();
    group.on_item_at_top(2).unwrap();
    assert!(group.can_pick_up_item(4).unwrap());

    assert!(group.can_drop_item(2, 4).unwrap());
    assert!(!group.can_drop_item(1, 2).unwrap());
    group.on_items_moved(4, 2).unwrap();
    group.on_items_moved(0, 3).unwrap();

    assert_eq!(*before.calls.lock(), vec!["hidden 1"]);
    assert_eq!(*after.calls.lock(), vec!["visible 1", "top 0", "moved 2 0"]);
    assert!(group.on_item_visible(5).is_err());
}

#[test]
fn test_removal_decrements_later_indices() {
    let group = ComponentGroup::new();
    let children: Vec<Arc<Leaf>> = (1..=5).map(leaf).collect();
    for child in &children {
        group.add_component(child.clone()).unwrap();
    }

    group.remove_at(1).unwrap();

    assert_eq!(group.index_of(&*children[0]), Some(0));
    assert_eq!(group.index_of(&*children[1]), None);
    assert_eq!(group.index_of(&*children[2]), Some(1));
    assert_eq!(group.index_of(&*children[3]), Some(2));
    assert_eq!(group.index_of(&*children[4]), Some(3));
    assert_eq!(group.range_of(&*children[2]), Some(Range::new(1, 4)));

    // Removed children no longer reach the group.
    let received = record(&group);
    children[1].append_data([9]);
    assert!(take(&received).is_empty());
    assert!(!group.remove(&*children[1]));
}

#[test]
fn test_duplicate_and_out_of_range_additions() {
    let group = ComponentGroup::new();
    let child = leaf(1);
    group.add_component(child.clone()).unwrap();

    assert!(matches!(
        group.add_component(child.clone()),
        Err(Error::DuplicateComponent { .. })
    ));
    assert_eq!(
        group.add_component_at(3, leaf(1)),
        Err(Error::IndexOutOfRange { index: 3, len: 1 })
    );
    assert_eq!(group.len(), 1);
    assert!(group.contains(&*child));
    assert!(!group.contains(&*leaf(1)));
}

#[test]
fn test_replace_emits_insert_then_remove() {
    let group = ComponentGroup::new();
    let old = leaf(2);
    group.add_component(leaf(1)).unwrap();
    group.add_component(old.clone()).unwrap();
    let received = record(&group);
    let structure = Arc::new(StructureLog::default());
    group.register_group_observer(structure.clone());

    let replacement = leaf(3);
    let displaced = group.replace_component(1, replacement.clone()).unwrap();

    assert!(Arc::ptr_eq(&displaced, &(old.clone() as Arc<dyn Component>)));
    assert_eq!(
        take(&received),
        vec![
            DataChange::RangeInserted { start: 1, count: 3 },
            DataChange::RangeRemoved { start: 4, count: 2 },
        ]
    );
    assert_eq!(*structure.0.lock(), vec!["changed", "removed 2"]);
    assert_eq!(group.index_of(&*replacement), Some(1));
    assert_eq!(group.count(), 4);

    assert!(matches!(
        group.replace_component(0, replacement.clone()),
        Err(Error::DuplicateComponent { .. })
    ));
    assert_eq!(group.replace(&*old, leaf(1)).err(), Some(Error::ComponentNotFound));
    group.replace(&*replacement, old.clone()).unwrap();
    assert_eq!(group.count(), 3);
}

#[test]
fn test_clear_reports_each_removal_then_whole_change() {
    let group = ComponentGroup::new();
    let children = [leaf(1), leaf(2), leaf(3)];
    for child in &children {
        group.add_component(child.clone()).unwrap();
    }
    let received = record(&group);
    let structure = Arc::new(StructureLog::default());
    let id = group.register_group_observer(structure.clone());

    group.clear();

    assert!(group.is_empty());
    assert_eq!(group.count(), 0);
    assert_eq!(take(&received), vec![DataChange::Changed]);
    assert_eq!(*structure.0.lock(), vec!["removed 1", "removed 2", "removed 3"]);

    children[0].append_data([4]);
    assert!(take(&received).is_empty());

    group.unregister_group_observer(id).unwrap();
    assert!(group.unregister_group_observer(id).is_err());
}

#[test]
fn test_nested_changes_reach_the_root() {
    let root = ComponentGroup::new();
    let middle = Arc::new(ComponentGroup::new());
    let inner = Arc::new(ComponentGroup::new());
    let deep = leaf(2);

    root.add_component(leaf(4)).unwrap();
    root.add_component(middle.clone()).unwrap();
    middle.add_component(leaf(3)).unwrap();
    middle.add_component(inner.clone()).unwrap();
    inner.add_component(leaf(1)).unwrap();
    inner.add_component(deep.clone()).unwrap();
    assert_eq!(root.count(), 10);

    let received = record(&root);
    deep.append_data([5, 6]);
    assert_eq!(
        take(&received),
        vec![DataChange::RangeInserted { start: 10, count: 2 }]
    );
    assert_eq!(root.count(), 12);

    assert_eq!(root.find_component_offset(&*deep), Some(8));
    assert_eq!(root.find_component_offset(&*inner), Some(7));
    assert_eq!(root.find_component_offset(&*leaf(1)), None);

    let found = root.find_ranged_component_with_index(9).unwrap();
    assert!(Arc::ptr_eq(&found.value, &(deep.clone() as Arc<dyn Component>)));
    assert_eq!(found.range, Range::new(8, 12));
    assert!(root.find_component_with_index(12).is_err());
    let direct = root.component_at(9).unwrap();
    assert!(direct.as_group().is_some());
}

#[test]
fn test_lanes_and_spans() {
    let group = ComponentGroup::new();
    assert_eq!(group.number_lanes(), Ok(1));

    let pair = Arc::new(Leaf::new(HolderType::of::<Row>()).with_lanes(2).with_data(0..2));
    let triple = Arc::new(Leaf::new(HolderType::of::<Row>()).with_lanes(3).with_data(0..3));
    group.add_component(pair).unwrap();
    group.add_component(triple).unwrap();

    assert_eq!(group.number_lanes(), Ok(6));
    assert_eq!(group.span_size(0), Ok(3));
    assert_eq!(group.span_size(2), Ok(2));

    let broken = Arc::new(Leaf::new(HolderType::of::<Row>()).with_lanes(0).with_data(0..1));
    group.add_component(broken).unwrap();
    assert_eq!(group.number_lanes(), Err(Error::InvalidLaneCount { lanes: 0 }));
}

#[test]
fn test_observer_registration() {
    #[derive(Default)]
    struct Counter(Mutex<usize>);

    impl ComponentDataObserver for Counter {
        fn on_item_range_inserted(&self, _start: usize, count: usize) {
            *self.0.lock() += count;
        }
    }

    let group = ComponentGroup::new();
    let counter = Arc::new(Counter::default());
    let id = register_data_observer(&group, counter.clone());

    let children: Vec<Arc<dyn Component>> = vec![leaf(2), leaf(3)];
    group.add_all(children).unwrap();
    assert_eq!(*counter.0.lock(), 5);

    unregister_data_observer(&group, id).unwrap();
    group.add_component(leaf(4)).unwrap();
    assert_eq!(*counter.0.lock(), 5);
}

#[test]
fn test_observer_may_query_group_during_dispatch() {
    let group = Arc::new(ComponentGroup::new());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    let weak = Arc::downgrade(&group);
    group.signals().data.connect(move |_| {
        if let Some(group) = weak.upgrade() {
            seen_clone.lock().push(group.count());
        }
    });

    let child = leaf(2);
    group.add_component(child.clone()).unwrap();
    child.append_data([3]);

    assert_eq!(*seen.lock(), vec![2, 3]);
}

#[test]
fn test_dropping_group_detaches_children() {
    let child = leaf(1);
    {
        let group = ComponentGroup::new();
        group.add_component(child.clone()).unwrap();
        assert_eq!(child.signals().data.connection_count(), 1);
    }
    assert_eq!(child.signals().data.connection_count(), 0);
    child.append_data([1]);
}

#[test]
fn test_identity_removal_is_atomic_under_concurrent_inserts() {
    for _ in 0..200 {
        let group = ComponentGroup::new();
        let first = leaf(1);
        let target = leaf(2);
        group.add_component(first.clone()).unwrap();
        group.add_component(target.clone()).unwrap();

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..20 {
                    group.add_component_at(0, leaf(1)).unwrap();
                }
            });
            assert!(group.remove(&*target));
        });

        assert!(!group.contains(&*target));
        assert!(group.contains(&*first));
        assert_eq!(group.len(), 21);
        assert_eq!(group.count(), 21);
    }
}

#[test]
fn test_replace_by_identity_is_atomic_under_concurrent_inserts() {
    for _ in 0..200 {
        let group = ComponentGroup::new();
        let first = leaf(1);
        let old = leaf(2);
        let replacement = leaf(3);
        group.add_component(first.clone()).unwrap();
        group.add_component(old.clone()).unwrap();

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..20 {
                    group.add_component_at(0, leaf(1)).unwrap();
                }
            });
            let displaced = group.replace(&*old, replacement.clone()).unwrap();
            assert!(Arc::ptr_eq(&displaced, &(old.clone() as Arc<dyn Component>)));
        });

        assert!(!group.contains(&*old));
        assert!(group.contains(&*first));
        assert_eq!(group.index_of(&*replacement), Some(group.index_of(&*first).unwrap() + 1));
        assert_eq!(group.count(), 24);
    }
}

#[test]
fn test_cyclic_membership_is_rejected() {
    let root = Arc::new(ComponentGroup::new());
    let middle = Arc::new(ComponentGroup::new());
    let inner = Arc::new(ComponentGroup::new());
    root.add_component(middle.clone()).unwrap();
    middle.add_component(inner.clone()).unwrap();

    let root_dyn: Arc<dyn Component> = root.clone();
    assert!(matches!(
        root.add_component(root_dyn.clone()),
        Err(Error::CyclicMembership { .. })
    ));
    assert!(matches!(
        inner.add_component(root_dyn.clone()),
        Err(Error::CyclicMembership { .. })
    ));
    assert!(matches!(
        inner.add_component(middle.clone()),
        Err(Error::CyclicMembership { .. })
    ));
    inner.add_component(leaf(2)).unwrap();
    assert!(matches!(
        inner.replace_component(0, root_dyn),
        Err(Error::CyclicMembership { .. })
    ));

    assert_eq!(inner.len(), 1);
    assert_eq!(root.count(), 2);

    // Siblings are not ancestors.
    let sibling = Arc::new(ComponentGroup::new());
    root.add_component(sibling.clone()).unwrap();
    sibling.add_component(leaf(1)).unwrap();
    assert_eq!(root.count(), 3);
}
