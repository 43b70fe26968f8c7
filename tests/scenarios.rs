// =====================================================================
// File: tests/scenarios.rs
//
// Description:
//   End-to-end scenarios covering each facade's core workflow.
// =====================================================================
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use ordered_containers::{OrderedMap, OrderedMultiMap, OrderedMultiSet, OrderedSet};

#[test]
fn set_unique_insert() {
    let mut set: OrderedSet<i32> = OrderedSet::new();
    assert!(set.insert(123));
    assert!(set.insert(456));
    let second = set.insert(123);
    assert!(!second);
    assert!(set.insert(100));

    assert_eq!(set.len(), 3);
    let traversal: Vec<_> = set.iter().copied().collect();
    assert_eq!(traversal, vec![100, 123, 456]);

    let cursor = set.find(&123);
    assert_eq!(*set.get_key(&cursor), 123);

    assert_eq!(set.erase(&999), 0);
    assert_eq!(set.len(), 3);
}

#[test]
fn multiset_allows_duplicates() {
    let mut ms: OrderedMultiSet<i32> = OrderedMultiSet::new();
    ms.insert(123);
    ms.insert(123);
    assert_eq!(ms.len(), 2);

    assert_ne!(ms.lower_bound(&123), ms.upper_bound(&123));
    assert_eq!(ms.erase(&123), 2);
    assert!(ms.is_empty());
}

#[test]
fn map_bounds() {
    let mut map: OrderedMap<i32, i32> = OrderedMap::new();
    map.insert(1, 0);
    map.insert(100, 1);
    map.insert(123, 321);
    map.insert(456, 654);

    let lb = map.lower_bound(&100);
    assert_eq!(map.get_at(&lb), (&100, &1));

    let ub = map.upper_bound(&100);
    assert_eq!(map.get_at(&ub), (&123, &321));

    assert_eq!(map.lower_bound(&500), map.end());
    assert_eq!(map.upper_bound(&500), map.end());

    assert_eq!(map.erase(&500), 0);
    assert_eq!(map.len(), 4);
}

#[test]
fn map_default_on_index() {
    let mut map: OrderedMap<i32, i32> = OrderedMap::new();
    let _ = map.get_or_default(1);
    assert_eq!(map.len(), 1);
    let traversal: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(traversal, vec![(1, 0)]);
}

#[test]
fn map_remove_by_cursor_returns_successor() {
    let mut map: OrderedMap<i32, i32> = OrderedMap::new();
    map.insert(1, 0);
    map.insert(100, 1);
    map.insert(101, 3);
    map.insert(123, 321);
    map.insert(456, 654);

    let cursor = map.find(&101);
    let (removed, successor) = map.remove_at(cursor);
    assert_eq!(removed, (101, 3));
    assert_eq!(map.get_at(&successor), (&123, &321));
    assert_eq!(map.len(), 4);
}

#[test]
fn set_orders_composite_tuple_keys_lexicographically() {
    let mut set: OrderedSet<(i32, &'static str, i32)> = OrderedSet::new();
    set.insert((2, "a", 0));
    set.insert((1, "b", 5));
    set.insert((1, "a", 9));
    set.insert((1, "a", 1));

    let traversal: Vec<_> = set.iter().copied().collect();
    assert_eq!(traversal, vec![(1, "a", 1), (1, "a", 9), (1, "b", 5), (2, "a", 0)]);
}

#[test]
fn multiset_remove_at_successor_stays_within_duplicate_run() {
    let mut ms: OrderedMultiSet<i32> = OrderedMultiSet::new();
    ms.insert(1);
    ms.insert(1);
    ms.insert(1);
    ms.insert(2);

    // Remove the middle occurrence of the duplicate run; the successor
    // must be the remaining occurrence of the same key, not the next
    // distinct key (upper_bound(1) would wrongly land on 2).
    let cursor = ms.advance(ms.find(&1));
    let (removed, succ) = ms.remove_at(cursor);
    assert_eq!(removed, 1);
    assert_eq!(*ms.get_key(&succ), 1);
    assert_eq!(ms.count(&1), 2);
}

/// A foreign-reference stand-in: increments a shared per-object counter on
/// clone, decrements on drop. Used to audit reference-count balance
/// across a mixed insert/overwrite/delete workload.
struct ForeignRef {
    id: i64,
    counters: Rc<RefCell<HashMap<i64, i64>>>,
}

impl ForeignRef {
    fn new(id: i64, counters: &Rc<RefCell<HashMap<i64, i64>>>) -> Self {
        *counters.borrow_mut().entry(id).or_insert(0) += 1;
        ForeignRef { id, counters: Rc::clone(counters) }
    }
}

impl Clone for ForeignRef {
    fn clone(&self) -> Self {
        *self.counters.borrow_mut().entry(self.id).or_insert(0) += 1;
        ForeignRef { id: self.id, counters: Rc::clone(&self.counters) }
    }
}

impl Drop for ForeignRef {
    fn drop(&mut self) {
        *self.counters.borrow_mut().entry(self.id).or_insert(0) -= 1;
    }
}

#[test]
fn reference_balance_across_mixed_workload() {
    let counters: Rc<RefCell<HashMap<i64, i64>>> = Rc::new(RefCell::new(HashMap::new()));
    let mut mm: OrderedMultiMap<i64, ForeignRef> = OrderedMultiMap::new();

    for round in 0..100 {
        for pair in 0..10 {
            let key = 100_000 + pair;
            let value = ForeignRef::new(200_000 + pair, &counters);
            mm.insert(key, value);
            if round % 3 == 0 {
                // overwrite-flavored churn: remove one occurrence back out
                let cursor = mm.find(&key);
                if cursor != mm.end() {
                    mm.remove_at(cursor);
                }
            }
        }
    }

    mm.clear();
    drop(mm);

    for (&_id, &net) in counters.borrow().iter() {
        assert_eq!(net, 0, "reference balance must return to zero after clear");
    }
}

