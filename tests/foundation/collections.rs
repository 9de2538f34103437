//! Ordered persistent map behaviour.

use yangforge::foundation::OrderedMap;

#[test]
fn ordered_map_keeps_declaration_order() {
    let map = OrderedMap::new()
        .insert("zebra", 1)
        .insert("alpha", 2)
        .insert("mike", 3);

    let keys: Vec<_> = map.keys().copied().collect();
    assert_eq!(keys, vec!["zebra", "alpha", "mike"]);
    assert_eq!(map.first(), Some((&"zebra", &1)));
}

#[test]
fn ordered_map_versions_are_independent() {
    let v1 = OrderedMap::new().insert("a", 1);
    let v2 = v1.insert("b", 2);
    let v3 = v2.remove(&"a");

    assert_eq!(v1.len(), 1);
    assert_eq!(v2.len(), 2);
    assert_eq!(v3.len(), 1);
    assert!(v2.contains_key(&"a"));
    assert!(!v3.contains_key(&"a"));
}

#[test]
fn ordered_map_overwrite_preserves_slot() {
    let map = OrderedMap::new().insert("a", 1).insert("b", 2).insert("a", 9);
    let entries: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(entries, vec![("a", 9), ("b", 2)]);
}
