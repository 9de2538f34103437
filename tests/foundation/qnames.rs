//! Qualified-name identity semantics.

use yangforge::foundation::{Interner, QName, QNameModule, Revision};

#[test]
fn distinct_revisions_coexist() {
    let old = QNameModule::new("urn:coexist", Some(Revision::parse("2020-01-01").unwrap()));
    let new = QNameModule::new("urn:coexist", Some(Revision::parse("2021-01-01").unwrap()));

    assert_ne!(old, new);
    let old_leaf = old.with_local_name("status").unwrap();
    let new_leaf = new.with_local_name("status").unwrap();
    assert_ne!(old_leaf, new_leaf);
    assert_eq!(old_leaf.local_name(), new_leaf.local_name());
}

#[test]
fn qname_hash_covers_all_coordinates() {
    use std::collections::HashSet;

    let mut set = HashSet::new();
    set.insert(QName::create("urn:a", "x").unwrap());
    set.insert(QName::create("urn:b", "x").unwrap());
    set.insert(QName::create("urn:a", "y").unwrap());
    set.insert(QName::create("urn:a", "x").unwrap());

    assert_eq!(set.len(), 3);
}

#[test]
fn interner_shares_reserved_arguments() {
    let mut interner = Interner::new();
    let add = interner.intern_str("add");
    let reserved = interner.reserved("add").unwrap();
    assert!(std::sync::Arc::ptr_eq(&add, &reserved));
}

#[test]
fn revision_round_trip() {
    for raw in ["2016-02-29", "1999-12-31", "2024-01-01"] {
        let rev = Revision::parse(raw).unwrap();
        assert_eq!(rev.to_string(), raw);
    }
}
