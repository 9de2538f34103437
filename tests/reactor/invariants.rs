//! Compile-wide invariants: identifier uniqueness and leafref closure.

use std::collections::HashSet;
use std::sync::Arc;

use yangforge::model::{Absolute, EffectiveStatement, YangKeyword};
use yangforge::reactor::Reactor;

use crate::util::{keyed_list, module, source, stmt, string_leaf};

fn collect_paths(stmt: &Arc<EffectiveStatement>, out: &mut Vec<Absolute>) {
    if let Some(path) = stmt.schema_path() {
        out.push(path.clone());
    }
    for sub in stmt.substatements() {
        collect_paths(sub, out);
    }
}

#[test]
fn schema_node_identifiers_are_unique() {
    let root = module("inv", "urn:inv", "i")
        .with_child(
            stmt(YangKeyword::Container, "a")
                .with_child(string_leaf("x"))
                .with_child(keyed_list("items", "name")),
        )
        .with_child(stmt(YangKeyword::Container, "b").with_child(string_leaf("x")));

    let mut reactor = Reactor::new();
    reactor.add_source(&source("inv.yang", root));
    let model = reactor.build().unwrap();

    let mut paths = Vec::new();
    for (_, module) in model.module_statements() {
        collect_paths(module, &mut paths);
    }
    let unique: HashSet<_> = paths.iter().cloned().collect();
    assert!(!paths.is_empty());
    assert_eq!(paths.len(), unique.len());
}

#[test]
fn leafref_chains_terminate_in_concrete_types() {
    // ref1 -> ref2 -> name(string)
    let root = module("lref", "urn:lref", "l").with_child(
        stmt(YangKeyword::Container, "top")
            .with_child(string_leaf("name"))
            .with_child(
                stmt(YangKeyword::Leaf, "ref2").with_child(
                    stmt(YangKeyword::Type, "leafref")
                        .with_child(stmt(YangKeyword::Path, "../name")),
                ),
            )
            .with_child(
                stmt(YangKeyword::Leaf, "ref1").with_child(
                    stmt(YangKeyword::Type, "leafref")
                        .with_child(stmt(YangKeyword::Path, "../ref2")),
                ),
            ),
    );

    let mut reactor = Reactor::new();
    reactor.add_source(&source("lref.yang", root));
    let model = reactor.build().unwrap();

    for (path, target) in model.leafref_targets() {
        assert!(
            !target.is_leafref(),
            "leafref at {path} resolved to another leafref"
        );
    }
    // Both leafrefs resolved.
    assert_eq!(model.leafref_targets().count(), 2);
}

#[test]
fn leafref_cycles_are_rejected() {
    let root = module("cyc", "urn:cyc", "c").with_child(
        stmt(YangKeyword::Container, "top")
            .with_child(
                stmt(YangKeyword::Leaf, "a").with_child(
                    stmt(YangKeyword::Type, "leafref")
                        .with_child(stmt(YangKeyword::Path, "../b")),
                ),
            )
            .with_child(
                stmt(YangKeyword::Leaf, "b").with_child(
                    stmt(YangKeyword::Type, "leafref")
                        .with_child(stmt(YangKeyword::Path, "../a")),
                ),
            ),
    );

    let mut reactor = Reactor::new();
    reactor.add_source(&source("cyc.yang", root));
    assert!(reactor.build().is_err());
}

#[test]
fn typedef_chains_flatten_restrictions() {
    let root = module("types", "urn:types", "t")
        .with_child(
            stmt(YangKeyword::Typedef, "percent").with_child(
                stmt(YangKeyword::Type, "uint8").with_child(stmt(YangKeyword::Range, "0..100")),
            ),
        )
        .with_child(
            stmt(YangKeyword::Typedef, "small-percent")
                .with_child(stmt(YangKeyword::Type, "percent")),
        )
        .with_child(
            stmt(YangKeyword::Leaf, "load")
                .with_child(stmt(YangKeyword::Type, "small-percent")),
        );

    let mut reactor = Reactor::new();
    reactor.add_source(&source("types.yang", root));
    let model = reactor.build().unwrap();

    let load = model
        .find_data_tree_child([yangforge::foundation::QName::create("urn:types", "load").unwrap()])
        .unwrap();
    let spec = load.type_spec().unwrap();
    assert_eq!(spec.base, yangforge::model::BaseType::Uint8);
    assert_eq!(&*spec.name, "small-percent");
    let range = spec.range.as_ref().unwrap();
    assert!(range.contains(100));
    assert!(!range.contains(101));
}

#[test]
fn typedef_cycles_are_rejected() {
    let root = module("tcyc", "urn:tcyc", "t")
        .with_child(stmt(YangKeyword::Typedef, "a").with_child(stmt(YangKeyword::Type, "b")))
        .with_child(stmt(YangKeyword::Typedef, "b").with_child(stmt(YangKeyword::Type, "a")))
        .with_child(stmt(YangKeyword::Leaf, "x").with_child(stmt(YangKeyword::Type, "a")));

    let mut reactor = Reactor::new();
    reactor.add_source(&source("tcyc.yang", root));
    let err = reactor.build().unwrap_err();
    assert!(err.to_string().contains("cycle"));
}
