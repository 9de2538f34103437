//! Cross-module augmentation.

use yangforge::foundation::QName;
use yangforge::model::{InferenceStack, StatementSource, YangKeyword};
use yangforge::reactor::Reactor;

use crate::util::{keyed_list, module, source, stmt, string_leaf};
use std::sync::Arc;

const NET_NS: &str = "urn:net";
const BGP_NS: &str = "urn:bgp";

fn net(local: &str) -> QName {
    QName::create(NET_NS, local).unwrap()
}

fn bgp(local: &str) -> QName {
    QName::create(BGP_NS, local).unwrap()
}

// module net: container network-instances {
//   list network-instance { key name; leaf name;
//     container protocols { list protocol { key name; leaf name; } } } }
fn net_module() -> StatementSource {
    let protocol = keyed_list("protocol", "name");
    let protocols = stmt(YangKeyword::Container, "protocols").with_child(protocol);
    let network_instance = stmt(YangKeyword::List, "network-instance")
        .with_child(stmt(YangKeyword::Key, "name"))
        .with_child(string_leaf("name"))
        .with_child(protocols);
    let root = module("net", NET_NS, "n").with_child(
        stmt(YangKeyword::Container, "network-instances").with_child(network_instance),
    );
    source("net.yang", root)
}

// module bgp: augments the protocol list with a bgp/neighbors subtree
// carrying per-neighbor afi-safis.
fn bgp_module() -> StatementSource {
    let afi_safi = keyed_list("afi-safi", "name");
    let afi_safis = stmt(YangKeyword::Container, "afi-safis").with_child(afi_safi);
    let neighbor = stmt(YangKeyword::List, "neighbor")
        .with_child(stmt(YangKeyword::Key, "address"))
        .with_child(string_leaf("address"))
        .with_child(afi_safis);
    let neighbors = stmt(YangKeyword::Container, "neighbors").with_child(neighbor);
    let bgp_container = stmt(YangKeyword::Container, "bgp").with_child(neighbors);

    let root = module("bgp", BGP_NS, "b")
        .with_child(stmt(YangKeyword::Import, "net").with_child(stmt(YangKeyword::Prefix, "n")))
        .with_child(
            stmt(
                YangKeyword::Augment,
                "/n:network-instances/n:network-instance/n:protocols/n:protocol",
            )
            .with_child(bgp_container),
        );
    source("bgp.yang", root)
}

#[test]
fn augment_under_protocol_is_navigable() {
    let mut reactor = Reactor::new();
    reactor.add_source(&net_module());
    reactor.add_source(&bgp_module());
    let model = Arc::new(reactor.build().unwrap());

    // The whole path resolves with successive data-tree steps.
    let mut stack = InferenceStack::of(Arc::clone(&model));
    for qname in [
        net("network-instances"),
        net("network-instance"),
        net("protocols"),
        net("protocol"),
        bgp("bgp"),
        bgp("neighbors"),
        bgp("neighbor"),
        bgp("afi-safis"),
        bgp("afi-safi"),
    ] {
        stack.enter_data_tree(&qname).unwrap();
    }

    let id = stack.to_schema_node_identifier().unwrap();
    assert_eq!(id.len(), 9);
    assert_eq!(id.last().local_name(), "afi-safi");
}

#[test]
fn augment_sources_may_arrive_in_any_order() {
    let mut reactor = Reactor::new();
    reactor.add_source(&bgp_module());
    reactor.add_source(&net_module());
    let model = reactor.build().unwrap();

    assert!(model
        .find_data_tree_child([
            net("network-instances"),
            net("network-instance"),
            net("protocols"),
            net("protocol"),
            bgp("bgp"),
        ])
        .is_some());
}

#[test]
fn unresolved_augment_target_fails_the_build() {
    let mut reactor = Reactor::new();
    reactor.add_source(&bgp_module());
    let err = reactor.build().unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Imported module 'net' was not found"));
}

#[test]
fn colliding_augments_are_rejected() {
    // Two augments of the same target from one module inject the same
    // qualified name.
    let root = module("aug1", "urn:aug1", "a1")
        .with_child(stmt(YangKeyword::Import, "net").with_child(stmt(YangKeyword::Prefix, "n")))
        .with_child(
            stmt(YangKeyword::Augment, "/n:network-instances").with_child(string_leaf("extra")),
        )
        .with_child(
            stmt(YangKeyword::Augment, "/n:network-instances").with_child(string_leaf("extra")),
        );

    let mut reactor = Reactor::new();
    reactor.add_source(&net_module());
    reactor.add_source(&source("aug1.yang", root));
    let err = reactor.build().unwrap_err();
    assert!(err.to_string().contains("already declared"));
}

#[test]
fn augments_from_two_namespaces_coexist() {
    let first = module("aug1", "urn:aug1", "a1")
        .with_child(stmt(YangKeyword::Import, "net").with_child(stmt(YangKeyword::Prefix, "n")))
        .with_child(stmt(YangKeyword::Augment, "/n:network-instances").with_child(string_leaf("extra")));
    // Same local name, different namespace: no collision.
    let second = module("aug2", "urn:aug2", "a2")
        .with_child(stmt(YangKeyword::Import, "net").with_child(stmt(YangKeyword::Prefix, "n")))
        .with_child(stmt(YangKeyword::Augment, "/n:network-instances").with_child(string_leaf("extra")));

    let mut reactor = Reactor::new();
    reactor.add_source(&net_module());
    reactor.add_source(&source("aug1.yang", first));
    reactor.add_source(&source("aug2.yang", second));
    // Both inject a leaf named "extra", one per namespace.
    let model = reactor.build().unwrap();
    assert!(model
        .find_data_tree_child([
            net("network-instances"),
            QName::create("urn:aug1", "extra").unwrap()
        ])
        .is_some());
    assert!(model
        .find_data_tree_child([
            net("network-instances"),
            QName::create("urn:aug2", "extra").unwrap()
        ])
        .is_some());
}
