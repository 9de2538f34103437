//! Substatement cardinality enforcement through the reactor.

use yangforge::model::YangKeyword;
use yangforge::reactor::Reactor;

use crate::util::{module, source, stmt, string_leaf};

#[test]
fn type_under_revision_is_rejected() {
    let root = module("bad", "urn:bad", "b").with_child(
        stmt(YangKeyword::Revision, "2020-01-01").with_child(stmt(YangKeyword::Type, "string")),
    );

    let mut reactor = Reactor::new();
    reactor.add_source(&source("bad.yang", root));
    let err = reactor.build().unwrap_err();
    assert!(err.to_string().contains("TYPE is not valid for REVISION"));
}

#[test]
fn two_descriptions_under_augment_are_rejected() {
    let root = module("bad", "urn:bad", "b")
        .with_child(stmt(YangKeyword::Container, "target"))
        .with_child(
            stmt(YangKeyword::Augment, "/target")
                .with_child(stmt(YangKeyword::Description, "one"))
                .with_child(stmt(YangKeyword::Description, "two"))
                .with_child(string_leaf("extra")),
        );

    let mut reactor = Reactor::new();
    reactor.add_source(&source("bad.yang", root));
    let err = reactor.build().unwrap_err();
    assert!(err
        .to_string()
        .contains("Maximal count of DESCRIPTION for AUGMENT is 1"));
}

#[test]
fn leaf_without_type_is_rejected() {
    let root = module("bad", "urn:bad", "b").with_child(stmt(YangKeyword::Leaf, "untyped"));

    let mut reactor = Reactor::new();
    reactor.add_source(&source("bad.yang", root));
    let err = reactor.build().unwrap_err();
    assert!(err
        .to_string()
        .contains("Minimal count of TYPE for LEAF is 1"));
}

#[test]
fn well_formed_module_passes_validation() {
    let root = module("good", "urn:good", "g")
        .with_child(
            stmt(YangKeyword::Revision, "2021-06-01")
                .with_child(stmt(YangKeyword::Description, "initial revision")),
        )
        .with_child(stmt(YangKeyword::Container, "top").with_child(string_leaf("name")));

    let mut reactor = Reactor::new();
    reactor.add_source(&source("good.yang", root));
    assert!(reactor.build().is_ok());
}

#[test]
fn extension_statements_are_admitted_anywhere() {
    let vendor = yangforge::model::StatementName::Extension(
        yangforge::foundation::QName::create("urn:vendor:ext", "annotation").unwrap(),
    );
    let root = module("ext", "urn:ext", "e").with_child(
        stmt(YangKeyword::Container, "top")
            .with_child(yangforge::model::StatementRecord::extension(
                vendor,
                Some("opaque payload"),
            ))
            .with_child(string_leaf("name")),
    );

    let mut reactor = Reactor::new();
    reactor.add_source(&source("ext.yang", root));
    assert!(reactor.build().is_ok());
}
