//! Source linkage: imports, submodules, revision selection.

use yangforge::foundation::QName;
use yangforge::model::{StatementRecord, YangKeyword};
use yangforge::reactor::Reactor;

use crate::util::{module, source, stmt, string_leaf};

#[test]
fn submodule_content_splices_into_the_module() {
    let main = module("host", "urn:host", "h").with_child(stmt(YangKeyword::Include, "guts"));
    let sub = StatementRecord::new(YangKeyword::Submodule, Some("guts"))
        .with_child(
            stmt(YangKeyword::BelongsTo, "host").with_child(stmt(YangKeyword::Prefix, "h")),
        )
        .with_child(stmt(YangKeyword::Container, "engine").with_child(string_leaf("rpm")));

    let mut reactor = Reactor::new();
    reactor.add_source(&source("host.yang", main));
    reactor.add_source(&source("guts.yang", sub));
    let model = reactor.build().unwrap();

    // Submodule nodes live in the parent module's namespace.
    let engine = QName::create("urn:host", "engine").unwrap();
    let rpm = QName::create("urn:host", "rpm").unwrap();
    assert!(model.find_data_tree_child([engine, rpm]).is_some());
    assert_eq!(model.module_count(), 1);
}

#[test]
fn missing_submodule_fails_linkage() {
    let main = module("host", "urn:host", "h").with_child(stmt(YangKeyword::Include, "ghost"));

    let mut reactor = Reactor::new();
    reactor.add_source(&source("host.yang", main));
    let err = reactor.build().unwrap_err();
    assert!(err.to_string().contains("ghost"));
}

#[test]
fn import_revision_date_must_match() {
    let exporter = module("lib", "urn:lib", "l")
        .with_child(stmt(YangKeyword::Revision, "2020-01-01"))
        .with_child(stmt(YangKeyword::Container, "shelf"));
    let importer = module("app", "urn:app", "a").with_child(
        stmt(YangKeyword::Import, "lib")
            .with_child(stmt(YangKeyword::Prefix, "l"))
            .with_child(stmt(YangKeyword::RevisionDate, "2019-06-01")),
    );

    let mut reactor = Reactor::new();
    reactor.add_source(&source("lib.yang", exporter));
    reactor.add_source(&source("app.yang", importer));
    let err = reactor.build().unwrap_err();
    assert!(err.to_string().contains("revision"));
}

#[test]
fn latest_revision_names_the_module() {
    let root = module("rev", "urn:rev", "r")
        .with_child(stmt(YangKeyword::Revision, "2019-01-01"))
        .with_child(stmt(YangKeyword::Revision, "2021-05-05"))
        .with_child(stmt(YangKeyword::Revision, "2020-03-03"));

    let mut reactor = Reactor::new();
    reactor.add_source(&source("rev.yang", root));
    let model = reactor.build().unwrap();

    let (module_id, _) = model.module_statements().next().unwrap();
    assert_eq!(
        module_id.revision().unwrap().to_string(),
        "2021-05-05"
    );
}
