//! Per-keyword statement supports.

pub mod augment;
pub mod deviate;
pub mod feature;
pub mod grouping;
pub mod meta;
pub mod module;
pub mod schema;
pub mod typedef;

use std::sync::Arc;

use crate::support::SupportRegistry;

/// Builds the registry covering the RFC 7950 keywords this engine
/// implements. The reactor takes the registry as an explicit value; this is
/// the convenience assembly of the built-in supports.
#[must_use]
pub fn default_registry() -> Arc<SupportRegistry> {
    let mut registry = SupportRegistry::new();
    module::register(&mut registry);
    schema::register(&mut registry);
    grouping::register(&mut registry);
    augment::register(&mut registry);
    deviate::register(&mut registry);
    feature::register(&mut registry);
    typedef::register(&mut registry);
    meta::register(&mut registry);
    Arc::new(registry)
}
