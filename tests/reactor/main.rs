//! Integration tests for Layer 3: Reactor
//!
//! Tests for linkage, grouping expansion, augments, deviations, feature
//! gating, cardinality validation, and the compile-wide invariants.

mod augments;
mod deviations;
mod features;
mod invariants;
mod linkage;
mod uses;
mod util;
mod validators;
