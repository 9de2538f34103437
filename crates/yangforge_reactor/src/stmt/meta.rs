//! Leaf-grammar supports: description, reference, status, and the rest of
//! the keywords that carry no inference behaviour of their own.

use std::sync::Arc;

use yangforge_model::{SubstatementValidator, YangKeyword};

use crate::support::{ArgKind, BuiltinSupport, SupportRegistry};

/// Registers the plain builtin supports.
pub fn register(registry: &mut SupportRegistry) {
    use ArgKind::{Bool, IfFeature, MaxElements, OrderedBy, Path, Revision, Status, Str, UInt};
    use YangKeyword as K;

    let plain: [(K, ArgKind); 24] = [
        (K::Description, Str),
        (K::Reference, Str),
        (K::Contact, Str),
        (K::Organization, Str),
        (K::Namespace, Str),
        (K::Prefix, Str),
        (K::YangVersion, Str),
        (K::RevisionDate, Revision),
        (K::Status, Status),
        (K::Config, Bool),
        (K::Mandatory, Bool),
        (K::Presence, Str),
        (K::Key, Str),
        (K::Unique, Str),
        (K::MinElements, UInt),
        (K::MaxElements, MaxElements),
        (K::Units, Str),
        (K::Default, Str),
        (K::When, Str),
        (K::OrderedBy, OrderedBy),
        (K::ErrorMessage, Str),
        (K::IfFeature, IfFeature),
        (K::Path, Path),
        (K::RequireInstance, Bool),
    ];
    for (keyword, arg_kind) in plain {
        registry.register(Arc::new(BuiltinSupport::new(keyword, arg_kind)));
    }

    registry.register(Arc::new(
        BuiltinSupport::new(K::Revision, Revision).with_validator(
            SubstatementValidator::builder(K::Revision)
                .add_optional(K::Description)
                .add_optional(K::Reference)
                .build(),
        ),
    ));

    registry.register(Arc::new(
        BuiltinSupport::new(K::Must, Str).with_validator(
            SubstatementValidator::builder(K::Must)
                .add_optional(K::ErrorMessage)
                .add_optional(K::Description)
                .add_optional(K::Reference)
                .build(),
        ),
    ));

    registry.register(Arc::new(
        BuiltinSupport::new(K::Pattern, Str).with_validator(
            SubstatementValidator::builder(K::Pattern)
                .add_optional(K::Modifier)
                .add_optional(K::ErrorMessage)
                .add_optional(K::Description)
                .add_optional(K::Reference)
                .build(),
        ),
    ));
    registry.register(Arc::new(BuiltinSupport::new(K::Modifier, Str)));

    registry.register(Arc::new(
        BuiltinSupport::new(K::Range, Str).with_validator(
            SubstatementValidator::builder(K::Range)
                .add_optional(K::ErrorMessage)
                .add_optional(K::Description)
                .add_optional(K::Reference)
                .build(),
        ),
    ));
    registry.register(Arc::new(
        BuiltinSupport::new(K::Length, Str).with_validator(
            SubstatementValidator::builder(K::Length)
                .add_optional(K::ErrorMessage)
                .add_optional(K::Description)
                .add_optional(K::Reference)
                .build(),
        ),
    ));
    registry.register(Arc::new(BuiltinSupport::new(K::FractionDigits, UInt)));

    registry.register(Arc::new(
        BuiltinSupport::new(K::Enum, Str).with_validator(
            SubstatementValidator::builder(K::Enum)
                .add_optional(K::Value)
                .add_optional(K::Status)
                .add_optional(K::Description)
                .add_optional(K::Reference)
                .add_any(K::IfFeature)
                .build(),
        ),
    ));
    registry.register(Arc::new(BuiltinSupport::new(K::Value, Str)));
    registry.register(Arc::new(
        BuiltinSupport::new(K::Bit, Str).with_validator(
            SubstatementValidator::builder(K::Bit)
                .add_optional(K::Position)
                .add_optional(K::Status)
                .add_optional(K::Description)
                .add_optional(K::Reference)
                .add_any(K::IfFeature)
                .build(),
        ),
    ));
    registry.register(Arc::new(BuiltinSupport::new(K::Position, UInt)));

    registry.register(Arc::new(BuiltinSupport::new(K::Base, ArgKind::NodeIdentifier)));
    registry.register(Arc::new(
        BuiltinSupport::new(K::Identity, ArgKind::NodeIdentifier).with_validator(
            SubstatementValidator::builder(K::Identity)
                .add_any(K::Base)
                .add_optional(K::Status)
                .add_optional(K::Description)
                .add_optional(K::Reference)
                .add_any(K::IfFeature)
                .build(),
        ),
    ));

    registry.register(Arc::new(
        BuiltinSupport::new(K::Extension, ArgKind::NodeIdentifier).with_validator(
            SubstatementValidator::builder(K::Extension)
                .add_optional(K::Argument)
                .add_optional(K::Status)
                .add_optional(K::Description)
                .add_optional(K::Reference)
                .build(),
        ),
    ));
    registry.register(Arc::new(BuiltinSupport::new(K::Argument, ArgKind::NodeIdentifier)));
}
