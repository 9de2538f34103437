//! Schema-tree node supports.
//!
//! Containers, leaves, lists, choices, cases, and the other data-definition
//! keywords register themselves as schema-tree children of their parent so
//! augment and deviation targets resolve across sources.

use std::sync::Arc;

use yangforge_foundation::Result;
use yangforge_model::{
    validator, StatementName, SubstatementValidator, YangKeyword,
};

use crate::ctx::CtxId;
use crate::reactor::Reactor;
use crate::support::{ArgKind, ArgumentContext, StatementPolicy, StatementSupport, SupportRegistry};

/// Registers the schema-node supports.
pub fn register(registry: &mut SupportRegistry) {
    for (keyword, arg_kind) in [
        (YangKeyword::Container, ArgKind::NodeIdentifier),
        (YangKeyword::Leaf, ArgKind::NodeIdentifier),
        (YangKeyword::LeafList, ArgKind::NodeIdentifier),
        (YangKeyword::List, ArgKind::NodeIdentifier),
        (YangKeyword::Choice, ArgKind::NodeIdentifier),
        (YangKeyword::Case, ArgKind::NodeIdentifier),
        (YangKeyword::Anydata, ArgKind::NodeIdentifier),
        (YangKeyword::Anyxml, ArgKind::NodeIdentifier),
        (YangKeyword::Rpc, ArgKind::NodeIdentifier),
        (YangKeyword::Action, ArgKind::NodeIdentifier),
        (YangKeyword::Notification, ArgKind::NodeIdentifier),
        (YangKeyword::Input, ArgKind::None),
        (YangKeyword::Output, ArgKind::None),
    ] {
        registry.register(Arc::new(SchemaNodeSupport::new(keyword, arg_kind)));
    }
}

fn common_body(builder: validator::Builder) -> validator::Builder {
    builder
        .add_optional(YangKeyword::Config)
        .add_optional(YangKeyword::Description)
        .add_optional(YangKeyword::Reference)
        .add_optional(YangKeyword::Status)
        .add_optional(YangKeyword::When)
        .add_any(YangKeyword::IfFeature)
}

fn data_definitions(builder: validator::Builder) -> validator::Builder {
    builder
        .add_any(YangKeyword::Container)
        .add_any(YangKeyword::Leaf)
        .add_any(YangKeyword::LeafList)
        .add_any(YangKeyword::List)
        .add_any(YangKeyword::Choice)
        .add_any(YangKeyword::Anydata)
        .add_any(YangKeyword::Anyxml)
        .add_any(YangKeyword::Uses)
}

fn validator_for(keyword: YangKeyword) -> SubstatementValidator {
    let builder = SubstatementValidator::builder(keyword);
    match keyword {
        YangKeyword::Container => data_definitions(common_body(builder))
            .add_optional(YangKeyword::Presence)
            .add_any(YangKeyword::Must)
            .add_any(YangKeyword::Typedef)
            .add_any(YangKeyword::Grouping)
            .add_any(YangKeyword::Action)
            .add_any(YangKeyword::Notification)
            .build(),
        YangKeyword::Leaf => common_body(builder)
            .add_mandatory(YangKeyword::Type)
            .add_optional(YangKeyword::Default)
            .add_optional(YangKeyword::Mandatory)
            .add_optional(YangKeyword::Units)
            .add_any(YangKeyword::Must)
            .build(),
        YangKeyword::LeafList => common_body(builder)
            .add_mandatory(YangKeyword::Type)
            .add_any(YangKeyword::Default)
            .add_optional(YangKeyword::MinElements)
            .add_optional(YangKeyword::MaxElements)
            .add_optional(YangKeyword::OrderedBy)
            .add_optional(YangKeyword::Units)
            .add_any(YangKeyword::Must)
            .build(),
        YangKeyword::List => data_definitions(common_body(builder))
            .add_optional(YangKeyword::Key)
            .add_any(YangKeyword::Unique)
            .add_optional(YangKeyword::MinElements)
            .add_optional(YangKeyword::MaxElements)
            .add_optional(YangKeyword::OrderedBy)
            .add_any(YangKeyword::Must)
            .add_any(YangKeyword::Typedef)
            .add_any(YangKeyword::Grouping)
            .add_any(YangKeyword::Action)
            .add_any(YangKeyword::Notification)
            .build(),
        YangKeyword::Choice => common_body(builder)
            .add_any(YangKeyword::Case)
            .add_any(YangKeyword::Container)
            .add_any(YangKeyword::Leaf)
            .add_any(YangKeyword::LeafList)
            .add_any(YangKeyword::List)
            .add_any(YangKeyword::Anydata)
            .add_any(YangKeyword::Anyxml)
            .add_optional(YangKeyword::Default)
            .add_optional(YangKeyword::Mandatory)
            .build(),
        YangKeyword::Case => data_definitions(common_body(builder)).build(),
        YangKeyword::Anydata | YangKeyword::Anyxml => common_body(builder)
            .add_optional(YangKeyword::Mandatory)
            .add_any(YangKeyword::Must)
            .build(),
        YangKeyword::Rpc | YangKeyword::Action => common_body(builder)
            .add_optional(YangKeyword::Input)
            .add_optional(YangKeyword::Output)
            .add_any(YangKeyword::Typedef)
            .add_any(YangKeyword::Grouping)
            .build(),
        YangKeyword::Notification => data_definitions(common_body(builder))
            .add_any(YangKeyword::Must)
            .add_any(YangKeyword::Typedef)
            .add_any(YangKeyword::Grouping)
            .build(),
        _ => data_definitions(builder)
            .add_any(YangKeyword::Must)
            .add_any(YangKeyword::Typedef)
            .add_any(YangKeyword::Grouping)
            .build(),
    }
}

/// Support shared by every schema-tree keyword.
pub struct SchemaNodeSupport {
    keyword: YangKeyword,
    arg_kind: ArgKind,
    validator: SubstatementValidator,
}

impl SchemaNodeSupport {
    /// Creates the support for one schema-tree keyword.
    #[must_use]
    pub fn new(keyword: YangKeyword, arg_kind: ArgKind) -> Self {
        Self {
            keyword,
            arg_kind,
            validator: validator_for(keyword),
        }
    }
}

impl StatementSupport for SchemaNodeSupport {
    fn name(&self) -> StatementName {
        StatementName::Rfc(self.keyword)
    }

    fn policy(&self) -> StatementPolicy {
        StatementPolicy::CopyOnUse
    }

    fn parse_argument(
        &self,
        ctx: &ArgumentContext<'_>,
        raw: Option<&str>,
    ) -> Result<yangforge_model::ArgValue> {
        self.arg_kind.parse(ctx, raw)
    }

    fn validator(&self) -> Option<&SubstatementValidator> {
        Some(&self.validator)
    }

    fn on_full_definition_declared(&self, reactor: &mut Reactor, ctx: CtxId) -> Result<()> {
        let Some(parent) = reactor.arena().get(ctx).parent else {
            return Ok(());
        };
        let Some(qname) = reactor.arena().get(ctx).arg.as_qname().cloned() else {
            return Ok(());
        };
        reactor.register_schema_child(parent, qname, ctx)
    }
}
