//! Parsed statement argument values.
//!
//! Every keyword parses its raw argument string into one of the variants
//! here during statement definition. Parsing that needs prefix resolution
//! (qualified names, paths, if-feature expressions) receives a resolver
//! from the active source.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use yangforge_foundation::{Error, QName, QNameModule, Result, Revision};

use crate::ident::Absolute;
use crate::path::PathExpression;

/// The `status` of a definition.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Status {
    /// Definition is current and valid.
    #[default]
    Current,
    /// Definition is obsolescent but still permitted.
    Deprecated,
    /// Definition is obsolete and should not be implemented.
    Obsolete,
}

impl Status {
    /// Parses a `status` argument.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "current" => Ok(Self::Current),
            "deprecated" => Ok(Self::Deprecated),
            "obsolete" => Ok(Self::Obsolete),
            other => Err(Error::source(format!(
                "'{other}' is not a valid status argument"
            ))),
        }
    }
}

/// The `ordered-by` mode of a list or leaf-list.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum OrderedBy {
    /// Order is implementation-determined.
    #[default]
    System,
    /// Order is significant and controlled by the client.
    User,
}

impl OrderedBy {
    /// Parses an `ordered-by` argument.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "system" => Ok(Self::System),
            "user" => Ok(Self::User),
            other => Err(Error::source(format!(
                "'{other}' is not a valid ordered-by argument"
            ))),
        }
    }
}

/// The four kinds of `deviate` statement.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeviateKind {
    /// Target is not implemented at all.
    NotSupported,
    /// Add substatements to the target.
    Add,
    /// Replace substatements of the target.
    Replace,
    /// Delete substatements from the target.
    Delete,
}

impl DeviateKind {
    /// Returns the argument keyword for this kind.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::NotSupported => "not-supported",
            Self::Add => "add",
            Self::Replace => "replace",
            Self::Delete => "delete",
        }
    }

    /// Parses a deviate argument; anything outside the lexicon is a source
    /// error.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "not-supported" => Ok(Self::NotSupported),
            "add" => Ok(Self::Add),
            "replace" => Ok(Self::Replace),
            "delete" => Ok(Self::Delete),
            other => Err(Error::source(format!(
                "String '{other}' is not valid deviate argument"
            ))),
        }
    }
}

impl fmt::Display for DeviateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// The set of features active for one compilation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FeatureSet {
    /// Every feature is considered supported.
    #[default]
    All,
    /// Only the listed features are supported.
    Explicit(HashSet<QName>),
}

impl FeatureSet {
    /// Creates an explicit feature set from an iterator of feature names.
    #[must_use]
    pub fn of(features: impl IntoIterator<Item = QName>) -> Self {
        Self::Explicit(features.into_iter().collect())
    }

    /// An explicit empty set: no feature is supported.
    #[must_use]
    pub fn none() -> Self {
        Self::Explicit(HashSet::new())
    }

    /// Returns true if the feature is supported.
    #[must_use]
    pub fn supports(&self, feature: &QName) -> bool {
        match self {
            Self::All => true,
            Self::Explicit(set) => set.contains(feature),
        }
    }
}

/// A parsed `if-feature` predicate: a boolean expression over feature names.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum IfFeatureExpr {
    /// A single feature reference.
    Feature(QName),
    /// Conjunction.
    And(Box<IfFeatureExpr>, Box<IfFeatureExpr>),
    /// Disjunction.
    Or(Box<IfFeatureExpr>, Box<IfFeatureExpr>),
    /// Negation.
    Not(Box<IfFeatureExpr>),
}

impl IfFeatureExpr {
    /// Evaluates the predicate against the active feature set.
    #[must_use]
    pub fn evaluate(&self, features: &FeatureSet) -> bool {
        match self {
            Self::Feature(qname) => features.supports(qname),
            Self::And(lhs, rhs) => lhs.evaluate(features) && rhs.evaluate(features),
            Self::Or(lhs, rhs) => lhs.evaluate(features) || rhs.evaluate(features),
            Self::Not(inner) => !inner.evaluate(features),
        }
    }

    /// Parses an `if-feature` argument.
    ///
    /// Grammar per RFC 7950 section 7.20.2: feature names (optionally
    /// prefixed), `and`, `or`, `not`, and parentheses. `resolve` binds a
    /// name to a feature QName given its optional prefix.
    pub fn parse(
        raw: &str,
        resolve: &dyn Fn(Option<&str>, &str) -> Result<QName>,
    ) -> Result<Self> {
        let tokens = tokenize(raw)?;
        let mut parser = ExprParser {
            tokens: &tokens,
            pos: 0,
            resolve,
            raw,
        };
        let expr = parser.parse_or()?;
        if parser.pos != tokens.len() {
            return Err(Error::source(format!(
                "trailing input in if-feature expression '{raw}'"
            )));
        }
        Ok(expr)
    }
}

#[derive(Debug, PartialEq)]
enum Token {
    Name(String),
    And,
    Or,
    Not,
    Open,
    Close,
}

fn tokenize(raw: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = raw.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        match c {
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            c if c.is_whitespace() => {}
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = start + c.len_utf8();
                while let Some(&(idx, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':') {
                        end = idx + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let word = &raw[start..end];
                tokens.push(match word {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    name => Token::Name(name.to_string()),
                });
            }
            other => {
                return Err(Error::source(format!(
                    "unexpected character '{other}' in if-feature expression '{raw}'"
                )));
            }
        }
    }
    Ok(tokens)
}

struct ExprParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    resolve: &'a dyn Fn(Option<&str>, &str) -> Result<QName>,
    raw: &'a str,
}

impl ExprParser<'_> {
    fn parse_or(&mut self) -> Result<IfFeatureExpr> {
        let mut lhs = self.parse_and()?;
        while matches!(self.tokens.get(self.pos), Some(Token::Or)) {
            self.pos += 1;
            let rhs = self.parse_and()?;
            lhs = IfFeatureExpr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<IfFeatureExpr> {
        let mut lhs = self.parse_atom()?;
        while matches!(self.tokens.get(self.pos), Some(Token::And)) {
            self.pos += 1;
            let rhs = self.parse_atom()?;
            lhs = IfFeatureExpr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_atom(&mut self) -> Result<IfFeatureExpr> {
        match self.tokens.get(self.pos) {
            Some(Token::Not) => {
                self.pos += 1;
                Ok(IfFeatureExpr::Not(Box::new(self.parse_atom()?)))
            }
            Some(Token::Open) => {
                self.pos += 1;
                let expr = self.parse_or()?;
                if !matches!(self.tokens.get(self.pos), Some(Token::Close)) {
                    return Err(Error::source(format!(
                        "unbalanced parentheses in if-feature expression '{}'",
                        self.raw
                    )));
                }
                self.pos += 1;
                Ok(expr)
            }
            Some(Token::Name(name)) => {
                self.pos += 1;
                let qname = match name.split_once(':') {
                    Some((prefix, local)) => (self.resolve)(Some(prefix), local)?,
                    None => (self.resolve)(None, name)?,
                };
                Ok(IfFeatureExpr::Feature(qname))
            }
            _ => Err(Error::source(format!(
                "malformed if-feature expression '{}'",
                self.raw
            ))),
        }
    }
}

/// A parsed statement argument.
#[derive(Clone, Debug, PartialEq)]
pub enum ArgValue {
    /// The keyword takes no argument.
    None,
    /// A plain string argument.
    Str(Arc<str>),
    /// A node or definition identifier.
    Identifier(QName),
    /// `true` / `false`.
    Bool(bool),
    /// A non-negative count (`min-elements`, `value`, `fraction-digits`).
    UInt(u64),
    /// `max-elements` (`unbounded` maps to `None`).
    MaxElements(Option<u64>),
    /// A revision date.
    Revision(Revision),
    /// A `status` argument.
    Status(Status),
    /// An `ordered-by` argument.
    OrderedBy(OrderedBy),
    /// A `deviate` kind.
    Deviate(DeviateKind),
    /// An `if-feature` predicate.
    IfFeature(IfFeatureExpr),
    /// A `path` expression.
    Path(PathExpression),
    /// An absolute schema node identifier (`augment`, `deviation`).
    SchemaNodeId(Absolute),
}

impl ArgValue {
    /// Returns the qualified name, for identifier arguments.
    #[must_use]
    pub const fn as_qname(&self) -> Option<&QName> {
        match self {
            Self::Identifier(qname) => Some(qname),
            _ => None,
        }
    }

    /// Returns the string payload, for string arguments.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean payload, for boolean arguments.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns a rebound copy for identifier arguments, other values
    /// unchanged. Used when a grouping is instantiated into another module.
    #[must_use]
    pub fn bind_to(&self, module: &QNameModule) -> Self {
        match self {
            Self::Identifier(qname) => Self::Identifier(qname.bind_to(module.clone())),
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(namespace: &'static str) -> impl Fn(Option<&str>, &str) -> Result<QName> {
        move |_prefix, local| QName::create(namespace, local)
    }

    #[test]
    fn deviate_lexicon_is_exact() {
        assert_eq!(DeviateKind::parse("add").unwrap(), DeviateKind::Add);
        assert_eq!(DeviateKind::parse("delete").unwrap(), DeviateKind::Delete);
        assert_eq!(DeviateKind::parse("replace").unwrap(), DeviateKind::Replace);
        assert_eq!(
            DeviateKind::parse("not-supported").unwrap(),
            DeviateKind::NotSupported
        );
        let err = DeviateKind::parse("remove").unwrap_err();
        assert!(format!("{err}").contains("is not valid deviate argument"));
    }

    #[test]
    fn if_feature_single_name() {
        let expr = IfFeatureExpr::parse("my-feature", &resolver("urn:t")).unwrap();
        let feature = QName::create("urn:t", "my-feature").unwrap();
        assert!(expr.evaluate(&FeatureSet::All));
        assert!(expr.evaluate(&FeatureSet::of([feature])));
        assert!(!expr.evaluate(&FeatureSet::none()));
    }

    #[test]
    fn if_feature_boolean_operators() {
        let expr = IfFeatureExpr::parse("a and (b or not c)", &resolver("urn:t")).unwrap();
        let a = QName::create("urn:t", "a").unwrap();
        let b = QName::create("urn:t", "b").unwrap();
        let c = QName::create("urn:t", "c").unwrap();

        assert!(expr.evaluate(&FeatureSet::of([a.clone(), b.clone()])));
        assert!(expr.evaluate(&FeatureSet::of([a.clone()])));
        assert!(!expr.evaluate(&FeatureSet::none()));
        // a missing: whole expression false
        assert!(!expr.evaluate(&FeatureSet::of([b])));
        // a present but c cancels the right side
        assert!(!expr.evaluate(&FeatureSet::of([a, c])));
    }

    #[test]
    fn if_feature_rejects_garbage() {
        assert!(IfFeatureExpr::parse("a and", &resolver("urn:t")).is_err());
        assert!(IfFeatureExpr::parse("(a", &resolver("urn:t")).is_err());
        assert!(IfFeatureExpr::parse("a ! b", &resolver("urn:t")).is_err());
    }

    #[test]
    fn feature_set_defaults_to_all() {
        let set = FeatureSet::default();
        assert!(set.supports(&QName::create("urn:x", "anything").unwrap()));
    }
}
