use crate::source_expression::{PortSpec, SourceExpression, UriSourceExpression};
use crate::tables::SchemePorts;
use crate::uri::Uri;
use cspkit_types::ids;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Directive type, or one of the non-regular markers.
///
/// The three `*BaseRestriction` kinds are synthetic `violated-directive` values sent by one
/// browser family. They never occur in a parsed policy.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DirectiveKind {
    Regular(String),
    Invalid,
    InlineStyleBaseRestriction,
    InlineScriptBaseRestriction,
    EvalScriptBaseRestriction,
}

/// The kind of event a violation report describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReportType {
    Regular,
    Eval,
    Inline,
}

impl ReportType {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportType::Regular => ids::REPORT_TYPE_REGULAR,
            ReportType::Eval => ids::REPORT_TYPE_EVAL,
            ReportType::Inline => ids::REPORT_TYPE_INLINE,
        }
    }
}

impl FromStr for ReportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ids::REPORT_TYPE_REGULAR => Ok(ReportType::Regular),
            ids::REPORT_TYPE_EVAL => Ok(ReportType::Eval),
            ids::REPORT_TYPE_INLINE => Ok(ReportType::Inline),
            other => Err(format!(
                "unknown report type: {other} (expected regular, eval, or inline)"
            )),
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One CSP rule: a directive type and its whitelist.
///
/// An empty whitelist is `'none'`. `Invalid` source expressions are dropped on construction and
/// duplicates collapse, so at most one `'self'` can be present.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Directive {
    kind: DirectiveKind,
    whitelist: BTreeSet<SourceExpression>,
}

impl Directive {
    pub const INVALID: Directive = Directive::sentinel(DirectiveKind::Invalid);
    pub const INLINE_STYLE_BASE_RESTRICTION: Directive =
        Directive::sentinel(DirectiveKind::InlineStyleBaseRestriction);
    pub const INLINE_SCRIPT_BASE_RESTRICTION: Directive =
        Directive::sentinel(DirectiveKind::InlineScriptBaseRestriction);
    pub const EVAL_SCRIPT_BASE_RESTRICTION: Directive =
        Directive::sentinel(DirectiveKind::EvalScriptBaseRestriction);

    pub fn new(
        directive_type: impl Into<String>,
        whitelist: impl IntoIterator<Item = SourceExpression>,
    ) -> Self {
        Self {
            kind: DirectiveKind::Regular(directive_type.into()),
            whitelist: whitelist.into_iter().filter(|e| !e.is_invalid()).collect(),
        }
    }

    const fn sentinel(kind: DirectiveKind) -> Self {
        Self {
            kind,
            whitelist: BTreeSet::new(),
        }
    }

    pub fn kind(&self) -> &DirectiveKind {
        &self.kind
    }

    /// Effective directive type. Browser markers report the type they restrict.
    pub fn directive_type(&self) -> &str {
        match &self.kind {
            DirectiveKind::Regular(ty) => ty,
            DirectiveKind::InlineStyleBaseRestriction => ids::STYLE_SRC,
            DirectiveKind::InlineScriptBaseRestriction
            | DirectiveKind::EvalScriptBaseRestriction => ids::SCRIPT_SRC,
            DirectiveKind::Invalid => "[invalid]",
        }
    }

    pub fn whitelist(&self) -> &BTreeSet<SourceExpression> {
        &self.whitelist
    }

    pub fn is_regular(&self) -> bool {
        matches!(self.kind, DirectiveKind::Regular(_))
    }

    pub fn is_basic_directive(&self) -> bool {
        self.is_regular() && self.whitelist.len() <= 1
    }

    /// Union of both whitelists (more permissive). Only for deriving policies from
    /// observations; enforcing two policies at once has different semantics.
    pub fn combined_directive(&self, other: &Directive) -> Directive {
        match (&self.kind, &other.kind) {
            (DirectiveKind::Regular(a), DirectiveKind::Regular(b)) if a == b => Directive {
                kind: self.kind.clone(),
                whitelist: self.whitelist.union(&other.whitelist).cloned().collect(),
            },
            _ => Directive::INVALID,
        }
    }

    /// Whether `resource` is allowed, assuming it has the type of this directive.
    pub fn matches(&self, resource: &Uri, document: &Uri, ports: &SchemePorts) -> bool {
        self.is_regular()
            && self
                .whitelist
                .iter()
                .any(|expr| expr.matches(resource, document, ports))
    }

    /// A directive allowing exactly the event of a violation report in which `self` was the
    /// violated directive and `blocked` the blocked URI.
    ///
    /// URIs are taken as they are: no port normalization, no `'self'` substitution.
    pub fn generate_directive(&self, report_type: ReportType, blocked: &Uri) -> Directive {
        let marker_mismatch = match self.kind {
            DirectiveKind::Invalid => true,
            DirectiveKind::EvalScriptBaseRestriction => report_type != ReportType::Eval,
            DirectiveKind::InlineScriptBaseRestriction
            | DirectiveKind::InlineStyleBaseRestriction => report_type != ReportType::Inline,
            DirectiveKind::Regular(_) => false,
        };
        let ty = self.directive_type();
        let incompatible = match report_type {
            ReportType::Regular => !blocked.is_regular(),
            ReportType::Eval => ty != ids::SCRIPT_SRC,
            ReportType::Inline => ty != ids::SCRIPT_SRC && ty != ids::STYLE_SRC,
        };
        if marker_mismatch || ty == ids::DEFAULT_SRC || *blocked == Uri::INVALID || incompatible {
            return Directive::INVALID;
        }

        let expr = match report_type {
            ReportType::Regular => SourceExpression::UriMatch(UriSourceExpression::new(
                blocked.scheme(),
                Some(blocked.host()),
                blocked.port().map(PortSpec::Number),
                blocked.path(),
            )),
            ReportType::Eval => SourceExpression::UnsafeEval,
            ReportType::Inline => SourceExpression::UnsafeInline,
        };
        Directive::new(ty, [expr])
    }

    /// Copy with paths removed from URI sources. Sources whose scheme is listed in
    /// `scheme_only` are reduced to `scheme:`.
    pub fn without_paths(&self, scheme_only: &[String]) -> Directive {
        let DirectiveKind::Regular(ty) = &self.kind else {
            return self.clone();
        };
        let stripped = self.whitelist.iter().map(|expr| match expr {
            SourceExpression::UriMatch(uri)
                if uri
                    .scheme()
                    .is_some_and(|s| scheme_only.iter().any(|listed| listed == s)) =>
            {
                uri.scheme_only()
            }
            other => other.without_path(),
        });
        Directive::new(ty.clone(), stripped)
    }

    /// One directive per whitelist entry. Non-regular directives have no basic form.
    pub fn as_basic_directives(&self) -> BTreeSet<Directive> {
        let DirectiveKind::Regular(ty) = &self.kind else {
            return BTreeSet::new();
        };
        if self.whitelist.len() <= 1 {
            return BTreeSet::from([self.clone()]);
        }
        self.whitelist
            .iter()
            .map(|expr| Directive::new(ty.clone(), [expr.clone()]))
            .collect()
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ty = match &self.kind {
            DirectiveKind::Invalid => return f.write_str("[invalid]"),
            DirectiveKind::InlineStyleBaseRestriction => {
                return f.write_str(ids::PHRASE_INLINE_STYLE_BASE_RESTRICTION);
            }
            DirectiveKind::InlineScriptBaseRestriction => {
                return f.write_str(ids::PHRASE_INLINE_SCRIPT_BASE_RESTRICTION);
            }
            DirectiveKind::EvalScriptBaseRestriction => {
                return f.write_str(ids::PHRASE_EVAL_SCRIPT_BASE_RESTRICTION);
            }
            DirectiveKind::Regular(ty) => ty,
        };
        if self.whitelist.is_empty() {
            return write!(f, "{ty} {}", ids::KEYWORD_NONE);
        }
        let mut members: Vec<String> = self.whitelist.iter().map(ToString::to_string).collect();
        members.sort();
        write!(f, "{ty} {}", members.join(" "))
    }
}
