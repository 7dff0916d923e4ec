use crate::directive::Directive;
use crate::source_expression::{SourceExpression, UriSourceExpression};
use crate::tables::SchemePorts;
use crate::uri::Uri;
use cspkit_types::ids;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A set of directives, at most one per type.
///
/// An empty policy is valid and distinct from [`Policy::INVALID`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Policy {
    invalid: bool,
    directives: BTreeMap<String, Directive>,
}

/// Result of [`Policy::compare_to`], as sets of basic policies.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PolicyComparison {
    pub common: BTreeSet<Policy>,
    pub only_self: BTreeSet<Policy>,
    pub only_other: BTreeSet<Policy>,
}

impl Policy {
    pub const INVALID: Policy = Policy {
        invalid: true,
        directives: BTreeMap::new(),
    };

    /// Non-regular directives are dropped. If several directives share a type, the last one wins.
    pub fn new(directives: impl IntoIterator<Item = Directive>) -> Self {
        Self {
            invalid: false,
            directives: directives
                .into_iter()
                .filter(Directive::is_regular)
                .map(|d| (d.directive_type().to_string(), d))
                .collect(),
        }
    }

    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    pub fn directives(&self) -> impl Iterator<Item = &Directive> {
        self.directives.values()
    }

    pub fn directive(&self, directive_type: &str) -> Option<&Directive> {
        self.directives.get(directive_type)
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn has_default_directive(&self) -> bool {
        !self.invalid && self.directives.contains_key(ids::DEFAULT_SRC)
    }

    /// Exactly one directive, and that directive is basic.
    pub fn is_basic_policy(&self) -> bool {
        self.single_directive().is_some_and(Directive::is_basic_directive)
    }

    /// Exactly one directive, with an empty whitelist.
    pub fn is_basic_none_policy(&self) -> bool {
        self.single_directive().is_some_and(|d| d.whitelist().is_empty())
    }

    fn single_directive(&self) -> Option<&Directive> {
        if self.invalid || self.directives.len() != 1 {
            return None;
        }
        self.directives.values().next()
    }

    /// Directive-wise union (more permissive). Only for deriving policies from observations.
    ///
    /// `default-src` can only be combined when each side is either empty or consists of a
    /// `default-src` directive alone; mixing it with elementary types would change its meaning.
    pub fn combined_policy(&self, other: &Policy) -> Policy {
        if self.invalid || other.invalid {
            return Policy::INVALID;
        }
        let has_default = self.has_default_directive() || other.has_default_directive();
        if has_default && !(default_only_or_empty(self) && default_only_or_empty(other)) {
            return Policy::INVALID;
        }

        let mut combined = self.directives.clone();
        for (ty, theirs) in &other.directives {
            let merged = match combined.get(ty) {
                Some(mine) => mine.combined_directive(theirs),
                None => theirs.clone(),
            };
            if merged == Directive::INVALID {
                return Policy::INVALID;
            }
            combined.insert(ty.clone(), merged);
        }
        Policy {
            invalid: false,
            directives: combined,
        }
    }

    /// Whether `resource` of `resource_type` may be loaded by `document` under this policy.
    ///
    /// Only the directive of the resource type is consulted when present. Otherwise types listed
    /// in `default_src_types` fall back to `default-src`, or to an implicit `default-src *`.
    pub fn matches(
        &self,
        resource: &Uri,
        resource_type: &str,
        document: &Uri,
        ports: &SchemePorts,
        default_src_types: &[String],
    ) -> bool {
        if self.invalid {
            return false;
        }
        let resource_type = resource_type.to_ascii_lowercase();
        if let Some(directive) = self.directives.get(&resource_type) {
            return directive.matches(resource, document, ports);
        }
        if !default_src_types.iter().any(|t| *t == resource_type) {
            return false;
        }
        match self.directives.get(ids::DEFAULT_SRC) {
            Some(directive) => directive.matches(resource, document, ports),
            None => SourceExpression::UriMatch(UriSourceExpression::any())
                .matches(resource, document, ports),
        }
    }

    pub fn without_paths(&self, scheme_only: &[String]) -> Policy {
        if self.invalid {
            return Policy::INVALID;
        }
        Policy::new(self.directives.values().map(|d| d.without_paths(scheme_only)))
    }

    /// Decomposes into policies of one basic directive each. An empty policy is its own basic
    /// form; an invalid one has none.
    pub fn as_basic_policies(&self) -> BTreeSet<Policy> {
        if self.invalid {
            return BTreeSet::new();
        }
        if self.directives.is_empty() {
            return BTreeSet::from([self.clone()]);
        }
        self.directives
            .values()
            .flat_map(Directive::as_basic_directives)
            .map(|basic| Policy::new([basic]))
            .collect()
    }

    pub fn compare_to(&self, other: &Policy) -> PolicyComparison {
        if self.invalid || other.invalid {
            return PolicyComparison::default();
        }
        let mine = self.as_basic_policies();
        let theirs = other.as_basic_policies();
        PolicyComparison {
            common: mine.intersection(&theirs).cloned().collect(),
            only_self: mine.difference(&theirs).cloned().collect(),
            only_other: theirs.difference(&mine).cloned().collect(),
        }
    }
}

fn default_only_or_empty(policy: &Policy) -> bool {
    if policy.has_default_directive() {
        policy.directives.len() == 1
    } else {
        policy.directives.is_empty()
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.invalid {
            return f.write_str("[invalid]");
        }
        let mut rendered: Vec<String> = self.directives.values().map(ToString::to_string).collect();
        rendered.sort();
        f.write_str(&rendered.join("; "))
    }
}
