use crate::source_expression::SourceExpressionParser;
use cspkit_domain::tables::{ALLOWED_DIRECTIVE_TYPES, to_strings, type_translations};
use cspkit_domain::{Directive, SchemePorts, SourceExpression};
use cspkit_types::ids;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectiveParserConfig {
    /// Legacy type name to current name, applied before the allow-list check.
    pub type_translations: BTreeMap<String, String>,
    pub allowed_types: Vec<String>,
    pub known_schemes: SchemePorts,
    /// Reject the whole directive on any bad token instead of dropping the token.
    pub strict: bool,
}

impl Default for DirectiveParserConfig {
    fn default() -> Self {
        Self {
            type_translations: type_translations(),
            allowed_types: to_strings(ALLOWED_DIRECTIVE_TYPES),
            known_schemes: SchemePorts::default(),
            strict: true,
        }
    }
}

/// Parses `type source-expr ...` strings into [`Directive`]s.
#[derive(Clone, Debug)]
pub struct DirectiveParser {
    type_translations: BTreeMap<String, String>,
    allowed_types: BTreeSet<String>,
    strict: bool,
    source_expressions: SourceExpressionParser,
}

impl Default for DirectiveParser {
    fn default() -> Self {
        Self::new(DirectiveParserConfig::default())
    }
}

impl DirectiveParser {
    pub fn new(config: DirectiveParserConfig) -> Self {
        Self {
            type_translations: config.type_translations,
            allowed_types: config.allowed_types.into_iter().collect(),
            strict: config.strict,
            source_expressions: SourceExpressionParser::new(config.known_schemes),
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn parse(&self, input: &str) -> Directive {
        let input = input.trim();
        match input {
            ids::PHRASE_INLINE_STYLE_BASE_RESTRICTION => {
                return Directive::INLINE_STYLE_BASE_RESTRICTION;
            }
            ids::PHRASE_INLINE_SCRIPT_BASE_RESTRICTION => {
                return Directive::INLINE_SCRIPT_BASE_RESTRICTION;
            }
            ids::PHRASE_EVAL_SCRIPT_BASE_RESTRICTION => {
                return Directive::EVAL_SCRIPT_BASE_RESTRICTION;
            }
            _ => {}
        }

        let Some((raw_type, rest)) = input.split_once(' ') else {
            return Directive::INVALID;
        };
        let mut directive_type = raw_type.trim().to_ascii_lowercase();
        if let Some(translated) = self.type_translations.get(&directive_type) {
            directive_type = translated.clone();
        }
        if directive_type.is_empty() || !self.allowed_types.contains(&directive_type) {
            return Directive::INVALID;
        }

        let tokens: Vec<&str> = rest.split_whitespace().collect();
        let is_none = |token: &&str| token.eq_ignore_ascii_case(ids::KEYWORD_NONE);
        if self.strict && tokens.len() > 1 && tokens.iter().any(is_none) {
            return Directive::INVALID;
        }

        let mut whitelist = Vec::with_capacity(tokens.len());
        for token in tokens.iter().filter(|t| !is_none(*t)) {
            let expression = self.source_expressions.parse(token);
            if !keyword_allowed(&expression, &directive_type) || expression.is_invalid() {
                if self.strict {
                    return Directive::INVALID;
                }
                continue;
            }
            whitelist.push(expression);
        }
        Directive::new(directive_type, whitelist)
    }
}

fn keyword_allowed(expression: &SourceExpression, directive_type: &str) -> bool {
    match expression {
        SourceExpression::UnsafeEval => {
            matches!(directive_type, ids::SCRIPT_SRC | ids::DEFAULT_SRC)
        }
        SourceExpression::UnsafeInline => {
            matches!(directive_type, ids::SCRIPT_SRC | ids::STYLE_SRC | ids::DEFAULT_SRC)
        }
        _ => true,
    }
}
