//! Rule registry.
//!
//! A [`Rule`] binds a field-key pattern to a translation function. Rules are
//! grouped in named [`RuleSet`]s, and a model stacks rule sets from the most
//! generic to the most specific. [`RuleRegistry::build`] resolves the stack
//! once into a flat lookup table:
//!
//! - a rule in a more specific set is found before any rule of a less
//!   specific set;
//! - a rule flagged [`Rule::overriding`] removes inherited rules with the
//!   same pattern;
//! - the same pattern registered twice without `override` is a
//!   configuration error.
//!
//! Patterns are either a literal five-character key (`tag+ind1+ind2`, blank
//! indicators written as space or `_`), a control tag (`001`), or a regex
//! over the key when the pattern starts with `^`.

use crate::document::Document;
use crate::error::{IngestError, Result, RuleError};
use crate::fragment::{Fragment, Merge, Property};
use crate::record::RawField;
use indexmap::IndexMap;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;

/// Result of applying one rule to one field instance.
///
/// Genuine failures are the `Err` side of the rule function's return value.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    /// Fragments to merge, in order.
    Emit(Vec<Fragment>),
    /// The rule chose to ignore this field instance.
    Skip,
}

impl RuleOutcome {
    /// A single fragment.
    #[must_use]
    pub fn emit(property: Property) -> Self {
        RuleOutcome::Emit(vec![Fragment::new(property)])
    }

    /// Several fragments; an empty list is a skip.
    #[must_use]
    pub fn many(fragments: Vec<Fragment>) -> Self {
        if fragments.is_empty() {
            RuleOutcome::Skip
        } else {
            RuleOutcome::Emit(fragments)
        }
    }
}

/// Signature of every rule function.
///
/// The document is the partial output built so far; rules read it (to detect
/// a second title, for example) but never write to it.
pub type RuleFn = fn(&Document, &RawField) -> std::result::Result<RuleOutcome, RuleError>;

/// A field-key pattern bound to a translation function.
#[derive(Clone)]
pub struct Rule {
    pattern: String,
    name: &'static str,
    apply: RuleFn,
    merge: Merge,
    override_inherited: bool,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("pattern", &self.pattern)
            .field("name", &self.name)
            .field("merge", &self.merge)
            .field("override", &self.override_inherited)
            .finish()
    }
}

impl Rule {
    fn new(pattern: &str, name: &'static str, apply: RuleFn, merge: Merge) -> Self {
        Rule {
            pattern: normalize_pattern(pattern),
            name,
            apply,
            merge,
            override_inherited: false,
        }
    }

    /// Rule whose fragments replace the current value.
    #[must_use]
    pub fn assign(pattern: &str, name: &'static str, apply: RuleFn) -> Self {
        Rule::new(pattern, name, apply, Merge::Assign)
    }

    /// Rule whose fragments extend the current value.
    #[must_use]
    pub fn append(pattern: &str, name: &'static str, apply: RuleFn) -> Self {
        Rule::new(pattern, name, apply, Merge::Append)
    }

    /// Shadow inherited rules registered under the same pattern.
    #[must_use]
    pub fn overriding(mut self) -> Self {
        self.override_inherited = true;
        self
    }

    /// Normalised pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Output property the rule feeds, used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Default merge mode of the rule's fragments.
    #[must_use]
    pub fn merge(&self) -> Merge {
        self.merge
    }

    /// Whether the rule shadows inherited rules.
    #[must_use]
    pub fn is_override(&self) -> bool {
        self.override_inherited
    }

    /// Run the rule on one field instance.
    ///
    /// # Errors
    ///
    /// Whatever the rule function raises.
    pub fn apply(
        &self,
        document: &Document,
        field: &RawField,
    ) -> std::result::Result<RuleOutcome, RuleError> {
        (self.apply)(document, field)
    }
}

fn normalize_pattern(pattern: &str) -> String {
    if pattern.starts_with('^') {
        pattern.to_string()
    } else {
        pattern.replace(' ', "_")
    }
}

/// Compiled form of a rule pattern.
#[derive(Debug, Clone)]
pub enum KeyPattern {
    /// Exact key.
    Literal(String),
    /// Anchored regex over the key.
    Regex(Regex),
}

impl KeyPattern {
    /// Compile a pattern.
    ///
    /// # Errors
    ///
    /// `Configuration` for an invalid regex.
    pub fn parse(pattern: &str) -> Result<Self> {
        if pattern.starts_with('^') {
            let anchored = if pattern.ends_with('$') {
                pattern.to_string()
            } else {
                format!("{pattern}$")
            };
            Regex::new(&anchored).map(KeyPattern::Regex).map_err(|e| {
                IngestError::Configuration(format!("invalid rule pattern '{pattern}': {e}"))
            })
        } else {
            Ok(KeyPattern::Literal(normalize_pattern(pattern)))
        }
    }

    /// Whether `key` matches.
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        match self {
            KeyPattern::Literal(literal) => literal == key,
            KeyPattern::Regex(re) => re.is_match(key),
        }
    }
}

/// Named list of rules contributed by one model layer.
#[derive(Debug, Clone)]
pub struct RuleSet {
    name: &'static str,
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Create an empty rule set.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        RuleSet {
            name,
            rules: Vec::new(),
        }
    }

    /// Builder helper: add a rule.
    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add a rule.
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Name of the set.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Rules in registration order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

#[derive(Debug, Clone)]
struct Resolved {
    rule: Rule,
    pattern: KeyPattern,
    depth: usize,
}

/// Flat, read-only rule table of one model.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<Resolved>,
    literals: HashMap<String, usize>,
    /// Regex rules, most specific layer first.
    regexes: Vec<usize>,
}

impl RuleRegistry {
    /// Resolve rule sets given from the most generic to the most specific.
    ///
    /// # Errors
    ///
    /// `Configuration` on an invalid regex pattern, or on a pattern
    /// registered twice without `override`.
    pub fn build(layers: &[&RuleSet]) -> Result<Self> {
        let mut table: IndexMap<String, (Rule, usize, &'static str)> = IndexMap::new();
        for (depth, layer) in layers.iter().enumerate() {
            for rule in layer.rules() {
                if let Some(owner) = table.get(rule.pattern()).map(|(_, _, owner)| *owner) {
                    if !rule.is_override() {
                        return Err(IngestError::Configuration(format!(
                            "rule pattern '{}' of '{}' already registered by '{}'",
                            rule.pattern(),
                            layer.name(),
                            owner
                        )));
                    }
                    table.shift_remove(rule.pattern());
                }
                table.insert(rule.pattern().to_string(), (rule.clone(), depth, layer.name()));
            }
        }

        let mut registry = RuleRegistry::default();
        for (pattern, (rule, depth, _)) in table {
            let compiled = KeyPattern::parse(&pattern)?;
            let index = registry.rules.len();
            match &compiled {
                KeyPattern::Literal(literal) => {
                    registry.literals.insert(literal.clone(), index);
                },
                KeyPattern::Regex(_) => registry.regexes.push(index),
            }
            registry.rules.push(Resolved {
                rule,
                pattern: compiled,
                depth,
            });
        }
        let rules = &registry.rules;
        registry.regexes.sort_by(|a, b| rules[*b].depth.cmp(&rules[*a].depth));
        Ok(registry)
    }

    /// Rule for a field key, if any.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&Rule> {
        let literal = self.literals.get(key).map(|&i| &self.rules[i]);
        let regex = self
            .regexes
            .iter()
            .map(|&i| &self.rules[i])
            .find(|r| r.pattern.matches(key));
        match (literal, regex) {
            (Some(l), Some(r)) if r.depth > l.depth => Some(&r.rule),
            (Some(l), _) => Some(&l.rule),
            (None, Some(r)) => Some(&r.rule),
            (None, None) => None,
        }
    }

    /// Number of resolved rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when no rule is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
