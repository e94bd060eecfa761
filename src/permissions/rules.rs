/*!
 * Access Rules
 * Ordered allow/deny rules matched by prefix or regex against virtual paths
 */

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{FsError, FsResult};

/// How a rule's pattern is matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Exact string prefix, no normalization of the pattern
    Prefix,
    /// Unanchored regex search
    Regex,
}

/// Outcome of evaluating a rule or rule list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    Allow,
    Deny,
    /// Nothing matched
    Abstain,
}

impl PolicyDecision {
    /// Collapse to a boolean, using `unmatched` when nothing matched
    #[inline]
    #[must_use]
    pub const fn resolve(self, unmatched: RuleDefault) -> bool {
        match self {
            Self::Allow => true,
            Self::Deny => false,
            Self::Abstain => matches!(unmatched, RuleDefault::Allow),
        }
    }
}

/// Decision for paths no rule matches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleDefault {
    /// Fail-open
    #[default]
    Allow,
    /// Fail-closed
    Deny,
}

/// Wire form of a rule
#[derive(Serialize, Deserialize)]
struct RuleSpec {
    kind: MatchKind,
    allow: bool,
    pattern: String,
}

/// A single allow/deny directive
///
/// Immutable once built. Regex rules compile at construction, so a rule that
/// exists always has a usable matcher and can be shared across threads.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "RuleSpec", into = "RuleSpec")]
pub struct Rule {
    kind: MatchKind,
    allow: bool,
    pattern: String,
    regex: Option<Regex>,
}

impl Rule {
    /// Prefix rule
    pub fn prefix(pattern: impl Into<String>, allow: bool) -> Self {
        Self {
            kind: MatchKind::Prefix,
            allow,
            pattern: pattern.into(),
            regex: None,
        }
    }

    /// Regex rule; fails with `InvalidOption` when the pattern does not compile
    pub fn regex(pattern: impl Into<String>, allow: bool) -> FsResult<Self> {
        let pattern = pattern.into();
        let regex = Regex::new(&pattern)
            .map_err(|e| FsError::InvalidOption(format!("rule regex {:?}: {}", pattern, e)))?;
        Ok(Self {
            kind: MatchKind::Regex,
            allow,
            pattern,
            regex: Some(regex),
        })
    }

    pub fn allow_prefix(pattern: impl Into<String>) -> Self {
        Self::prefix(pattern, true)
    }

    pub fn deny_prefix(pattern: impl Into<String>) -> Self {
        Self::prefix(pattern, false)
    }

    #[inline]
    pub fn kind(&self) -> MatchKind {
        self.kind
    }

    #[inline]
    pub fn allow(&self) -> bool {
        self.allow
    }

    #[inline]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Check whether the rule applies to `path`
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match (&self.kind, &self.regex) {
            (MatchKind::Regex, Some(regex)) => regex.is_match(path),
            (MatchKind::Regex, None) => false,
            (MatchKind::Prefix, _) => path.starts_with(&self.pattern),
        }
    }

    /// Allow/Deny when the rule matches, Abstain otherwise
    #[must_use]
    pub fn decide(&self, path: &str) -> PolicyDecision {
        if !self.matches(path) {
            PolicyDecision::Abstain
        } else if self.allow {
            PolicyDecision::Allow
        } else {
            PolicyDecision::Deny
        }
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.allow == other.allow && self.pattern == other.pattern
    }
}

impl Eq for Rule {}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("kind", &self.kind)
            .field("allow", &self.allow)
            .field("pattern", &self.pattern)
            .finish()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.allow { "allow" } else { "deny" };
        let kind = match self.kind {
            MatchKind::Prefix => "path",
            MatchKind::Regex => "regex",
        };
        write!(f, "{} {} {}", verb, kind, self.pattern)
    }
}

impl TryFrom<RuleSpec> for Rule {
    type Error = FsError;

    fn try_from(wire: RuleSpec) -> Result<Self, Self::Error> {
        match wire.kind {
            MatchKind::Prefix => Ok(Self::prefix(wire.pattern, wire.allow)),
            MatchKind::Regex => Self::regex(wire.pattern, wire.allow),
        }
    }
}

impl From<Rule> for RuleSpec {
    fn from(rule: Rule) -> Self {
        Self {
            kind: rule.kind,
            allow: rule.allow,
            pattern: rule.pattern,
        }
    }
}

/// Evaluate `rules` last to first; the first match decides
#[must_use]
pub fn evaluate(path: &str, rules: &[Rule]) -> PolicyDecision {
    for rule in rules.iter().rev() {
        let decision = rule.decide(path);
        if decision != PolicyDecision::Abstain {
            log::debug!("Rule '{}' decided {:?} for {}", rule, decision, path);
            return decision;
        }
    }
    log::debug!("No rule matched {}", path);
    PolicyDecision::Abstain
}

/// Fail-open check: unmatched paths are allowed
#[must_use]
pub fn is_allowed(path: &str, rules: &[Rule]) -> bool {
    evaluate(path, rules).resolve(RuleDefault::Allow)
}

/// True when the final segment of `path` starts with `.`
#[must_use]
pub fn is_hidden(path: &str) -> bool {
    path.split('/')
        .filter(|s| !s.is_empty())
        .last()
        .is_some_and(|name| name.starts_with('.'))
}

/// Ordered rule list for one tier (global or per-user)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Append a rule; later rules take precedence
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Remove the rule at `index`, returning it
    pub fn remove(&mut self, index: usize) -> Option<Rule> {
        (index < self.rules.len()).then(|| self.rules.remove(index))
    }

    #[inline]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn evaluate(&self, path: &str) -> PolicyDecision {
        evaluate(path, &self.rules)
    }

    pub fn is_allowed(&self, path: &str, unmatched: RuleDefault) -> bool {
        self.evaluate(path).resolve(unmatched)
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        Self::new(rules)
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
