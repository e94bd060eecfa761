/*!
 * Permissions Module
 * Rule evaluation for virtual paths
 *
 * ## Features
 * - Ordered allow/deny rules, evaluated last to first
 * - Prefix and regex matching (regex compiled once, at construction)
 * - Two-tier policy: global and per-user rule sets must both allow
 * - Configurable decision for unmatched paths (fail-open by default)
 *
 * ## Usage
 * ```
 * use scopefs::permissions::{AccessPolicy, Checker, Rule, RuleSet};
 *
 * let policy = AccessPolicy::new(
 *     RuleSet::new(vec![Rule::deny_prefix("/a"), Rule::allow_prefix("/a/b")]),
 *     RuleSet::default(),
 * );
 * assert!(policy.check("/a/b/c"));
 * assert!(!policy.check("/a/x"));
 * ```
 */

pub mod policy;
pub mod rules;

pub use policy::{AccessPolicy, Checker};
pub use rules::{
    evaluate, is_allowed, is_hidden, MatchKind, PolicyDecision, Rule, RuleDefault, RuleSet,
};
