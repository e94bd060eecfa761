/*!
 * Access Policy
 * Combines the global and per-user rule tiers into one decision
 */

use log::debug;
use serde::{Deserialize, Serialize};

use super::rules::{is_hidden, PolicyDecision, RuleDefault, RuleSet};
use crate::errors::{FsError, FsResult};

/// Anything that can gate a virtual path
pub trait Checker: Send + Sync {
    /// True when `path` may be accessed
    fn check(&self, path: &str) -> bool;

    /// `PermissionDenied` unless `check` allows the path
    fn ensure(&self, path: &str) -> FsResult<()> {
        if self.check(path) {
            Ok(())
        } else {
            Err(FsError::PermissionDenied(path.to_string()))
        }
    }
}

/// A lone rule set is fail-open
impl Checker for RuleSet {
    fn check(&self, path: &str) -> bool {
        self.is_allowed(path, RuleDefault::Allow)
    }
}

/// Two-tier access policy
///
/// Access needs both the global (server) tier and the per-user tier to allow.
/// A deny from either blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessPolicy {
    pub global: RuleSet,
    pub user: RuleSet,
    /// Decision for a tier where no rule matches
    pub unmatched: RuleDefault,
    /// Deny paths whose final segment starts with `.`
    pub hide_dotfiles: bool,
}

impl AccessPolicy {
    pub fn new(global: RuleSet, user: RuleSet) -> Self {
        Self {
            global,
            user,
            ..Self::default()
        }
    }

    pub fn with_unmatched(mut self, unmatched: RuleDefault) -> Self {
        self.unmatched = unmatched;
        self
    }

    pub fn with_hide_dotfiles(mut self, hide: bool) -> Self {
        self.hide_dotfiles = hide;
        self
    }

    /// Combined decision for `path`
    pub fn evaluate(&self, path: &str) -> PolicyDecision {
        if self.hide_dotfiles && is_hidden(path) {
            debug!("Hidden path denied: {}", path);
            return PolicyDecision::Deny;
        }

        let global = self.global.is_allowed(path, self.unmatched);
        let user = self.user.is_allowed(path, self.unmatched);
        debug!(
            "Access check for {}: global={}, user={}",
            path, global, user
        );

        if global && user {
            PolicyDecision::Allow
        } else {
            PolicyDecision::Deny
        }
    }
}

impl Checker for AccessPolicy {
    fn check(&self, path: &str) -> bool {
        self.evaluate(path) == PolicyDecision::Allow
    }
}
