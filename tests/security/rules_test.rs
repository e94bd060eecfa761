/*!
 * Rule Engine Tests
 * Precedence, tier combination and the unmatched decision
 */

use pretty_assertions::assert_eq;
use scopefs::permissions::{
    is_allowed, is_hidden, AccessPolicy, Checker, PolicyDecision, Rule, RuleDefault, RuleSet,
};

#[test]
fn test_last_matching_rule_wins() {
    let rules = vec![Rule::deny_prefix("/a"), Rule::allow_prefix("/a/b")];
    assert!(is_allowed("/a/b/c", &rules));
    assert!(!is_allowed("/a/x", &rules));
    assert!(is_allowed("/elsewhere", &rules));
}

#[test]
fn test_prefix_is_raw_string_prefix() {
    let rules = vec![Rule::deny_prefix("/secret")];
    // No segment awareness: "/secrets" starts with "/secret"
    assert!(!is_allowed("/secrets/x", &rules));
    assert!(is_allowed("/.secret", &rules));
}

#[test]
fn test_regex_rules_are_unanchored() {
    let rules = vec![Rule::regex(r"\.key$", false).unwrap()];
    assert!(!is_allowed("/certs/server.key", &rules));
    assert!(is_allowed("/certs/server.pem", &rules));

    let rules = vec![Rule::regex("tmp", false).unwrap()];
    assert!(!is_allowed("/var/tmp/file", &rules));
}

#[test]
fn test_invalid_regex_rejected() {
    assert!(Rule::regex("(unclosed", true).is_err());
}

#[test]
fn test_two_tier_and() {
    let global_deny = RuleSet::new(vec![Rule::deny_prefix("/shared")]);
    let user_allow = RuleSet::new(vec![Rule::allow_prefix("/shared")]);

    let policy = AccessPolicy::new(global_deny.clone(), user_allow.clone());
    assert!(!policy.check("/shared/file"));

    let policy = AccessPolicy::new(user_allow.clone(), global_deny);
    assert!(!policy.check("/shared/file"));

    let policy = AccessPolicy::new(user_allow.clone(), user_allow);
    assert!(policy.check("/shared/file"));
}

#[test]
fn test_fail_open_and_fail_closed() {
    let open = AccessPolicy::default();
    assert!(open.check("/anything"));

    let closed = AccessPolicy::new(
        RuleSet::new(vec![Rule::allow_prefix("/public")]),
        RuleSet::default(),
    )
    .with_unmatched(RuleDefault::Deny);
    // The empty user tier matches nothing, so it denies too
    assert!(!closed.check("/public/index.html"));

    let closed = AccessPolicy::new(
        RuleSet::new(vec![Rule::allow_prefix("/public")]),
        RuleSet::new(vec![Rule::allow_prefix("/")]),
    )
    .with_unmatched(RuleDefault::Deny);
    assert!(closed.check("/public/index.html"));
    assert!(!closed.check("/private"));
}

#[test]
fn test_terminal_deny_all_convention() {
    let mut rules = RuleSet::new(vec![Rule::allow_prefix("/inbox")]);
    rules.push(Rule::deny_prefix("/"));
    // Appended last, the catch-all shadows every earlier allow
    assert_eq!(rules.evaluate("/inbox/mail"), PolicyDecision::Deny);

    let rules = RuleSet::new(vec![Rule::deny_prefix("/"), Rule::allow_prefix("/inbox")]);
    assert_eq!(rules.evaluate("/inbox/mail"), PolicyDecision::Allow);
    assert_eq!(rules.evaluate("/other"), PolicyDecision::Deny);
}

#[test]
fn test_hidden_paths() {
    assert!(is_hidden("/.git"));
    assert!(is_hidden("/project/.env"));
    assert!(!is_hidden("/.config/app.toml"));
    assert!(!is_hidden("/"));

    let policy = AccessPolicy::default().with_hide_dotfiles(true);
    assert!(!policy.check("/project/.env"));
    assert!(policy.check("/project/env"));
}

#[test]
fn test_rules_from_json() {
    let json = r#"[
        {"kind": "prefix", "allow": false, "pattern": "/private"},
        {"kind": "regex", "allow": true, "pattern": "^/private/shared/"}
    ]"#;
    let rules: RuleSet = serde_json::from_str(json).unwrap();
    assert_eq!(rules.len(), 2);
    assert!(rules.is_allowed("/private/shared/doc", RuleDefault::Allow));
    assert!(!rules.is_allowed("/private/mine", RuleDefault::Allow));

    let bad = r#"[{"kind": "regex", "allow": true, "pattern": "["}]"#;
    assert!(serde_json::from_str::<RuleSet>(bad).is_err());
}
