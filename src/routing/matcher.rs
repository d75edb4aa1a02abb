//! Rule matching module
//!
//! Literal prefix matching over the rule set, in declared order.

use super::rule::{Rule, RuleSet};

/// Find the first rule whose prefix starts the given path
#[must_use]
pub fn match_rule<'a>(path: &str, rules: &'a RuleSet) -> Option<&'a Rule> {
    rules.rules().iter().find(|rule| rule.matches(path))
}
