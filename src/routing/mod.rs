//! Routing module
//!
//! Forwarding rules for the dev server:
//! - Literal prefix matching, first declared rule wins
//! - Per-rule anchored path rewriting
//! - Upstream targets resolved once at startup

mod matcher;
mod rewrite;
mod rule;

pub use matcher::match_rule;
pub use rewrite::{rewrite_path_and_query, Rewrite};
pub use rule::{Rule, RuleSet, Target};
