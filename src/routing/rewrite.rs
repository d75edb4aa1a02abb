//! Path rewriting
//!
//! A rewrite is a pure anchored substitution: the pattern is replaced only
//! when it sits at the very start of the path.

use std::borrow::Cow;

/// Per-rule path transformation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// Forward the path untouched
    Identity,
    /// Replace a leading `pattern` with `replacement`
    Anchored {
        pattern: String,
        replacement: String,
    },
}

impl Rewrite {
    /// Remove a leading prefix, e.g. `/api/foo` -> `/foo`
    #[must_use]
    pub fn strip_prefix(prefix: &str) -> Self {
        Self::Anchored {
            pattern: prefix.to_string(),
            replacement: String::new(),
        }
    }

    /// Map a path onto itself. Spelled out so the forwarded path stays pinned
    /// even if prefix matching changes.
    #[must_use]
    pub fn pin(path: &str) -> Self {
        Self::Anchored {
            pattern: path.to_string(),
            replacement: path.to_string(),
        }
    }

    /// Apply to a request path (no query string). The result always starts
    /// with `/`.
    #[must_use]
    pub fn apply<'a>(&self, path: &'a str) -> Cow<'a, str> {
        match self {
            Self::Identity => Cow::Borrowed(path),
            Self::Anchored {
                pattern,
                replacement,
            } => match path.strip_prefix(pattern.as_str()) {
                Some(rest) => {
                    let rewritten = format!("{replacement}{rest}");
                    // Joined onto the target root: always slash-led
                    if rewritten.starts_with('/') {
                        Cow::Owned(rewritten)
                    } else {
                        Cow::Owned(format!("/{rewritten}"))
                    }
                }
                None => Cow::Borrowed(path),
            },
        }
    }
}

/// Rewrite the path of a path-and-query string, reattaching the query
#[must_use]
pub fn rewrite_path_and_query(rewrite: Option<&Rewrite>, path: &str, query: Option<&str>) -> String {
    let path = rewrite.map_or(Cow::Borrowed(path), |r| r.apply(path));
    match query {
        Some(q) => format!("{path}?{q}"),
        None => path.into_owned(),
    }
}
