//! Key patterns and key comparison.
//!
//! Patterns constrain which keys a hash table walk or index scan visits.
//! String-bearing keys (simple string keys and composite keys) support
//! prefix and LIKE matching on their string component; every key type
//! supports exact and inclusive range matching.
//!
//! # LIKE patterns
//!
//! - `%` matches zero or more characters
//! - `_` matches exactly one character
//!
//! Matching is case-sensitive and operates on Unicode scalar values.

use crate::error::Result;
use crate::key::Key;
use std::cmp::Ordering;

/// Three-way comparison of two keys of the same type.
pub fn compare(a: &Key, b: &Key) -> Result<Ordering> {
    a.compare(b)
}

/// A constraint on keys.
#[derive(Clone, Debug, PartialEq)]
pub enum KeyPattern {
    /// Every key.
    Any,
    /// Keys equal to the given key.
    Exact(Key),
    /// Keys whose string component starts with the prefix.
    Prefix(String),
    /// Keys whose string component matches a LIKE pattern.
    Like(String),
    /// Keys within inclusive bounds; a missing bound is open.
    Range { lo: Option<Key>, hi: Option<Key> },
}

impl KeyPattern {
    /// Creates an inclusive range pattern.
    pub fn range(lo: Key, hi: Key) -> Self {
        KeyPattern::Range {
            lo: Some(lo),
            hi: Some(hi),
        }
    }

    /// Creates a pattern for keys at or above `lo`.
    pub fn at_least(lo: Key) -> Self {
        KeyPattern::Range { lo: Some(lo), hi: None }
    }

    /// Creates a pattern for keys at or below `hi`.
    pub fn at_most(hi: Key) -> Self {
        KeyPattern::Range { lo: None, hi: Some(hi) }
    }

    /// Returns true if `key` satisfies the pattern.
    ///
    /// A key whose type differs from the pattern's key never matches.
    pub fn matches(&self, key: &Key) -> bool {
        match self {
            KeyPattern::Any => true,
            KeyPattern::Exact(k) => matches!(key.compare(k), Ok(Ordering::Equal)),
            KeyPattern::Prefix(prefix) => key.text().is_some_and(|t| t.starts_with(prefix.as_str())),
            KeyPattern::Like(pattern) => key.text().is_some_and(|t| like(t, pattern)),
            KeyPattern::Range { lo, hi } => {
                let above = match lo {
                    Some(lo) => matches!(key.compare(lo), Ok(Ordering::Greater | Ordering::Equal)),
                    None => true,
                };
                let below = match hi {
                    Some(hi) => matches!(key.compare(hi), Ok(Ordering::Less | Ordering::Equal)),
                    None => true,
                };
                above && below
            }
        }
    }
}

/// Free-function form of [`KeyPattern::matches`].
pub fn matches(key: &Key, pattern: &KeyPattern) -> bool {
    pattern.matches(key)
}

/// SQL LIKE pattern matching.
///
/// ```
/// use sos_core::pattern_match::like;
/// assert!(like("node01", "node%"));
/// assert!(like("node01", "node_1"));
/// assert!(!like("node01", "host%"));
/// ```
pub fn like(value: &str, pattern: &str) -> bool {
    let v: Vec<char> = value.chars().collect();
    let p: Vec<char> = pattern.chars().collect();
    like_at(&v, &p, 0, 0)
}

fn like_at(v: &[char], p: &[char], vi: usize, pi: usize) -> bool {
    if pi == p.len() {
        return vi == v.len();
    }
    match p[pi] {
        '%' => (vi..=v.len()).any(|skip| like_at(v, p, skip, pi + 1)),
        '_' => vi < v.len() && like_at(v, p, vi + 1, pi + 1),
        ch => vi < v.len() && v[vi] == ch && like_at(v, p, vi + 1, pi + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn s(text: &str) -> Key {
        Key::Simple(Value::from(text))
    }

    fn u(n: u32) -> Key {
        Key::Simple(Value::UInt32(n))
    }

    #[test]
    fn test_exact() {
        assert!(KeyPattern::Exact(u(5)).matches(&u(5)));
        assert!(!KeyPattern::Exact(u(5)).matches(&u(6)));
        assert!(!KeyPattern::Exact(u(5)).matches(&Key::Simple(Value::UInt64(5))));
    }

    #[test]
    fn test_prefix() {
        let p = KeyPattern::Prefix("job.".into());
        assert!(p.matches(&s("job.1")));
        assert!(!p.matches(&s("jobs")));
        assert!(p.matches(&Key::composite("job.7", Value::UInt32(1)).unwrap()));
        assert!(!p.matches(&u(1)));
    }

    #[test]
    fn test_like() {
        assert!(like("", "%"));
        assert!(like("abc", "a%c"));
        assert!(like("abc", "___"));
        assert!(!like("abc", "__"));
        assert!(KeyPattern::Like("n_de%".into()).matches(&s("node42")));
    }

    #[test]
    fn test_range_inclusive() {
        let p = KeyPattern::range(u(10), u(20));
        assert!(!p.matches(&u(9)));
        assert!(p.matches(&u(10)));
        assert!(p.matches(&u(20)));
        assert!(!p.matches(&u(21)));
        assert!(!p.matches(&s("15")));

        assert!(KeyPattern::at_least(u(3)).matches(&u(100)));
        assert!(!KeyPattern::at_most(u(3)).matches(&u(4)));
    }

    #[test]
    fn test_compare_free_function() {
        assert_eq!(compare(&u(1), &u(2)).unwrap(), Ordering::Less);
        assert!(compare(&u(1), &s("1")).is_err());
        assert!(matches(&u(1), &KeyPattern::Any));
    }
}
