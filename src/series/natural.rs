//! Human natural ordering of series keys.
//!
//! Keys are split into tokens: runs of ASCII digits and single non-space
//! characters, with whitespace between tokens ignored. Digit runs compare by
//! numeric value and everything else compares as text, so `cpu2` sorts
//! before `cpu10` and `cpu 2` equals `cpu2`.

use std::cmp::Ordering;
use std::fmt;

struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.rest = self.rest.trim_start();
        let first = self.rest.chars().next()?;
        let len = if first.is_ascii_digit() {
            self.rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(self.rest.len())
        } else {
            first.len_utf8()
        };
        let (token, rest) = self.rest.split_at(len);
        self.rest = rest;
        Some(token)
    }
}

fn tokens(s: &str) -> Tokens<'_> {
    Tokens { rest: s }
}

fn is_number(token: &str) -> bool {
    token.starts_with(|c: char| c.is_ascii_digit())
}

fn compare_numbers(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Compares two strings in natural order.
///
/// Strings whose tokens are all equal compare as equal even if their
/// spelling differs (`"02"` and `"2"`, `" cpu42"` and `"cpu 42"`); a string
/// that runs out of tokens first is the smaller one.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = tokens(a);
    let mut right = tokens(b);
    loop {
        match (left.next(), right.next()) {
            (Some(u), Some(v)) => {
                let order = if is_number(u) && is_number(v) {
                    compare_numbers(u, v)
                } else {
                    u.cmp(v)
                };
                if order != Ordering::Equal {
                    return order;
                }
            }
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (None, None) => return Ordering::Equal,
        }
    }
}

/// A map key ordered by [`natural_cmp`], ties broken by plain text order so
/// that distinct strings never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey(String);

impl NaturalKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NaturalKey {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for NaturalKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Ord for NaturalKey {
    fn cmp(&self, other: &Self) -> Ordering {
        natural_cmp(&self.0, &other.0).then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for NaturalKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_cmp_table() {
        let cases = [
            ("1", "2", Ordering::Less),
            ("1", "10", Ordering::Less),
            ("1", "100", Ordering::Less),
            ("11", "10", Ordering::Greater),
            ("10", "10", Ordering::Equal),
            ("2", "1", Ordering::Greater),
            ("2", "10", Ordering::Less),
            ("02", "10", Ordering::Less),
            ("02", "1", Ordering::Greater),
            ("a", "b", Ordering::Less),
            ("a", "aa", Ordering::Less),
            ("c", "a", Ordering::Greater),
            ("d", "d", Ordering::Equal),
            ("qw42", "ab42", Ordering::Greater),
            ("qw42", "ab43", Ordering::Greater),
            ("ab42", "ab43", Ordering::Less),
            ("ab420", "ab43", Ordering::Greater),
            ("ab42cd", "ab42", Ordering::Greater),
            ("ab42cd", "ab42cd", Ordering::Equal),
            ("ab42cd2", "ab42cd10", Ordering::Less),
            ("cpu 2", "cpu10", Ordering::Less),
            ("cpu 1core10", "cpu1 core 2", Ordering::Greater),
            (" cpu42", "  cpu     42   ", Ordering::Equal),
            (" cpu42", "  cpu     120   ", Ordering::Less),
            ("cpu 2", "cpu2core3", Ordering::Less),
            ("cpu 1 core 10 thread1", "cpu1core2thread2", Ordering::Greater),
            ("", "cpu", Ordering::Less),
            ("all", "0", Ordering::Greater),
            ("cpu1", "cpu", Ordering::Greater),
        ];
        for (a, b, expected) in cases {
            assert_eq!(natural_cmp(a, b), expected, "{a:?} vs {b:?}");
            assert_eq!(natural_cmp(b, a), expected.reverse(), "{b:?} vs {a:?}");
        }
    }

    #[test]
    fn test_large_numbers_do_not_overflow() {
        assert_eq!(
            natural_cmp("disk99999999999999999999999", "disk100000000000000000000000"),
            Ordering::Less
        );
    }

    #[test]
    fn test_natural_key_sorting() {
        let mut keys: Vec<NaturalKey> = ["cpu2", "cpu10", "cpu1"]
            .into_iter()
            .map(NaturalKey::from)
            .collect();
        keys.sort();
        let sorted: Vec<&str> = keys.iter().map(NaturalKey::as_str).collect();
        assert_eq!(sorted, vec!["cpu1", "cpu2", "cpu10"]);
    }

    #[test]
    fn test_natural_key_tie_break() {
        let a = NaturalKey::from("02");
        let b = NaturalKey::from("2");
        assert_eq!(natural_cmp(a.as_str(), b.as_str()), Ordering::Equal);
        assert_ne!(a.cmp(&b), Ordering::Equal);
    }
}
