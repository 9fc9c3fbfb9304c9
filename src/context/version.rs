//! Perl version numbers and their ordering

use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};

/// A module version as written in source. Ordering follows Perl's rules: a
/// decimal version like `1.02` is split into three-digit groups (`1.020`)
/// and compared component-wise against dotted versions like `v1.20.0`.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    parts: Vec<u64>,
}

impl Version {
    pub fn parse(text: &str) -> Version {
        let raw = text.trim();
        Version {
            raw: raw.to_string(),
            parts: components(raw),
        }
    }

    /// The "any version" requirement.
    pub fn zero() -> Version {
        Version {
            raw: "0".to_string(),
            parts: vec![],
        }
    }

    pub fn is_zero(&self) -> bool {
        self.parts
            .iter()
            .all(|&n| n == 0)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn components(raw: &str) -> Vec<u64> {
    let text: String = raw
        .chars()
        .filter(|&c| c != '_')
        .collect();

    let dotted = text.starts_with('v')
        || text
            .matches('.')
            .count()
            > 1;

    let text = text.trim_start_matches('v');

    if dotted {
        return text
            .split('.')
            .map(|part| {
                part.parse()
                    .unwrap_or(0)
            })
            .collect();
    }

    let (integer, fraction) = match text.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (text, ""),
    };

    let mut parts = vec![integer
        .parse()
        .unwrap_or(0)];

    let digits: Vec<char> = fraction
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    for chunk in digits.chunks(3) {
        let mut group: String = chunk
            .iter()
            .collect();
        while group.len() < 3 {
            group.push('0');
        }
        parts.push(
            group
                .parse()
                .unwrap_or(0),
        );
    }

    parts
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let width = self
            .parts
            .len()
            .max(
                other
                    .parts
                    .len(),
            );

        for i in 0..width {
            let a = self
                .parts
                .get(i)
                .copied()
                .unwrap_or(0);
            let b = other
                .parts
                .get(i)
                .copied()
                .unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }

        Ordering::Equal
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

#[cfg(test)]
mod check {
    use super::*;

    fn v(text: &str) -> Version {
        Version::parse(text)
    }

    #[test]
    fn decimal_versions() {
        assert!(v("1.23") > v("1.2"));
        assert!(v("1.02") < v("1.1"));
        assert_eq!(v("1.10"), v("1.1"));
        assert!(v("0.88") > v("0.8"));
        assert!(v("2") > v("1.999"));
    }

    #[test]
    fn dotted_versions() {
        assert_eq!(v("v5.10.1"), v("5.010001"));
        assert_eq!(v("5.10.0"), v("5.010"));
        assert!(v("v1.2.3") < v("v1.10.0"));
        assert_eq!(v("1.002_003"), v("v1.2.3"));
    }

    #[test]
    fn zero() {
        assert!(Version::zero().is_zero());
        assert!(v("0").is_zero());
        assert!(v("0.000").is_zero());
        assert!(!v("0.01").is_zero());
        assert!(v("0.01") > Version::zero());
    }
}
