//! Century labels attached to episodes, and their conversion to year spans.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static ORDINAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b")
        .unwrap_or_else(|e| unreachable!("ordinal pattern is valid: {e}"))
});

static BEFORE_CHRIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(bc|bce|b\.c\.|b\.c\.e\.)(\W|$)")
        .unwrap_or_else(|e| unreachable!("era pattern is valid: {e}"))
});

const WORD_ORDINALS: [&str; 21] = [
    "first",
    "second",
    "third",
    "fourth",
    "fifth",
    "sixth",
    "seventh",
    "eighth",
    "ninth",
    "tenth",
    "eleventh",
    "twelfth",
    "thirteenth",
    "fourteenth",
    "fifteenth",
    "sixteenth",
    "seventeenth",
    "eighteenth",
    "nineteenth",
    "twentieth",
    "twenty-first",
];

/// Century labels keyed by episode number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CenturyLabels(BTreeMap<u32, String>);

impl CenturyLabels {
    #[must_use]
    pub const fn new(labels: BTreeMap<u32, String>) -> Self {
        Self(labels)
    }

    /// Label for an episode, if any non-blank label exists.
    #[must_use]
    pub fn get(&self, episode: u32) -> Option<&str> {
        self.0
            .get(&episode)
            .map(|label| label.trim())
            .filter(|label| !label.is_empty())
    }
}

/// Convert a century label into an inclusive `(from, to)` year span.
///
/// AD century `n` covers `(n-1)*100 ..= n*100-1`; BC century `n` covers
/// `-(n*100) ..= -((n-1)*100+1)`. A single `early`/`mid`/`late` century
/// narrows to the matching third. Several centuries take their union.
#[must_use]
pub fn century_span(label: &str) -> Option<(i32, i32)> {
    let lower = label.to_lowercase();
    let bc = BEFORE_CHRIST.is_match(&lower);

    let mut centuries: Vec<i32> = ORDINAL
        .captures_iter(&lower)
        .filter_map(|caps| caps[1].parse::<i32>().ok())
        .filter(|&n| n > 0)
        .collect();

    if centuries.is_empty() {
        centuries = WORD_ORDINALS
            .iter()
            .zip(1..22)
            .rev()
            .filter(|(word, _)| lower.contains(**word))
            .map(|(_, n)| n)
            .take(1)
            .collect();
    }

    let spans: Vec<(i32, i32)> = centuries
        .iter()
        .map(|&n| {
            if bc {
                (-(n * 100), -((n - 1) * 100 + 1))
            } else {
                ((n - 1) * 100, n * 100 - 1)
            }
        })
        .collect();

    let from = spans.iter().map(|(from, _)| *from).min()?;
    let to = spans.iter().map(|(_, to)| *to).max()?;

    if spans.len() == 1 {
        if lower.contains("early") {
            return Some((from, from + 32));
        }
        if lower.contains("mid") {
            return Some((from + 33, from + 66));
        }
        if lower.contains("late") {
            return Some((from + 67, to));
        }
    }

    Some((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("15th century", (1400, 1499))]
    #[case("1st century", (0, 99))]
    #[case("21st Century", (2000, 2099))]
    #[case("5th century BC", (-500, -401))]
    #[case("1st century BCE", (-100, -1))]
    #[case("early 16th century", (1500, 1532))]
    #[case("mid-16th century", (1533, 1566))]
    #[case("late 16th century", (1567, 1599))]
    #[case("15th-16th centuries", (1400, 1599))]
    #[case("Fifteenth century", (1400, 1499))]
    #[case("twenty-first century", (2000, 2099))]
    #[case("the first century", (0, 99))]
    #[case("eighteenth century", (1700, 1799))]
    #[case("late seventeenth century", (1667, 1699))]
    #[case("fifth century BC", (-500, -401))]
    fn spans(#[case] label: &str, #[case] expected: (i32, i32)) {
        assert_eq!(century_span(label), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("medieval")]
    #[case("0th century")]
    fn unparseable(#[case] label: &str) {
        assert_eq!(century_span(label), None);
    }

    #[test]
    fn labels_deserialize_from_string_keys() {
        let labels: CenturyLabels =
            serde_json::from_str(r#"{"10": "15th century", "11": "  "}"#).unwrap();
        assert_eq!(labels.get(10), Some("15th century"));
        assert_eq!(labels.get(11), None);
        assert_eq!(labels.get(12), None);
    }
}
