//! Named, ordered extraction rules.
//!
//! Every heuristic that fills a field lives in a [`RuleSet`] for that field.
//! Rules are tried in order and the first one that yields a usable value
//! wins; the winning rule's name and confidence travel with the record as
//! provenance.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::numeric::parse_scaled_count;
use crate::records::{Confidence, Engagement, FieldProvenance};

pub struct Rule {
    pub name: &'static str,
    pub pattern: Regex,
    pub confidence: Confidence,
}

impl Rule {
    pub fn new(name: &'static str, pattern: &str, confidence: Confidence) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            pattern: Regex::new(pattern)?,
            confidence,
        })
    }
}

/// One match of one rule.
pub struct RuleHit<'t> {
    pub rule: &'static str,
    pub confidence: Confidence,
    pub captures: Captures<'t>,
}

impl<'t> RuleHit<'t> {
    pub fn group(&self, i: usize) -> Option<&'t str> {
        self.captures.get(i).map(|m| m.as_str())
    }

    pub fn provenance(&self, field: &str) -> FieldProvenance {
        FieldProvenance::new(field, self.rule, self.confidence)
    }
}

pub struct RuleSet {
    pub field: &'static str,
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(field: &'static str, rules: Vec<Rule>) -> Self {
        Self { field, rules }
    }

    /// Append a rule at the lowest priority.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// First match, in rule order, for which `map` produces a value.
    ///
    /// A match whose value fails to parse falls through to the rule's next
    /// match and then to the next rule.
    pub fn first_map<'t, T>(
        &self,
        text: &'t str,
        map: impl Fn(&RuleHit<'t>) -> Option<T>,
    ) -> Option<(T, FieldProvenance)> {
        for rule in &self.rules {
            for captures in rule.pattern.captures_iter(text) {
                let hit = RuleHit {
                    rule: rule.name,
                    confidence: rule.confidence,
                    captures,
                };
                if let Some(value) = map(&hit) {
                    return Some((value, hit.provenance(self.field)));
                }
            }
        }
        None
    }
}

fn build(field: &'static str, table: &[(&'static str, &str, Confidence)]) -> RuleSet {
    let rules = table
        .iter()
        .map(|(name, pattern, confidence)| Rule::new(*name, pattern, *confidence).expect("static rule pattern compiles"))
        .collect();
    RuleSet::new(field, rules)
}

const MONTH: &str = r"(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?";

pub static TIMESTAMP_RULES: LazyLock<RuleSet> = LazyLock::new(|| {
    let absolute = format!(r"(?i)\b({MONTH}\s+\d{{1,2}},?\s+\d{{4}})\b");
    build(
        "timestamp",
        &[
            (
                "relative_abbrev_bullet",
                r"(?i)\b(\d{1,3}\s?(?:mo|yr|[smhdwy]))\b(?:\s*ago)?\s*•",
                Confidence::High,
            ),
            (
                "relative_words_bullet",
                r"(?i)\b(\d{1,3}\s+(?:second|minute|hour|day|week|month|year)s?(?:\s+ago)?)\s*•",
                Confidence::High,
            ),
            (
                "relative_token_line",
                r"(?im)^[ \t]*(\d{1,3}(?:mo|yr|[smhdwy]))(?:[ \t]+ago)?[ \t]*$",
                Confidence::Medium,
            ),
            (
                "relative_words_ago",
                r"(?i)\b(\d{1,3}\s+(?:second|minute|hour|day|week|month|year)s?\s+ago)\b",
                Confidence::Medium,
            ),
            ("absolute_month_day_year", absolute.as_str(), Confidence::Medium),
            (
                "numeric_date",
                r"\b(\d{1,2}/\d{1,2}/(?:\d{4}|\d{2}))\b",
                Confidence::Low,
            ),
        ],
    )
});

pub static LIKES_RULES: LazyLock<RuleSet> = LazyLock::new(|| {
    build(
        "likes",
        &[
            (
                "count_likes",
                r"(?i)\b(\d[\d,.]*[kmb]?)\s*(?:likes?|reactions?)\b",
                Confidence::High,
            ),
            (
                "names_and_others",
                r"(?m)^([A-Z][^\n•]{0,80}?)\s+and\s+(\d[\d,.]*[kKmMbB]?)\s+others?\b",
                Confidence::High,
            ),
            (
                "reaction_icon_count",
                r"(?mi)^[ \t]*(?:like|love|celebrate|support|insightful|funny|curious)[a-z \t]*\n[ \t]*(\d[\d,.]*[kmb]?)[ \t]*$",
                Confidence::Low,
            ),
        ],
    )
});

pub static COMMENTS_RULES: LazyLock<RuleSet> = LazyLock::new(|| {
    build(
        "commentsCount",
        &[(
            "count_comments",
            r"(?i)\b(\d[\d,.]*[kmb]?)\s*comments?\b",
            Confidence::High,
        )],
    )
});

pub static REPOSTS_RULES: LazyLock<RuleSet> = LazyLock::new(|| {
    build(
        "repostsCount",
        &[(
            "count_reposts",
            r"(?i)\b(\d[\d,.]*[kmb]?)\s*reposts?\b",
            Confidence::High,
        )],
    )
});

pub static FOLLOWERS_RULES: LazyLock<RuleSet> = LazyLock::new(|| {
    build(
        "followers",
        &[(
            "count_followers",
            r"(?i)\b(\d[\d,.]*[kmb]?)\+?\s*followers\b",
            Confidence::High,
        )],
    )
});

pub static CONNECTIONS_RULES: LazyLock<RuleSet> = LazyLock::new(|| {
    build(
        "connections",
        &[(
            "count_connections",
            r"(?i)\b(\d[\d,]*\+?)\s*connections\b",
            Confidence::High,
        )],
    )
});

/// Timestamp from the first matching rule, with its provenance.
pub fn extract_timestamp(text: &str) -> Option<(String, FieldProvenance)> {
    TIMESTAMP_RULES.first_map(text, |hit| hit.group(1).map(|t| t.trim().to_string()))
}

/// Like, comment and repost counts, each from its own rule chain.
pub fn extract_engagement(text: &str) -> (Engagement, Vec<FieldProvenance>) {
    let mut provenance = Vec::new();
    let mut take = |found: Option<(u64, FieldProvenance)>| {
        found.map(|(value, prov)| {
            provenance.push(prov);
            value
        })
    };

    let likes = take(LIKES_RULES.first_map(text, likes_value));
    let comments_count = take(COMMENTS_RULES.first_map(text, count_group));
    let reposts_count = take(REPOSTS_RULES.first_map(text, count_group));

    (
        Engagement {
            likes,
            comments_count,
            reposts_count,
        },
        provenance,
    )
}

/// Parsed count from capture group 1.
pub fn count_group(hit: &RuleHit<'_>) -> Option<u64> {
    hit.group(1).and_then(parse_scaled_count)
}

// "Jane Doe, John Roe and 40 others" counts the named reactors too.
fn likes_value(hit: &RuleHit<'_>) -> Option<u64> {
    if hit.rule == "names_and_others" {
        let named = hit.group(1)?.matches(',').count() as u64 + 1;
        let others = hit.group(2).and_then(parse_scaled_count)?;
        return Some(others + named);
    }
    count_group(hit)
}
