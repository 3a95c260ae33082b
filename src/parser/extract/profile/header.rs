//! Intro block of a profile page: everything above the first section title.

use std::sync::LazyLock;

use regex::Regex;

use crate::parser::extract::strip_degree_suffix;
use crate::parser::rules::{count_group, CONNECTIONS_RULES, FOLLOWERS_RULES};
use crate::parser::tokens::is_plausible_person_name;
use crate::records::{Confidence, FieldProvenance};

static PRONOUNS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:she|he|they|ze|xe)\s*/\s*(?:her|him|them|hers|his|theirs|hir|xem)(?:\s*/\s*\w+)?$").unwrap()
});
static DEGREE_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[·•]?\s*(?:1st|2nd|3rd\+?)$").unwrap());
static CONTACT_INFO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.*?)[\s·•|]*contact\s+info\s*$").unwrap());
static MUTUAL_OTHERS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.+?)\s+and\s+\d[\d,]*\s+other\s+mutual\s+connections?$").unwrap()
});
static MUTUAL_PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.+?)\s+and\s+(.+?)\s+are\s+mutual\s+connections$").unwrap());
static MUTUAL_ONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.+?)\s+is\s+a\s+mutual\s+connection$").unwrap());

/// Navigation chrome captured above the profile card.
const NAV_LINES: &[&str] = &[
    "home", "my network", "jobs", "messaging", "notifications", "me", "for business",
    "try premium for free", "search", "skip to main content", "reactivate premium",
];
const BADGE_LINES: &[&str] = &["verified", "premium", "top voice", "open to work", "hiring"];
const NAME_SCAN_LINES: usize = 10;

#[derive(Debug, Default)]
pub(super) struct Header {
    pub name: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub followers: Option<u64>,
    pub connections: Option<String>,
    pub mutual_connections: Vec<String>,
}

pub(super) fn extract(intro: &[&str], existing: Option<&str>, provenance: &mut Vec<FieldProvenance>) -> Header {
    let discovered = intro
        .iter()
        .take(NAME_SCAN_LINES)
        .position(|l| is_name_line(l));

    let name = match existing {
        Some(name) => {
            provenance.push(FieldProvenance::new("name", "existing_name", Confidence::High));
            Some(name.to_string())
        }
        None => discovered.map(|i| {
            provenance.push(FieldProvenance::new("name", "first_name_line", Confidence::Medium));
            strip_degree_suffix(intro[i]).to_string()
        }),
    };

    // Without a name line the headline search starts at the top.
    let after_name = discovered.map_or(0, |i| i + 1);
    let headline = intro
        .iter()
        .skip(after_name)
        .find(|l| is_headline_line(l))
        .map(|l| {
            provenance.push(FieldProvenance::new("headline", "line_after_name", Confidence::Medium));
            l.to_string()
        });

    let location = location(intro, headline.as_deref()).map(|loc| {
        provenance.push(FieldProvenance::new("location", "contact_info_line", Confidence::Medium));
        loc
    });

    let joined = intro.join("\n");
    let followers = FOLLOWERS_RULES.first_map(&joined, count_group).map(|(n, prov)| {
        provenance.push(prov);
        n
    });
    let connections = CONNECTIONS_RULES
        .first_map(&joined, |hit| hit.group(1).map(str::to_string))
        .map(|(c, prov)| {
            provenance.push(prov);
            c
        });

    Header {
        name,
        headline,
        location,
        followers,
        connections,
        mutual_connections: mutual_connections(intro),
    }
}

fn is_name_line(line: &str) -> bool {
    let candidate = strip_degree_suffix(line);
    let lower = candidate.to_lowercase();
    !NAV_LINES.contains(&lower.as_str())
        && candidate.split_whitespace().count() >= 2
        && is_plausible_person_name(candidate, None)
}

fn is_headline_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    line.chars().count() > 5
        && !PRONOUNS_RE.is_match(line)
        && !DEGREE_LINE_RE.is_match(line)
        && !BADGE_LINES.contains(&lower.as_str())
        && !NAV_LINES.contains(&lower.as_str())
        && !["contact info", "followers", "connections", "mutual connection"]
            .iter()
            .any(|marker| lower.contains(marker))
}

// The location shares a line with "Contact info", or sits right above it.
fn location(intro: &[&str], headline: Option<&str>) -> Option<String> {
    let at = intro.iter().position(|l| CONTACT_INFO_RE.is_match(l))?;
    let prefix = CONTACT_INFO_RE
        .captures(intro[at])
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default();
    if !prefix.is_empty() {
        return Some(prefix);
    }
    at.checked_sub(1)
        .map(|i| intro[i].trim().to_string())
        .filter(|l| !l.is_empty() && Some(l.as_str()) != headline && is_headline_line(l))
}

fn mutual_connections(intro: &[&str]) -> Vec<String> {
    for line in intro {
        if let Some(caps) = MUTUAL_OTHERS_RE.captures(line) {
            return split_names(&caps[1]);
        }
        if let Some(caps) = MUTUAL_PAIR_RE.captures(line) {
            let mut names = split_names(&caps[1]);
            names.push(caps[2].trim().to_string());
            return names;
        }
        if let Some(caps) = MUTUAL_ONE_RE.captures(line) {
            return vec![caps[1].trim().to_string()];
        }
    }
    Vec::new()
}

fn split_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect()
}
