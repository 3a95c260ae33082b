use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

use crate::records::Mention;

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\w&/#])#(\w+)").unwrap());
// Name words only: a leading word plus up to three capitalized words of two
// or more letters ("O'Brien" counts, "I" and "I'm" do not). Digits and
// punctuation runs end the capture.
static MENTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w.])@([A-Za-z][A-Za-z'\-]*(?: [A-Z](?:[A-Za-z][A-Za-z'\-]*|'[A-Z][A-Za-z\-]*)){0,3})")
        .unwrap()
});
static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

static BADGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\{:[A-Za-z]+\}\s*").unwrap());
static ACCOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+(?:has\s+an?\s+)?(?:premium\s+|verified\s+)?account$").unwrap()
});
static HONORIFIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:mr|ms|mrs|mx|dr|prof)\.?\s+").unwrap());
static CREDENTIAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:,\s*|\s+)(?:ph\.?\s?d\.?|mba|m\.d\.|md|cpa|cfa|pmp|esq\.?)$").unwrap()
});
static SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// UI labels that sit where a person's name would and must never be taken for one.
const RESERVED_NAME_TOKENS: &[&str] = &[
    "premium", "follow", "following", "like", "comment", "repost", "send", "share", "more",
    "verified", "author", "you", "promoted", "edited", "reply", "connect", "message", "play",
    "unmute", "load more comments", "show translation", "see translation", "top voice",
    "contact info", "feed post", "activity", "posts", "comments", "reactions", "all activity",
];
const RESERVED_NAME_PREFIXES: &[&str] = &["view ", "show all", "see all", "load more", "activate "];

const EMPLOYMENT_TYPES: &[&str] = &[
    "full-time", "part-time", "contract", "freelance", "internship", "self-employed",
    "seasonal", "apprenticeship", "remote", "hybrid", "on-site", "show all", "see all",
];

/// Hashtags in first-seen order, without the `#`, deduplicated case-insensitively.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tags = Vec::new();
    for caps in HASHTAG_RE.captures_iter(text) {
        let tag = &caps[1];
        if tag.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if seen.insert(tag.to_lowercase()) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// `@Name` mentions in first-seen order, deduplicated case-insensitively.
/// Links are not recoverable from captured text and stay `None`.
pub fn extract_mentions(text: &str) -> Vec<Mention> {
    let mut seen = HashSet::new();
    let mut mentions = Vec::new();
    for caps in MENTION_RE.captures_iter(text) {
        let name = caps[1].trim_end_matches(['\'', '-']).trim();
        if name.chars().count() < 2 {
            continue;
        }
        if seen.insert(name.to_lowercase()) {
            mentions.push(Mention {
                name: name.to_string(),
                link: None,
            });
        }
    }
    mentions
}

/// Jaccard similarity over lowercased word sets.
///
/// Two texts without words are identical (1.0); one empty side scores 0.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let words = |s: &str| -> HashSet<String> {
        let lower = s.to_lowercase();
        WORD_RE
            .find_iter(&lower)
            .map(|m| m.as_str().to_string())
            .collect()
    };
    let wa = words(a);
    let wb = words(b);

    if wa.is_empty() && wb.is_empty() {
        return 1.0;
    }
    if wa.is_empty() || wb.is_empty() {
        return 0.0;
    }

    let intersection = wa.intersection(&wb).count();
    let union = wa.union(&wb).count();
    #[allow(clippy::cast_precision_loss)]
    let score = intersection as f64 / union as f64;
    score
}

/// Strip badge markers, a trailing "account" qualifier, honorifics and
/// credential suffixes from a display name.
///
/// Every step only removes text, so iterating to a fixpoint terminates and
/// makes the function idempotent.
pub fn clean_profile_name(name: &str) -> String {
    let mut current = SPACES_RE.replace_all(name.trim(), " ").into_owned();
    loop {
        let mut next = BADGE_RE.replace_all(&current, " ").into_owned();
        next = ACCOUNT_RE.replace(&next, "").into_owned();
        next = HONORIFIC_RE.replace(&next, "").into_owned();
        next = CREDENTIAL_RE.replace(&next, "").into_owned();
        next = SPACES_RE.replace_all(next.trim(), " ").into_owned();
        next = next.trim_end_matches(',').trim().to_string();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Heuristic check for a line that names a person.
///
/// Starts with a capital letter, contains only name characters, is not a
/// reserved UI token and is not `own_name`.
pub fn is_plausible_person_name(line: &str, own_name: Option<&str>) -> bool {
    let trimmed = line.trim();
    let len = trimmed.chars().count();
    if !(2..=80).contains(&len) {
        return false;
    }
    if !trimmed.chars().next().is_some_and(char::is_uppercase) {
        return false;
    }
    if !trimmed
        .chars()
        .all(|c| c.is_alphabetic() || matches!(c, ' ' | '.' | '\'' | '-' | ','))
    {
        return false;
    }
    if trimmed.split_whitespace().count() > 6 {
        return false;
    }

    let lower = trimmed.to_lowercase();
    if RESERVED_NAME_TOKENS.contains(&lower.as_str())
        || RESERVED_NAME_PREFIXES.iter().any(|p| lower.starts_with(p))
    {
        return false;
    }

    if let Some(own) = own_name {
        let own = clean_profile_name(own);
        if !own.is_empty() && clean_profile_name(trimmed).eq_ignore_ascii_case(&own) {
            return false;
        }
    }

    true
}

/// Loose check for an employer line: not an employment type, not a URL, has letters.
pub fn is_valid_company_name(line: &str) -> bool {
    let trimmed = line.trim();
    let len = trimmed.chars().count();
    if !(2..=150).contains(&len) {
        return false;
    }
    let lower = trimmed.to_lowercase();
    if EMPLOYMENT_TYPES.contains(&lower.as_str()) || lower.starts_with("http") {
        return false;
    }
    trimmed.chars().any(char::is_alphabetic)
}

/// Deterministic record id: readable prefix, content prefix and timestamp,
/// plus a short digest over every identifying part so distinct records with
/// the same prefix do not collide.
pub fn record_id(prefix: &str, content: Option<&str>, timestamp: Option<&str>, extra: &[&str]) -> String {
    let prefix_part = sanitize_id_part(if prefix.trim().is_empty() { "unknown" } else { prefix }, 20);
    let content_part = sanitize_id_part(content.unwrap_or("item"), 20).to_lowercase();
    let time_part = timestamp
        .map(|t| sanitize_id_part(t, 15))
        .unwrap_or_else(|| "undated".to_string());

    let mut material = vec![prefix, content.unwrap_or(""), timestamp.unwrap_or("")];
    material.extend_from_slice(extra);
    let digest = format!("{:x}", Sha256::digest(material.join("\u{1f}").as_bytes()));

    format!("{prefix_part}_{content_part}_{time_part}_{}", &digest[..8])
}

fn sanitize_id_part(s: &str, max_chars: usize) -> String {
    s.trim()
        .chars()
        .take(max_chars)
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}
