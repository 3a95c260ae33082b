use std::sync::LazyLock;

use regex::Regex;

use super::normalize::is_ui_residue_line;
use crate::records::MediaKind;

static FOLLOW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\+?\s*follow(?:ing)?$").unwrap());
static VISIBILITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|•\s*)visible\s+to\b").unwrap());
static ELLIPSIS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:(?:…|\.\.\.)\s*(?:see\s+)?more|see\s+more)$").unwrap());
static ACTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:Like|Comment|Repost|Send|Share|Reply|Like\s*[·•]\s*Reply)(?:\s+(?:Like|Comment|Repost|Send|Share|Reply))*$")
        .unwrap()
});
static ENGAGEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)^(?:
            \d[\d,.]*[kmb]?\s*(?:comments?|reposts?|likes?|reactions?|replies|reply)\b.*
          | \d[\d,.]*[kmb]?
          | .+\s+and\s+\d[\d,.]*[kmb]?\s+others?
        )$",
    )
    .unwrap()
});
static REACTION_ICON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:like|love|celebrate|support|insightful|funny|curious)(?:\s*(?:like|love|celebrate|support|insightful|funny|curious))*$")
        .unwrap()
});
static DEGREE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[•·]\s*)?(?:1st|2nd|3rd\+?|You|Author|Following)(?:\s+degree\s+connection)?$").unwrap()
});
static TIMESTAMP_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\d{1,3}\s?(?:mo|yr|[smhdwy]|(?:second|minute|hour|day|week|month|year)s?)\b(?:\s*ago)?\s*(?:•.*)?$",
    )
    .unwrap()
});

/// What one captured line is, as far as layout is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Follow,
    Visibility,
    Timestamp,
    DegreeMarker,
    Engagement,
    ReactionIcons,
    Action,
    Media(MediaKind),
    Ellipsis,
    Residue,
    Text,
}

impl LineKind {
    /// Lines that close an authored-content region.
    pub fn ends_content(self) -> bool {
        matches!(
            self,
            LineKind::Ellipsis
                | LineKind::Engagement
                | LineKind::ReactionIcons
                | LineKind::Action
                | LineKind::Media(_)
                | LineKind::Follow
                | LineKind::Visibility
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    pub text: &'a str,
    pub kind: LineKind,
}

/// Split a capture on the activity delimiter.
///
/// Text before the first delimiter is page chrome and is dropped, as are
/// blocks whose trimmed length is under `min_chars`. A capture with no
/// delimiter yields nothing.
pub fn segment_blocks<'a>(raw: &'a str, delimiter: &Regex, min_chars: usize) -> Vec<&'a str> {
    delimiter
        .split(raw)
        .skip(1)
        .filter(|block| block.trim().chars().count() >= min_chars)
        .collect()
}

pub fn classify_lines(block: &str) -> Vec<Line<'_>> {
    block
        .lines()
        .map(|raw| {
            let text = raw.trim();
            Line {
                text,
                kind: classify_line(text),
            }
        })
        .collect()
}

pub fn classify_line(line: &str) -> LineKind {
    if line.is_empty() {
        return LineKind::Blank;
    }
    if FOLLOW_RE.is_match(line) {
        return LineKind::Follow;
    }
    if VISIBILITY_RE.is_match(line) {
        return LineKind::Visibility;
    }
    if ELLIPSIS_RE.is_match(line) {
        return LineKind::Ellipsis;
    }
    if let Some(kind) = media_kind(line) {
        return LineKind::Media(kind);
    }
    if ACTION_RE.is_match(line) {
        return LineKind::Action;
    }
    if DEGREE_RE.is_match(line) {
        return LineKind::DegreeMarker;
    }
    if TIMESTAMP_LINE_RE.is_match(line) {
        return LineKind::Timestamp;
    }
    if ENGAGEMENT_RE.is_match(line) {
        return LineKind::Engagement;
    }
    if REACTION_ICON_RE.is_match(line) {
        return LineKind::ReactionIcons;
    }
    if is_ui_residue_line(line) {
        return LineKind::Residue;
    }
    LineKind::Text
}

fn media_kind(line: &str) -> Option<MediaKind> {
    let lower = line.to_lowercase();
    if lower.starts_with("activate to view larger image") {
        Some(MediaKind::Image)
    } else if lower == "play" || lower.starts_with("play video") {
        Some(MediaKind::Video)
    } else if lower.starts_with("view document") {
        Some(MediaKind::Document)
    } else if lower == "web link" {
        Some(MediaKind::WebLink)
    } else {
        None
    }
}

/// Index of the line holding byte offset `pos` of the block.
pub fn line_index_at(block: &str, pos: usize) -> usize {
    block[..pos.min(block.len())].matches('\n').count()
}
