pub mod activity;
pub mod comments;
pub mod profile;
pub mod reactions;

use std::sync::LazyLock;

use regex::Regex;

use super::blocks::{Line, LineKind};
use super::normalize::{clean_duplicate_content_with, strip_ui_residue};
use super::rules::extract_timestamp;
use super::tokens::is_plausible_person_name;
use crate::records::{Confidence, FieldProvenance, Media, MediaKind};

static DEGREE_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[•·]\s*(?:1st|2nd|3rd\+?|You|Author)\s*$").unwrap());

/// Authored text of a post body and where it sits in the block.
#[derive(Debug)]
pub(crate) struct ContentRegion {
    pub text: String,
    /// First line after the region; engagement lives from here on.
    pub end: usize,
    pub rule: &'static str,
}

impl ContentRegion {
    pub fn provenance(&self, field: &str) -> FieldProvenance {
        let confidence = if self.rule == "after_visibility" {
            Confidence::High
        } else {
            Confidence::Medium
        };
        FieldProvenance::new(field, self.rule, confidence)
    }
}

/// The post body that follows the first Follow or visibility line at or
/// after `from`, up to the first end marker or the next author header.
pub(crate) fn content_region(lines: &[Line<'_>], from: usize, mirror_min_chars: usize) -> Option<ContentRegion> {
    let marker = (from..lines.len()).find(|&i| matches!(lines[i].kind, LineKind::Follow | LineKind::Visibility))?;
    let rule = if lines[marker].kind == LineKind::Visibility {
        "after_visibility"
    } else {
        "after_follow"
    };

    let mut i = marker + 1;
    while i < lines.len()
        && matches!(
            lines[i].kind,
            LineKind::Follow
                | LineKind::Visibility
                | LineKind::Timestamp
                | LineKind::DegreeMarker
                | LineKind::Residue
                | LineKind::Blank
        )
    {
        i += 1;
    }

    let mut kept = Vec::new();
    while i < lines.len() {
        let line = lines[i];
        if line.kind.ends_content() || starts_author_block(lines, i) {
            break;
        }
        if !matches!(line.kind, LineKind::DegreeMarker | LineKind::Residue) {
            kept.push(line.text);
        }
        i += 1;
    }

    let text = clean_duplicate_content_with(&strip_ui_residue(&kept.join("\n")), mirror_min_chars)?;
    if text.is_empty() {
        return None;
    }
    Some(ContentRegion { text, end: i, rule })
}

// A person-name line rendered twice (or followed by a degree marker) with
// header metadata close behind opens another post.
fn starts_author_block(lines: &[Line<'_>], i: usize) -> bool {
    let line = lines[i];
    if line.kind != LineKind::Text || !is_plausible_person_name(strip_degree_suffix(line.text), None) {
        return false;
    }
    let rest = &lines[i + 1..];
    let repeated = rest
        .iter()
        .find(|l| l.kind != LineKind::Blank)
        .is_some_and(|next| next.text == line.text || next.kind == LineKind::DegreeMarker);
    repeated
        && rest.iter().take(6).any(|l| {
            matches!(
                l.kind,
                LineKind::DegreeMarker | LineKind::Follow | LineKind::Timestamp | LineKind::Visibility
            )
        })
}

/// Drop a trailing `• 2nd`-style connection marker from a name line.
pub(crate) fn strip_degree_suffix(line: &str) -> &str {
    DEGREE_SUFFIX_RE
        .find(line)
        .map_or(line, |m| &line[..m.start()])
        .trim()
}

/// Name, headline and timestamp of the post author named near `from`.
#[derive(Debug, Default)]
pub(crate) struct AuthorHeader {
    pub name: String,
    pub index: usize,
    pub headline: Option<String>,
    pub timestamp: Option<(String, FieldProvenance)>,
}

/// First plausible person name at or after `from` (never `own_name`), with
/// the headline and timestamp rendered in the few lines below it.
pub(crate) fn scan_author_header(lines: &[Line<'_>], from: usize, own_name: &str) -> Option<AuthorHeader> {
    let window = lines.iter().enumerate().skip(from).take(12);
    let own_lower = own_name.to_lowercase();
    let mut found = None;
    for (i, line) in window {
        if matches!(
            line.kind,
            LineKind::Visibility | LineKind::Ellipsis | LineKind::Engagement | LineKind::Action
        ) {
            break;
        }
        if line.kind == LineKind::Text {
            let candidate = strip_degree_suffix(line.text);
            let mentions_own = !own_lower.is_empty() && candidate.to_lowercase().contains(&own_lower);
            if !mentions_own && is_plausible_person_name(candidate, Some(own_name)) {
                found = Some((i, candidate));
                break;
            }
        }
    }
    let (index, name) = found?;

    let mut header = AuthorHeader {
        name: name.to_string(),
        index,
        ..AuthorHeader::default()
    };
    for line in lines.iter().skip(index + 1).take(6) {
        match line.kind {
            LineKind::Timestamp => {
                if header.timestamp.is_none() {
                    header.timestamp = extract_timestamp(line.text);
                }
            }
            LineKind::Visibility => {
                if header.timestamp.is_none() {
                    header.timestamp = extract_timestamp(line.text);
                }
                break;
            }
            LineKind::Text if strip_degree_suffix(line.text) == name => {}
            LineKind::Text if header.headline.is_none() && line.text.chars().count() > 3 => {
                header.headline = Some(line.text.to_string());
            }
            LineKind::Ellipsis | LineKind::Engagement | LineKind::Action | LineKind::Media(_) => break,
            _ => {}
        }
    }
    Some(header)
}

/// Media placeholders in the block, one per kind, in first-seen order.
pub(crate) fn collect_media(lines: &[Line<'_>]) -> Vec<Media> {
    let mut media: Vec<Media> = Vec::new();
    for line in lines {
        if let LineKind::Media(kind) = line.kind {
            if media.iter().any(|m| m.kind == kind) {
                continue;
            }
            let description = match kind {
                MediaKind::Image => "Image",
                MediaKind::Video => "Video",
                MediaKind::Document => "Document",
                MediaKind::WebLink => "Web link",
            };
            media.push(Media {
                kind,
                description: description.to_string(),
            });
        }
    }
    media
}

/// Regex source matching `name` literally, tolerant of whitespace runs.
pub(crate) fn name_pattern(name: &str) -> String {
    name.split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}

/// First line whose text equals `name` ignoring case, searching backwards
/// from `before` (exclusive) down to `after` (exclusive).
pub(crate) fn last_name_line(lines: &[Line<'_>], name: &str, after: usize, before: usize) -> Option<usize> {
    (after + 1..before.min(lines.len()))
        .rev()
        .find(|&i| strip_degree_suffix(lines[i].text).eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::blocks::classify_lines;

    #[test]
    fn region_after_visibility() {
        let lines = classify_lines("\nVisible to anyone on or off LinkedIn\nHello #World\n2 comments");
        let region = content_region(&lines, 0, 100).unwrap();
        assert_eq!(region.text, "Hello #World");
        assert_eq!(region.rule, "after_visibility");
        assert_eq!(lines[region.end].text, "2 comments");
    }

    #[test]
    fn region_stops_at_next_author() {
        let block = "Follow\nFirst post body\nJohn Roe\nJohn Roe\n• 2nd\n1w •\nOther body";
        let lines = classify_lines(block);
        let region = content_region(&lines, 0, 100).unwrap();
        assert_eq!(region.text, "First post body");
    }

    #[test]
    fn region_needs_a_marker() {
        let lines = classify_lines("Just text\nwith no markers");
        assert!(content_region(&lines, 0, 100).is_none());
    }

    #[test]
    fn author_header() {
        let block = "Jane Doe reposted this\nJohn Roe\nJohn Roe\n• 2nd\nCTO at Acme\n1w •\nFollow\nBody";
        let lines = classify_lines(block);
        let header = scan_author_header(&lines, 1, "Jane Doe").unwrap();
        assert_eq!(header.name, "John Roe");
        assert_eq!(header.index, 1);
        assert_eq!(header.headline.as_deref(), Some("CTO at Acme"));
        assert_eq!(header.timestamp.map(|(t, _)| t).as_deref(), Some("1w"));
    }

    #[test]
    fn degree_suffix() {
        assert_eq!(strip_degree_suffix("John Roe • 2nd"), "John Roe");
        assert_eq!(strip_degree_suffix("John Roe"), "John Roe");
    }

    #[test]
    fn name_pattern_escapes() {
        let re = Regex::new(&format!("(?i){} reposted", name_pattern("J. (Jay)  Doe"))).unwrap();
        assert!(re.is_match("j. (jay) doe reposted"));
    }
}
