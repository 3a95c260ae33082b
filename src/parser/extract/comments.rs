use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::{content_region, last_name_line, name_pattern, scan_author_header, strip_degree_suffix};
use crate::config::ParserConfig;
use crate::parser::blocks::{classify_lines, line_index_at, Line, LineKind};
use crate::parser::normalize::{clean_duplicate_content, extract_content_snippet, strip_ui_residue};
use crate::parser::numeric::parse_scaled_count;
use crate::parser::rules::extract_timestamp;
use crate::parser::tokens::{clean_profile_name, record_id};
use crate::records::{CommentRecord, Confidence, FieldProvenance, PostReference, ReplyTarget};

static COMMENT_LIKES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d[\d,.]*[kmb]?)(?:\s+(?:likes?|reactions?))?$").unwrap());

/// How far below a comment header its timestamp may sit.
const TIMESTAMP_WINDOW: usize = 5;

/// Name-anchored patterns for one profile.
pub(crate) struct CommentPatterns {
    pub indicator: Regex,
    reply_target: Regex,
}

impl CommentPatterns {
    /// `None` for a blank name: without it no block can be attributed.
    pub fn new(name: &str) -> Option<Self> {
        if name.is_empty() {
            return None;
        }
        let pat = name_pattern(name);
        let indicator = Regex::new(&format!(r"(?i)\b{pat}\s+(commented\s+on|replied\s+to)\b")).ok()?;
        let reply_target = Regex::new(&format!(r"(?i)\b{pat}\s+replied\s+to\s+(.{{1,80}}?)['’]s\s+comment")).ok()?;
        Some(Self { indicator, reply_target })
    }
}

/// A comment as rendered under its author header.
#[derive(Debug)]
pub(crate) struct CommentBody {
    pub text: String,
    pub headline: Option<String>,
    pub timestamp: Option<(String, FieldProvenance)>,
    pub likes: Option<u64>,
}

pub fn extract(blocks: &[&str], profile_name: &str, config: &ParserConfig) -> Vec<CommentRecord> {
    let name = clean_profile_name(profile_name);
    let Some(patterns) = CommentPatterns::new(&name) else {
        debug!("no profile name, comments cannot be attributed");
        return Vec::new();
    };

    blocks
        .iter()
        .enumerate()
        .filter_map(|(i, block)| {
            let record = parse_block(block, &name, &patterns, config);
            if record.is_none() {
                debug!(block = i, "comment block skipped");
            }
            record
        })
        .collect()
}

fn parse_block(block: &str, name: &str, patterns: &CommentPatterns, config: &ParserConfig) -> Option<CommentRecord> {
    let indicator_match = patterns.indicator.find(block)?;
    let lines = classify_lines(block);
    let indicator = line_index_at(block, indicator_match.end());

    let (own_at, body) = own_comment(&lines, indicator, name)?;
    let mut provenance = vec![FieldProvenance::new("text", "own_comment_header", Confidence::Medium)];

    let header = scan_author_header(&lines, indicator + 1, name);
    let region = content_region(&lines, indicator + 1, config.mirror_min_chars);
    let on_original_post = PostReference {
        author: header.as_ref().map(|h| h.name.clone()),
        author_headline: header.as_ref().and_then(|h| h.headline.clone()),
        timestamp: header.as_ref().and_then(|h| h.timestamp.as_ref()).map(|(t, _)| t.clone()),
        content_snippet: region
            .as_ref()
            .and_then(|r| extract_content_snippet(&r.text, config.comment_snippet_words)),
    };

    let is_reply_to = patterns.reply_target.captures(block).map(|caps| {
        let author = caps[1].trim().to_string();
        let comment_snippet = last_name_line(&lines, &author, indicator, own_at)
            .and_then(|at| scan_comment_body(&lines, at, &author))
            .and_then(|parent| extract_content_snippet(&parent.text, config.reply_snippet_words));
        provenance.push(FieldProvenance::new("isReplyTo", "replied_to_phrase", Confidence::High));
        ReplyTarget { author, comment_snippet }
    });

    let timestamp = body.timestamp.map(|(ts, prov)| {
        provenance.push(prov);
        ts
    });
    if body.likes.is_some() {
        provenance.push(FieldProvenance::new("likes", "count_after_terminator", Confidence::Medium));
    }

    let post_author = on_original_post.author.as_deref().unwrap_or("");
    let post_snippet = on_original_post.content_snippet.as_deref().unwrap_or("");
    let id = record_id(
        &format!("comment_{name}"),
        Some(body.text.as_str()),
        timestamp.as_deref(),
        &[post_author, post_snippet],
    );

    Some(CommentRecord {
        id,
        text: body.text,
        timestamp,
        likes: body.likes,
        on_original_post,
        is_reply_to,
        provenance,
    })
}

/// The profile's own comment: the body under the last header line carrying
/// the profile name after the activity indicator.
pub(crate) fn own_comment(lines: &[Line<'_>], indicator: usize, name: &str) -> Option<(usize, CommentBody)> {
    let at = last_name_line(lines, name, indicator, lines.len())?;
    scan_comment_body(lines, at, name).map(|body| (at, body))
}

/// Comment text rendered under the header line at `header`, up to the
/// Like/Reply bar.
pub(crate) fn scan_comment_body(lines: &[Line<'_>], header: usize, author: &str) -> Option<CommentBody> {
    let stamp_at = lines
        .iter()
        .enumerate()
        .skip(header + 1)
        .take(TIMESTAMP_WINDOW)
        .find(|(_, l)| l.kind == LineKind::Timestamp)
        .map(|(i, _)| i);

    let mut headline = None;
    let mut timestamp = None;
    let mut i = header + 1;
    match stamp_at {
        Some(at) => {
            headline = lines[header + 1..at]
                .iter()
                .find(|l| l.kind == LineKind::Text && !strip_degree_suffix(l.text).eq_ignore_ascii_case(author))
                .map(|l| l.text.to_string());
            timestamp = extract_timestamp(lines[at].text);
            i = at + 1;
        }
        None => {
            while i < lines.len()
                && (matches!(lines[i].kind, LineKind::Blank | LineKind::DegreeMarker | LineKind::Residue)
                    || strip_degree_suffix(lines[i].text).eq_ignore_ascii_case(author))
            {
                i += 1;
            }
        }
    }

    let mut kept = Vec::new();
    while i < lines.len() {
        let line = lines[i];
        match line.kind {
            LineKind::Action
            | LineKind::Engagement
            | LineKind::ReactionIcons
            | LineKind::Follow
            | LineKind::Visibility
            | LineKind::Media(_) => break,
            LineKind::Residue | LineKind::DegreeMarker | LineKind::Ellipsis => {}
            _ => kept.push(line.text),
        }
        i += 1;
    }

    let text = clean_duplicate_content(&strip_ui_residue(&kept.join("\n")))?;
    if text.is_empty() {
        return None;
    }

    Some(CommentBody {
        text,
        headline,
        timestamp,
        likes: likes_after(lines, i),
    })
}

// The like count sits in the Like/Reply bar, before the next text line.
fn likes_after(lines: &[Line<'_>], from: usize) -> Option<u64> {
    for line in lines.iter().skip(from).take(5) {
        match line.kind {
            LineKind::Text => return None,
            LineKind::Engagement => {
                if let Some(caps) = COMMENT_LIKES_RE.captures(line.text) {
                    return parse_scaled_count(&caps[1]);
                }
            }
            _ => {}
        }
    }
    None
}
