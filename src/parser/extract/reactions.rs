use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::comments::{own_comment, scan_comment_body, CommentPatterns};
use super::{content_region, last_name_line, name_pattern, scan_author_header};
use crate::config::ParserConfig;
use crate::parser::blocks::{classify_lines, line_index_at, Line};
use crate::parser::normalize::extract_content_snippet;
use crate::parser::tokens::{clean_profile_name, record_id};
use crate::records::{
    Confidence, FieldProvenance, PostContext, ReactionRecord, ReactionTarget, ReactionTargetKind,
};

static COMMENT_AUTHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(.{1,80}?)['’]s\s+comment\b").unwrap());
static COMMENT_ON_POST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bcomment\s+on\s+(.{1,80}?)['’]s\s+post\b").unwrap());
static COMMENT_TARGET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)['’]s\s+comment\b").unwrap());

struct ReactionPatterns {
    verb: Regex,
}

impl ReactionPatterns {
    fn new(name: &str) -> Option<Self> {
        if name.is_empty() {
            return None;
        }
        let verb = Regex::new(&format!(
            r"(?i)\b{}\s+(likes|liked|loves|loved|celebrates|celebrated|supports|supported|finds|found|is\s+curious\s+about|reacted\s+to)\b([^\n]{{0,80}})",
            name_pattern(name)
        ))
        .ok()?;
        Some(Self { verb })
    }
}

/// Map the verb phrase to a reaction type; anything unrecognized is `unspecified`.
pub fn reaction_type(verb: &str, rest: &str) -> &'static str {
    let verb = verb.to_lowercase();
    let rest = rest.to_lowercase();
    match verb.as_str() {
        "likes" | "liked" => "liked",
        "loves" | "loved" => "loved",
        "celebrates" | "celebrated" => "celebrated",
        "supports" | "supported" => "supported",
        "finds" | "found" if rest.contains("insightful") => "insightful",
        "finds" | "found" if rest.contains("funny") => "funny",
        "finds" | "found" if rest.contains("curious") => "curious",
        v if v.starts_with("is") && v.contains("curious") => "curious",
        _ => "unspecified",
    }
}

pub fn extract(blocks: &[&str], profile_name: &str, config: &ParserConfig) -> Vec<ReactionRecord> {
    let name = clean_profile_name(profile_name);
    let Some(patterns) = ReactionPatterns::new(&name) else {
        debug!("no profile name, reactions cannot be attributed");
        return Vec::new();
    };
    let comment_patterns = CommentPatterns::new(&name);

    blocks
        .iter()
        .enumerate()
        .filter_map(|(i, block)| {
            let record = parse_block(block, &name, &patterns, comment_patterns.as_ref(), config);
            if record.is_none() {
                debug!(block = i, "reaction block skipped");
            }
            record
        })
        .collect()
}

fn parse_block(
    block: &str,
    name: &str,
    patterns: &ReactionPatterns,
    comment_patterns: Option<&CommentPatterns>,
    config: &ParserConfig,
) -> Option<ReactionRecord> {
    let caps = patterns.verb.captures(block)?;
    let indicator = line_index_at(block, caps.get(0)?.end());
    let lines = classify_lines(block);
    let rest = caps.get(2).map_or("", |m| m.as_str());
    let reaction = reaction_type(&caps[1], rest);

    // A block that is also a comment by the profile belongs to the comments feed.
    let mut provenance = Vec::new();
    match comment_patterns.and_then(|p| p.indicator.find(block)) {
        Some(m) => {
            if own_comment(&lines, line_index_at(block, m.end()), name).is_some() {
                debug!("block carries the profile's own comment, left to the comments feed");
                return None;
            }
            provenance.push(FieldProvenance::new("reactionType", "verb_phrase_ambiguous", Confidence::Low));
        }
        None => provenance.push(FieldProvenance::new("reactionType", "verb_phrase", Confidence::High)),
    }

    let (reacted_to, original_post_context) = if COMMENT_TARGET_RE.is_match(rest) {
        comment_target(&lines, indicator, name, rest, config, &mut provenance)
    } else {
        (post_target(&lines, indicator, name, config, &mut provenance), None)
    };

    if reacted_to.author.is_none() && reacted_to.content_snippet.is_none() {
        return None;
    }

    let kind = match reacted_to.kind {
        ReactionTargetKind::Post => "post",
        ReactionTargetKind::Comment => "comment",
    };
    let id = record_id(
        &format!("reaction_{name}"),
        reacted_to.content_snippet.as_deref().or(reacted_to.author.as_deref()),
        None,
        &[reaction, kind, reacted_to.author.as_deref().unwrap_or("")],
    );

    Some(ReactionRecord {
        id,
        reaction_type: reaction.to_string(),
        reacted_to,
        original_post_context,
        provenance,
    })
}

fn post_target(
    lines: &[Line<'_>],
    indicator: usize,
    name: &str,
    config: &ParserConfig,
    provenance: &mut Vec<FieldProvenance>,
) -> ReactionTarget {
    let header = scan_author_header(lines, indicator + 1, name);
    let region = content_region(lines, indicator + 1, config.mirror_min_chars);
    if header.is_some() {
        provenance.push(FieldProvenance::new("reactedTo.author", "person_name_scan", Confidence::Medium));
    }
    let (author, author_headline) = match header {
        Some(h) => (Some(h.name), h.headline),
        None => (None, None),
    };
    ReactionTarget {
        kind: ReactionTargetKind::Post,
        author,
        author_headline,
        content_snippet: region.and_then(|r| extract_content_snippet(&r.text, config.reaction_snippet_words)),
    }
}

fn comment_target(
    lines: &[Line<'_>],
    indicator: usize,
    name: &str,
    rest: &str,
    config: &ParserConfig,
    provenance: &mut Vec<FieldProvenance>,
) -> (ReactionTarget, Option<PostContext>) {
    let author = COMMENT_AUTHOR_RE.captures(rest).map(|c| c[1].trim().to_string());
    if author.is_some() {
        provenance.push(FieldProvenance::new("reactedTo.author", "possessive_comment_phrase", Confidence::High));
    }

    let comment_at = author
        .as_deref()
        .and_then(|a| last_name_line(lines, a, indicator, lines.len()));
    let body = comment_at
        .zip(author.as_deref())
        .and_then(|(at, a)| scan_comment_body(lines, at, a));

    let post_header = scan_author_header(lines, indicator + 1, name).filter(|h| Some(h.index) != comment_at);
    let post_author = COMMENT_ON_POST_RE
        .captures(rest)
        .map(|c| c[1].trim().to_string())
        .or_else(|| post_header.map(|h| h.name));
    let post_snippet = content_region(lines, indicator + 1, config.mirror_min_chars)
        .and_then(|r| extract_content_snippet(&r.text, config.reaction_snippet_words));
    let context = (post_author.is_some() || post_snippet.is_some()).then_some(PostContext {
        author: post_author,
        content_snippet: post_snippet,
    });

    let (author_headline, content_snippet) = match body {
        Some(b) => (b.headline, extract_content_snippet(&b.text, config.reaction_snippet_words)),
        None => (None, None),
    };
    (
        ReactionTarget {
            kind: ReactionTargetKind::Comment,
            author,
            author_headline,
            content_snippet,
        },
        context,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract::comments;

    const POST_LIKE: &str = "\nJane Doe likes this\nJohn Roe\nJohn Roe\n• 2nd\nCTO at Acme\n3d •\nFollow\n\
        We are hiring senior Rust engineers in Berlin and remote\n…more\n120 reactions";

    const COMMENT_LIKE: &str = "\nJane Doe likes John Roe’s comment on Ada Lovelace’s post\nAda Lovelace\nAda Lovelace\n\
        • 3rd+\nMathematician\n1w •\nFollow\nAnalytical engines are the future of computing\n10 reactions\n\
        John Roe\nJohn Roe\n• 2nd\nCTO at Acme\n5d\nI disagree, the difference engine is enough.\nLike\nReply";

    fn run(blocks: &[&str]) -> Vec<ReactionRecord> {
        extract(blocks, "Jane Doe", &ParserConfig::default())
    }

    #[test]
    fn post_reaction() {
        let r = &run(&[POST_LIKE])[0];
        assert_eq!(r.reaction_type, "liked");
        assert_eq!(r.reacted_to.kind, ReactionTargetKind::Post);
        assert_eq!(r.reacted_to.author.as_deref(), Some("John Roe"));
        assert_eq!(r.reacted_to.author_headline.as_deref(), Some("CTO at Acme"));
        assert_eq!(
            r.reacted_to.content_snippet.as_deref(),
            Some("We are hiring senior Rust engineers in Berlin and remote")
        );
        assert!(r.original_post_context.is_none());
    }

    #[test]
    fn comment_reaction() {
        let r = &run(&[COMMENT_LIKE])[0];
        assert_eq!(r.reacted_to.kind, ReactionTargetKind::Comment);
        assert_eq!(r.reacted_to.author.as_deref(), Some("John Roe"));
        assert_eq!(r.reacted_to.author_headline.as_deref(), Some("CTO at Acme"));
        assert_eq!(
            r.reacted_to.content_snippet.as_deref(),
            Some("I disagree, the difference engine is enough.")
        );
        let context = r.original_post_context.as_ref().unwrap();
        assert_eq!(context.author.as_deref(), Some("Ada Lovelace"));
        assert_eq!(
            context.content_snippet.as_deref(),
            Some("Analytical engines are the future of computing")
        );
    }

    #[test]
    fn verb_mapping() {
        assert_eq!(reaction_type("celebrates", " this"), "celebrated");
        assert_eq!(reaction_type("Loved", ""), "loved");
        assert_eq!(reaction_type("finds", " this insightful"), "insightful");
        assert_eq!(reaction_type("found", " this funny"), "funny");
        assert_eq!(reaction_type("is curious about", " this"), "curious");
        assert_eq!(reaction_type("reacted to", " this"), "unspecified");
        assert_eq!(reaction_type("finds", " this odd"), "unspecified");
    }

    #[test]
    fn blocks_without_target_are_skipped() {
        assert!(run(&["\nJane Doe likes this\nLike\nComment"]).is_empty());
        assert!(extract(&[POST_LIKE], "", &ParserConfig::default()).is_empty());
    }

    #[test]
    fn own_comment_wins_over_reaction() {
        let block = "\nJane Doe commented on this\nJane Doe likes this\nJohn Roe\nJohn Roe\n• 2nd\nCTO at Acme\n2d •\n\
            Follow\nWe just open sourced our parser toolkit\n45 reactions\n\
            Jane Doe\n• You\nFounder at Acme\n1d\nCongrats, this is a great milestone!\nLike\nReply";
        assert!(run(&[block]).is_empty());
        let comments = comments::extract(&[block], "Jane Doe", &ParserConfig::default());
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].text, "Congrats, this is a great milestone!");
    }

    #[test]
    fn comment_phrase_without_text_stays_a_reaction() {
        let block = "\nJane Doe commented on this\nJane Doe likes this\nJohn Roe\nJohn Roe\n• 2nd\nCTO at Acme\n2d •\n\
            Follow\nWe just open sourced our parser toolkit\n45 reactions";
        let reactions = run(&[block]);
        assert_eq!(reactions.len(), 1);
        let prov = reactions[0]
            .provenance
            .iter()
            .find(|p| p.field == "reactionType")
            .unwrap();
        assert_eq!(prov.confidence, Confidence::Low);
        assert!(comments::extract(&[block], "Jane Doe", &ParserConfig::default()).is_empty());
    }
}
