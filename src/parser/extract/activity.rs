use regex::Regex;
use tracing::debug;

use super::{collect_media, content_region, name_pattern, scan_author_header};
use crate::config::ParserConfig;
use crate::parser::blocks::{classify_lines, line_index_at, Line, LineKind};
use crate::parser::normalize::{clean_duplicate_content_with, strip_ui_residue};
use crate::parser::rules::{extract_engagement, extract_timestamp};
use crate::parser::tokens::{clean_profile_name, extract_hashtags, extract_mentions, record_id, similarity};
use crate::records::{ActivityRecord, ActivityType, Confidence, Engagement, FieldProvenance, OriginalPost};

/// Turn activity blocks into records, skipping blocks with no recoverable text.
pub fn extract(blocks: &[&str], profile_name: &str, config: &ParserConfig) -> Vec<ActivityRecord> {
    let name = clean_profile_name(profile_name);
    let repost_re = repost_indicator(&name);

    blocks
        .iter()
        .enumerate()
        .filter_map(|(i, block)| {
            let record = parse_block(block, &name, repost_re.as_ref(), config);
            if record.is_none() {
                debug!(block = i, "activity block has no content");
            }
            record
        })
        .collect()
}

fn repost_indicator(name: &str) -> Option<Regex> {
    let pattern = if name.is_empty() {
        r"(?i)\breposted\s+this\b".to_string()
    } else {
        format!(r"(?i)\b{}\s+reposted\s+this\b", name_pattern(name))
    };
    Regex::new(&pattern).ok()
}

fn parse_block(block: &str, name: &str, repost_re: Option<&Regex>, config: &ParserConfig) -> Option<ActivityRecord> {
    let lines = classify_lines(block);
    let indicator = repost_re
        .and_then(|re| re.find(block))
        .map(|m| line_index_at(block, m.end()));

    let mut provenance = Vec::new();
    let timestamp = extract_timestamp(block).map(|(ts, prov)| {
        provenance.push(prov);
        ts
    });

    let record = match indicator {
        Some(at) => repost(block, &lines, at, name, config, &mut provenance),
        None => original(block, &lines, config, &mut provenance),
    }?;

    let activity_type = record.activity_type;
    let content_key = record
        .authored_content
        .as_deref()
        .or_else(|| record.original_post.as_ref().and_then(|p| p.content.as_deref()));
    let author = record
        .original_post
        .as_ref()
        .and_then(|p| p.author_name.as_deref())
        .unwrap_or("");
    let id = record_id(name, content_key, timestamp.as_deref(), &[activity_type.as_str(), author]);

    let (mentions, hashtags) = match record.authored_content.as_deref() {
        Some(text) => (extract_mentions(text), extract_hashtags(text)),
        None => (Vec::new(), Vec::new()),
    };

    Some(ActivityRecord {
        id,
        activity_type,
        timestamp,
        authored_content: record.authored_content,
        engagement: record.engagement,
        original_post: record.original_post,
        mentions,
        hashtags,
        media: collect_media(&lines),
        provenance,
    })
}

struct Parsed {
    activity_type: ActivityType,
    authored_content: Option<String>,
    engagement: Engagement,
    original_post: Option<OriginalPost>,
}

fn original(block: &str, lines: &[Line<'_>], config: &ParserConfig, provenance: &mut Vec<FieldProvenance>) -> Option<Parsed> {
    let region = content_region(lines, 0, config.mirror_min_chars)?;
    provenance.push(region.provenance("authoredContent"));
    let (engagement, engagement_prov) = extract_engagement(&tail(block, lines, region.end));
    provenance.extend(engagement_prov);

    Some(Parsed {
        activity_type: ActivityType::OriginalPost,
        authored_content: Some(region.text),
        engagement,
        original_post: None,
    })
}

fn repost(
    block: &str,
    lines: &[Line<'_>],
    indicator: usize,
    name: &str,
    config: &ParserConfig,
    provenance: &mut Vec<FieldProvenance>,
) -> Option<Parsed> {
    let header = scan_author_header(lines, indicator + 1, name);
    let shared = content_region(lines, indicator + 1, config.mirror_min_chars);
    let commentary = repost_commentary(lines, indicator, name, config);

    if header.is_some() {
        provenance.push(FieldProvenance::new("originalPost.authorName", "person_name_scan", Confidence::Medium));
    }
    if let Some(region) = &shared {
        provenance.push(region.provenance("originalPost.content"));
    }

    let shared_text = shared.as_ref().map(|r| r.text.clone());
    // Commentary already inside the shared post is not the reposter's own text.
    let commentary = commentary.filter(|c| match &shared_text {
        Some(s) => !s.contains(c.as_str()) && similarity(c, s) < 0.9,
        None => true,
    });
    if commentary.is_some() {
        provenance.push(FieldProvenance::new("authoredContent", "repost_preamble", Confidence::Low));
    }
    if commentary.is_none() && shared_text.is_none() {
        return None;
    }

    let engagement_from = shared.as_ref().map_or(indicator + 1, |r| r.end);
    let (engagement, engagement_prov) = extract_engagement(&tail(block, lines, engagement_from));
    provenance.extend(engagement_prov.into_iter().map(|mut p| {
        p.field = format!("originalPost.engagement.{}", p.field);
        p
    }));

    let (author_name, author_headline, header_ts) = match header {
        Some(h) => (Some(h.name), h.headline, h.timestamp.map(|(t, _)| t)),
        None => (None, None, None),
    };
    let timestamp = header_ts.or_else(|| extract_timestamp(block).map(|(t, _)| t));

    Some(Parsed {
        activity_type: ActivityType::Repost,
        authored_content: commentary,
        engagement: Engagement::default(),
        original_post: Some(OriginalPost {
            author_name,
            author_headline,
            timestamp,
            content: shared_text,
            engagement,
        }),
    })
}

// Text the reposter wrote above the "reposted this" line.
fn repost_commentary(lines: &[Line<'_>], indicator: usize, name: &str, config: &ParserConfig) -> Option<String> {
    let kept: Vec<&str> = lines[..indicator]
        .iter()
        .filter(|l| l.kind == LineKind::Text)
        .map(|l| l.text)
        .filter(|t| !clean_profile_name(t).eq_ignore_ascii_case(name))
        .collect();
    let text = clean_duplicate_content_with(&strip_ui_residue(&kept.join("\n")), config.mirror_min_chars)?;
    text.chars().any(char::is_alphanumeric).then_some(text)
}

fn tail(block: &str, lines: &[Line<'_>], from: usize) -> String {
    if from == 0 {
        return block.to_string();
    }
    lines[from.min(lines.len())..]
        .iter()
        .map(|l| l.text)
        .collect::<Vec<_>>()
        .join("\n")
}
