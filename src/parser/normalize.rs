use std::sync::LazyLock;

use regex::Regex;

/// Minimum size of one half before mirrored text is collapsed.
pub const DEFAULT_MIRROR_MIN_CHARS: usize = 100;

static PARAGRAPH_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());
static HASHTAG_ARTIFACT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bhashtag\s*#").unwrap());
static BADGE_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\{:[A-Za-z]+\}").unwrap());
static EXTRA_BREAKS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

static RESIDUE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)^(?:
            (?:…|\.\.\.)\s*(?:see\s+)?more
          | [·•|]
          | see\s+more | show\s+more | show\s+less
          | show\s+all\s+\d+\s+.*
          | load\s+more\s+comments?
          | (?:show|see)\s+translation
          | edited
          | (?:edited\s*•\s*)?visible\s+to\s+.*
          | \+?\s*follow(?:ing)?
          | view\s+.*graphic\s+link
          | activate\s+to\s+view\s+larger\s+image,?
          | play | pause | unmute | mute
          | turn\s+(?:closed\s+captions|fullscreen)\s+(?:on|off)
          | playback\s+speed.* | loaded:.* | remaining\s+time.* | current\s+time.* | duration\s+\d.*
        )$",
    )
    .unwrap()
});

/// True for lines that are platform chrome rather than authored text.
pub fn is_ui_residue_line(line: &str) -> bool {
    RESIDUE_LINE_RE.is_match(line.trim())
}

/// Collapse mirrored text to one copy, else drop consecutive repeated paragraphs.
pub fn clean_duplicate_content(text: &str) -> Option<String> {
    clean_duplicate_content_with(text, DEFAULT_MIRROR_MIN_CHARS)
}

/// [`clean_duplicate_content`] with an explicit mirrored-half threshold.
pub fn clean_duplicate_content_with(text: &str, min_half_chars: usize) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(half) = mirrored_by_lines(trimmed, min_half_chars)
        .or_else(|| mirrored_by_chars(trimmed, min_half_chars))
    {
        return Some(half);
    }

    let mut kept: Vec<&str> = Vec::new();
    let mut last_normalized: Option<String> = None;
    for paragraph in PARAGRAPH_BREAK_RE.split(trimmed) {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }
        let normalized = normalize_for_compare(paragraph);
        if last_normalized.as_deref() == Some(normalized.as_str()) {
            continue;
        }
        last_normalized = Some(normalized);
        kept.push(paragraph);
    }

    Some(kept.join("\n\n"))
}

fn mirrored_by_lines(text: &str, min_half_chars: usize) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() < 2 {
        return None;
    }
    let mid = lines.len() / 2;
    let first = lines[..mid].join("\n");
    let second = lines[mid..].join("\n");
    let first = first.trim();
    (first == second.trim() && first.chars().count() > min_half_chars).then(|| first.to_string())
}

// Single-paragraph mirrors: the capture glues both copies onto one line.
fn mirrored_by_chars(text: &str, min_half_chars: usize) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let mid = chars.len() / 2;
    let first: String = chars[..mid].iter().collect();
    let second: String = chars[mid..].iter().collect();
    let first = first.trim();
    (first == second.trim() && first.chars().count() > min_half_chars).then(|| first.to_string())
}

fn normalize_for_compare(paragraph: &str) -> String {
    paragraph
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// First `max_words` words of `text`, with `...` appended when truncated.
pub fn extract_content_snippet(text: &str, max_words: usize) -> Option<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() || max_words == 0 {
        return None;
    }
    let mut snippet = words[..words.len().min(max_words)].join(" ");
    if words.len() > max_words {
        snippet.push_str("...");
    }
    Some(snippet)
}

/// Drop platform chrome lines and badge markers, and fold the
/// `hashtag\n#Tag` accessibility artifact back into `#Tag`.
pub fn strip_ui_residue(text: &str) -> String {
    let kept: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !is_ui_residue_line(line))
        .collect();
    let joined = kept.join("\n");
    let joined = BADGE_MARKER_RE.replace_all(&joined, "");
    let joined = HASHTAG_ARTIFACT_RE.replace_all(&joined, "#");
    EXTRA_BREAKS_RE
        .replace_all(&joined, "\n\n")
        .trim()
        .to_string()
}

/// Trimmed, non-empty lines with adjacent repeats removed.
///
/// Profile captures render most lines twice in a row.
pub fn collapse_adjacent_duplicates<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut out: Vec<&'a str> = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() || out.last() == Some(&line) {
            continue;
        }
        out.push(line);
    }
    out
}
