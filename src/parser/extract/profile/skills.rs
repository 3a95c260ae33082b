use std::sync::LazyLock;

use regex::Regex;

use crate::config::ParserConfig;
use crate::parser::normalize::is_ui_residue_line;
use crate::parser::numeric::parse_scaled_count;
use crate::records::SkillEntry;

static ENDORSEMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d[\d,.]*[kmb]?)\+?\s*endorsements?$").unwrap());
static ENDORSED_BY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^endorsed\s+by\b").unwrap());
// Lines that tie a skill to where it was used.
static CONTEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^\d+\s+experiences?\b|\bexperiences?\s+(?:across|at)\b|\bother\s+compan(?:y|ies)\b|^passed\s+linkedin\s+skill\s+assessment|\bskill\s+assessment\b|^\S.*\s+at\s+\S.*$)").unwrap()
});

const CATEGORY_HEADERS: &[&str] = &[
    "all", "industry knowledge", "tools & technologies", "interpersonal skills", "other skills",
    "languages", "top skills",
];

pub(super) fn extract(lines: &[&str], config: &ParserConfig) -> Vec<SkillEntry> {
    let lines: Vec<&str> = lines.iter().copied().filter(|l| !is_ui_residue_line(l)).collect();
    let mut skills: Vec<SkillEntry> = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        i += 1;
        if !is_skill_name(line) {
            continue;
        }

        let mut skill = SkillEntry {
            name: line.to_string(),
            ..SkillEntry::default()
        };
        let window_end = (i + config.skill_lookahead_lines).min(lines.len());
        while i < window_end {
            let detail = lines[i];
            if let Some(caps) = ENDORSEMENT_RE.captures(detail) {
                skill.endorsements_count = skill.endorsements_count.or_else(|| parse_scaled_count(&caps[1]));
            } else if ENDORSED_BY_RE.is_match(detail) {
                skill.endorsed_by_summary.push(detail.to_string());
            } else if !CONTEXT_RE.is_match(detail) {
                break;
            }
            i += 1;
        }

        if !skills.iter().any(|s| s.name.eq_ignore_ascii_case(&skill.name)) {
            skills.push(skill);
        }
    }
    skills
}

fn is_skill_name(line: &str) -> bool {
    let len = line.chars().count();
    (2..=80).contains(&len)
        && line.split_whitespace().count() <= 8
        && !line.ends_with('.')
        && !line.starts_with(|c: char| c.is_ascii_digit())
        && !CATEGORY_HEADERS.contains(&line.to_lowercase().as_str())
        && !ENDORSEMENT_RE.is_match(line)
        && !ENDORSED_BY_RE.is_match(line)
        && !CONTEXT_RE.is_match(line)
}
