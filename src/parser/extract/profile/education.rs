use std::sync::LazyLock;

use regex::Regex;

use crate::parser::normalize::is_ui_residue_line;
use crate::records::EducationEntry;

static INSTITUTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:university|universit[àéä]t?|college|school|institute|academy|polytechnic|conservatory|seminary|école|escuela|hochschule)\b").unwrap()
});
static DEGREE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:bachelor|master|doctor|associate|diploma|certificate|ph\.?\s?d|mba|b\.?sc?|m\.?sc?|b\.?a|m\.?a|b\.?eng|m\.?eng|llb|llm|jd|md|high\s+school\s+diploma)\b",
    )
    .unwrap()
});
static YEAR_RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b((?:19|20)\d{2})\s*[-–—]\s*((?:19|20)\d{2}|present)\b").unwrap());
static SINGLE_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:19|20)\d{2}$").unwrap());

/// Education entries, one per institution line.
pub(super) fn extract(lines: &[&str]) -> Vec<EducationEntry> {
    let mut entries: Vec<EducationEntry> = Vec::new();
    for line in lines.iter().copied().filter(|l| !is_ui_residue_line(l)) {
        if is_institution(line) {
            entries.push(EducationEntry {
                school: line.to_string(),
                ..EducationEntry::default()
            });
            continue;
        }
        let Some(entry) = entries.last_mut() else {
            continue;
        };

        if entry.years.is_none() {
            if let Some(caps) = YEAR_RANGE_RE.captures(line) {
                entry.years = Some(format!("{} - {}", &caps[1], &caps[2]));
                continue;
            }
            if SINGLE_YEAR_RE.is_match(line) {
                entry.years = Some(line.to_string());
                continue;
            }
        }
        if entry.degree.is_none() && DEGREE_RE.is_match(line) {
            let (degree, field) = match line.split_once(',') {
                Some((degree, field)) => (degree.trim(), Some(field.trim())),
                None => (line, None),
            };
            entry.degree = Some(degree.to_string());
            entry.field_of_study = field.filter(|f| !f.is_empty()).map(str::to_string);
        }
    }
    entries
}

fn is_institution(line: &str) -> bool {
    INSTITUTION_RE.is_match(line)
        && !DEGREE_RE.is_match(line)
        && !YEAR_RANGE_RE.is_match(line)
        && line.chars().count() <= 120
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degree_field_and_years() {
        let entries = extract(&[
            "Massachusetts Institute of Technology",
            "Bachelor of Science - BS, Computer Science",
            "2004 – 2008",
            "Activities and societies: Robotics club",
        ]);
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.school, "Massachusetts Institute of Technology");
        assert_eq!(e.degree.as_deref(), Some("Bachelor of Science - BS"));
        assert_eq!(e.field_of_study.as_deref(), Some("Computer Science"));
        assert_eq!(e.years.as_deref(), Some("2004 - 2008"));
    }

    #[test]
    fn sparse_entries() {
        let entries = extract(&["Lincoln High School", "2001", "Stanford University", "MBA"]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].years.as_deref(), Some("2001"));
        assert_eq!(entries[0].degree, None);
        assert_eq!(entries[1].degree.as_deref(), Some("MBA"));
        assert_eq!(entries[1].field_of_study, None);
    }

    #[test]
    fn lines_before_first_school_are_ignored() {
        assert!(extract(&["Master of Arts", "2010 - 2012"]).is_empty());
    }
}
