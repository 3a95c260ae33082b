use std::sync::LazyLock;

use regex::Regex;

use crate::config::ParserConfig;
use crate::parser::normalize::{clean_duplicate_content_with, is_ui_residue_line};
use crate::parser::tokens::is_valid_company_name;
use crate::records::{Confidence, ExperienceEntry, FieldProvenance};

const MONTH_YEAR: &str = r"(?:(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+)?\d{4}";
const SPAN: &str = r"\d+\s+yrs?(?:\s+\d+\s+mos?)?|\d+\s+mos?|less\s+than\s+a\s+year";

static DATE_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^({MONTH_YEAR}\s*[-–—]\s*(?:{MONTH_YEAR}|present))(?:\s*·\s*(.+))?$"
    ))
    .unwrap()
});
static SPAN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(&format!(r"(?i)^(?:{SPAN})$")).unwrap());
// A company header's total: "5 yrs 2 mos", optionally after the employment type.
static GROUP_SPAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)^(?:[a-z\- ]+\s*·\s*)?({SPAN})$")).unwrap());
static DASH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*[-–—]\s*").unwrap());
static WORK_MODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:(.*?)\s*·\s*)?(on-site|remote|hybrid)$").unwrap());
static PLACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\p{Lu}[\p{L} .'\-]+,\s*\p{Lu}[\p{L} .'\-]+(?:,\s*\p{Lu}[\p{L} .'\-]+)?$").unwrap()
});
static EMPLOYMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:^|\s*·\s*)(?:full-time|part-time|contract|freelance|internship|self-employed|seasonal|apprenticeship)\s*$",
    )
    .unwrap()
});

const MIN_DESCRIPTION_CHARS: usize = 20;

#[derive(Debug, Default)]
struct Draft<'a> {
    title: &'a str,
    company: String,
    group_total: Option<String>,
    body: Vec<&'a str>,
}

/// Experience entries in page order.
///
/// Two layouts are recognized: a standalone role (title, company, optional
/// dates) and a company header with its total tenure followed by one or more
/// roles, each of which inherits the company and the total. Standalone roles
/// without an employment type or dates are kept at low confidence.
pub(super) fn extract(
    lines: &[&str],
    config: &ParserConfig,
    provenance: &mut Vec<FieldProvenance>,
) -> Vec<ExperienceEntry> {
    let lines: Vec<&str> = lines.iter().copied().filter(|l| !is_ui_residue_line(l)).collect();
    let mut entries = Vec::new();
    let mut group: Option<(String, String)> = None;
    let mut current: Option<Draft<'_>> = None;

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        let next = lines.get(i + 1).copied();
        let after = lines.get(i + 2).copied();

        if is_company_like(line)
            && next.and_then(group_span).is_some()
            && after.is_some_and(is_title_like)
        {
            entries.extend(current.take().map(|d| finish(d, config)));
            group = next
                .and_then(group_span)
                .map(|total| (strip_employment(line).to_string(), total.to_string()));
            i += 2;
            continue;
        }

        let dated = next.is_some_and(|n| EMPLOYMENT_RE.is_match(n)) || after.is_some_and(is_date_line);
        if is_title_like(line) && next.is_some_and(is_company_like) && (dated || closes_role(after)) {
            entries.extend(current.take().map(|d| finish(d, config)));
            let (rule, confidence) = if dated {
                ("title_company_dated", Confidence::High)
            } else {
                ("title_company", Confidence::Low)
            };
            let at = entries.len();
            provenance.push(FieldProvenance::new(&format!("experience[{at}]"), rule, confidence));
            group = None;
            current = Some(Draft {
                title: line,
                company: strip_employment(next.unwrap_or_default()).to_string(),
                ..Draft::default()
            });
            i += 2;
            continue;
        }

        if let Some((company, total)) = &group {
            let dated = next.is_some_and(is_date_line)
                || (next.is_some_and(is_employment_only) && after.is_some_and(is_date_line));
            if is_title_like(line) && dated {
                entries.extend(current.take().map(|d| finish(d, config)));
                current = Some(Draft {
                    title: line,
                    company: company.clone(),
                    group_total: Some(total.clone()),
                    body: Vec::new(),
                });
                i += 1;
                continue;
            }
        }

        if let Some(draft) = current.as_mut() {
            draft.body.push(line);
        }
        i += 1;
    }
    entries.extend(current.map(|d| finish(d, config)));
    entries
}

fn finish(draft: Draft<'_>, config: &ParserConfig) -> ExperienceEntry {
    let mut duration = None;
    let mut own_total = None;
    let mut location = None;
    let mut description = Vec::new();

    for (i, line) in draft.body.iter().enumerate() {
        if let Some(caps) = DATE_RANGE_RE.captures(line) {
            if duration.is_none() {
                duration = Some(DASH_RE.replace(&caps[1], " - ").into_owned());
                own_total = caps
                    .get(2)
                    .map(|m| m.as_str().trim())
                    .filter(|t| SPAN_RE.is_match(t))
                    .map(str::to_string);
            }
            continue;
        }
        if location.is_none() {
            if let Some(caps) = WORK_MODE_RE.captures(line) {
                let place = caps.get(1).map_or("", |m| m.as_str()).trim();
                let place = if place.is_empty() { &caps[2] } else { place };
                location = Some(place.to_string());
                continue;
            }
            let follows_dates = i > 0 && is_date_line(draft.body[i - 1]);
            if follows_dates && PLACE_RE.is_match(line) {
                location = Some(line.to_string());
                continue;
            }
        }
        if is_employment_only(line) || SPAN_RE.is_match(line) {
            continue;
        }
        description.push(*line);
    }

    let description = clean_duplicate_content_with(&description.join("\n"), config.mirror_min_chars)
        .filter(|d| d.chars().count() >= MIN_DESCRIPTION_CHARS);

    ExperienceEntry {
        title: draft.title.to_string(),
        company: draft.company,
        duration,
        total_duration: draft.group_total.or(own_total),
        location,
        description,
    }
}

// What may follow an undated title and company: the end of the section, a
// location, or description text. A tenure line means a company header instead.
fn closes_role(after: Option<&str>) -> bool {
    match after {
        None => true,
        Some(a) => {
            is_location_line(a) || (!is_title_like(a) && group_span(a).is_none() && !is_employment_only(a))
        }
    }
}

fn is_date_line(line: &str) -> bool {
    DATE_RANGE_RE.is_match(line)
}

fn group_span(line: &str) -> Option<&str> {
    GROUP_SPAN_RE.captures(line).and_then(|c| c.get(1)).map(|m| m.as_str())
}

fn is_employment_only(line: &str) -> bool {
    EMPLOYMENT_RE.find(line).is_some_and(|m| m.start() == 0)
}

fn is_location_line(line: &str) -> bool {
    WORK_MODE_RE.is_match(line) || PLACE_RE.is_match(line)
}

fn is_title_like(line: &str) -> bool {
    let len = line.chars().count();
    (2..=100).contains(&len)
        && !line.ends_with('.')
        && line.split_whitespace().count() <= 12
        && line.chars().next().is_some_and(|c| c.is_uppercase() || c.is_ascii_digit())
        && !is_date_line(line)
        && !SPAN_RE.is_match(line)
        && !is_location_line(line)
        && !is_employment_only(line)
        && !line.to_lowercase().starts_with("skills:")
}

fn is_company_like(line: &str) -> bool {
    is_title_like(line) && is_valid_company_name(strip_employment(line))
}

fn strip_employment(line: &str) -> &str {
    EMPLOYMENT_RE.find(line).map_or(line, |m| &line[..m.start()]).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Vec<ExperienceEntry> {
        run_with_provenance(text).0
    }

    fn run_with_provenance(text: &str) -> (Vec<ExperienceEntry>, Vec<FieldProvenance>) {
        let lines: Vec<&str> = text.lines().collect();
        let mut provenance = Vec::new();
        let entries = extract(&lines, &ParserConfig::default(), &mut provenance);
        (entries, provenance)
    }

    #[test]
    fn standalone_role() {
        let entries = run("Staff Engineer\nInitech · Contract\nMar 2010 – Jan 2012 · 1 yr 11 mos\n\
            Austin, Texas, United States\nMaintained the TPS report pipeline for the whole org.");
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.title, "Staff Engineer");
        assert_eq!(e.company, "Initech");
        assert_eq!(e.duration.as_deref(), Some("Mar 2010 - Jan 2012"));
        assert_eq!(e.total_duration.as_deref(), Some("1 yr 11 mos"));
        assert_eq!(e.location.as_deref(), Some("Austin, Texas, United States"));
        assert_eq!(
            e.description.as_deref(),
            Some("Maintained the TPS report pipeline for the whole org.")
        );
    }

    #[test]
    fn company_without_employment_type_uses_dates() {
        let (entries, provenance) = run_with_provenance("Engineer\nInitech\n2008 - 2010");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].company, "Initech");
        assert_eq!(entries[0].duration.as_deref(), Some("2008 - 2010"));
        assert_eq!(provenance[0].rule, "title_company_dated");
        assert_eq!(provenance[0].confidence, Confidence::High);
    }

    #[test]
    fn undated_role_is_kept_at_low_confidence() {
        let (entries, provenance) =
            run_with_provenance("Advisor\nAcme Corp\nHelping the team with strategy and hiring across regions.");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Advisor");
        assert_eq!(entries[0].company, "Acme Corp");
        assert_eq!(entries[0].duration, None);
        assert_eq!(
            entries[0].description.as_deref(),
            Some("Helping the team with strategy and hiring across regions.")
        );
        assert_eq!(provenance[0].field, "experience[0]");
        assert_eq!(provenance[0].confidence, Confidence::Low);

        assert_eq!(run("Engineer\nInitech").len(), 1);
        assert_eq!(run("Engineer\nInitech\nRemote")[0].location.as_deref(), Some("Remote"));
    }

    #[test]
    fn undated_pair_before_a_company_header_is_not_a_role() {
        let entries = run("Engineer\nInitech · Full-time\n2008 - 2010\nLed the hardware team\nGlobex\n\
            5 yrs\nManager\nJan 2020 - Present");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].company, "Initech");
        assert_eq!(entries[1].company, "Globex");
        assert_eq!(entries[1].title, "Manager");
    }

    #[test]
    fn grouped_roles_inherit_company() {
        let entries = run("Globex\nFull-time · 4 yrs\nManager\nJan 2020 - Present\nRemote\n\
            Engineer\nFull-time\nJan 2018 - Dec 2019");
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.company == "Globex"));
        assert!(entries.iter().all(|e| e.total_duration.as_deref() == Some("4 yrs")));
        assert_eq!(entries[0].location.as_deref(), Some("Remote"));
        assert_eq!(entries[1].title, "Engineer");
    }

    #[test]
    fn short_descriptions_dropped() {
        let entries = run("Engineer\nInitech · Full-time\n2008 - 2010\nShort note");
        assert_eq!(entries[0].description, None);
    }
}
