//! Profile page extraction: intro header plus the About, Experience,
//! Education, Skills, Recommendations and Interests sections.

mod education;
mod experience;
mod header;
mod interests;
mod recommendations;
mod skills;

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::config::ParserConfig;
use crate::parser::normalize::{clean_duplicate_content_with, collapse_adjacent_duplicates, strip_ui_residue};
use crate::parser::sections::{cluster_sections, find, Section, SectionKind};
use crate::parser::tokens::clean_profile_name;
use crate::records::{Confidence, ExperienceEntry, FieldProvenance, ProfileRecord};

static HEADLINE_AT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+at\s+(.+?)\s*(?:[|·•,]|$)").unwrap());

/// Placeholder some callers pass before a real name is known.
const UNKNOWN_NAME: &str = "Unknown Profile";

pub fn extract(raw: &str, existing_name: &str, config: &ParserConfig) -> ProfileRecord {
    let existing = clean_profile_name(existing_name);
    let existing = (!existing.is_empty() && !existing.eq_ignore_ascii_case(UNKNOWN_NAME)).then_some(existing);
    if raw.trim().is_empty() {
        debug!("empty profile capture");
        return ProfileRecord {
            name: existing,
            ..ProfileRecord::default()
        };
    }

    let sections = cluster_sections(raw);
    let lines_of = |kind: SectionKind| section_lines(&sections, kind);

    let mut provenance = Vec::new();
    let header = header::extract(&lines_of(SectionKind::Intro), existing.as_deref(), &mut provenance);
    let about = find(&sections, SectionKind::About).and_then(|s| about_text(&s.lines, config.mirror_min_chars));
    let experience = experience::extract(&lines_of(SectionKind::Experience), config, &mut provenance);
    let education = education::extract(&lines_of(SectionKind::Education));
    let skills = skills::extract(&lines_of(SectionKind::Skills), config);
    let recommendations = recommendations::extract(&lines_of(SectionKind::Recommendations));
    let interests = interests::extract(&lines_of(SectionKind::Interests));
    let current_company = current_company(&experience, header.headline.as_deref(), &mut provenance);

    info!(
        sections = sections.len(),
        experience = experience.len(),
        education = education.len(),
        skills = skills.len(),
        "parsed profile capture"
    );

    ProfileRecord {
        name: header.name,
        headline: header.headline,
        current_company,
        location: header.location,
        followers: header.followers,
        connections: header.connections,
        mutual_connections: header.mutual_connections,
        about,
        experience,
        education,
        skills,
        recommendations,
        interests,
        provenance,
    }
}

/// Lines of the first `kind` section with the doubled rendering collapsed.
fn section_lines<'a>(sections: &[Section<'a>], kind: SectionKind) -> Vec<&'a str> {
    find(sections, kind)
        .map(|s| collapse_adjacent_duplicates(s.lines.iter().copied()))
        .unwrap_or_default()
}

// About text ends where the "Top skills" strip begins.
fn about_text(lines: &[&str], mirror_min_chars: usize) -> Option<String> {
    let body: Vec<&str> = lines
        .iter()
        .copied()
        .take_while(|l| !l.to_lowercase().starts_with("top skills"))
        .collect();
    clean_duplicate_content_with(&strip_ui_residue(&body.join("\n")), mirror_min_chars).filter(|t| !t.is_empty())
}

fn current_company(
    experience: &[ExperienceEntry],
    headline: Option<&str>,
    provenance: &mut Vec<FieldProvenance>,
) -> Option<String> {
    let ongoing = experience.iter().find(|e| {
        e.duration
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains("present"))
    });
    if let Some(entry) = ongoing {
        provenance.push(FieldProvenance::new("currentCompany", "present_experience", Confidence::High));
        return Some(entry.company.clone());
    }

    let company = HEADLINE_AT_RE
        .captures(headline?)
        .map(|c| c[1].trim().to_string())
        .filter(|c| !c.is_empty())?;
    provenance.push(FieldProvenance::new("currentCompany", "headline_at", Confidence::Low));
    Some(company)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_profile() {
        let raw = std::fs::read_to_string("tests/fixtures/profile.txt").unwrap();
        let p = extract(&raw, "", &ParserConfig::default());
        assert_eq!(p.name.as_deref(), Some("Jane Doe"));
        assert_eq!(p.headline.as_deref(), Some("Founder at Acme Robotics | Building useful machines"));
        assert_eq!(p.location.as_deref(), Some("San Francisco Bay Area"));
        assert_eq!(p.followers, Some(12_400));
        assert_eq!(p.connections.as_deref(), Some("500+"));
        assert_eq!(p.mutual_connections, vec!["Ada Lovelace", "Grace Hopper"]);
        assert_eq!(p.current_company.as_deref(), Some("Acme Robotics"));
        assert!(p.about.as_deref().unwrap().starts_with("I build robots"));
        assert!(!p.about.as_deref().unwrap().contains("Top skills"));

        assert_eq!(p.experience.len(), 3);
        assert_eq!(p.experience[0].title, "Founder & CEO");
        assert_eq!(p.experience[0].company, "Acme Robotics");
        assert_eq!(p.experience[1].company, "Globex");
        assert_eq!(p.experience[2].company, "Globex");
        assert_eq!(p.experience[2].total_duration.as_deref(), Some("5 yrs 2 mos"));

        assert_eq!(p.education.len(), 2);
        assert_eq!(p.skills.len(), 3);
        assert_eq!(p.recommendations.received.len(), 1);
        assert_eq!(p.recommendations.given.len(), 1);
        assert_eq!(p.interests.companies.len(), 2);
    }

    #[test]
    fn existing_name_wins_and_unknown_is_ignored() {
        let raw = "Jane Doe\nFounder at Acme\n";
        assert_eq!(
            extract(raw, "Dr. Janet Doe, PhD", &ParserConfig::default()).name.as_deref(),
            Some("Janet Doe")
        );
        assert_eq!(
            extract(raw, UNKNOWN_NAME, &ParserConfig::default()).name.as_deref(),
            Some("Jane Doe")
        );
    }

    #[test]
    fn headline_company_fallback_is_low_confidence() {
        let mut prov = Vec::new();
        let company = current_company(&[], Some("Engineer at Initech | Speaker"), &mut prov);
        assert_eq!(company.as_deref(), Some("Initech"));
        assert_eq!(prov[0].confidence, Confidence::Low);
    }

    #[test]
    fn empty_capture_keeps_known_name() {
        let p = extract("   ", "Jane Doe", &ParserConfig::default());
        assert_eq!(p.name.as_deref(), Some("Jane Doe"));
        assert!(p.experience.is_empty());
    }

    #[test]
    fn undated_experience_survives_sectioning() {
        let raw = "Jane Doe\nFounder\nExperience\nExperience\nAdvisor\nAcme Corp\n\
                   Helping the team with strategy and hiring across regions.\nEducation\nEducation\nStanford University\n";
        let p = extract(raw, "Jane Doe", &ParserConfig::default());
        assert_eq!(p.experience.len(), 1);
        assert_eq!(p.experience[0].title, "Advisor");
        assert_eq!(p.experience[0].company, "Acme Corp");
        assert!(p
            .provenance
            .iter()
            .any(|f| f.field == "experience[0]" && f.confidence == Confidence::Low));
    }
}
