#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Intro,
    About,
    Experience,
    Education,
    Skills,
    Recommendations,
    Interests,
    /// A known section this crate does not extract; it only bounds its neighbours.
    Other,
}

#[derive(Debug, Clone)]
pub struct Section<'a> {
    pub kind: SectionKind,
    pub title: &'a str,
    pub lines: Vec<&'a str>,
}

const SECTION_TITLES: &[(&str, SectionKind)] = &[
    ("About", SectionKind::About),
    ("Experience", SectionKind::Experience),
    ("Education", SectionKind::Education),
    ("Skills", SectionKind::Skills),
    ("Recommendations", SectionKind::Recommendations),
    ("Interests", SectionKind::Interests),
    ("Featured", SectionKind::Other),
    ("Activity", SectionKind::Other),
    ("Licenses & certifications", SectionKind::Other),
    ("Volunteering", SectionKind::Other),
    ("Volunteer experience", SectionKind::Other),
    ("Projects", SectionKind::Other),
    ("Publications", SectionKind::Other),
    ("Courses", SectionKind::Other),
    ("Honors & awards", SectionKind::Other),
    ("Languages", SectionKind::Other),
    ("Organizations", SectionKind::Other),
    ("Causes", SectionKind::Other),
    ("Test scores", SectionKind::Other),
    ("Patents", SectionKind::Other),
    ("Services", SectionKind::Other),
    ("Contact info", SectionKind::Other),
    ("People also viewed", SectionKind::Other),
    ("People you may know", SectionKind::Other),
    ("You might like", SectionKind::Other),
    ("More profiles for you", SectionKind::Other),
    ("Explore Premium profiles", SectionKind::Other),
];

/// Split a profile capture into sections.
///
/// A section starts where one of the known titles is rendered twice in a
/// row (blank lines between the copies are allowed). Everything before the
/// first title is the [`SectionKind::Intro`].
pub fn cluster_sections(text: &str) -> Vec<Section<'_>> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let mut sections = Vec::new();
    let mut current = Section {
        kind: SectionKind::Intro,
        title: "",
        lines: Vec::new(),
    };

    let mut i = 0;
    while i < lines.len() {
        if let Some((kind, title, next)) = detect_transition(&lines, i) {
            let finished = std::mem::replace(
                &mut current,
                Section {
                    kind,
                    title,
                    lines: Vec::new(),
                },
            );
            if finished.kind != SectionKind::Intro || !finished.lines.is_empty() {
                sections.push(finished);
            }
            i = next;
            continue;
        }
        current.lines.push(lines[i]);
        i += 1;
    }
    sections.push(current);
    sections
}

fn detect_transition<'a>(lines: &[&'a str], idx: usize) -> Option<(SectionKind, &'a str, usize)> {
    let title = lines[idx];
    let kind = section_kind(title)?;
    let mut j = idx + 1;
    while j < lines.len() && lines[j].is_empty() {
        j += 1;
    }
    (j < lines.len() && lines[j] == title).then_some((kind, title, j + 1))
}

fn section_kind(line: &str) -> Option<SectionKind> {
    SECTION_TITLES
        .iter()
        .find(|(title, _)| title.eq_ignore_ascii_case(line))
        .map(|(_, kind)| *kind)
}

/// First section of `kind`, if present.
pub fn find<'s, 'a>(sections: &'s [Section<'a>], kind: SectionKind) -> Option<&'s Section<'a>> {
    sections.iter().find(|s| s.kind == kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<SectionKind> {
        cluster_sections(text).iter().map(|s| s.kind).collect()
    }

    #[test]
    fn doubled_titles_open_sections() {
        let text = "Jane Doe\nFounder\nAbout\nAbout\nI build things.\nExperience\n\nExperience\nEngineer";
        assert_eq!(
            kinds(text),
            vec![SectionKind::Intro, SectionKind::About, SectionKind::Experience]
        );
        let sections = cluster_sections(text);
        assert_eq!(sections[1].lines, vec!["I build things."]);
        assert_eq!(sections[2].lines, vec!["Engineer"]);
    }

    #[test]
    fn single_title_is_content() {
        let text = "About\nAbout\nMy Skills are many\nSkills\nnot a header";
        let sections = cluster_sections(text);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].kind, SectionKind::About);
        assert!(sections[0].lines.contains(&"Skills"));
    }

    #[test]
    fn boundary_sections_close_their_neighbours() {
        let text = "About\nAbout\nBio text\nFeatured\nFeatured\nA pinned post\nEducation\nEducation\nMIT";
        let sections = cluster_sections(text);
        assert_eq!(find(&sections, SectionKind::About).unwrap().lines, vec!["Bio text"]);
        assert_eq!(find(&sections, SectionKind::Other).unwrap().title, "Featured");
        assert_eq!(find(&sections, SectionKind::Education).unwrap().lines, vec!["MIT"]);
    }

    #[test]
    fn unknown_text_not_lost() {
        let sections = cluster_sections("Random paragraph\nthat matches nothing");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].kind, SectionKind::Intro);
        assert_eq!(sections[0].lines.len(), 2);
    }
}
