use std::sync::LazyLock;

use regex::Regex;

use crate::parser::extract::strip_degree_suffix;
use crate::parser::normalize::is_ui_residue_line;
use crate::parser::numeric::parse_scaled_count;
use crate::records::{InterestEntity, Interests};

static AUDIENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d[\d,.]*[kmb]?)\s+(?:followers|members|subscribers)\b").unwrap());
static DEGREE_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[·•]?\s*(?:1st|2nd|3rd\+?)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    TopVoices,
    Companies,
    Groups,
    Newsletters,
    Schools,
}

fn category(line: &str) -> Option<Category> {
    match line.to_lowercase().as_str() {
        "top voices" => Some(Category::TopVoices),
        "companies" => Some(Category::Companies),
        "groups" => Some(Category::Groups),
        "newsletters" => Some(Category::Newsletters),
        "schools" => Some(Category::Schools),
        _ => None,
    }
}

// The follow control closes each entity card.
fn is_delimiter(line: &str) -> bool {
    matches!(
        line.to_lowercase().as_str(),
        "follow" | "+ follow" | "following" | "subscribe" | "subscribed" | "join" | "joined"
    )
}

pub(super) fn extract(lines: &[&str]) -> Interests {
    let mut interests = Interests::default();
    let mut current = Category::TopVoices;
    let mut pending: Vec<&str> = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if let Some(cat) = category(line) {
            // A run of headers is the tab bar; the first one is the open tab.
            current = cat;
            pending.clear();
            while i + 1 < lines.len() && category(lines[i + 1]).is_some() {
                i += 1;
            }
        } else if is_delimiter(line) {
            if let Some(entity) = entity(&pending) {
                bucket(&mut interests, current).push(entity);
            }
            pending.clear();
        } else if !is_ui_residue_line(line) && !DEGREE_LINE_RE.is_match(line) {
            pending.push(line);
        }
        i += 1;
    }

    // A trailing card without its control still counts when it carries an audience size.
    if pending.iter().any(|l| AUDIENCE_RE.is_match(l)) {
        if let Some(entity) = entity(&pending) {
            bucket(&mut interests, current).push(entity);
        }
    }
    interests
}

fn bucket(interests: &mut Interests, category: Category) -> &mut Vec<InterestEntity> {
    match category {
        Category::TopVoices => &mut interests.top_voices,
        Category::Companies => &mut interests.companies,
        Category::Groups => &mut interests.groups,
        Category::Newsletters => &mut interests.newsletters,
        Category::Schools => &mut interests.schools,
    }
}

fn entity(lines: &[&str]) -> Option<InterestEntity> {
    let (name, rest) = lines.split_first()?;
    let name = strip_degree_suffix(name);
    if name.is_empty() {
        return None;
    }
    let followers = rest
        .iter()
        .find_map(|l| AUDIENCE_RE.captures(l))
        .and_then(|c| parse_scaled_count(&c[1]));
    let headline = rest
        .iter()
        .find(|l| !AUDIENCE_RE.is_match(l) && *l != &name)
        .map(|l| l.to_string());
    Some(InterestEntity {
        name: name.to_string(),
        headline,
        followers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cards_split_on_follow_controls() {
        let interests = extract(&[
            "Top Voices",
            "Companies",
            "Ada Lovelace",
            "· 3rd",
            "Mathematician and writer",
            "1,024 followers",
            "Follow",
            "Grace Hopper",
            "Computer scientist",
            "Following",
            "Groups",
            "Rust Developers",
            "45,210 members",
            "Join",
        ]);
        assert_eq!(interests.top_voices.len(), 2);
        let ada = &interests.top_voices[0];
        assert_eq!(ada.name, "Ada Lovelace");
        assert_eq!(ada.headline.as_deref(), Some("Mathematician and writer"));
        assert_eq!(ada.followers, Some(1024));
        assert_eq!(interests.groups[0].followers, Some(45_210));
        assert!(interests.companies.is_empty());
    }

    #[test]
    fn trailing_card_needs_a_count() {
        let with_count = extract(&["Newsletters", "Rust Weekly", "12K subscribers"]);
        assert_eq!(with_count.newsletters[0].followers, Some(12_000));
        let without = extract(&["Companies", "Show all companies"]);
        assert!(without.is_empty());
    }
}
