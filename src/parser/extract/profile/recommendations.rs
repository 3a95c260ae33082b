use std::sync::LazyLock;

use regex::Regex;

use crate::parser::extract::strip_degree_suffix;
use crate::parser::normalize::{clean_duplicate_content, is_ui_residue_line};
use crate::parser::tokens::is_plausible_person_name;
use crate::records::{Recommendation, Recommendations};

static SPELLED_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b((?:january|february|march|april|may|june|july|august|september|october|november|december)\s+\d{1,2},\s+\d{4})\b",
    )
    .unwrap()
});
static DEGREE_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[·•]?\s*(?:1st|2nd|3rd\+?)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Received,
    Given,
}

/// Recommendations split by the Received/Given tab labels; without labels
/// everything counts as received.
pub(super) fn extract(lines: &[&str]) -> Recommendations {
    let lines: Vec<&str> = lines
        .iter()
        .copied()
        .filter(|l| !is_ui_residue_line(l) && !DEGREE_LINE_RE.is_match(l))
        .collect();
    let mut out = Recommendations::default();
    let mut tab = Tab::Received;
    let mut current: Option<(Recommendation, Vec<&str>)> = None;

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if let Some(next_tab) = tab_label(line) {
            flush(&mut out, tab, current.take());
            // "Received" directly above "Given" is the tab bar; the first label is active.
            tab = next_tab;
            i += if lines.get(i + 1).and_then(|l| tab_label(l)).is_some() { 2 } else { 1 };
            continue;
        }

        if let Some((rec, consumed)) = entry_header(&lines[i..]) {
            flush(&mut out, tab, current.take());
            current = Some((rec, Vec::new()));
            i += consumed;
            continue;
        }

        if let Some((_, text)) = current.as_mut() {
            text.push(line);
        }
        i += 1;
    }
    flush(&mut out, tab, current);
    out
}

fn tab_label(line: &str) -> Option<Tab> {
    match line.to_lowercase().as_str() {
        "received" => Some(Tab::Received),
        "given" => Some(Tab::Given),
        _ => None,
    }
}

// Name, then title, then a line opening with the spelled-out date.
fn entry_header(lines: &[&str]) -> Option<(Recommendation, usize)> {
    let [name, title, dated, ..] = lines else {
        return None;
    };
    let name = strip_degree_suffix(name);
    if !is_plausible_person_name(name, None) || tab_label(name).is_some() {
        return None;
    }
    let date = SPELLED_DATE_RE.captures(dated).filter(|c| c.get(0).is_some_and(|m| m.start() == 0))?;
    Some((
        Recommendation {
            recommender_name: name.to_string(),
            recommender_title: Some(title.to_string()),
            date: Some(date[1].to_string()),
            text: None,
        },
        3,
    ))
}

fn flush(out: &mut Recommendations, tab: Tab, current: Option<(Recommendation, Vec<&str>)>) {
    let Some((mut rec, text)) = current else {
        return;
    };
    rec.text = clean_duplicate_content(&text.join("\n\n"));
    match tab {
        Tab::Received => out.received.push(rec),
        Tab::Given => out.given.push(rec),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untabbed_entries_are_received() {
        let recs = extract(&[
            "Grace Hopper",
            "· 3rd",
            "Rear Admiral at US Navy",
            "March 3, 2021, Grace managed Jane directly",
            "Jane writes careful code.",
            "Jane writes careful code.",
        ]);
        assert_eq!(recs.received.len(), 1);
        assert!(recs.given.is_empty());
        let r = &recs.received[0];
        assert_eq!(r.recommender_name, "Grace Hopper");
        assert_eq!(r.recommender_title.as_deref(), Some("Rear Admiral at US Navy"));
        assert_eq!(r.date.as_deref(), Some("March 3, 2021"));
        assert_eq!(r.text.as_deref(), Some("Jane writes careful code."));
    }

    #[test]
    fn tab_labels_route_entries() {
        let recs = extract(&[
            "Received",
            "Given",
            "Grace Hopper",
            "Rear Admiral",
            "March 3, 2021, Grace managed Jane",
            "Great engineer.",
            "Given",
            "John Roe",
            "CTO at Globex",
            "June 5, 2019, Jane worked with John",
            "Sees around corners.",
            "Ada Lovelace",
            "Mathematician",
            "July 1, 2018, Jane mentored Ada",
        ]);
        assert_eq!(recs.received.len(), 1);
        assert_eq!(recs.given.len(), 2);
        assert_eq!(recs.given[1].recommender_name, "Ada Lovelace");
        assert_eq!(recs.given[1].text, None);
    }

    #[test]
    fn name_without_date_is_text() {
        let recs = extract(&["Grace Hopper", "Rear Admiral", "no date here"]);
        assert_eq!(recs, Recommendations::default());
    }
}
