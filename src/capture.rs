use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::tokens::clean_profile_name;
use crate::records::{ActivityRecord, CommentRecord, FieldProvenance, ProfileRecord, ReactionRecord};

/// Which page a capture was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSection {
    Profile,
    Posts,
    Comments,
    Reactions,
}

impl CaptureSection {
    pub const ALL: [CaptureSection; 4] = [Self::Profile, Self::Posts, Self::Comments, Self::Reactions];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Posts => "posts",
            Self::Comments => "comments",
            Self::Reactions => "reactions",
        }
    }
}

impl fmt::Display for CaptureSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown capture section {0:?} (expected profile, posts, comments or reactions)")]
pub struct UnknownSection(pub String);

impl FromStr for CaptureSection {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "profile" | "about" => Ok(Self::Profile),
            "posts" | "activity" | "shares" => Ok(Self::Posts),
            "comments" => Ok(Self::Comments),
            "reactions" => Ok(Self::Reactions),
            other => Err(UnknownSection(other.to_string())),
        }
    }
}

/// Raw text of one captured page, keyed by the profile it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capture {
    pub profile_key: String,
    pub section: CaptureSection,
    pub text: String,
}

impl Capture {
    pub fn new(profile_key: impl Into<String>, section: CaptureSection, text: impl Into<String>) -> Self {
        Self {
            profile_key: profile_key.into(),
            section,
            text: text.into(),
        }
    }
}

/// Records parsed from one capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "section", content = "records", rename_all = "lowercase")]
pub enum ParsedSection {
    Profile(ProfileRecord),
    Posts(Vec<ActivityRecord>),
    Comments(Vec<CommentRecord>),
    Reactions(Vec<ReactionRecord>),
}

impl ParsedSection {
    pub fn section(&self) -> CaptureSection {
        match self {
            Self::Profile(_) => CaptureSection::Profile,
            Self::Posts(_) => CaptureSection::Posts,
            Self::Comments(_) => CaptureSection::Comments,
            Self::Reactions(_) => CaptureSection::Reactions,
        }
    }

    /// Record count; a profile counts as one record.
    pub fn len(&self) -> usize {
        match self {
            Self::Profile(_) => 1,
            Self::Posts(r) => r.len(),
            Self::Comments(r) => r.len(),
            Self::Reactions(r) => r.len(),
        }
    }

    /// Every provenance entry across the records, in record order.
    pub fn provenance(&self) -> Vec<&FieldProvenance> {
        match self {
            Self::Profile(p) => p.provenance.iter().collect(),
            Self::Posts(r) => r.iter().flat_map(|r| &r.provenance).collect(),
            Self::Comments(r) => r.iter().flat_map(|r| &r.provenance).collect(),
            Self::Reactions(r) => r.iter().flat_map(|r| &r.provenance).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Profile(p) => *p == ProfileRecord::default(),
            _ => self.len() == 0,
        }
    }
}

/// Best display name after `parsed`: a profile capture that found a name
/// replaces `current`, anything else keeps it.
pub fn refined_name(current: &str, parsed: &ParsedSection) -> String {
    match parsed {
        ParsedSection::Profile(ProfileRecord { name: Some(name), .. }) if !name.trim().is_empty() => {
            clean_profile_name(name)
        }
        _ => clean_profile_name(current),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_names_round_trip() {
        for section in CaptureSection::ALL {
            assert_eq!(section.to_string().parse::<CaptureSection>(), Ok(section));
        }
        assert_eq!("Activity".parse::<CaptureSection>(), Ok(CaptureSection::Posts));
        assert!("inbox".parse::<CaptureSection>().is_err());
    }

    #[test]
    fn parsed_section_is_tagged() {
        let json = serde_json::to_value(ParsedSection::Comments(Vec::new())).unwrap();
        assert_eq!(json, serde_json::json!({"section": "comments", "records": []}));
    }

    #[test]
    fn profile_name_refines_current() {
        let profile = ParsedSection::Profile(ProfileRecord {
            name: Some("Jane Doe {:badgeType}".into()),
            ..ProfileRecord::default()
        });
        assert_eq!(refined_name("jdoe", &profile), "Jane Doe");
        assert_eq!(refined_name("Dr. Jane Doe", &ParsedSection::Posts(Vec::new())), "Jane Doe");
        assert_eq!(refined_name("Jane", &ParsedSection::Profile(ProfileRecord::default())), "Jane");
    }
}
