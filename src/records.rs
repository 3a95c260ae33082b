//! Output records. Field names serialize in camelCase and are the contract
//! with persistence and refinement collaborators.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Which rule produced a field, so a downstream corrector knows what to distrust.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldProvenance {
    pub field: String,
    pub rule: String,
    pub confidence: Confidence,
}

impl FieldProvenance {
    pub fn new(field: &str, rule: &str, confidence: Confidence) -> Self {
        Self {
            field: field.to_string(),
            rule: rule.to_string(),
            confidence,
        }
    }
}

// ── Activity feed ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    OriginalPost,
    Repost,
}

impl ActivityType {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityType::OriginalPost => "original_post",
            ActivityType::Repost => "repost",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Engagement {
    pub likes: Option<u64>,
    pub comments_count: Option<u64>,
    pub reposts_count: Option<u64>,
}

impl Engagement {
    pub fn is_empty(&self) -> bool {
        self.likes.is_none() && self.comments_count.is_none() && self.reposts_count.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginalPost {
    pub author_name: Option<String>,
    pub author_headline: Option<String>,
    pub timestamp: Option<String>,
    pub content: Option<String>,
    pub engagement: Engagement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    pub name: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Document,
    WebLink,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub timestamp: Option<String>,
    pub authored_content: Option<String>,
    pub engagement: Engagement,
    pub original_post: Option<OriginalPost>,
    pub mentions: Vec<Mention>,
    pub hashtags: Vec<String>,
    pub media: Vec<Media>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provenance: Vec<FieldProvenance>,
}

// ── Comments ──

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostReference {
    pub author: Option<String>,
    pub author_headline: Option<String>,
    pub timestamp: Option<String>,
    pub content_snippet: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyTarget {
    pub author: String,
    pub comment_snippet: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    pub id: String,
    pub text: String,
    pub timestamp: Option<String>,
    pub likes: Option<u64>,
    pub on_original_post: PostReference,
    pub is_reply_to: Option<ReplyTarget>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provenance: Vec<FieldProvenance>,
}

// ── Reactions ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionTargetKind {
    Post,
    Comment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionTarget {
    #[serde(rename = "type")]
    pub kind: ReactionTargetKind,
    pub author: Option<String>,
    pub author_headline: Option<String>,
    pub content_snippet: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostContext {
    pub author: Option<String>,
    pub content_snippet: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionRecord {
    pub id: String,
    pub reaction_type: String,
    pub reacted_to: ReactionTarget,
    pub original_post_context: Option<PostContext>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provenance: Vec<FieldProvenance>,
}

// ── Profile ──

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub duration: Option<String>,
    pub total_duration: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    pub school: String,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub years: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillEntry {
    pub name: String,
    pub endorsements_count: Option<u64>,
    pub endorsed_by_summary: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub recommender_name: String,
    pub recommender_title: Option<String>,
    pub date: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendations {
    pub received: Vec<Recommendation>,
    pub given: Vec<Recommendation>,
}

/// A followed person, company, group, newsletter or school.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestEntity {
    pub name: String,
    pub headline: Option<String>,
    pub followers: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interests {
    pub top_voices: Vec<InterestEntity>,
    pub companies: Vec<InterestEntity>,
    pub groups: Vec<InterestEntity>,
    pub newsletters: Vec<InterestEntity>,
    pub schools: Vec<InterestEntity>,
}

impl Interests {
    pub fn is_empty(&self) -> bool {
        self.top_voices.is_empty()
            && self.companies.is_empty()
            && self.groups.is_empty()
            && self.newsletters.is_empty()
            && self.schools.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileRecord {
    pub name: Option<String>,
    pub headline: Option<String>,
    pub current_company: Option<String>,
    pub location: Option<String>,
    pub followers: Option<u64>,
    pub connections: Option<String>,
    pub mutual_connections: Vec<String>,
    pub about: Option<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub skills: Vec<SkillEntry>,
    pub recommendations: Recommendations,
    pub interests: Interests,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provenance: Vec<FieldProvenance>,
}
