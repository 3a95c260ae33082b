pub mod blocks;
pub mod extract;
pub mod normalize;
pub mod numeric;
pub mod rules;
pub mod sections;
pub mod tokens;

use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::capture::{Capture, CaptureSection, ParsedSection};
use crate::config::{ConfigError, ParserConfig};
use crate::records::{ActivityRecord, CommentRecord, ProfileRecord, ReactionRecord};

static DEFAULT_PARSER: LazyLock<ProfileParser> = LazyLock::new(|| {
    ProfileParser::new(ParserConfig::default()).expect("default parser config is valid")
});

/// Entry point for every capture kind: text → blocks → lines → records.
#[derive(Debug, Clone)]
pub struct ProfileParser {
    config: ParserConfig,
    delimiter: Regex,
}

impl ProfileParser {
    pub fn new(config: ParserConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let delimiter = Regex::new(&config.activity_delimiter).map_err(|source| ConfigError::Delimiter {
            pattern: config.activity_delimiter.clone(),
            source,
        })?;
        Ok(Self { config, delimiter })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Activity blocks of `raw` longer than `min_chars`.
    pub fn segment<'a>(&self, raw: &'a str, min_chars: usize) -> Vec<&'a str> {
        blocks::segment_blocks(raw, &self.delimiter, min_chars)
    }

    /// Feed blocks the extractor for `section` works on; profiles are not block based.
    pub fn blocks_for<'a>(&self, section: CaptureSection, raw: &'a str) -> Vec<&'a str> {
        let min_chars = match section {
            CaptureSection::Profile => return Vec::new(),
            CaptureSection::Posts => self.config.min_post_block_chars,
            CaptureSection::Comments => self.config.min_comment_block_chars,
            CaptureSection::Reactions => self.config.min_reaction_block_chars,
        };
        self.segment(raw, min_chars)
    }

    pub fn parse_activities(&self, raw: &str, profile_name: &str) -> Vec<ActivityRecord> {
        let blocks = self.blocks_for(CaptureSection::Posts, raw);
        let records = extract::activity::extract(&blocks, profile_name, &self.config);
        info!(blocks = blocks.len(), records = records.len(), "parsed activity capture");
        records
    }

    pub fn parse_comments(&self, raw: &str, profile_name: &str) -> Vec<CommentRecord> {
        let blocks = self.blocks_for(CaptureSection::Comments, raw);
        let records = extract::comments::extract(&blocks, profile_name, &self.config);
        info!(blocks = blocks.len(), records = records.len(), "parsed comments capture");
        records
    }

    pub fn parse_reactions(&self, raw: &str, profile_name: &str) -> Vec<ReactionRecord> {
        let blocks = self.blocks_for(CaptureSection::Reactions, raw);
        let records = extract::reactions::extract(&blocks, profile_name, &self.config);
        info!(blocks = blocks.len(), records = records.len(), "parsed reactions capture");
        records
    }

    /// `existing_name` is the best display name known so far, possibly empty.
    pub fn parse_profile(&self, raw: &str, existing_name: &str) -> ProfileRecord {
        extract::profile::extract(raw, existing_name, &self.config)
    }

    pub fn parse_capture(&self, capture: &Capture, profile_name: &str) -> ParsedSection {
        match capture.section {
            CaptureSection::Profile => ParsedSection::Profile(self.parse_profile(&capture.text, profile_name)),
            CaptureSection::Posts => ParsedSection::Posts(self.parse_activities(&capture.text, profile_name)),
            CaptureSection::Comments => {
                ParsedSection::Comments(self.parse_comments(&capture.text, profile_name))
            }
            CaptureSection::Reactions => {
                ParsedSection::Reactions(self.parse_reactions(&capture.text, profile_name))
            }
        }
    }
}

impl Default for ProfileParser {
    fn default() -> Self {
        DEFAULT_PARSER.clone()
    }
}

pub fn parse_activities(raw: &str, profile_name: &str) -> Vec<ActivityRecord> {
    DEFAULT_PARSER.parse_activities(raw, profile_name)
}

pub fn parse_comments(raw: &str, profile_name: &str) -> Vec<CommentRecord> {
    DEFAULT_PARSER.parse_comments(raw, profile_name)
}

pub fn parse_reactions(raw: &str, profile_name: &str) -> Vec<ReactionRecord> {
    DEFAULT_PARSER.parse_reactions(raw, profile_name)
}

pub fn parse_profile(raw: &str, existing_name: &str) -> ProfileRecord {
    DEFAULT_PARSER.parse_profile(raw, existing_name)
}

pub fn parse_capture(capture: &Capture, profile_name: &str) -> ParsedSection {
    DEFAULT_PARSER.parse_capture(capture, profile_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_delimiter_is_a_config_error() {
        let config = ParserConfig {
            activity_delimiter: "Feed post (".into(),
            ..ParserConfig::default()
        };
        assert!(matches!(ProfileParser::new(config), Err(ConfigError::Delimiter { .. })));
    }

    #[test]
    fn custom_delimiter_is_used() {
        let config = ParserConfig {
            activity_delimiter: r"-- item \d+ --".into(),
            ..ParserConfig::default()
        };
        let parser = ProfileParser::new(config).unwrap();
        let raw = "-- item 1 --\nVisible to anyone on or off LinkedIn\nHello there friends";
        let records = parser.parse_activities(raw, "Jane Doe");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].authored_content.as_deref(), Some("Hello there friends"));
    }

    #[test]
    fn empty_inputs_yield_empty_results() {
        assert!(parse_activities("", "Jane Doe").is_empty());
        assert!(parse_comments("", "Jane Doe").is_empty());
        assert!(parse_reactions("", "Jane Doe").is_empty());
        let profile = parse_profile("", "");
        assert_eq!(profile, ProfileRecord::default());
    }

    #[test]
    fn capture_dispatch_matches_section() {
        let capture = Capture::new("jane", CaptureSection::Comments, "");
        assert_eq!(parse_capture(&capture, "Jane Doe").section(), CaptureSection::Comments);
    }
}
