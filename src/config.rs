use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::normalize::DEFAULT_MIRROR_MIN_CHARS;

/// Prefix for environment overrides, e.g. `PROFILE_PARSER_MIN_COMMENT_BLOCK_CHARS=80`.
pub const ENV_PREFIX: &str = "PROFILE_PARSER";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid activity delimiter {pattern:?}: {source}")]
    Delimiter {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
}

/// Tunables for segmentation and snippet sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Pattern that separates activity blocks in feed captures.
    pub activity_delimiter: String,
    pub min_post_block_chars: usize,
    pub min_comment_block_chars: usize,
    pub min_reaction_block_chars: usize,
    pub comment_snippet_words: usize,
    pub reaction_snippet_words: usize,
    pub reply_snippet_words: usize,
    /// Minimum half length before mirrored text is collapsed.
    pub mirror_min_chars: usize,
    /// How many lines after a skill name may hold its endorsement data.
    pub skill_lookahead_lines: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            activity_delimiter: r"Feed post number \d+".to_string(),
            min_post_block_chars: 10,
            min_comment_block_chars: 50,
            min_reaction_block_chars: 50,
            comment_snippet_words: 30,
            reaction_snippet_words: 25,
            reply_snippet_words: 20,
            mirror_min_chars: DEFAULT_MIRROR_MIN_CHARS,
            skill_lookahead_lines: 4,
        }
    }
}

impl ParserConfig {
    /// Defaults, then the optional file, then `PROFILE_PARSER_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?;
        let parsed: ParserConfig = settings.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let snippet_sizes = [
            ("comment_snippet_words", self.comment_snippet_words),
            ("reaction_snippet_words", self.reaction_snippet_words),
            ("reply_snippet_words", self.reply_snippet_words),
            ("skill_lookahead_lines", self.skill_lookahead_lines),
        ];
        for (field, value) in snippet_sizes {
            if value == 0 {
                return Err(ConfigError::Zero(field));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_values() {
        let c = ParserConfig::default();
        assert_eq!(c.min_post_block_chars, 10);
        assert_eq!(c.min_comment_block_chars, 50);
        assert_eq!(c.comment_snippet_words, 30);
        assert_eq!(c.reaction_snippet_words, 25);
        assert_eq!(c.reply_snippet_words, 20);
        assert_eq!(c.mirror_min_chars, 100);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn zero_snippet_rejected() {
        let c = ParserConfig {
            reply_snippet_words: 0,
            ..ParserConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::Zero("reply_snippet_words"))));
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "min_comment_block_chars = 80\nactivity_delimiter = \"Post \\\\d+\"").unwrap();
        let c = ParserConfig::load(Some(file.path())).unwrap();
        assert_eq!(c.min_comment_block_chars, 80);
        assert_eq!(c.activity_delimiter, r"Post \d+");
        assert_eq!(c.min_post_block_chars, 10);
    }
}
