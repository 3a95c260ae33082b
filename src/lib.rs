//! Heuristic extraction of structured records from captured profile and
//! activity-feed text.

pub mod capture;
pub mod config;
pub mod parser;
pub mod records;
pub mod refine;
pub mod store;

pub use capture::{Capture, CaptureSection, ParsedSection};
pub use config::ParserConfig;
pub use parser::{parse_activities, parse_capture, parse_comments, parse_profile, parse_reactions, ProfileParser};
