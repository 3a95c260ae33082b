//! Optional second pass over a parse result by an external refiner.
//!
//! The heuristic result is always kept unless the refiner hands back a
//! result for the same section.

use thiserror::Error;
use tracing::{info, warn};

use crate::capture::ParsedSection;

#[derive(Debug, Error)]
pub enum RefineError {
    #[error("refiner unavailable: {0}")]
    Unavailable(String),
    #[error("refiner output is not a parse result: {0}")]
    Decode(#[from] serde_json::Error),
}

pub trait Refiner {
    /// A replacement for `initial`, given the raw text it was parsed from.
    fn refine(&self, raw: &str, initial: &ParsedSection) -> Result<ParsedSection, RefineError>;
}

impl<F> Refiner for F
where
    F: Fn(&str, &ParsedSection) -> Result<ParsedSection, RefineError>,
{
    fn refine(&self, raw: &str, initial: &ParsedSection) -> Result<ParsedSection, RefineError> {
        self(raw, initial)
    }
}

/// Decode a refiner's JSON reply (`{"section": ..., "records": ...}`).
pub fn decode_refined(json: &str) -> Result<ParsedSection, RefineError> {
    Ok(serde_json::from_str(json)?)
}

/// `initial`, or the refiner's replacement when it succeeds with the same section.
pub fn refine_section(refiner: Option<&dyn Refiner>, raw: &str, initial: ParsedSection) -> ParsedSection {
    let Some(refiner) = refiner else {
        return initial;
    };
    match refiner.refine(raw, &initial) {
        Ok(refined) if refined.section() == initial.section() => {
            info!(
                section = %initial.section(),
                before = initial.len(),
                after = refined.len(),
                "accepted refined records"
            );
            refined
        }
        Ok(refined) => {
            warn!(
                expected = %initial.section(),
                got = %refined.section(),
                "refiner changed the section, keeping heuristic records"
            );
            initial
        }
        Err(e) => {
            warn!(error = %e, "refinement failed, keeping heuristic records");
            initial
        }
    }
}
