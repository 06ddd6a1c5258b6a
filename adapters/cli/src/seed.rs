//! Level seed parsing for the command line.

use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use yogo_core::LevelSeed;

/// Reasons a command-line seed was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum SeedError {
    /// The argument is not a 32-bit integer.
    #[error("`{input}` is not a 32-bit integer seed")]
    Unparsable {
        /// Argument as supplied.
        input: String,
    },
}

/// Parses a seed argument.
///
/// Negative values are reinterpreted bit-for-bit, so `-1` and `4294967295`
/// name the same level.
pub(crate) fn parse_seed(input: &str) -> Result<LevelSeed, SeedError> {
    let trimmed = input.trim();
    if let Ok(signed) = trimmed.parse::<i32>() {
        return Ok(LevelSeed::from(signed));
    }
    trimmed
        .parse::<u32>()
        .map(LevelSeed::new)
        .map_err(|_| SeedError::Unparsable {
            input: input.to_owned(),
        })
}

/// Seed derived from the wall clock for runs started without an explicit seed.
pub(crate) fn clock_seed() -> LevelSeed {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    LevelSeed::new(since_epoch.subsec_nanos() ^ since_epoch.as_secs() as u32)
}
