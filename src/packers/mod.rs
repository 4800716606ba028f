//! Packer identification.
//!
//! Packers are checked in a declared priority order so detection stays
//! deterministic when several packers' markers co-occur in one image.

pub mod unpack;

pub use unpack::{UnpackOutcome, UnpackStrategy, Unpacker};

use crate::error::RevscopeError;
use crate::signatures::PatternMatcher;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Known packers. Each variant's markers live in the `SignatureRegistry`
/// under `Packer::name()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Packer {
    Upx,
    PeCompact,
    AsPack,
    Fsg,
    Mew,
}

impl Packer {
    /// Detection priority, highest first.
    pub const PRIORITY: [Packer; 5] = [
        Packer::Upx,
        Packer::PeCompact,
        Packer::AsPack,
        Packer::Fsg,
        Packer::Mew,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Packer::Upx => "upx",
            Packer::PeCompact => "pecompact",
            Packer::AsPack => "aspack",
            Packer::Fsg => "fsg",
            Packer::Mew => "mew",
        }
    }

    /// Only UPX ships a dedicated decompressor.
    pub fn strategy(self) -> UnpackStrategy {
        match self {
            Packer::Upx => UnpackStrategy::Upx,
            _ => UnpackStrategy::Generic,
        }
    }
}

impl fmt::Display for Packer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Packer {
    type Err = RevscopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Packer::PRIORITY
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| RevscopeError::InvalidInput(format!("unknown packer: {s}")))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PackerDetector;

impl PackerDetector {
    /// Stateless; signatures come from the matcher passed to each call.
    pub fn new() -> Self {
        Self
    }

    /// First packer in `Packer::PRIORITY` with any marker present in `data`.
    pub fn detect_packer(&self, data: &[u8], matcher: &PatternMatcher) -> Option<Packer> {
        let found = Packer::PRIORITY
            .into_iter()
            .find(|p| matcher.contains(data, p.name()));
        debug!(packer = ?found, "Packer detection complete");
        found
    }
}
