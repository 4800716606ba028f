//! Exact byte-pattern and regex search over binary contents.

use super::{SignatureCategory, SignatureRegistry};
use crate::error::{Result, RevscopeError};
use indexmap::IndexMap;
use memchr::memmem;
use rayon::prelude::*;
use regex::bytes::RegexBuilder;
use serde::{Deserialize, Serialize};

/// Signature name to ascending hit offsets. Only names with hits appear.
pub type MatchResult = IndexMap<String, Vec<usize>>;

/// A single regex hit. Offsets are raw byte offsets into the searched data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegexMatch {
    pub offset: usize,
    /// Matched bytes decoded one byte per character (Latin-1).
    pub text: String,
    pub span: (usize, usize),
}

/// Every occurrence of `needle` in `haystack`, overlaps included: after a hit
/// at `i` the search resumes at `i + 1`.
pub fn find_overlapping(haystack: &[u8], needle: &[u8]) -> Vec<usize> {
    if needle.is_empty() {
        return Vec::new();
    }
    let finder = memmem::Finder::new(needle);
    let mut offsets = Vec::new();
    let mut start = 0usize;
    while start <= haystack.len() {
        match finder.find(&haystack[start..]) {
            Some(pos) => {
                let hit = start + pos;
                offsets.push(hit);
                start = hit + 1;
            }
            None => break,
        }
    }
    offsets
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Searches data for the signatures held in its registry.
#[derive(Debug, Clone, Default)]
pub struct PatternMatcher {
    registry: SignatureRegistry,
}

impl PatternMatcher {
    /// A matcher over the built-in signatures.
    pub fn new() -> Self {
        Self::with_registry(SignatureRegistry::new())
    }

    pub fn with_registry(registry: SignatureRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SignatureRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SignatureRegistry {
        &mut self.registry
    }

    pub fn add_pattern(&mut self, name: &str, pattern: &[u8]) -> Result<()> {
        self.registry.add_pattern(name, pattern)
    }

    /// Offsets of the named signature, ascending. Multi-pattern signatures
    /// report the de-duplicated union of their patterns' hits. Unknown names
    /// yield an empty list.
    pub fn find_pattern(&self, data: &[u8], name: &str) -> Vec<usize> {
        let Some(signature) = self.registry.get(name) else {
            return Vec::new();
        };
        match signature.patterns.as_slice() {
            [single] => find_overlapping(data, single),
            patterns => {
                let mut offsets: Vec<usize> = patterns
                    .iter()
                    .flat_map(|p| find_overlapping(data, p))
                    .collect();
                offsets.sort_unstable();
                offsets.dedup();
                offsets
            }
        }
    }

    /// Runs `find_pattern` for every registered signature, keeping only those
    /// with at least one hit. Output follows registry order.
    pub fn find_all_patterns(&self, data: &[u8]) -> MatchResult {
        let names = self.registry.names();
        let hits: Vec<(&str, Vec<usize>)> = names
            .par_iter()
            .map(|&name| (name, self.find_pattern(data, name)))
            .collect();
        hits.into_iter()
            .filter(|(_, offsets)| !offsets.is_empty())
            .map(|(name, offsets)| (name.to_string(), offsets))
            .collect()
    }

    /// True when any pattern of the named signature occurs in `data`.
    pub fn contains(&self, data: &[u8], name: &str) -> bool {
        self.registry
            .get(name)
            .map(|s| s.patterns.iter().any(|p| memmem::find(data, p).is_some()))
            .unwrap_or(false)
    }

    /// Names of signatures in `category` that occur in `data`, registry order.
    pub fn matching_in_category(&self, data: &[u8], category: SignatureCategory) -> Vec<&str> {
        self.registry
            .by_category(category)
            .filter(|s| s.patterns.iter().any(|p| memmem::find(data, p).is_some()))
            .map(|s| s.name.as_str())
            .collect()
    }

    /// Regex search with byte-aligned offsets.
    ///
    /// The pattern is compiled with Unicode disabled so each byte is one
    /// character; `offset` and `span` are therefore raw byte offsets and no
    /// input is ever rejected as undecodable.
    pub fn match_regex(&self, data: &[u8], pattern: &str) -> Result<Vec<RegexMatch>> {
        let re = RegexBuilder::new(pattern)
            .unicode(false)
            .build()
            .map_err(|e| RevscopeError::InvalidPattern(e.to_string()))?;
        Ok(re
            .find_iter(data)
            .map(|m| RegexMatch {
                offset: m.start(),
                text: latin1(m.as_bytes()),
                span: (m.start(), m.end()),
            })
            .collect())
    }
}
