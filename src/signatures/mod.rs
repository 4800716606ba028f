//! Named byte signatures and the registry that holds them.
//!
//! A `SignatureRegistry` maps a unique name to one or more exact byte
//! sequences. It starts out seeded with shellcode prologues, dynamic-loading
//! API names and packer markers, and can be extended at runtime.

pub mod builtin;
pub mod matcher;

pub use matcher::{find_overlapping, MatchResult, PatternMatcher, RegexMatch};

use crate::error::{Result, RevscopeError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Coarse classification of what a signature recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureCategory {
    Packer,
    Api,
    Shellcode,
    /// Added at runtime without a declared category
    Custom,
}

/// A named set of exact byte sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub patterns: Vec<Vec<u8>>,
    pub category: SignatureCategory,
}

impl Signature {
    pub fn new(
        name: impl Into<String>,
        category: SignatureCategory,
        patterns: Vec<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            patterns,
            category,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.patterns.is_empty() {
            return Err(RevscopeError::InvalidInput(format!(
                "signature '{}' has no patterns",
                self.name
            )));
        }
        if self.patterns.iter().any(|p| p.is_empty()) {
            return Err(RevscopeError::InvalidInput(format!(
                "signature '{}' contains an empty pattern",
                self.name
            )));
        }
        Ok(())
    }
}

/// Insertion-ordered table of signatures keyed by unique name.
#[derive(Debug, Clone)]
pub struct SignatureRegistry {
    signatures: IndexMap<String, Signature>,
}

impl Default for SignatureRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SignatureRegistry {
    /// A registry seeded with the built-in signatures.
    pub fn new() -> Self {
        let mut signatures = IndexMap::with_capacity(builtin::BUILTIN_SIGNATURES.len());
        for &(name, category, patterns) in builtin::BUILTIN_SIGNATURES {
            let patterns = patterns.iter().map(|p| p.to_vec()).collect();
            signatures.insert(name.to_string(), Signature::new(name, category, patterns));
        }
        Self { signatures }
    }

    /// A registry with no signatures at all.
    pub fn empty() -> Self {
        Self {
            signatures: IndexMap::new(),
        }
    }

    /// Insert a single-pattern signature, or replace the pattern list of an
    /// existing one (its category is kept).
    pub fn add_pattern(&mut self, name: &str, pattern: &[u8]) -> Result<()> {
        let category = self
            .signatures
            .get(name)
            .map(|s| s.category)
            .unwrap_or(SignatureCategory::Custom);
        self.add_signature(Signature::new(name, category, vec![pattern.to_vec()]))
    }

    /// Insert a signature, replacing any existing entry with the same name in
    /// place.
    pub fn add_signature(&mut self, signature: Signature) -> Result<()> {
        signature.validate()?;
        debug!(
            name = %signature.name,
            patterns = signature.patterns.len(),
            replaced = self.signatures.contains_key(&signature.name),
            "Registering signature"
        );
        self.signatures.insert(signature.name.clone(), signature);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Signature> {
        self.signatures.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.signatures.contains_key(name)
    }

    /// Signature names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.signatures.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signature> {
        self.signatures.values()
    }

    pub fn by_category(&self, category: SignatureCategory) -> impl Iterator<Item = &Signature> {
        self.iter().filter(move |s| s.category == category)
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}
