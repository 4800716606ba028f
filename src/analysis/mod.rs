//! Static heuristic analyzers.
//!
//! Each analyzer is a pure function of an immutable `BinaryImage`, so
//! analyzers can run in any order or concurrently.

pub mod antidebug;
pub mod obfuscation;

pub use antidebug::{AntiDebugDetector, AntiDebugReport};
pub use obfuscation::{ObfuscationAnalyzer, ObfuscationMetrics};
