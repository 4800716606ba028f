//! Static binary analysis: packer, anti-debug and obfuscation heuristics,
//! signature search, external decompiler and unpacker orchestration, and a
//! function-interception registry.

/// Obfuscation and anti-debug heuristics
pub mod analysis;
/// Configuration for analyzers and external tools
pub mod config;
/// External decompiler backends
pub mod decompiler;
/// Entropy calculation
pub mod entropy;
/// Error types
pub mod error;
/// Function-interception registry
pub mod hooking;
/// Binary loading and bounds-checked buffers
pub mod io;
/// Logging and tracing infrastructure
pub mod logging;
/// Packer detection and unpacking
pub mod packers;
/// Whole-binary analysis session
pub mod session;
/// Signature registry and pattern matching
pub mod signatures;
/// Timeout utilities
pub mod timeout;
/// External tool invocation
pub mod tools;

pub use analysis::{AntiDebugDetector, AntiDebugReport, ObfuscationAnalyzer, ObfuscationMetrics};
pub use config::AnalysisConfig;
pub use decompiler::{DecompileResult, Decompiler, DecompilerKind};
pub use error::{Result, RevscopeError};
pub use hooking::{HookAction, HookCall, HookHandler, HookRegistry, Platform};
pub use io::{BinaryImage, SafeBuffer};
pub use packers::{Packer, PackerDetector, UnpackOutcome, Unpacker};
pub use session::{AnalysisReport, AnalysisSession, SessionOptions};
pub use signatures::{PatternMatcher, SignatureCategory, SignatureRegistry};
