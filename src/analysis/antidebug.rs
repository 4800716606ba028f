//! Anti-debugging technique detection.
//!
//! Three independent byte-content checks plus the packer signature check;
//! finding nothing yields an all-false report.

use crate::io::BinaryImage;
use crate::signatures::{PatternMatcher, SignatureCategory};
use aho_corasick::AhoCorasick;
use memchr::memmem;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// API names whose presence suggests debugger checks, in report order.
pub const ANTI_DEBUG_APIS: &[&str] = &[
    "IsDebuggerPresent",
    "CheckRemoteDebuggerPresent",
    "NtQueryInformationProcess",
    "OutputDebugString",
];

pub const TIMING_APIS: &[&[u8]] = &[b"GetTickCount", b"QueryPerformanceCounter", b"rdtsc"];

/// rdtsc
pub const TIMESTAMP_COUNTER_OPCODE: &[u8] = b"\x0F\x31";

pub const PEB_ACCESS_PATTERNS: &[&[u8]] = &[
    // mov eax, fs:[0x30]
    b"\x64\xA1\x30\x00\x00\x00",
    // mov rax, gs:[0x60]
    b"\x65\x48\x8B\x04\x25\x60\x00\x00\x00",
];

static ANTI_DEBUG_AUTOMATON: Lazy<AhoCorasick> =
    Lazy::new(|| AhoCorasick::new(ANTI_DEBUG_APIS).expect("valid anti-debug automaton"));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AntiDebugReport {
    pub packed: bool,
    pub anti_debug_apis: Vec<String>,
    pub timing_checks: bool,
    pub debugger_detection: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AntiDebugDetector;

impl AntiDebugDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn detect(&self, image: &BinaryImage, matcher: &PatternMatcher) -> AntiDebugReport {
        let data = image.bytes();
        let report = AntiDebugReport {
            packed: self.check_packed(data, matcher),
            anti_debug_apis: self.check_anti_debug_apis(data),
            timing_checks: self.check_timing_checks(data),
            debugger_detection: self.check_debugger_detection(data),
        };
        debug!(
            apis = report.anti_debug_apis.len(),
            timing = report.timing_checks,
            peb = report.debugger_detection,
            "Anti-debug detection complete"
        );
        report
    }

    /// Any packer-category signature present.
    pub fn check_packed(&self, data: &[u8], matcher: &PatternMatcher) -> bool {
        !matcher
            .matching_in_category(data, SignatureCategory::Packer)
            .is_empty()
    }

    /// Anti-debug API names found, in `ANTI_DEBUG_APIS` order.
    pub fn check_anti_debug_apis(&self, data: &[u8]) -> Vec<String> {
        let mut seen = [false; ANTI_DEBUG_APIS.len()];
        for m in ANTI_DEBUG_AUTOMATON.find_overlapping_iter(data) {
            seen[m.pattern().as_usize()] = true;
        }
        ANTI_DEBUG_APIS
            .iter()
            .zip(seen)
            .filter(|(_, hit)| *hit)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    pub fn check_timing_checks(&self, data: &[u8]) -> bool {
        TIMING_APIS
            .iter()
            .chain(std::iter::once(&TIMESTAMP_COUNTER_OPCODE))
            .any(|p| memmem::find(data, p).is_some())
    }

    pub fn check_debugger_detection(&self, data: &[u8]) -> bool {
        PEB_ACCESS_PATTERNS
            .iter()
            .any(|p| memmem::find(data, p).is_some())
    }
}
