//! Heuristic obfuscation scoring.

use crate::config::ObfuscationConfig;
use crate::entropy::shannon_entropy;
use crate::io::BinaryImage;
use memchr::memmem;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Indirect call/jump encodings counted by the control-flow heuristic.
pub const INDIRECT_BRANCH_PATTERNS: &[&[u8]] = &[
    b"\xFF\xD0", // call eax
    b"\xFF\xD1", // call ecx
    b"\xFF\xE0", // jmp eax
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObfuscationMetrics {
    /// Shannon entropy, bits per byte in [0, 8].
    pub entropy: f64,
    pub control_flow_obfuscation: bool,
    pub string_obfuscation: bool,
    pub instruction_obfuscation: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ObfuscationAnalyzer {
    config: ObfuscationConfig,
}

impl ObfuscationAnalyzer {
    pub fn new(config: ObfuscationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ObfuscationConfig {
        &self.config
    }

    pub fn analyze(&self, image: &BinaryImage) -> ObfuscationMetrics {
        let data = image.bytes();
        let metrics = ObfuscationMetrics {
            entropy: image.entropy(),
            control_flow_obfuscation: self.control_flow_obfuscation(data),
            string_obfuscation: self.string_obfuscation(data),
            instruction_obfuscation: self.instruction_obfuscation(data),
        };
        debug!(
            entropy = metrics.entropy,
            control_flow = metrics.control_flow_obfuscation,
            strings = metrics.string_obfuscation,
            "Obfuscation analysis complete"
        );
        metrics
    }

    pub fn entropy(&self, data: &[u8]) -> f64 {
        shannon_entropy(data)
    }

    /// Non-overlapping hits of every `INDIRECT_BRANCH_PATTERNS` entry.
    pub fn indirect_branch_count(&self, data: &[u8]) -> usize {
        INDIRECT_BRANCH_PATTERNS
            .iter()
            .map(|p| memmem::find_iter(data, p).count())
            .sum()
    }

    /// True when indirect branches exceed `indirect_branch_density` of the length.
    pub fn control_flow_obfuscation(&self, data: &[u8]) -> bool {
        let count = self.indirect_branch_count(data) as f64;
        count > data.len() as f64 * self.config.indirect_branch_density
    }

    /// Share of bytes in 0x20..=0x7E; 0.0 for empty input.
    pub fn printable_ratio(&self, data: &[u8]) -> f64 {
        if data.is_empty() {
            return 0.0;
        }
        let printable = data.iter().filter(|&&b| (0x20..=0x7E).contains(&b)).count();
        printable as f64 / data.len() as f64
    }

    /// True when the printable ratio falls below `printable_ratio_threshold`.
    ///
    /// Empty input has ratio 0.0 and is therefore flagged.
    pub fn string_obfuscation(&self, data: &[u8]) -> bool {
        self.printable_ratio(data) < self.config.printable_ratio_threshold
    }

    /// No instruction-level detector exists yet; always false.
    pub fn instruction_obfuscation(&self, _data: &[u8]) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printable_text() {
        let analyzer = ObfuscationAnalyzer::default();
        assert_eq!(analyzer.printable_ratio(b"HELLO WORLD"), 1.0);
        assert!(!analyzer.string_obfuscation(b"HELLO WORLD"));
    }

    #[test]
    fn test_all_zero_bytes() {
        let analyzer = ObfuscationAnalyzer::default();
        let data = vec![0u8; 64];
        assert_eq!(analyzer.printable_ratio(&data), 0.0);
        assert!(analyzer.string_obfuscation(&data));
    }

    #[test]
    fn test_empty_input() {
        let analyzer = ObfuscationAnalyzer::default();
        assert_eq!(analyzer.printable_ratio(b""), 0.0);
        assert!(analyzer.string_obfuscation(b""));
        assert!(!analyzer.control_flow_obfuscation(b""));
        assert_eq!(analyzer.entropy(b""), 0.0);
    }

    #[test]
    fn test_printable_boundaries() {
        let analyzer = ObfuscationAnalyzer::default();
        assert_eq!(analyzer.printable_ratio(&[0x1F, 0x20, 0x7E, 0x7F]), 0.5);
    }

    #[test]
    fn test_control_flow_density_threshold() {
        let analyzer = ObfuscationAnalyzer::default();
        // 2 hits in 200 bytes == exactly 1%: not above the threshold
        let mut data = vec![0x90u8; 200];
        data[10..12].copy_from_slice(b"\xFF\xD0");
        data[50..52].copy_from_slice(b"\xFF\xE0");
        assert_eq!(analyzer.indirect_branch_count(&data), 2);
        assert!(!analyzer.control_flow_obfuscation(&data));

        data[90..92].copy_from_slice(b"\xFF\xD1");
        assert!(analyzer.control_flow_obfuscation(&data));
    }

    #[test]
    fn test_custom_thresholds() {
        let analyzer = ObfuscationAnalyzer::new(ObfuscationConfig {
            indirect_branch_density: 0.5,
            printable_ratio_threshold: 0.9,
        });
        assert!(analyzer.string_obfuscation(b"ABCD\x00\x00"));
        assert!(!analyzer.control_flow_obfuscation(b"\xFF\xD0\x90\x90\x90"));
    }

    #[test]
    fn test_analyze_image_fields() {
        let analyzer = ObfuscationAnalyzer::default();
        let image = BinaryImage::from_bytes(b"HELLO WORLD".to_vec());
        let metrics = analyzer.analyze(&image);
        assert_eq!(metrics.entropy, image.entropy());
        assert!(!metrics.string_obfuscation);
        assert!(!metrics.control_flow_obfuscation);
        assert!(!metrics.instruction_obfuscation);
    }
}
