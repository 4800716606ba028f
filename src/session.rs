//! One-shot analysis of a single binary.
//!
//! The four static analyzers only read the shared `BinaryImage`, so they run
//! concurrently. The optional subprocess steps (decompile, unpack) follow and
//! never abort the session: their failures are recorded in the report.

use crate::analysis::{AntiDebugDetector, AntiDebugReport, ObfuscationAnalyzer, ObfuscationMetrics};
use crate::config::AnalysisConfig;
use crate::decompiler::{DecompileResult, Decompiler, DecompilerKind};
use crate::error::Result;
use crate::io::BinaryImage;
use crate::packers::{Packer, PackerDetector, UnpackOutcome, Unpacker};
use crate::signatures::{MatchResult, PatternMatcher};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Optional steps for `AnalysisSession::analyze`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Decompile with this backend when set.
    pub decompiler: Option<DecompilerKind>,
    pub function_address: Option<u64>,
    pub unpack: bool,
    /// Defaults to the input path with `.unpacked` appended.
    pub unpack_output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub path: Option<PathBuf>,
    pub size: usize,
    pub sha256: String,
    #[serde(flatten)]
    pub anti_debug: AntiDebugReport,
    #[serde(flatten)]
    pub obfuscation: ObfuscationMetrics,
    pub packer: Option<Packer>,
    pub signatures: MatchResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decompile: Option<DecompileResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unpack: Option<UnpackOutcome>,
}

impl AnalysisReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisSession {
    image: BinaryImage,
    config: AnalysisConfig,
    matcher: PatternMatcher,
}

impl AnalysisSession {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_config(path, AnalysisConfig::default())
    }

    pub fn load_with_config(path: impl AsRef<Path>, config: AnalysisConfig) -> Result<Self> {
        let image = BinaryImage::load_with_config(path, &config.io)?;
        Ok(Self::from_image(image, config))
    }

    pub fn from_image(image: BinaryImage, config: AnalysisConfig) -> Self {
        Self {
            image,
            config,
            matcher: PatternMatcher::new(),
        }
    }

    /// Replace the signature set used by every analyzer in this session.
    pub fn with_matcher(mut self, matcher: PatternMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn image(&self) -> &BinaryImage {
        &self.image
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn matcher(&self) -> &PatternMatcher {
        &self.matcher
    }

    pub fn analyze(&self, options: &SessionOptions) -> AnalysisReport {
        let data = self.image.bytes();
        let obfuscation_analyzer = ObfuscationAnalyzer::new(self.config.obfuscation.clone());

        let ((signatures, packer), (anti_debug, obfuscation)) = rayon::join(
            || {
                rayon::join(
                    || self.matcher.find_all_patterns(data),
                    || PackerDetector::new().detect_packer(data, &self.matcher),
                )
            },
            || {
                rayon::join(
                    || AntiDebugDetector::new().detect(&self.image, &self.matcher),
                    || obfuscation_analyzer.analyze(&self.image),
                )
            },
        );

        let (decompile, unpack) = rayon::join(
            || options.decompiler.map(|kind| self.decompile(kind, options.function_address)),
            || options.unpack.then(|| self.unpack(packer, options.unpack_output.as_deref())),
        );

        info!(
            size = self.image.size(),
            packer = ?packer,
            signatures = signatures.len(),
            entropy = obfuscation.entropy,
            "Analysis complete"
        );

        AnalysisReport {
            path: self.image.source().map(Path::to_path_buf),
            size: self.image.size(),
            sha256: self.image.sha256().to_string(),
            anti_debug,
            obfuscation,
            packer,
            signatures,
            decompile,
            unpack,
        }
    }

    fn decompile(&self, kind: DecompilerKind, function_address: Option<u64>) -> DecompileResult {
        let Some(path) = self.image.source() else {
            return DecompileResult::failure("decompilation requires an image loaded from a file");
        };
        let decompiler = Decompiler::new(kind, self.config.tools.clone());
        decompiler
            .decompile(path, function_address)
            .unwrap_or_else(|e| {
                warn!(backend = %kind, error = %e, "Decompile step failed");
                DecompileResult::failure(e.to_string())
            })
    }

    fn unpack(&self, packer: Option<Packer>, output: Option<&Path>) -> UnpackOutcome {
        let unpacker = Unpacker::with_matcher(self.config.tools.clone(), self.matcher.clone());
        unpacker
            .unpack_image(&self.image, output)
            .unwrap_or_else(|e| {
                warn!(error = %e, "Unpack step failed");
                UnpackOutcome::failed(packer, None, e.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolConfig;

    fn packed_image() -> BinaryImage {
        let mut data = b"UPX!".to_vec();
        data.extend(std::iter::repeat(0u8).take(256));
        BinaryImage::from_bytes(data)
    }

    fn missing_tools() -> AnalysisConfig {
        AnalysisConfig {
            tools: ToolConfig {
                upx_path: Some(PathBuf::from("/nonexistent/upx")),
                radare2_path: Some(PathBuf::from("/nonexistent/r2")),
                probe_timeout_secs: 2,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_packed_low_printable_image() {
        let session = AnalysisSession::from_image(packed_image(), AnalysisConfig::default());
        let report = session.analyze(&SessionOptions::default());
        assert_eq!(report.packer, Some(Packer::Upx));
        assert!(report.anti_debug.packed);
        assert!(report.obfuscation.string_obfuscation);
        assert!(!report.obfuscation.instruction_obfuscation);
        assert_eq!(report.signatures["upx"], vec![0]);
        assert!(report.decompile.is_none());
        assert!(report.unpack.is_none());
    }

    #[test]
    fn test_plain_text_image() {
        let image = BinaryImage::from_bytes(b"HELLO WORLD".to_vec());
        let report = AnalysisSession::from_image(image, AnalysisConfig::default())
            .analyze(&SessionOptions::default());
        assert_eq!(report.packer, None);
        assert!(!report.anti_debug.packed);
        assert!(!report.obfuscation.string_obfuscation);
        assert!(report.signatures.is_empty());
        assert_eq!(report.size, 11);
    }

    #[test]
    fn test_report_json_field_names_are_flat() {
        let session = AnalysisSession::from_image(packed_image(), AnalysisConfig::default());
        let json = session.analyze(&SessionOptions::default()).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for field in [
            "packed",
            "anti_debug_apis",
            "timing_checks",
            "debugger_detection",
            "entropy",
            "control_flow_obfuscation",
            "string_obfuscation",
            "instruction_obfuscation",
        ] {
            assert!(value.get(field).is_some(), "missing field {field}");
        }
        assert_eq!(value["packer"], "upx");
        assert!(value.get("decompile").is_none());
    }

    #[test]
    fn test_subprocess_failures_are_recorded() {
        let session = AnalysisSession::from_image(packed_image(), missing_tools());
        let options = SessionOptions {
            decompiler: Some(DecompilerKind::Radare2),
            unpack: true,
            ..Default::default()
        };
        let report = session.analyze(&options);

        let decompile = report.decompile.unwrap();
        assert!(!decompile.success);
        assert!(!decompile.errors.is_empty());

        let unpack = report.unpack.unwrap();
        assert!(!unpack.success);
        assert_eq!(unpack.packer, Some(Packer::Upx));
    }

    #[test]
    fn test_custom_matcher_applies_to_all_analyzers() {
        let mut matcher = PatternMatcher::new();
        matcher.add_pattern("fsg", b"FSG!v2").unwrap();
        let image = BinaryImage::from_bytes(b"FSG! only".to_vec());
        let report = AnalysisSession::from_image(image, AnalysisConfig::default())
            .with_matcher(matcher)
            .analyze(&SessionOptions::default());
        assert_eq!(report.packer, None);
        assert!(!report.anti_debug.packed);
    }
}
