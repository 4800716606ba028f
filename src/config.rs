//! Configuration for the analysis toolkit.
//!
//! Provides centralized configuration for all analyzers and external tool
//! invocations with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::Result;
use crate::timeout::{DECOMPILE_TIMEOUT_SECONDS, UNPACK_TIMEOUT_SECONDS};

/// Master configuration for an analysis session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// I/O configuration for loading binaries.
    #[serde(default)]
    pub io: IOConfig,
    /// Obfuscation heuristic thresholds.
    #[serde(default)]
    pub obfuscation: ObfuscationConfig,
    /// External tool locations and time budgets.
    #[serde(default)]
    pub tools: ToolConfig,
}

impl AnalysisConfig {
    /// Parse a configuration from JSON; missing sections fall back to defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// I/O configuration for file reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IOConfig {
    /// Maximum file size to load (default: 104857600 = 100MB).
    pub max_file_size: u64,
}

impl Default for IOConfig {
    fn default() -> Self {
        Self {
            max_file_size: 104857600, // 100MB
        }
    }
}

/// Thresholds for the obfuscation heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObfuscationConfig {
    /// Indirect call/jump hits per byte above which control flow is flagged (default: 0.01).
    pub indirect_branch_density: f64,
    /// Printable-ASCII ratio below which strings are flagged (default: 0.2).
    pub printable_ratio_threshold: f64,
}

impl Default for ObfuscationConfig {
    fn default() -> Self {
        Self {
            indirect_branch_density: 0.01,
            printable_ratio_threshold: 0.2,
        }
    }
}

/// External tool locations and time budgets.
///
/// Paths left as `None` are resolved from the environment and then from the
/// process `PATH` at call time; a missing tool is a runtime condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub upx_path: Option<PathBuf>,
    pub radare2_path: Option<PathBuf>,
    pub ghidra_headless_path: Option<PathBuf>,
    pub ida_path: Option<PathBuf>,
    /// Unpacker budget in seconds (default: 60).
    pub unpack_timeout_secs: u64,
    /// Decompiler budget in seconds (default: 30).
    pub decompile_timeout_secs: u64,
    /// Availability probe budget in seconds (default: 10).
    pub probe_timeout_secs: u64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            upx_path: None,
            radare2_path: None,
            ghidra_headless_path: None,
            ida_path: None,
            unpack_timeout_secs: UNPACK_TIMEOUT_SECONDS,
            decompile_timeout_secs: DECOMPILE_TIMEOUT_SECONDS,
            probe_timeout_secs: 10,
        }
    }
}

impl ToolConfig {
    pub fn upx(&self) -> PathBuf {
        self.upx_path.clone().unwrap_or_else(|| PathBuf::from("upx"))
    }

    pub fn radare2(&self) -> PathBuf {
        self.radare2_path.clone().unwrap_or_else(|| PathBuf::from("r2"))
    }

    /// Resolve the Ghidra analyzeHeadless executable.
    ///
    /// Precedence:
    /// - explicit `ghidra_headless_path`.
    /// - `GHIDRA_ANALYZE_HEADLESS` pointing directly to the executable.
    /// - `GHIDRA_INSTALL_DIR`, appended with the platform-specific script name.
    pub fn ghidra_headless(&self) -> Option<PathBuf> {
        if let Some(p) = &self.ghidra_headless_path {
            return Some(p.clone());
        }
        if let Ok(p) = env::var("GHIDRA_ANALYZE_HEADLESS") {
            return Some(PathBuf::from(p));
        }
        env::var("GHIDRA_INSTALL_DIR").ok().map(|dir| {
            let dir = PathBuf::from(dir).join("support");
            if cfg!(windows) {
                dir.join("analyzeHeadless.bat")
            } else {
                dir.join("analyzeHeadless")
            }
        })
    }

    /// Resolve the IDA text-mode executable (`idat64`).
    pub fn ida(&self) -> PathBuf {
        if let Some(p) = &self.ida_path {
            return p.clone();
        }
        let exe = if cfg!(windows) { "idat64.exe" } else { "idat64" };
        match env::var("IDA_INSTALL_DIR") {
            Ok(dir) => PathBuf::from(dir).join(exe),
            Err(_) => PathBuf::from(exe),
        }
    }
}
