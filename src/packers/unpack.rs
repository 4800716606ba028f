//! Unpacking dispatch.
//!
//! A detected packer selects its strategy; UPX shells out to `upx -d` under
//! a bounded timeout, everything else falls through to the generic strategy,
//! which does not support unpacking. Tool failures become an unsuccessful
//! `UnpackOutcome`, never an error.

use super::{Packer, PackerDetector};
use crate::config::ToolConfig;
use crate::error::{Result, RevscopeError};
use crate::io::BinaryImage;
use crate::signatures::PatternMatcher;
use crate::timeout::TimeoutConfig;
use crate::tools::run_tool;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Suffix appended to auto-derived output paths.
pub const UNPACKED_SUFFIX: &str = ".unpacked";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnpackStrategy {
    Upx,
    Generic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnpackOutcome {
    pub packer: Option<Packer>,
    pub success: bool,
    pub output_path: Option<PathBuf>,
    pub message: String,
}

impl UnpackOutcome {
    pub(crate) fn failed(
        packer: Option<Packer>,
        output_path: Option<PathBuf>,
        message: String,
    ) -> Self {
        Self {
            packer,
            success: false,
            output_path,
            message,
        }
    }
}

/// `input` with `.unpacked` appended to its full file name, so the result
/// never names the input itself.
pub fn default_output_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_os_string();
    name.push(UNPACKED_SUFFIX);
    PathBuf::from(name)
}

#[derive(Debug, Clone, Default)]
pub struct Unpacker {
    matcher: PatternMatcher,
    detector: PackerDetector,
    tools: ToolConfig,
}

impl Unpacker {
    pub fn new(tools: ToolConfig) -> Self {
        Self::with_matcher(tools, PatternMatcher::new())
    }

    pub fn with_matcher(tools: ToolConfig, matcher: PatternMatcher) -> Self {
        Self {
            matcher,
            detector: PackerDetector::new(),
            tools,
        }
    }

    pub fn detect_packer(&self, path: impl AsRef<Path>) -> Result<Option<Packer>> {
        let image = BinaryImage::load(path)?;
        Ok(self.detector.detect_packer(image.bytes(), &self.matcher))
    }

    /// Load `path` and unpack it to `output` (or the default output path).
    pub fn unpack(&self, path: impl AsRef<Path>, output: Option<&Path>) -> Result<UnpackOutcome> {
        let image = BinaryImage::load(path)?;
        self.unpack_image(&image, output)
    }

    /// Unpack an already loaded image. The image must have a backing file
    /// for the external tool to read; this is only checked once a packer is
    /// detected.
    pub fn unpack_image(
        &self,
        image: &BinaryImage,
        output: Option<&Path>,
    ) -> Result<UnpackOutcome> {
        let Some(packer) = self.detector.detect_packer(image.bytes(), &self.matcher) else {
            return Ok(UnpackOutcome::failed(None, None, "no packer detected".into()));
        };
        let input = image.source().ok_or_else(|| {
            RevscopeError::InvalidInput("unpacking requires an image loaded from a file".into())
        })?;
        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_output_path(input));

        info!(packer = %packer, input = %input.display(), output = %output.display(), "Unpacking");
        Ok(match packer.strategy() {
            UnpackStrategy::Upx => self.unpack_upx(input, output),
            UnpackStrategy::Generic => UnpackOutcome::failed(
                Some(packer),
                None,
                format!("generic unpacking is not supported for {packer}"),
            ),
        })
    }

    fn unpack_upx(&self, input: &Path, output: PathBuf) -> UnpackOutcome {
        let upx = self.tools.upx();
        let args = [
            OsStr::new("-d"),
            input.as_os_str(),
            OsStr::new("-o"),
            output.as_os_str(),
        ];
        let timeout = TimeoutConfig::new(self.tools.unpack_timeout_secs, "upx -d");

        match run_tool(&upx, args, timeout) {
            Ok(out) if out.success() => UnpackOutcome {
                packer: Some(Packer::Upx),
                success: true,
                output_path: Some(output),
                message: out.stdout.trim().to_string(),
            },
            Ok(out) => {
                warn!(exit_code = ?out.exit_code, "upx exited unsuccessfully");
                UnpackOutcome::failed(
                    Some(Packer::Upx),
                    None,
                    format!("upx exited with {:?}: {}", out.exit_code, out.stderr.trim()),
                )
            }
            Err(e) => {
                warn!(error = %e, "upx invocation failed");
                UnpackOutcome::failed(Some(Packer::Upx), None, e.to_string())
            }
        }
    }
}
