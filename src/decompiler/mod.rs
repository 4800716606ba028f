//! External decompiler backends.
//!
//! The backend is picked once at construction from a closed set. Availability
//! is probed lazily and cached for the lifetime of the `Decompiler`; nothing
//! here ever fails because a tool is missing until a caller actually asks for
//! decompilation.

mod probe;
mod radare2;

use crate::config::ToolConfig;
use crate::error::{Result, RevscopeError};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecompilerKind {
    Ghidra,
    Ida,
    Radare2,
}

impl DecompilerKind {
    pub fn name(self) -> &'static str {
        match self {
            DecompilerKind::Ghidra => "ghidra",
            DecompilerKind::Ida => "ida",
            DecompilerKind::Radare2 => "radare2",
        }
    }
}

impl fmt::Display for DecompilerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DecompilerKind {
    type Err = RevscopeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ghidra" => Ok(DecompilerKind::Ghidra),
            "ida" => Ok(DecompilerKind::Ida),
            "radare2" | "r2" => Ok(DecompilerKind::Radare2),
            other => Err(RevscopeError::InvalidInput(format!(
                "unknown decompiler: {other}"
            ))),
        }
    }
}

/// Outcome of one decompile request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecompileResult {
    pub success: bool,
    pub code: String,
    pub errors: String,
}

impl DecompileResult {
    pub fn failure(errors: impl Into<String>) -> Self {
        Self {
            success: false,
            code: String::new(),
            errors: errors.into(),
        }
    }
}

/// Structural summary of a binary. Backends do not populate it yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryStructure {
    pub functions: Vec<String>,
    pub strings: Vec<String>,
    pub imports: Vec<String>,
    pub exports: Vec<String>,
}

#[derive(Debug)]
pub struct Decompiler {
    kind: DecompilerKind,
    tools: ToolConfig,
    available: OnceCell<bool>,
}

impl Decompiler {
    /// Availability is checked lazily on first use.
    pub fn new(kind: DecompilerKind, tools: ToolConfig) -> Self {
        Self {
            kind,
            tools,
            available: OnceCell::new(),
        }
    }

    /// Backend this decompiler drives.
    pub fn kind(&self) -> DecompilerKind {
        self.kind
    }

    /// Whether the backend's executable responds. Probed once, then cached.
    pub fn available(&self) -> bool {
        *self.available.get_or_init(|| {
            let ok = probe::probe(self.kind, &self.tools);
            info!(backend = %self.kind, available = ok, "Probed decompiler backend");
            ok
        })
    }

    fn require_available(&self) -> Result<()> {
        if self.available() {
            Ok(())
        } else {
            Err(RevscopeError::BackendUnavailable(self.kind.name().to_string()))
        }
    }

    /// Decompile `path`, optionally starting at `function_address`.
    ///
    /// Tool failures (spawn errors, timeouts, nonzero exits) come back as an
    /// unsuccessful `DecompileResult`. Only an unavailable backend or a
    /// backend without a strategy is an `Err`.
    pub fn decompile(
        &self,
        path: impl AsRef<Path>,
        function_address: Option<u64>,
    ) -> Result<DecompileResult> {
        let path = path.as_ref();
        self.require_available()?;
        debug!(
            backend = %self.kind,
            path = %path.display(),
            address = ?function_address,
            "Decompiling"
        );
        match self.kind {
            DecompilerKind::Radare2 => Ok(radare2::decompile(&self.tools, path, function_address)),
            DecompilerKind::Ghidra | DecompilerKind::Ida => Err(RevscopeError::NotImplemented(
                format!("{} decompilation", self.kind),
            )),
        }
    }

    pub fn analyze_binary(&self, path: impl AsRef<Path>) -> Result<BinaryStructure> {
        self.require_available()?;
        debug!(
            backend = %self.kind,
            path = %path.as_ref().display(),
            "Structural analysis requested"
        );
        Ok(BinaryStructure::default())
    }
}
