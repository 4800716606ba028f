//! Platform selection and per-platform hook backends.

use crate::error::Result;
use std::fmt;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    Linux,
    Unsupported(String),
}

impl Platform {
    /// The platform this process was compiled for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Unsupported(std::env::consts::OS.to_string())
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::Unsupported(os) => os,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Platform::Unsupported(_))
    }

    pub(super) fn backend(&self) -> Option<Box<dyn HookBackend>> {
        match self {
            Platform::Windows => Some(Box::new(WindowsBackend)),
            Platform::Linux => Some(Box::new(LinuxBackend)),
            Platform::Unsupported(_) => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Platform mechanics behind a registry entry. The registry owns the table;
/// a backend is told about each installation and removal.
pub trait HookBackend: Send + Sync + fmt::Debug {
    /// Short description of how calls get redirected.
    fn mechanism(&self) -> &'static str;

    fn install(&self, module: &str, function: &str) -> Result<()> {
        trace!(module, function, mechanism = self.mechanism(), "Installing hook");
        Ok(())
    }

    fn remove(&self, module: &str, function: &str) {
        trace!(module, function, mechanism = self.mechanism(), "Removing hook");
    }
}

#[derive(Debug)]
pub struct WindowsBackend;

impl HookBackend for WindowsBackend {
    fn mechanism(&self) -> &'static str {
        "inline detour"
    }
}

#[derive(Debug)]
pub struct LinuxBackend;

impl HookBackend for LinuxBackend {
    fn mechanism(&self) -> &'static str {
        "symbol interposition"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_platform() {
        let platform = Platform::current();
        #[cfg(target_os = "linux")]
        assert_eq!(platform, Platform::Linux);
        #[cfg(windows)]
        assert_eq!(platform, Platform::Windows);
        assert_eq!(platform.is_supported(), platform.backend().is_some());
    }

    #[test]
    fn test_unsupported_has_no_backend() {
        let platform = Platform::Unsupported("macos".into());
        assert_eq!(platform.to_string(), "macos");
        assert!(!platform.is_supported());
        assert!(platform.backend().is_none());
    }

    #[test]
    fn test_backend_mechanisms() {
        assert_eq!(Platform::Windows.backend().unwrap().mechanism(), "inline detour");
        assert_eq!(Platform::Linux.backend().unwrap().mechanism(), "symbol interposition");
    }
}
