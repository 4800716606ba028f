//! Live-process function interception table.
//!
//! A `HookRegistry` maps `module:function` keys to handlers. It is an owned
//! value (share it with `Arc` when several threads need it); there is no
//! process-wide singleton. Concurrent installs on the same key are
//! serialized and the last writer wins.

pub mod platform;

pub use platform::{HookBackend, LinuxBackend, Platform, WindowsBackend};

use crate::error::{Result, RevscopeError};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Arguments of an intercepted call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookCall {
    pub module: String,
    pub function: String,
    pub args: Vec<u64>,
}

/// What an intercepted call should do once the handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction {
    CallOriginal,
    Return(u64),
}

pub type HookHandler = Arc<dyn Fn(&HookCall) -> HookAction + Send + Sync>;

pub fn hook_key(module: &str, function: &str) -> String {
    format!("{module}:{function}")
}

struct HookEntry {
    module: String,
    function: String,
    handler: HookHandler,
}

pub struct HookRegistry {
    platform: Platform,
    backend: Option<Box<dyn HookBackend>>,
    hooks: Mutex<IndexMap<String, HookEntry>>,
}

impl HookRegistry {
    /// Registry for the platform this process runs on.
    pub fn new() -> Self {
        Self::for_platform(Platform::current())
    }

    pub fn for_platform(platform: Platform) -> Self {
        let backend = platform.backend();
        Self {
            platform,
            backend,
            hooks: Mutex::new(IndexMap::new()),
        }
    }

    /// Registry driving a caller-supplied backend.
    ///
    /// Backend calls happen with the table lock held, so a backend must not
    /// call back into this registry.
    pub fn with_backend(platform: Platform, backend: Box<dyn HookBackend>) -> Self {
        Self {
            platform,
            backend: Some(backend),
            hooks: Mutex::new(IndexMap::new()),
        }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Install `handler` under `module:function`, replacing any existing
    /// handler for that key. A replaced key keeps its original position.
    pub fn hook_function(&self, module: &str, function: &str, handler: HookHandler) -> Result<()> {
        let backend = self
            .backend
            .as_ref()
            .ok_or_else(|| RevscopeError::UnsupportedPlatform(self.platform.name().to_string()))?;
        if module.is_empty() || function.is_empty() {
            return Err(RevscopeError::InvalidInput(
                "hook target needs both a module and a function name".into(),
            ));
        }

        let key = hook_key(module, function);
        let mut hooks = self.hooks.lock();
        backend.install(module, function)?;
        let entry = HookEntry {
            module: module.to_string(),
            function: function.to_string(),
            handler,
        };
        let replaced = hooks.insert(key.clone(), entry).is_some();
        drop(hooks);
        info!(hook = %key, replaced, "Hook installed");
        Ok(())
    }

    /// Remove the hook for `module:function`. Returns false when none was
    /// installed.
    pub fn unhook_function(&self, module: &str, function: &str) -> bool {
        let key = hook_key(module, function);
        let mut hooks = self.hooks.lock();
        let Some(entry) = hooks.shift_remove(&key) else {
            drop(hooks);
            debug!(hook = %key, "Unhook requested for absent key");
            return false;
        };
        if let Some(backend) = &self.backend {
            backend.remove(&entry.module, &entry.function);
        }
        drop(hooks);
        info!(hook = %key, "Hook removed");
        true
    }

    /// Installed keys in insertion order.
    pub fn get_hooks(&self) -> Vec<String> {
        self.hooks.lock().keys().cloned().collect()
    }

    pub fn is_hooked(&self, module: &str, function: &str) -> bool {
        self.hooks.lock().contains_key(&hook_key(module, function))
    }

    /// Number of installed hooks.
    pub fn len(&self) -> usize {
        self.hooks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.lock().is_empty()
    }

    /// Remove every hook, telling the backend about each one.
    pub fn clear(&self) {
        let mut hooks = self.hooks.lock();
        for (_, entry) in hooks.drain(..) {
            if let Some(backend) = &self.backend {
                backend.remove(&entry.module, &entry.function);
            }
        }
    }

    /// Run the handler installed for `module:function`, if any.
    ///
    /// The handler is invoked without the table lock held, so it may itself
    /// hook or unhook.
    pub fn dispatch(&self, module: &str, function: &str, args: &[u64]) -> Option<HookAction> {
        let handler = self
            .hooks
            .lock()
            .get(&hook_key(module, function))
            .map(|entry| Arc::clone(&entry.handler))?;
        let call = HookCall {
            module: module.to_string(),
            function: function.to_string(),
            args: args.to_vec(),
        };
        Some(handler(&call))
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("platform", &self.platform)
            .field("hooks", &self.get_hooks())
            .finish()
    }
}
