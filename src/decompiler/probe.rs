use super::DecompilerKind;
use crate::config::ToolConfig;
use crate::timeout::TimeoutConfig;
use crate::tools::run_tool;
use std::env;
use std::path::Path;
use tracing::debug;

pub(super) fn probe(kind: DecompilerKind, tools: &ToolConfig) -> bool {
    let timeout = TimeoutConfig::new(tools.probe_timeout_secs, format!("{kind} version probe"));
    match kind {
        DecompilerKind::Radare2 => version_ok(&tools.radare2(), "-v", timeout),
        DecompilerKind::Ghidra => match tools.ghidra_headless() {
            Some(headless) => version_ok(&headless, "-version", timeout),
            None => {
                debug!("Ghidra headless analyzer not configured");
                false
            }
        },
        DecompilerKind::Ida => executable_exists(&tools.ida()),
    }
}

fn version_ok(program: &Path, flag: &str, timeout: TimeoutConfig) -> bool {
    match run_tool(program, [flag], timeout) {
        Ok(out) => {
            debug!(
                program = %program.display(),
                version = %out.stdout.trim(),
                exit_code = ?out.exit_code,
                "Version probe"
            );
            out.success()
        }
        Err(e) => {
            debug!(program = %program.display(), error = %e, "Version probe failed");
            false
        }
    }
}

/// A path with a directory component must exist as a file; a bare name is
/// looked up on `PATH`.
fn executable_exists(program: &Path) -> bool {
    if program.components().count() > 1 {
        return program.is_file();
    }
    env::var_os("PATH")
        .map(|paths| env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}
