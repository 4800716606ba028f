//! radare2 strategy: `r2 -q -A [-c "s 0x<addr>"] -c pdf <path>`.

use super::DecompileResult;
use crate::config::ToolConfig;
use crate::timeout::TimeoutConfig;
use crate::tools::run_tool;
use std::ffi::OsString;
use std::path::Path;
use tracing::warn;

/// The seek has to precede `pdf` for the address to select the function.
pub(super) fn command_args(path: &Path, function_address: Option<u64>) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-q".into(), "-A".into()];
    if let Some(addr) = function_address {
        args.push("-c".into());
        args.push(format!("s 0x{addr:x}").into());
    }
    args.push("-c".into());
    args.push("pdf".into());
    args.push(path.as_os_str().to_os_string());
    args
}

pub(super) fn decompile(
    tools: &ToolConfig,
    path: &Path,
    function_address: Option<u64>,
) -> DecompileResult {
    let timeout = TimeoutConfig::new(tools.decompile_timeout_secs, "radare2 decompile");
    match run_tool(&tools.radare2(), command_args(path, function_address), timeout) {
        Ok(out) => DecompileResult {
            success: out.success(),
            code: out.stdout,
            errors: out.stderr,
        },
        Err(e) => {
            warn!(error = %e, path = %path.display(), "radare2 invocation failed");
            DecompileResult::failure(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(address: Option<u64>) -> Vec<String> {
        command_args(Path::new("/tmp/a.out"), address)
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_args_without_address() {
        assert_eq!(args(None), vec!["-q", "-A", "-c", "pdf", "/tmp/a.out"]);
    }

    #[test]
    fn test_seek_precedes_print() {
        assert_eq!(
            args(Some(0x401000)),
            vec!["-q", "-A", "-c", "s 0x401000", "-c", "pdf", "/tmp/a.out"]
        );
    }
}
