//! Unpacker and decompiler runs against fake external tools.
#![cfg(unix)]

mod common;

use common::{fake_tool, upx_packed_bytes, write_fixture};
use revscope::config::ToolConfig;
use revscope::{
    AnalysisConfig, AnalysisSession, Decompiler, DecompilerKind, Packer, SessionOptions, Unpacker,
};
use std::fs;
use tempfile::TempDir;

const FAKE_R2: &str = r#"if [ "$1" = "-v" ]; then echo "radare2 5.9.0"; exit 0; fi
echo "r2 $*""#;

const FAKE_UPX: &str = r#"[ "$1" = "-d" ] || exit 2
cp "$2" "$4"
echo "Unpacked 1 file."
exit 0"#;

#[test]
fn upx_strategy_invokes_tool_with_output_path() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "sample.exe", &upx_packed_bytes());
    let tools = ToolConfig {
        upx_path: Some(fake_tool(dir.path(), "upx", FAKE_UPX)),
        ..Default::default()
    };

    let outcome = Unpacker::new(tools).unpack(&input, None).unwrap();

    let expected = dir.path().join("sample.exe.unpacked");
    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(outcome.packer, Some(Packer::Upx));
    assert_eq!(outcome.output_path.as_deref(), Some(expected.as_path()));
    assert_eq!(fs::read(&expected).unwrap(), upx_packed_bytes());
    assert_eq!(outcome.message, "Unpacked 1 file.");
}

#[test]
fn upx_nonzero_exit_is_failure() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "sample.exe", &upx_packed_bytes());
    let tools = ToolConfig {
        upx_path: Some(fake_tool(dir.path(), "upx", "echo 'NotPackedException' 1>&2; exit 2")),
        ..Default::default()
    };
    let explicit = dir.path().join("out.bin");

    let outcome = Unpacker::new(tools).unpack(&input, Some(&explicit)).unwrap();
    assert!(!outcome.success);
    assert!(outcome.message.contains("NotPackedException"));
    assert!(!explicit.exists());
}

#[test]
fn upx_timeout_is_failure() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "sample.exe", &upx_packed_bytes());
    let tools = ToolConfig {
        upx_path: Some(fake_tool(dir.path(), "upx", "sleep 10")),
        unpack_timeout_secs: 1,
        ..Default::default()
    };

    let outcome = Unpacker::new(tools).unpack(&input, None).unwrap();
    assert!(!outcome.success);
    assert!(outcome.message.contains("timeout"));
}

#[test]
fn radare2_decompile_seeks_before_print() {
    let dir = TempDir::new().unwrap();
    let binary = write_fixture(&dir, "a.out", b"\x7fELF");
    let tools = ToolConfig {
        radare2_path: Some(fake_tool(dir.path(), "r2", FAKE_R2)),
        ..Default::default()
    };
    let decompiler = Decompiler::new(DecompilerKind::Radare2, tools);

    assert!(decompiler.available());
    let result = decompiler.decompile(&binary, Some(0x401000)).unwrap();
    assert!(result.success);
    assert_eq!(
        result.code.trim(),
        format!("r2 -q -A -c s 0x401000 -c pdf {}", binary.display())
    );
    assert!(result.errors.is_empty());
}

#[test]
fn radare2_failure_is_captured() {
    let dir = TempDir::new().unwrap();
    let binary = write_fixture(&dir, "a.out", b"\x7fELF");
    let body = r#"[ "$1" = "-v" ] && exit 0
echo "Cannot open file" 1>&2
exit 1"#;
    let tools = ToolConfig {
        radare2_path: Some(fake_tool(dir.path(), "r2", body)),
        ..Default::default()
    };

    let result = Decompiler::new(DecompilerKind::Radare2, tools)
        .decompile(&binary, None)
        .unwrap();
    assert!(!result.success);
    assert_eq!(result.errors.trim(), "Cannot open file");
}

#[test]
fn radare2_timeout_is_failure() {
    let dir = TempDir::new().unwrap();
    let binary = write_fixture(&dir, "a.out", b"\x7fELF");
    let body = r#"[ "$1" = "-v" ] && exit 0
exec sleep 10"#;
    let tools = ToolConfig {
        radare2_path: Some(fake_tool(dir.path(), "r2", body)),
        decompile_timeout_secs: 1,
        ..Default::default()
    };

    let result = Decompiler::new(DecompilerKind::Radare2, tools)
        .decompile(&binary, None)
        .unwrap();
    assert!(!result.success);
    assert!(result.code.is_empty());
    assert_eq!(result.errors, "Operation timeout after 1s");
}

#[test]
fn session_runs_both_subprocess_steps() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "sample.exe", &upx_packed_bytes());
    let config = AnalysisConfig {
        tools: ToolConfig {
            upx_path: Some(fake_tool(dir.path(), "upx", FAKE_UPX)),
            radare2_path: Some(fake_tool(dir.path(), "r2", FAKE_R2)),
            ..Default::default()
        },
        ..Default::default()
    };
    let output = dir.path().join("restored.exe");
    let options = SessionOptions {
        decompiler: Some(DecompilerKind::Radare2),
        function_address: None,
        unpack: true,
        unpack_output: Some(output.clone()),
    };

    let report = AnalysisSession::load_with_config(&input, config)
        .unwrap()
        .analyze(&options);

    assert!(report.decompile.as_ref().unwrap().success);
    let unpack = report.unpack.as_ref().unwrap();
    assert!(unpack.success);
    assert_eq!(unpack.output_path.as_deref(), Some(output.as_path()));

    let json = report.to_json().unwrap();
    assert!(json.contains("\"decompile\""));
    assert!(json.contains("\"unpack\""));
}
