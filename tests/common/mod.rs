//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Marker followed by enough zero bytes to push the printable ratio well
/// below the string-obfuscation threshold.
pub fn upx_packed_bytes() -> Vec<u8> {
    let mut data = b"UPX!".to_vec();
    data.extend(std::iter::repeat(0u8).take(1024));
    data
}

/// Bytes carrying every anti-debug indicator.
pub fn anti_debug_bytes() -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(b"\x00IsDebuggerPresent\x00CheckRemoteDebuggerPresent\x00");
    data.extend_from_slice(b"QueryPerformanceCounter\x00");
    data.extend_from_slice(&[0x64, 0xA1, 0x30, 0x00, 0x00, 0x00]);
    data
}

pub fn write_fixture(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write fixture");
    path
}

/// Write an executable `/bin/sh` script standing in for an external tool.
#[cfg(unix)]
pub fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write fake tool");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod fake tool");
    path
}
