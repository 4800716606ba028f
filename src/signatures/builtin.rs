//! Built-in signatures seeded into every new registry.
//!
//! Entries are listed in registration order; that order is also the
//! iteration order of `SignatureRegistry` and of scan results.

use super::SignatureCategory;

/// (name, category, patterns)
pub const BUILTIN_SIGNATURES: &[(&str, SignatureCategory, &[&[u8]])] = &[
    // xor eax,eax; push eax; push "//sh"
    (
        "execve",
        SignatureCategory::Shellcode,
        &[b"\x31\xc0\x50\x68\x2f\x2f\x73\x68"],
    ),
    // xor eax,eax; xor ebx,ebx; xor ecx,ecx
    (
        "bind_shell",
        SignatureCategory::Shellcode,
        &[b"\x31\xc0\x31\xdb\x31\xc9"],
    ),
    (
        "reverse_shell",
        SignatureCategory::Shellcode,
        &[b"\x31\xc0\x31\xdb\x31\xc9\x31\xd2"],
    ),
    ("loadlibrary", SignatureCategory::Api, &[b"LoadLibrary"]),
    ("getprocaddress", SignatureCategory::Api, &[b"GetProcAddress"]),
    // Packer markers. Names match `Packer::name()`.
    ("upx", SignatureCategory::Packer, &[b"UPX!", b"UPX0", b"UPX1"]),
    ("pecompact", SignatureCategory::Packer, &[b"PEC2", b"PEC2MSCE"]),
    ("aspack", SignatureCategory::Packer, &[b"ASPack"]),
    ("fsg", SignatureCategory::Packer, &[b"FSG!"]),
    ("mew", SignatureCategory::Packer, &[b"MEW"]),
];
