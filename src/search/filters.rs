//! Platform and pipeline predicates (spec §4.4).
//!
//! Grounded on the teacher's `search/simd_pattern_matching.rs` multi-pattern
//! scanning role, repurposed here from scanning ripgrep output lines to
//! testing a command string against a closed platform-variant table and a
//! ~70-entry legacy tool allowlist via a plain `once_cell`-backed `Vec`
//! membership test — these tables are small and static enough that a linear
//! scan is simpler than building an automaton over them.

use crate::models::Command;
use once_cell::sync::Lazy;

/// The ~70-entry legacy cross-platform tool allowlist: a command whose base
/// token is in this table is kept even when it declares no `platform` at
/// all and matches no variant of the current platform.
static LEGACY_CROSS_PLATFORM_TOOLS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "git", "docker", "node", "npm", "npx", "yarn", "python", "python3", "pip", "pip3",
        "curl", "wget", "kubectl", "helm", "terraform", "ansible", "aws", "gcloud", "az",
        "ssh", "scp", "rsync", "tar", "zip", "unzip", "gzip", "gunzip", "grep", "sed", "awk",
        "find", "xargs", "jq", "yq", "make", "cmake", "cargo", "rustc", "go", "java", "javac",
        "mvn", "gradle", "ruby", "gem", "bundle", "php", "composer", "perl", "psql", "mysql",
        "sqlite3", "redis-cli", "mongo", "mongosh", "ffmpeg", "convert", "openssl", "gpg",
        "ping", "traceroute", "nslookup", "dig", "nc", "telnet", "htop", "top", "ps", "kill",
        "systemctl", "journalctl", "vim", "nano", "emacs", "code", "nvim", "tmux", "screen",
        "which", "whoami",
    ]
});

/// A subset of the fixed variant tables, keyed by canonical platform name.
fn platform_matches(label: &str, current: &str) -> bool {
    let label = label.to_lowercase();
    if label == "cross-platform" || label == current {
        return true;
    }
    match current {
        "windows" => {
            matches!(label.as_str(), "cmd" | "powershell" | "windows-cmd" | "windows-powershell")
                || label.starts_with("windows")
        }
        "macos" => label == "darwin" || label.starts_with("macos"),
        "linux" => matches!(label.as_str(), "unix" | "bash" | "zsh") || label.starts_with("linux"),
        _ => false,
    }
}

/// Derive the canonical current-platform name once, from `std::env::consts::OS`.
pub fn current_platform() -> &'static str {
    match std::env::consts::OS {
        "windows" => "windows",
        "macos" => "macos",
        "linux" => "linux",
        other => other,
    }
}

/// Spec §4.4 platform filter: true means "keep this command".
pub fn platform_allowed(cmd: &Command, current: &str, all_platforms: bool) -> bool {
    if all_platforms {
        return true;
    }
    if cmd.platform.is_empty() {
        return true;
    }
    if cmd.platform.iter().any(|p| platform_matches(p, current)) {
        return true;
    }
    LEGACY_CROSS_PLATFORM_TOOLS.contains(&cmd.base_token_lower())
}

/// Spec §4.4 pipeline predicate. Deliberately preserves the literal,
/// possibly-buggy source behavior flagged in spec §9: the case-insensitive
/// substring `"pipe"` anywhere in the command string also counts, even
/// inside an unrelated word.
pub fn is_pipeline(cmd: &Command) -> bool {
    cmd.pipeline
        || cmd.command.contains('|')
        || cmd.command.contains("&&")
        || cmd.command.contains(">>")
        || cmd.command_lower.contains("pipe")
}
