use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
    println!("cargo:rustc-env=PKGKIT_VERSION={}", version());
}

/// Version from git tags, with a timestamp appended for dirty trees and a
/// plain timestamped fallback when git is unavailable.
fn version() -> String {
    match git_describe() {
        Some(described) if !described.is_empty() && !described.ends_with("-dirty") => described,
        Some(described) => format!("{}-{}", described, timestamp()),
        None => format!("0.0.0-unknown-{}", timestamp()),
    }
}

fn git_describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim();
    // Strip 'v' prefix if present (e.g., "v1.0.0" -> "1.0.0")
    Some(described.strip_prefix('v').unwrap_or(described).to_string())
}

fn timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs()
}
