use std::process::Command;

/// Exposes TOOLCHAT_VERSION as 0.1.<commit count>[+dirty].
fn main() {
    let commit_count = git(&["rev-list", "--count", "HEAD"])
        .and_then(|out| out.trim().parse::<u32>().ok())
        .unwrap_or(0);
    let is_dirty = git(&["status", "--porcelain"]).is_some_and(|out| !out.trim().is_empty());

    let version = if is_dirty {
        format!("0.1.{commit_count}+dirty")
    } else {
        format!("0.1.{commit_count}")
    };
    println!("cargo:rustc-env=TOOLCHAT_VERSION={version}");

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-changed=.git/index");
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).into_owned())
}
