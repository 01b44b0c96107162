use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn main() {
    let hash = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".into());

    println!("cargo:rustc-env=CONTINUOUS_CANVAS_GIT_HASH={hash}");
    println!("cargo:rerun-if-changed=config.example.toml");

    if let Some(git_dir) = git_dir() {
        for name in ["HEAD", "refs", "packed-refs"] {
            rerun_if_exists(&git_dir.join(name));
        }
    }
}

/// Locates the git directory, following a `gitdir:` file in worktrees.
fn git_dir() -> Option<PathBuf> {
    if let Some(dir) = env::var_os("GIT_DIR") {
        return Some(PathBuf::from(dir));
    }

    let dot_git = PathBuf::from(".git");
    if dot_git.is_dir() {
        return Some(dot_git);
    }

    let contents = fs::read_to_string(&dot_git).ok()?;
    let target = PathBuf::from(contents.strip_prefix("gitdir:")?.trim());
    Some(if target.is_relative() {
        Path::new(".").join(target)
    } else {
        target
    })
}

fn rerun_if_exists(path: &Path) {
    if let Some(display) = path.to_str().filter(|_| path.exists()) {
        println!("cargo:rerun-if-changed={display}");
    }
}
