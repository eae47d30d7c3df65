use std::process::Command;

fn main() {
  embed_commit_hash();
  println!("cargo:rerun-if-changed=build.rs");
  println!("cargo:rerun-if-changed=.git/HEAD");
  println!("cargo:rerun-if-changed=resources/copyright-templates");
}

/// Exposes the short commit hash as `COPYRIGHT_CHECK_COMMIT` for `--version`.
fn embed_commit_hash() {
  let hash = Command::new("git")
    .args(["rev-parse", "--short", "HEAD"])
    .output()
    .ok()
    .filter(|output| output.status.success())
    .and_then(|output| String::from_utf8(output.stdout).ok())
    .map(|hash| hash.trim().to_string())
    .unwrap_or_default();
  println!("cargo:rustc-env=COPYRIGHT_CHECK_COMMIT={hash}");
}
