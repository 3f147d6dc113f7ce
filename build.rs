use std::env;
use std::process::Command;

fn main() {
    // Embed the short commit id of the build, so `--version` can report it.
    let head = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|hash| hash.trim().to_owned())
        .or_else(|| env::var("GIT_HEAD").ok())
        .unwrap_or_else(|| String::from("unknown"));

    println!("cargo:rustc-env=GIT_HEAD={head}");
    println!("cargo:rerun-if-changed=../.git/HEAD");
}
