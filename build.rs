use std::process::Command;

fn main() {
    // Release packaging injects DOTSTASH_VERSION; local builds derive one
    // from the git work tree instead. With neither, the binary reports the
    // crate version.
    let version = std::env::var("DOTSTASH_VERSION").ok().or_else(git_describe);
    if let Some(version) = version {
        println!("cargo:rustc-env=DOTSTASH_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=DOTSTASH_VERSION");
}

fn git_describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
