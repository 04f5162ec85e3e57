use std::env;

fn main() {
    // Version string used by the CLI and the outbound User-Agent
    let version = env::var("FUJINAV_VERSION")
        .unwrap_or_else(|_| env::var("CARGO_PKG_VERSION").unwrap_or_default());
    println!("cargo:rustc-env=FUJINAV_VERSION={}", version);

    println!("cargo:rerun-if-changed=src/");
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-env-changed=FUJINAV_VERSION");
}
