fn main() {
    let version = match rustc_version::version() {
        Ok(v) => v.to_string(),
        Err(e) => {
            println!("cargo:warning=could not detect rustc version: {e}");
            "0.0.0".to_string()
        }
    };
    println!("cargo:rustc-env=RUSTC_VERSION={version}");
    println!("cargo:rerun-if-changed=build.rs");
}
