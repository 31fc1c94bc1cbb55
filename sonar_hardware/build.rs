//! Puts `memory.x` from the workspace root where the linker can find it,
//! and reruns when it changes. Dependents pick up the search path too.

use std::{env, fs::File, io::Write, path::PathBuf};

fn main() {
    println!("cargo:rustc-link-arg-examples=--nmagic");
    println!("cargo:rustc-link-arg-examples=-Tlink.x");

    println!("cargo:rerun-if-changed=../memory.x");

    let out = &PathBuf::from(env::var_os("OUT_DIR").unwrap());
    File::create(out.join("memory.x"))
        .unwrap()
        .write_all(include_bytes!("../memory.x"))
        .unwrap();
    println!("cargo:rustc-link-search={}", out.display());
}
