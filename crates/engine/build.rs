// crates/engine/build.rs
fn main() {
    let f = |n| std::env::var(format!("CARGO_FEATURE_{}", n)).is_ok();

    if f("FFI") && !f("TRANSPORT") {
        panic!("feature 'ffi' requires 'transport'");
    }
    println!("cargo:rerun-if-changed=anchors/kehua_api.pem");
}
