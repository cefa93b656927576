//! Layering guardrails for the workspace crates.
//!
//! `phasespec_core` is shared by the runtime and the proc-macro crate, so it must stay free of
//! dependencies. The runtime crate must not pull in the proc-macro stack; only `phasespec_derive`
//! parses Rust syntax.

/// Dependency names listed in the `[dependencies]` table of a manifest.
fn main_dependencies(manifest: &str) -> Vec<String> {
    let mut in_dependencies = false;
    let mut names = Vec::new();

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            if line == "[dependencies]" {
                in_dependencies = true;
                continue;
            }
            if in_dependencies {
                break;
            }
        }

        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Strip inline comments for robustness.
        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        if let Some((name, _)) = line_no_comment.split_once('=') {
            names.push(name.trim().to_string());
        }
    }
    names
}

#[test]
fn core_crate_has_no_dependencies() {
    let deps = main_dependencies(include_str!("../crates/phasespec_core/Cargo.toml"));
    assert!(deps.is_empty(), "`phasespec_core` must not have [dependencies], found {deps:?}");
}

#[test]
fn runtime_does_not_depend_on_proc_macro_stack() {
    let deps = main_dependencies(include_str!("../Cargo.toml"));
    for forbidden in ["syn", "quote", "proc-macro2"] {
        assert!(
            !deps.iter().any(|d| d == forbidden),
            "`{forbidden}` must not appear in the runtime [dependencies]; keep it in phasespec_derive"
        );
    }
    assert!(deps.iter().any(|d| d == "phasespec_derive"));
}
