#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
//! Manifest policy tests for the Crisis Survival client.
//!
//! These tests parse Cargo.toml and the fuzz manifest and check that they
//! conform to project policy: panic-free lints, feature wiring, and the
//! demo registration. All checks are synchronous filesystem reads.

use std::path::PathBuf;

use toml::Table;

/// Returns the project root directory (where Cargo.toml lives).
fn project_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Reads and parses a TOML file relative to the project root.
fn read_manifest(relative_path: &str) -> Table {
    let path = project_root().join(relative_path);
    let text = std::fs::read_to_string(&path).unwrap_or_else(|e| {
        panic!(
            "Failed to read '{}': {}. This file is required by project policy.",
            path.display(),
            e
        )
    });
    toml::from_str::<Table>(&text)
        .unwrap_or_else(|e| panic!("'{}' is not valid TOML: {e}", path.display()))
}

fn table<'a>(parent: &'a Table, key: &str) -> &'a Table {
    parent
        .get(key)
        .and_then(|value| value.as_table())
        .unwrap_or_else(|| panic!("missing [{key}] table"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Module: panic_policy
// ─────────────────────────────────────────────────────────────────────────────

mod panic_policy {
    use super::*;

    const REQUIRED_DENY_LINTS: &[&str] = &[
        "unwrap_used",
        "expect_used",
        "panic",
        "todo",
        "unimplemented",
        "indexing_slicing",
    ];

    #[test]
    fn cargo_toml_denies_all_panic_prone_lints() {
        let cargo = read_manifest("Cargo.toml");
        let clippy = table(table(&cargo, "lints"), "clippy");
        for lint in REQUIRED_DENY_LINTS {
            assert_eq!(
                clippy.get(*lint).and_then(|level| level.as_str()),
                Some("deny"),
                "Cargo.toml must set `{lint} = \"deny\"` in [lints.clippy]. \
                 Library code propagates errors instead of panicking."
            );
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Module: feature_policy
// ─────────────────────────────────────────────────────────────────────────────

mod feature_policy {
    use super::*;

    #[test]
    fn websocket_transport_is_default_and_optional() {
        let cargo = read_manifest("Cargo.toml");
        let features = table(&cargo, "features");

        let default: Vec<_> = features["default"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|f| f.as_str())
            .collect();
        assert!(default.contains(&"transport-websocket"));

        let deps = table(&cargo, "dependencies");
        for optional in ["tokio-tungstenite", "futures-util"] {
            let dep = deps[optional].as_table().unwrap();
            assert_eq!(
                dep.get("optional").and_then(|v| v.as_bool()),
                Some(true),
                "{optional} must stay optional so the core builds without a socket stack"
            );
        }
    }

    #[test]
    fn demo_requires_websocket_feature() {
        let cargo = read_manifest("Cargo.toml");
        let demos = cargo["example"].as_array().unwrap();
        assert!(!demos.is_empty());
        for demo in demos {
            let path = demo["path"].as_str().unwrap();
            assert!(
                project_root().join(path).is_file(),
                "demo '{path}' is registered but missing"
            );
            let required: Vec<_> = demo["required-features"]
                .as_array()
                .unwrap()
                .iter()
                .filter_map(|f| f.as_str())
                .collect();
            assert!(required.contains(&"transport-websocket"));
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Module: fuzz_policy
// ─────────────────────────────────────────────────────────────────────────────

mod fuzz_policy {
    use super::*;

    #[test]
    fn fuzz_crate_points_at_this_package() {
        let fuzz = read_manifest("fuzz/Cargo.toml");
        let deps = table(&fuzz, "dependencies");
        let cargo = read_manifest("Cargo.toml");
        let name = table(&cargo, "package")["name"].as_str().unwrap();

        let dep = deps[name].as_table().unwrap();
        assert_eq!(dep["path"].as_str(), Some(".."));
    }

    #[test]
    fn every_fuzz_target_exists() {
        let fuzz = read_manifest("fuzz/Cargo.toml");
        for bin in fuzz["bin"].as_array().unwrap() {
            let path = bin["path"].as_str().unwrap();
            assert!(
                project_root().join("fuzz").join(path).is_file(),
                "fuzz target '{path}' is registered but missing"
            );
        }
    }
}
