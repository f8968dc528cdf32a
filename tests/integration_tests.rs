//! Integration tests for nftctx
//!
//! These drive the full stack - `ContextManager` over the CLI-backed engine -
//! against a mock `nft` script, so no privileges and no real nftables are
//! required. The script keeps its simulated ruleset in a state file next to
//! itself, which makes dry-run vs. live mutation observable across
//! invocations. Each test installs its own copy in a fresh temporary
//! directory, so tests stay independent under parallel execution.

use nftctx::{ContextManager, Error, NftCli, OutputFlags};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use tempfile::TempDir;

/// Minimal stand-in for the nft CLI surface the engine drives.
const MOCK_NFT: &str = r#"#!/bin/sh
# Simulated ruleset state lives next to the script.
state="$(dirname "$0")/state"

json=0
check=0
cmd=""
for arg in "$@"; do
    case "$arg" in
        --json) json=1 ;;
        --check) check=1 ;;
        --*) ;;
        *) cmd="$arg" ;;
    esac
done

case "$cmd" in
    "list ruleset")
        if [ "$json" = "1" ]; then
            printf '{"nftables":[{"metainfo":{"json_schema_version":1}}'
            while IFS= read -r table; do
                printf ',{"table":{"family":"%s","name":"%s"}}' "${table%% *}" "${table#* }"
            done < "$state"
            printf ']}\n'
        else
            while IFS= read -r table; do
                printf 'table %s {\n}\n' "$table"
            done < "$state"
        fi
        ;;
    "add table "*)
        if [ "$check" = "0" ]; then
            printf '%s\n' "${cmd#add table }" >> "$state"
        fi
        ;;
    "")
        printf 'Error: syntax error, unexpected end of file\n' >&2
        exit 1
        ;;
    *)
        printf 'Error: syntax error, unexpected %s\n' "$cmd" >&2
        exit 1
        ;;
esac
exit 0
"#;

/// One mock nft installation in its own temporary directory.
struct MockNft {
    dir: TempDir,
}

impl MockNft {
    fn install() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let dir = TempDir::new().expect("create tempdir");
        let script = dir.path().join("nft");
        fs::write(&script, MOCK_NFT).expect("write mock script");
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755))
            .expect("mark script executable");
        fs::write(dir.path().join("state"), "").expect("create state file");
        Self { dir }
    }

    fn program(&self) -> PathBuf {
        self.dir.path().join("nft")
    }

    fn manager(&self) -> ContextManager {
        let mut manager = ContextManager::new(Box::new(NftCli::with_program(self.program())));
        manager.initialize().expect("initialize context");
        manager
    }
}

#[test]
fn test_list_ruleset_default_format() {
    let mock = MockNft::install();
    let mut manager = mock.manager();

    // Empty simulated ruleset lists as nothing
    assert!(manager.run_command("list ruleset").unwrap().is_empty());

    manager.run_command("add table inet filter").unwrap();
    let listing = manager.run_command("list ruleset").unwrap();
    assert!(listing.contains("table inet filter {"));
}

#[test]
fn test_json_flag_shapes_output() {
    let mock = MockNft::install();
    let mut manager = mock.manager();
    manager.run_command("add table inet filter").unwrap();

    manager.set_output_flags(&[OutputFlags::JSON]).unwrap();
    let json = manager.run_command("list ruleset").unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["nftables"][1]["table"]["family"], "inet");
    assert_eq!(value["nftables"][1]["table"]["name"], "filter");

    // Same logical command without the flag: engine default text format
    manager.set_output_flags(&[OutputFlags::DEFAULT]).unwrap();
    let text = manager.run_command("list ruleset").unwrap();
    assert!(text.starts_with("table inet filter"));
}

#[test]
fn test_invalid_command_error_is_verbatim() {
    let mock = MockNft::install();
    let mut manager = mock.manager();

    let result = manager.run_command("frobnicate the firewall");
    match result {
        Err(Error::Command { message, code }) => {
            assert_eq!(message.trim(), "Error: syntax error, unexpected frobnicate");
            assert_eq!(code, 1);
        }
        other => panic!("expected Command error, got {other:?}"),
    }

    // Context remains usable for a subsequent valid command
    manager.run_command("list ruleset").unwrap();
}

#[test]
fn test_empty_command_is_rejected() {
    let mock = MockNft::install();
    let mut manager = mock.manager();

    match manager.run_command("") {
        Err(Error::Command { message, .. }) => {
            assert!(message.contains("unexpected end of file"));
        }
        other => panic!("expected Command error, got {other:?}"),
    }
}

#[test]
fn test_dry_run_does_not_mutate() {
    let mock = MockNft::install();
    let mut manager = mock.manager();

    assert!(manager.set_dry_run(true).unwrap());
    manager.run_command("add table inet filter").unwrap();
    assert!(manager.run_command("list ruleset").unwrap().is_empty());

    assert!(!manager.set_dry_run(false).unwrap());
    manager.run_command("add table inet filter").unwrap();
    assert!(
        manager
            .run_command("list ruleset")
            .unwrap()
            .contains("inet filter")
    );
}

#[test]
fn test_flags_survive_reinitialize_end_to_end() {
    let mock = MockNft::install();
    let mut manager = mock.manager();
    manager
        .set_output_flags(&[OutputFlags::JSON, OutputFlags::HANDLE])
        .unwrap();
    manager.set_dry_run(true).unwrap();

    manager.initialize().unwrap();

    assert_eq!(
        manager.output_flags().unwrap(),
        OutputFlags::JSON | OutputFlags::HANDLE
    );
    // Dry-run reverts to the engine default on a fresh context
    assert!(!manager.dry_run().unwrap());
    // And the preserved JSON flag still shapes output
    let json = manager.run_command("list ruleset").unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&json).is_ok());
}

#[test]
fn test_run_json_convenience() {
    let mock = MockNft::install();
    let mut manager = mock.manager();
    manager.run_command("add table ip6 mangle").unwrap();

    let value = manager.run_json("list ruleset").unwrap();
    assert_eq!(value["nftables"][1]["table"]["family"], "ip6");
    // Temporary JSON flag restored afterwards
    assert_eq!(manager.output_flags().unwrap(), OutputFlags::DEFAULT);
}

#[test]
fn test_missing_program_is_command_error() {
    let mut manager = ContextManager::new(Box::new(NftCli::with_program(
        "/nonexistent/nftctx-integration-nft",
    )));
    manager.initialize().unwrap();

    match manager.run_command("list ruleset") {
        Err(Error::Command { message, code }) => {
            assert!(message.contains("failed to run"));
            assert_eq!(code, -1);
        }
        other => panic!("expected Command error, got {other:?}"),
    }
}
