//! Integration tests for CLI commands

use std::process::{Command, Output};

/// Helper to run herald against the demo release
fn herald(args: &[&str], api_key: Option<&str>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_herald"));
    cmd.arg("--config").arg(demo_config()).args(args);
    cmd.env_remove("RUST_LOG");
    match api_key {
        Some(key) => cmd.env("ZULIP_API_KEY", key),
        None => cmd.env_remove("ZULIP_API_KEY"),
    };
    cmd.output().expect("Failed to execute herald")
}

/// Get the fixtures path
fn fixtures_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures")
}

fn demo_config() -> String {
    format!("{}/demo-release/herald.yml", fixtures_path())
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

mod package_command {
    use super::*;

    #[test]
    fn test_writes_scoop_manifest() {
        let out = tempfile::tempdir().unwrap();
        let output = herald(
            &["package", "--output-dir", out.path().to_str().unwrap()],
            None,
        );

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(stdout(&output).contains("scoop"));

        let manifest = std::fs::read_to_string(out.path().join("scoop/bucket/demo.json"))
            .expect("manifest should be written");
        let manifest: serde_json::Value = serde_json::from_str(&manifest).unwrap();

        assert_eq!(manifest["version"], "1.4.0");
        assert_eq!(manifest["license"], "Apache-2.0");
        assert_eq!(
            manifest["url"],
            "https://github.com/demo-org/demo/releases/download/v1.4.0/demo-1.4.0.zip"
        );
        assert_eq!(
            manifest["autoupdate"]["url"],
            "https://downloads.example.com/demo/$version/demo-$version.zip"
        );
        assert_eq!(manifest["autoupdate"]["extract_dir"], "demo-$version");
        assert_eq!(manifest["hash"].as_str().unwrap().len(), 64);
    }

    #[test]
    fn test_only_rejects_targets_of_other_commands() {
        let output = herald(&["package", "--only", "zulip"], None);
        assert_eq!(output.status.code(), Some(64));
        assert!(stderr(&output).contains("Unknown target"));
    }
}

mod announce_command {
    use super::*;

    #[test]
    fn test_dry_run_with_env_credential() {
        let output = herald(&["announce", "--dry-run"], Some("from-env"));

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let stdout = stdout(&output);
        assert!(stdout.contains("dry run"));
        assert!(stdout.contains("zulip"));
        assert!(stdout.contains("dry-run"));
        assert!(stdout.contains("skipped (disabled)"));
    }

    #[test]
    fn test_dry_run_payload_logged_at_debug() {
        let quiet = herald(&["announce", "--dry-run"], Some("from-env"));
        assert!(!stderr(&quiet).contains("[dry-run]"));

        let verbose = herald(&["--debug", "announce", "--dry-run"], Some("from-env"));
        assert!(verbose.status.success(), "stderr: {}", stderr(&verbose));
        let stderr = stderr(&verbose);
        assert!(stderr.contains("[dry-run] zulip: would announce to announce"));
        assert!(stderr.contains("has been released!"));
    }

    #[test]
    fn test_missing_credential_is_reported_but_best_effort_succeeds() {
        let output = herald(&["announce", "--dry-run"], None);

        assert_eq!(output.status.code(), Some(0));
        let stdout = stdout(&output);
        assert!(stdout.contains("failed during context"));
        assert!(stdout.contains("ZULIP_API_KEY"));
    }

    #[test]
    fn test_fail_fast_exits_with_config_error() {
        let output = herald(&["announce", "--dry-run", "--fail-fast"], None);

        assert_eq!(output.status.code(), Some(2));
        assert!(stderr(&output).contains("target(s) failed"));
    }
}

mod release_command {
    use super::*;

    #[test]
    fn test_packages_then_announces() {
        let out = tempfile::tempdir().unwrap();
        let output = herald(
            &[
                "release",
                "--dry-run",
                "--jobs",
                "2",
                "--output-dir",
                out.path().to_str().unwrap(),
            ],
            Some("from-env"),
        );

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let stdout = stdout(&output);
        let scoop = stdout.find("scoop").unwrap();
        let zulip = stdout.find("zulip").unwrap();
        assert!(scoop < zulip, "tools should be listed first:\n{}", stdout);
        assert!(stdout.contains("2 delivered, 1 skipped, 0 failed"));
        assert!(out.path().join("scoop/bucket/demo.json").is_file());
    }

    #[test]
    fn test_only_selected_target_runs() {
        let out = tempfile::tempdir().unwrap();
        let output = herald(
            &[
                "release",
                "--only",
                "scoop",
                "--output-dir",
                out.path().to_str().unwrap(),
            ],
            None,
        );

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(stdout(&output).contains("skipped (not selected)"));
    }

    #[test]
    fn test_disabled_but_selected_target_fails() {
        let output = herald(&["release", "--dry-run", "--only", "sdkman", "--fail-fast"], None);
        assert_eq!(output.status.code(), Some(2));
    }
}

mod config_command {
    use super::*;

    #[test]
    fn test_masks_credentials() {
        let output = herald(&["config"], Some("very-secret-key"));

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let stdout = stdout(&output);
        assert!(stdout.contains("apiKey: ************"));
        assert!(stdout.contains("consumerKey: **unset**") || stdout.contains("consumerKey: ************"));
        assert!(!stdout.contains("very-secret-key"));
    }

    #[test]
    fn test_yaml_view() {
        let output = herald(&["config", "--yaml"], None);

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let stdout = stdout(&output);
        assert!(stdout.contains("name: demo"));
        assert!(stdout.contains("apiKey:"));
        assert!(stdout.contains("**unset**"));
    }
}

mod errors {
    use super::*;

    #[test]
    fn test_missing_config_file() {
        let output = Command::new(env!("CARGO_BIN_EXE_herald"))
            .args(["--config", "/nonexistent/herald.yml", "package"])
            .output()
            .expect("Failed to execute herald");

        assert_eq!(output.status.code(), Some(2));
        assert!(stderr(&output).contains("Config file not found"));
    }

    #[test]
    fn test_template_error_in_tag_name() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("herald.yml");
        std::fs::write(
            &config,
            "project: { name: app, version: 1.0.0 }\nrelease:\n  github: { owner: a, name: b, tagName: 'v{{ projectVersoin }}' }\n",
        )
        .unwrap();

        let output = Command::new(env!("CARGO_BIN_EXE_herald"))
            .args(["--config", config.to_str().unwrap(), "package"])
            .output()
            .expect("Failed to execute herald");

        assert_eq!(output.status.code(), Some(3));
        assert!(stderr(&output).contains("projectVersion"));
    }
}
