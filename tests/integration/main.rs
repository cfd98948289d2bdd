//! Integration tests for Warden

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Nothing listens on the discard port, so every fetch fails fast
    const DEAD_ORIGIN: &str = "http://127.0.0.1:9";

    struct Sandbox {
        dir: TempDir,
    }

    impl Sandbox {
        fn new(version: &str) -> Self {
            let sandbox = Self {
                dir: TempDir::new().unwrap(),
            };
            sandbox.write_config(version);
            sandbox
        }

        fn config_path(&self) -> PathBuf {
            self.dir.path().join("config.toml")
        }

        fn cache_path(&self) -> PathBuf {
            self.dir.path().join("cache")
        }

        fn write_config(&self, version: &str) {
            self.write_config_with(version, true);
        }

        fn write_config_with(&self, version: &str, skip_waiting: bool) {
            let config = format!(
                r#"[engine]
version = "{version}"
origin = "{DEAD_ORIGIN}"
api_timeout_ms = 3000
skip_waiting_on_install = {skip_waiting}

[manifest]
core_assets = ["/", "/index.html"]

[store]
backend = "disk"
path = "{}"

[network]
timeout_secs = 5
"#,
                self.cache_path().display()
            );
            std::fs::write(self.config_path(), config).unwrap();
        }

        fn warden(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("warden");
            cmd.env("WARDEN_CONFIG", self.config_path()).env("CI", "1");
            cmd
        }

        fn partitions(&self) -> Vec<String> {
            list_dirs(&self.cache_path())
        }
    }

    fn list_dirs(root: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(root)
            .map(|rd| {
                rd.filter_map(|e| e.ok())
                    .filter(|e| e.path().is_dir())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("warden")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("offline caching engine"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("warden")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("warden"));
    }

    #[test]
    fn config_path_follows_env() {
        let sandbox = Sandbox::new("v1");
        sandbox
            .warden()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_reflects_file() {
        let sandbox = Sandbox::new("v42");
        sandbox
            .warden()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[engine]"))
            .stdout(predicate::str::contains("version = \"v42\""));
    }

    #[test]
    fn config_init_repairs_broken_file() {
        let sandbox = Sandbox::new("v1");
        std::fs::write(sandbox.config_path(), "[engine\n").unwrap();

        sandbox
            .warden()
            .arg("stats")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"))
            .stderr(predicate::str::contains("warden config init --force"));

        sandbox
            .warden()
            .args(["config", "init", "--force"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration initialized"));
    }

    #[test]
    fn stats_json_on_empty_store() {
        let sandbox = Sandbox::new("v1");
        sandbox
            .warden()
            .args(["stats", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"static\""))
            .stdout(predicate::str::contains("\"approximateSizeBytes\": 0"));
    }

    #[test]
    fn install_survives_dead_network() {
        let sandbox = Sandbox::new("v1");
        sandbox
            .warden()
            .arg("install")
            .assert()
            .success()
            .stdout(predicate::str::contains("Cached 0 of 2 core assets"))
            .stdout(predicate::str::contains("Version v1 active"));

        assert_eq!(sandbox.partitions(), vec!["api-v1", "dynamic-v1", "static-v1"]);
    }

    #[test]
    fn new_version_replaces_old_partitions() {
        let sandbox = Sandbox::new("v1");
        sandbox.warden().arg("install").assert().success();

        sandbox.write_config("v2");
        sandbox
            .warden()
            .arg("install")
            .assert()
            .success()
            .stdout(predicate::str::contains("3 stale partition(s) removed"));

        assert_eq!(sandbox.partitions(), vec!["api-v2", "dynamic-v2", "static-v2"]);
    }

    #[test]
    fn waiting_version_activates_in_later_run() {
        let sandbox = Sandbox::new("v1");
        sandbox.warden().arg("install").assert().success();

        sandbox.write_config_with("v2", false);
        sandbox
            .warden()
            .arg("install")
            .assert()
            .success()
            .stdout(predicate::str::contains("waiting"));
        assert_eq!(
            sandbox.partitions(),
            vec!["api-v1", "api-v2", "dynamic-v1", "dynamic-v2", "static-v1", "static-v2"]
        );

        // still waiting in a new process: nothing is intercepted or removed
        sandbox
            .warden()
            .args(["fetch", "/divine/fortune"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Network unavailable"));
        assert_eq!(sandbox.partitions().len(), 6);

        sandbox
            .warden()
            .args(["message", r#"{"type":"SKIP_WAITING"}"#])
            .assert()
            .success();
        assert_eq!(sandbox.partitions(), vec!["api-v2", "dynamic-v2", "static-v2"]);
    }

    #[test]
    fn activate_before_install_fails() {
        let sandbox = Sandbox::new("v1");
        sandbox
            .warden()
            .arg("activate")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid lifecycle transition"))
            .stderr(predicate::str::contains("warden install"));
    }

    #[test]
    fn offline_api_gets_structured_503() {
        let sandbox = Sandbox::new("v1");
        sandbox
            .warden()
            .args(["fetch", "-i", "/divine/fortune?date=2024-01-01"])
            .assert()
            .success()
            .stdout(predicate::str::contains("HTTP 503"))
            .stdout(predicate::str::contains("x-from-cache: offline-fallback"))
            .stdout(predicate::str::contains("\"error\":\"offline\""));
    }

    #[test]
    fn offline_document_gets_offline_page() {
        let sandbox = Sandbox::new("v1");
        sandbox
            .warden()
            .args(["fetch", "--destination", "document", "/deep/link"])
            .assert()
            .success()
            .stdout(predicate::str::contains("<!DOCTYPE html>"));
    }

    #[test]
    fn offline_image_gets_placeholder() {
        let sandbox = Sandbox::new("v1");
        sandbox
            .warden()
            .args(["fetch", "-d", "image", "-i", "/avatars/guanyin.png"])
            .assert()
            .success()
            .stdout(predicate::str::contains("content-type: image/svg+xml"));
    }

    #[test]
    fn offline_other_fails() {
        let sandbox = Sandbox::new("v1");
        sandbox
            .warden()
            .args(["fetch", "/robots.txt"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Network unavailable"));
    }

    #[test]
    fn offline_api_post_gets_structured_503() {
        let sandbox = Sandbox::new("v1");
        sandbox
            .warden()
            .args([
                "fetch",
                "-i",
                "-X",
                "POST",
                "-H",
                "Content-Type: application/json",
                "--data",
                r#"{"birth":"1990-01-01"}"#,
                "/api/calculate-bazi",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("HTTP 503"));
    }

    #[test]
    fn non_network_scheme_rejected() {
        let sandbox = Sandbox::new("v1");
        sandbox
            .warden()
            .args(["fetch", "chrome-extension://abc/content.js"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unsupported URL scheme: chrome-extension"))
            .stderr(predicate::str::contains("Only http and https"));
    }

    #[test]
    fn bad_destination_rejected() {
        let sandbox = Sandbox::new("v1");
        sandbox
            .warden()
            .args(["fetch", "-d", "video", "/clip"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown destination"));
    }

    #[test]
    fn version_message() {
        let sandbox = Sandbox::new("v3");
        sandbox
            .warden()
            .args(["message", r#"{"type":"GET_VERSION"}"#])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"version\": \"v3\""));
    }

    #[test]
    fn unknown_message_fails_with_hint() {
        let sandbox = Sandbox::new("v1");
        sandbox
            .warden()
            .args(["message", r#"{"type":"PING"}"#])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown control message: PING"))
            .stderr(predicate::str::contains("GET_CACHE_STATS"));
    }

    #[test]
    fn clear_requires_confirmation() {
        let sandbox = Sandbox::new("v1");
        sandbox.warden().arg("install").assert().success();

        sandbox
            .warden()
            .arg("clear")
            .assert()
            .success()
            .stdout(predicate::str::contains("Aborted"));
        assert_eq!(sandbox.partitions().len(), 3);

        sandbox
            .warden()
            .args(["clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cleared 3 partition(s)"));
        assert!(sandbox.partitions().is_empty());

        sandbox
            .warden()
            .args(["stats", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"count\": 0"))
            .stdout(predicate::str::contains("\"count\": 1").not());
    }

    #[test]
    fn clear_message_reports_success() {
        let sandbox = Sandbox::new("v1");
        sandbox
            .warden()
            .args(["message", r#"{"type":"CLEAR_CACHE"}"#])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"success\": true"));
    }

    #[test]
    fn revalidate_reports_failures() {
        let sandbox = Sandbox::new("v1");
        sandbox
            .warden()
            .arg("revalidate")
            .assert()
            .success()
            .stdout(predicate::str::contains("0 refreshed, 3 failed"));
    }

    #[test]
    fn push_and_open() {
        let sandbox = Sandbox::new("v1");
        sandbox
            .warden()
            .args(["push", r#"{"title":"Daily sutra","url":"/sutra/today"}"#, "--click", "open"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"title\": \"Daily sutra\""))
            .stdout(predicate::str::contains("opened"))
            .stdout(predicate::str::contains("/sutra/today"));
    }

    #[test]
    fn push_without_payload_uses_defaults() {
        let sandbox = Sandbox::new("v1");
        sandbox
            .warden()
            .arg("push")
            .assert()
            .success()
            .stdout(predicate::str::contains("\"title\": \"Divine Friend\""));
    }
}
