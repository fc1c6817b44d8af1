use std::path::Path;
use std::process::Command;

use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RESULT_JSON: &str = r#"{
    "outdated_packages": [
        {"name": "foo/foo", "current_version": "1.0.0", "new_version": "1.0.5"},
        {"name": "bar/bar", "current_version": "2.0.0", "new_version": "2.2.0", "insecure": true}
    ]
}"#;

const EMPTY_RESULT_JSON: &str = r#"{"outdated_packages": []}"#;

/// Service environment variables the host could leak into the child.
const SERVICE_ENV: &[&str] = &[
    "GITLAB_ENABLE",
    "GITLAB_URL",
    "GITLAB_AUTH_KEY",
    "MATTERMOST_ENABLE",
    "MATTERMOST_URL",
    "MATTERMOST_CHANNEL",
    "MATTERMOST_USERNAME",
    "SLACK_ENABLE",
    "SLACK_URL",
    "TEAMS_ENABLE",
    "TEAMS_URL",
];

fn update_reporter() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_update-reporter"));
    for var in SERVICE_ENV {
        command.env_remove(var);
    }
    command
}

fn write_file(dir: &Path, name: &str, contents: &str) -> String {
    let file = dir.join(name);
    std::fs::write(&file, contents).expect("failed to write fixture");
    file.to_string_lossy().into_owned()
}

fn run(command: &mut Command) -> std::process::Output {
    command.output().expect("failed to execute")
}

#[tokio::test]
async fn exits_zero_when_backend_accepts_the_report() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hooks/x"))
        .and(body_string_contains("2 outdated packages"))
        .and(body_string_contains("packagist.org/packages/foo/foo"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "result.json", RESULT_JSON);

    let output = run(update_reporter()
        .args(["--input", &input])
        .env("MATTERMOST_ENABLE", "1")
        .env("MATTERMOST_URL", format!("{}/hooks/x", server.uri()))
        .env("MATTERMOST_CHANNEL", "alerts"));

    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Sending report to Mattermost"));
    assert!(stdout.contains("Mattermost report was successful"));
}

#[tokio::test]
async fn exits_nonzero_when_backend_rejects_the_report() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "result.json", RESULT_JSON);

    let output = run(update_reporter()
        .args(["--input", &input])
        .env("MATTERMOST_ENABLE", "1")
        .env("MATTERMOST_URL", format!("{}/hooks/x", server.uri()))
        .env("MATTERMOST_CHANNEL", "alerts"));

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Error during Mattermost report"));
}

#[tokio::test]
async fn empty_result_skips_all_services_and_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "result.json", EMPTY_RESULT_JSON);

    let output = run(update_reporter()
        .args(["--input", &input])
        .env("SLACK_ENABLE", "1")
        .env("SLACK_URL", format!("{}/services/x", server.uri())));

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Skipped Slack report"));
}

#[tokio::test]
async fn json_flag_keeps_stdout_clean() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "result.json", RESULT_JSON);

    let output = run(update_reporter()
        .args(["--input", &input, "--json"])
        .env("SLACK_ENABLE", "1")
        .env("SLACK_URL", format!("{}/services/x", server.uri())));

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[tokio::test]
async fn settings_file_configures_services() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hooks/from-settings"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "result.json", RESULT_JSON);
    let settings = write_file(
        dir.path(),
        "settings.toml",
        &format!(
            "[update-check.mattermost]\n\
             enable = true\n\
             url = \"{}/hooks/from-settings\"\n\
             channel = \"alerts\"\n",
            server.uri()
        ),
    );

    let output = run(update_reporter().args(["--input", &input, "--config", &settings]));

    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[tokio::test]
async fn environment_overrides_settings_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hooks/from-env"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "result.json", RESULT_JSON);
    // The settings file points at a dead endpoint; the environment must win.
    let settings = write_file(
        dir.path(),
        "settings.toml",
        "[update-check.mattermost]\n\
         enable = true\n\
         url = \"http://127.0.0.1:1/hooks/from-settings\"\n\
         channel = \"alerts\"\n",
    );

    let output = run(update_reporter()
        .args(["--input", &input, "--config", &settings])
        .env("MATTERMOST_URL", format!("{}/hooks/from-env", server.uri())));

    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn enabled_but_unconfigured_service_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "result.json", RESULT_JSON);

    let output = run(update_reporter()
        .args(["--input", &input])
        .env("MATTERMOST_ENABLE", "1"));

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("mattermost url is not defined"));
    assert!(stderr.contains("MATTERMOST_URL"));
}

#[tokio::test]
async fn dry_run_contacts_no_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "result.json", RESULT_JSON);

    let output = run(update_reporter()
        .args(["--input", &input, "--dry-run"])
        .env("SLACK_ENABLE", "1")
        .env("SLACK_URL", format!("{}/services/x", server.uri())));

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("dry run"));
}

#[test]
fn missing_input_file_exits_with_error() {
    let output = run(update_reporter().args(["--input", "does-not-exist.json"]));

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("failed to read"));
}

#[test]
fn malformed_input_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "result.json", "not json");

    let output = run(update_reporter().args(["--input", &input]));

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("failed to parse check result"));
}
