use std::process::Command;

fn driver() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_copilot-driver"));
    for var in [
        "AZURE_OPENAI_ENDPOINT",
        "AZURE_OPENAI_API_KEY",
        "AZURE_OPENAI_AD_TOKEN",
        "OPENAI_API_KEY",
        "COPILOT_DRIVER_CODE_PATH",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_help_lists_options() {
    let output = driver().arg("--help").output().unwrap();
    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    for flag in [
        "--project-folder",
        "--code-path",
        "--prompt",
        "--keep-max-wait",
        "--install-interval",
        "--save-frames",
        "--skip-install",
    ] {
        assert!(help.contains(flag), "missing {flag} in help:\n{help}");
    }
}

#[test]
fn test_missing_credentials_fail_before_launch() {
    let dir = tempfile::tempdir().unwrap();
    let output = driver()
        .current_dir(dir.path())
        .args(["--project-folder"])
        .arg(dir.path())
        // would be spawned if credentials were checked too late
        .args(["--code-path", "/definitely/not/here/code"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Vision model is not configured"),
        "unexpected stderr:\n{stderr}"
    );
}

#[test]
fn test_invalid_interval_is_rejected() {
    let output = driver().args(["--keep-interval", "0"]).output().unwrap();
    assert!(!output.status.success());
}
