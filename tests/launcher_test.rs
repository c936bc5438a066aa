use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::TempDir;
use vnnews_etl::core::launcher::{PAUSE_PROMPT, STOPPED_MESSAGE};

fn write_config(dir: &Path, java: &Path) -> std::path::PathBuf {
    let config = dir.join("launcher.toml");
    std::fs::write(
        &config,
        format!(
            "[paths]\nvncorenlp_dir = \"{}\"\n\n[vncorenlp]\njava = \"{}\"\nport = 9123\n",
            dir.display(),
            java.display()
        ),
    )
    .unwrap();
    config
}

fn snapshot(dir: &Path) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64)> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| {
            let e = e.unwrap();
            (
                e.file_name().to_string_lossy().into_owned(),
                e.metadata().unwrap().len(),
            )
        })
        .collect();
    entries.sort();
    entries
}

#[cfg(unix)]
#[test]
fn test_reports_stop_only_after_the_server_exits() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let script = temp.path().join("fake-java.sh");
    std::fs::write(
        &script,
        "#!/bin/sh\nsleep 0.2\necho \"fake server args: $*\"\nexit 3\n",
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    let config = write_config(temp.path(), &script);
    let before = snapshot(temp.path());

    let output = Command::new(env!("CARGO_BIN_EXE_vncorenlp_server"))
        .arg("--config")
        .arg(&config)
        .arg("--no-pause")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let server_line = stdout
        .find("fake server args: -Xmx2g -jar VnCoreNLP-1.2.jar -p 9123 -a wseg")
        .expect("server output missing");
    let stopped = stdout.find(STOPPED_MESSAGE).expect("stop message missing");
    assert!(server_line < stopped);
    assert!(!stdout.contains(PAUSE_PROMPT));
    assert_eq!(snapshot(temp.path()), before);

    let mut child = Command::new(env!("CARGO_BIN_EXE_vncorenlp_server"))
        .arg("--config")
        .arg(&config)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"\n").unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stopped = stdout.find(STOPPED_MESSAGE).unwrap();
    let prompt = stdout.find(PAUSE_PROMPT).expect("pause prompt missing");
    assert!(stopped < prompt);
}

#[test]
fn test_missing_executable_still_reports_and_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), &temp.path().join("no-such-java"));

    let output = Command::new(env!("CARGO_BIN_EXE_vncorenlp_server"))
        .arg("--config")
        .arg(&config)
        .arg("--no-pause")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(STOPPED_MESSAGE));
}

#[cfg(unix)]
#[test]
fn test_ctrl_c_stops_the_server_but_not_the_report() {
    use std::os::unix::fs::PermissionsExt;
    use std::os::unix::process::CommandExt;

    let temp = TempDir::new().unwrap();
    let script = temp.path().join("fake-java.sh");
    std::fs::write(
        &script,
        "#!/bin/sh\ntrap 'echo \"fake server got INT\"; exit 130' INT\nwhile true; do sleep 0.1; done\n",
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    let config = write_config(temp.path(), &script);

    let child = Command::new(env!("CARGO_BIN_EXE_vncorenlp_server"))
        .arg("--config")
        .arg(&config)
        .arg("--no-pause")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .process_group(0)
        .spawn()
        .unwrap();
    std::thread::sleep(std::time::Duration::from_millis(1500));

    let group = format!("-{}", child.id());
    let kill = Command::new("kill")
        .args(["-s", "INT", "--", &group])
        .status()
        .unwrap();
    assert!(kill.success());

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let got_int = stdout.find("fake server got INT").expect("server was not interrupted");
    let stopped = stdout.find(STOPPED_MESSAGE).expect("stop message missing");
    assert!(got_int < stopped);
}
