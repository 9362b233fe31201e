use std::process::Command;

fn combined_output(output: &std::process::Output) -> String {
    let mut combined = String::new();
    combined.push_str(&String::from_utf8_lossy(&output.stdout));
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    combined
}

fn pulsetx_bin() -> &'static str {
    env!("CARGO_BIN_EXE_pulsetx")
}

#[test]
fn help_mentions_name_and_flags() {
    let output = Command::new(pulsetx_bin())
        .arg("--help")
        .output()
        .expect("run pulsetx --help");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("pulsetx"));
    assert!(combined.contains("--threshold"));
    assert!(combined.contains("--nodesrv"));
}

#[test]
fn list_input_devices_uses_test_override() {
    let output = Command::new(pulsetx_bin())
        .arg("--list-input-devices")
        .env("PULSETX_TEST_DEVICES", "Built-in Mic, USB Interface")
        .output()
        .expect("run pulsetx --list-input-devices");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("Available audio input devices"));
    assert!(combined.contains("  - USB Interface"));
}

#[test]
fn list_input_devices_reports_empty_override() {
    let output = Command::new(pulsetx_bin())
        .arg("--list-input-devices")
        .env("PULSETX_TEST_DEVICES", "")
        .output()
        .expect("run pulsetx --list-input-devices");
    assert!(output.status.success());
    assert!(combined_output(&output).contains("No audio input devices detected."));
}

#[test]
fn invalid_threshold_fails_fast() {
    let output = Command::new(pulsetx_bin())
        .args(["--threshold", "2.0"])
        .output()
        .expect("run pulsetx --threshold 2.0");
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("--threshold"));
}

#[test]
fn unreachable_directory_is_fatal() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);
    let output = Command::new(pulsetx_bin())
        .args(["--nodesrv", &addr])
        .output()
        .expect("run pulsetx against a closed directory port");
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("can't register node"));
}
