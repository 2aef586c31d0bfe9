use std::io::Write;
use std::process::{Command, Output, Stdio};

fn scx_unitsched(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_scx_unitsched"))
        .args(args)
        .env_remove("SCX_UNITSCHED_QUANTUM")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn test_cli_reads_stdin() {
    let out = scx_unitsched(&[], "FIFO\n2\nA 0 3\nB 1 2\n");
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), "A 0 3\nB 3 5\n");
}

#[test]
fn test_cli_reads_file_with_quantum() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "RR 2\nA 0 3\nB 0 3\n").unwrap();
    let path = file.path().to_str().unwrap();

    let out = scx_unitsched(&["-q", "2", path], "");
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), "A 0 5\nB 2 6\n");
}

#[test]
fn test_cli_json_and_stats() {
    let out = scx_unitsched(&["--json", "--stats"], "PSJF 2 A 0 5 B 1 2");
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["rows"][0]["name"], "B");
    assert!(String::from_utf8_lossy(&out.stderr).contains("policy=PSJF makespan=7"));
}

#[test]
fn test_cli_rejects_bad_input() {
    let out = scx_unitsched(&[], "fifo 1 A 0 1");
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown scheduling policy"));

    let out = scx_unitsched(&["-q", "0"], "RR 1 A 0 1");
    assert!(!out.status.success());
}
