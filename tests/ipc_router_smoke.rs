use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_reportcardd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .env_remove("REPORTCARDD_CONFIG")
        .spawn()
        .expect("spawn reportcardd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn read_response(reader: &mut BufReader<ChildStdout>) -> serde_json::Value {
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response");
    serde_json::from_str(line.trim()).expect("parse response json")
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let value = read_response(reader);
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    if value.get("ok").and_then(|v| v.as_bool()) == Some(false) {
        let code = value
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        assert_ne!(
            code, "not_implemented",
            "unexpected unknown method for {}",
            method
        );
    }
    value
}

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let health = request(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(health["ok"], true);
    assert!(health["result"]["version"].is_string());
    assert!(health["result"]["workspacePath"].is_null());

    let _ = request(&mut stdin, &mut reader, "2", "settings.get", json!({}));
    let _ = request(
        &mut stdin,
        &mut reader,
        "3",
        "marks.normalize",
        json!({ "values": [1, null] }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "4",
        "comments.subjects",
        json!({ "marks": [80] }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "5",
        "comments.overall",
        json!({ "subjectMarks": { "A": 1, "B": 2 }, "total": 3, "studentName": "X" }),
    );
    let _ = request(&mut stdin, &mut reader, "6", "format.mark", json!({ "value": 1 }));
    let _ = request(
        &mut stdin,
        &mut reader,
        "7",
        "format.classAverage",
        json!({ "value": 1 }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "8",
        "format.abbreviateName",
        json!({ "name": "A B" }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "9",
        "reports.classModel",
        json!({ "sheet": { "rows": [] } }),
    );

    let unknown = {
        writeln!(stdin, "{}", json!({ "id": "10", "method": "nope.nothing" })).expect("write");
        stdin.flush().expect("flush");
        read_response(&mut reader)
    };
    assert_eq!(unknown["ok"], false);
    assert_eq!(unknown["error"]["code"], "not_implemented");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn malformed_lines_get_bad_json_and_the_loop_continues() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    writeln!(stdin).expect("write blank");
    writeln!(stdin, "this is not json").expect("write garbage");
    stdin.flush().expect("flush");
    let bad = read_response(&mut reader);
    assert_eq!(bad["ok"], false);
    assert_eq!(bad["error"]["code"], "bad_json");
    assert!(bad.get("id").is_none());

    let health = request(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(health["ok"], true);

    drop(stdin);
    let _ = child.wait();
}
