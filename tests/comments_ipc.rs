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

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn error_code(value: &serde_json::Value) -> String {
    assert_eq!(value["ok"], false, "expected failure: {}", value);
    value["error"]["code"].as_str().unwrap_or("").to_string()
}

#[test]
fn subject_comments_follow_bands_and_bilingual_slot() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let res = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "comments.subjects",
        json!({ "marks": [85, "77", 65.9, 52, null] }),
    );
    assert_eq!(
        res["comments"],
        json!([
            "Excellent, keep it up!",
            "Vema kabisa, lenga juu zaidi!",
            "Good, there's room for improvement.",
            "Average, strive to do better next time.",
            "No marks entered, please double check.",
        ])
    );

    let res = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "comments.subjects",
        json!({ "marks": [] }),
    );
    assert_eq!(res["comments"], json!([]));

    let res = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "comments.subjects",
        json!({ "marks": [" ", 0] }),
    );
    assert_eq!(
        res["comments"],
        json!([
            "No marks entered, please double check.",
            "Chini ya wastani, tufanye kazi kwa bidii.",
        ])
    );

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn subject_comment_errors_carry_codes() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let v = request(
        &mut stdin,
        &mut reader,
        "1",
        "comments.subjects",
        json!({ "marks": [50, 60, 101, 70] }),
    );
    assert_eq!(error_code(&v), "range_error");
    assert_eq!(v["error"]["details"]["value"], 101.0);

    let v = request(
        &mut stdin,
        &mut reader,
        "2",
        "comments.subjects",
        json!({ "marks": [50, "fifty"] }),
    );
    assert_eq!(error_code(&v), "format_error");

    let v = request(&mut stdin, &mut reader, "3", "comments.subjects", json!({}));
    assert_eq!(error_code(&v), "bad_params");

    let v = request(
        &mut stdin,
        &mut reader,
        "4",
        "comments.subjects",
        json!({ "marks": [true] }),
    );
    assert_eq!(error_code(&v), "bad_params");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn overall_comment_over_ipc() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let marks = json!({
        "English": 90,
        "Math": 89,
        "Swahili": 85,
        "Science": 93,
        "History": 93
    });

    let res = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "comments.overall",
        json!({ "subjectMarks": marks, "total": 450, "studentName": "Alice" }),
    );
    let comment = res["comment"].as_str().expect("comment");
    assert!(comment.starts_with("Outstanding job, Alice!"), "{}", comment);
    assert!(comment.contains("450"));
    assert!(comment.contains("excelled in Science"));

    let res = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "comments.overall",
        json!({ "subjectMarks": marks, "total": 450, "studentName": "Alice", "scale": "absolute" }),
    );
    assert!(res["comment"]
        .as_str()
        .unwrap_or("")
        .starts_with("Stay engaged, Alice."));

    let res = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "comments.overall",
        json!({ "subjectMarks": {}, "total": -1, "studentName": "Zed" }),
    );
    assert_eq!(
        res["comment"],
        "Total marks for Zed is -1. Please check the marks entered."
    );

    let v = request(
        &mut stdin,
        &mut reader,
        "4",
        "comments.overall",
        json!({ "subjectMarks": { "English": 50 }, "total": 50, "studentName": "Zed" }),
    );
    assert_eq!(error_code(&v), "insufficient_data");

    let v = request(
        &mut stdin,
        &mut reader,
        "5",
        "comments.overall",
        json!({ "subjectMarks": marks, "total": "450", "studentName": "Zed" }),
    );
    assert_eq!(error_code(&v), "bad_params");

    let v = request(
        &mut stdin,
        &mut reader,
        "6",
        "comments.overall",
        json!({ "subjectMarks": marks, "total": 450, "studentName": "Zed", "scale": "weekly" }),
    );
    assert_eq!(error_code(&v), "bad_params");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn normalize_and_format_helpers_over_ipc() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let res = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "marks.normalize",
        json!({ "values": [null, "", "42", 67.8, 0] }),
    );
    assert_eq!(
        res["marks"],
        json!([
            { "value": 0, "entered": false },
            { "value": 0, "entered": false },
            { "value": 42, "entered": true },
            { "value": 67, "entered": true },
            { "value": 0, "entered": true },
        ])
    );

    let v = request(
        &mut stdin,
        &mut reader,
        "2",
        "marks.normalize",
        json!({ "values": ["x"] }),
    );
    assert_eq!(error_code(&v), "format_error");

    let res = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "format.classAverage",
        json!({ "value": "73.5" }),
    );
    assert_eq!(res["classAverage"], "73.50");
    let res = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "format.classAverage",
        json!({ "value": null }),
    );
    assert_eq!(res["classAverage"], "0.00");
    let res = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "format.mark",
        json!({ "value": { "nested": true } }),
    );
    assert_eq!(res["mark"], 0);

    let res = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "format.abbreviateName",
        json!({ "name": "This Is The Master Of The Art" }),
    );
    assert_eq!(res["name"], "T. I. T. M. O. T.");
    let res = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "format.abbreviateName",
        json!({ "name": "Jane Wanjiru Odhiambo", "maxLength": 18 }),
    );
    assert_eq!(res["name"], "Jane Wanjiru O.");

    drop(stdin);
    let _ = child.wait();
}
