use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_rosterd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn rosterd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request_ok(
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
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn roster() -> serde_json::Value {
    json!({
        "columns": ["S.No", "REGD.NO", "NAME", "DBMS", "OS", "CN"],
        "rows": [
            [1, "22MCA01", "Anil", 70, 55, 90],
            [2, "22MCA02", "Bhavya", 0.58, 82, 64],
            [3, "22MCA03", "Chris", 91, 77, 80]
        ]
    })
}

#[test]
fn at_risk_rows_carry_subject_and_percent() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.analyze",
        json!({ "table": roster() }),
    );

    let rows = result["atRiskRows"].as_array().expect("atRiskRows");
    assert_eq!(rows.len(), 2, "Chris is above 65 everywhere: {}", result);

    assert_eq!(rows[0]["regdNo"], json!("22MCA01"));
    assert_eq!(rows[0]["display"], json!("OS (55%)"));
    assert_eq!(rows[0]["count"], json!(1));

    // 0.58 is a fraction and normalizes to 58%.
    assert_eq!(rows[1]["regdNo"], json!("22MCA02"));
    assert_eq!(rows[1]["display"], json!("DBMS (58%), CN (64%)"));
    assert_eq!(rows[1]["count"], json!(2));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn distribution_is_a_partition_per_subject() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.analyze",
        json!({ "table": roster() }),
    );

    let dist = result["subjectDistribution"].as_array().expect("distribution");
    assert_eq!(dist.len(), 3);
    for subject in dist {
        let total = subject["below60"].as_u64().unwrap()
            + subject["from60To65"].as_u64().unwrap()
            + subject["from65To75"].as_u64().unwrap()
            + subject["atOrAbove75"].as_u64().unwrap();
        assert_eq!(total, 3, "buckets must cover all students: {}", subject);
    }

    // DBMS: 70, 58, 91.
    assert_eq!(dist[0]["below60"], json!(1));
    assert_eq!(dist[0]["from65To75"], json!(1));
    assert_eq!(dist[0]["atOrAbove75"], json!(1));
    assert_eq!(dist[0]["belowThreshold"], json!(1));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn threshold_75_with_cap_changes_headline_counts_only() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.analyze",
        json!({ "table": roster(), "threshold": 75, "capAt75": true }),
    );

    assert_eq!(result["threshold"], json!(75.0));
    assert_eq!(result["capped"], json!(true));

    // With the cap every value above 75 clamps to exactly 75, which is
    // not strictly below the threshold.
    let rows = result["atRiskRows"].as_array().expect("atRiskRows");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["display"], json!("DBMS (70%), OS (55%)"));
    assert_eq!(rows[1]["display"], json!("DBMS (58%), CN (64%)"));

    let dist = result["subjectDistribution"].as_array().expect("distribution");
    // CN capped: 75, 64, 75.
    assert_eq!(dist[2]["atOrAbove75"], json!(2));
    assert_eq!(dist[2]["belowThreshold"], json!(1));

    drop(stdin);
    let _ = child.wait();
}
