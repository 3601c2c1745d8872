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

#[test]
fn totals_averages_and_categories_per_student() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "marks.analyze",
        json!({
            "table": {
                "columns": ["S.No", "REGD.NO", "NAME", "Sub1", "Sub2", "Sub3"],
                "rows": [
                    [1, "22MCA01", "Anil", 80, 50, 30],
                    [2, "22MCA02", "Bhavya", 90, 85, 95],
                    [3, "22MCA03", "Chris", 20, 30, 25]
                ]
            }
        }),
    );

    let rows = result["studentRows"].as_array().expect("studentRows");
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0]["total"], json!(160.0));
    assert_eq!(rows[0]["average"], json!(53.33));
    assert_eq!(rows[0]["category"], json!("regularLearner"));

    assert_eq!(rows[1]["total"], json!(270.0));
    assert_eq!(rows[1]["category"], json!("advancedLearner"));

    assert_eq!(rows[2]["average"], json!(25.0));
    assert_eq!(rows[2]["category"], json!("slowLearner"));

    assert_eq!(result["categoryCounts"]["slow"], json!(1));
    assert_eq!(result["categoryCounts"]["regular"], json!(1));
    assert_eq!(result["categoryCounts"]["advanced"], json!(1));
    assert_eq!(result["categoryShares"]["slow"], json!(33.3));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn boundary_averages_stay_regular() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "marks.analyze",
        json!({
            "table": {
                "columns": ["S.No", "REGD.NO", "NAME", "Sub1"],
                "rows": [
                    [1, "22MCA01", "Anil", 40],
                    [2, "22MCA02", "Bhavya", 60]
                ]
            }
        }),
    );

    let rows = result["studentRows"].as_array().expect("studentRows");
    assert_eq!(rows[0]["category"], json!("regularLearner"));
    assert_eq!(rows[1]["category"], json!("regularLearner"));
    assert_eq!(result["categoryCounts"]["regular"], json!(2));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn subject_summary_counts_total_columns_inclusively() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "marks.subjectSummary",
        json!({
            "table": {
                "columns": ["S.No", "REGD.NO", "NAME", "Total1", "Sub1"],
                "rows": [
                    [1, "22MCA01", "Anil", 35, 10],
                    [2, "22MCA02", "Bhavya", 45, 20],
                    [3, "22MCA03", "Chris", 65, 30],
                    [4, "22MCA04", "Divya", 40, 40],
                    [5, "22MCA05", "Esha", 60, 50]
                ]
            }
        }),
    );

    let columns = result["columns"].as_array().expect("columns");
    assert_eq!(columns.len(), 1, "only the Total column qualifies");
    assert_eq!(columns[0]["subject"], json!("Total1"));
    assert_eq!(columns[0]["below40"], json!(1));
    // 40 and 60 are inside the middle bucket here, by design.
    assert_eq!(columns[0]["from40To60"], json!(3));
    assert_eq!(columns[0]["above60"], json!(1));

    drop(stdin);
    let _ = child.wait();
}
