use serde_json::json;

use crate::ipc::error::{engine, err};
use crate::ipc::types::{Defaults, Request};
use crate::table::{Cell, Table};

/// Decode the submitted table from `params.table`. The caller has
/// already parsed the upload; cells arrive as JSON strings, numbers,
/// or nulls. A per-request `identityColumnCount` overrides the
/// sidecar defaults.
pub fn table_from_params(req: &Request, defaults: &Defaults) -> Result<Table, serde_json::Value> {
    let Some(payload) = req.params.get("table") else {
        return Err(err(&req.id, "bad_params", "missing params.table", None));
    };
    let Some(columns_json) = payload.get("columns").and_then(|v| v.as_array()) else {
        return Err(err(
            &req.id,
            "bad_params",
            "table.columns must be an array",
            None,
        ));
    };
    let mut columns = Vec::with_capacity(columns_json.len());
    for (i, c) in columns_json.iter().enumerate() {
        let Some(s) = c.as_str() else {
            return Err(err(
                &req.id,
                "bad_params",
                format!("table.columns[{}] must be a string", i),
                None,
            ));
        };
        columns.push(s.to_string());
    }

    let Some(rows_json) = payload.get("rows").and_then(|v| v.as_array()) else {
        return Err(err(
            &req.id,
            "bad_params",
            "table.rows must be an array",
            None,
        ));
    };
    let mut rows = Vec::with_capacity(rows_json.len());
    for (i, row) in rows_json.iter().enumerate() {
        let Some(cells_json) = row.as_array() else {
            return Err(err(
                &req.id,
                "bad_params",
                format!("table.rows[{}] must be an array", i),
                None,
            ));
        };
        let mut cells = Vec::with_capacity(cells_json.len());
        for (j, cell) in cells_json.iter().enumerate() {
            let parsed = if cell.is_null() {
                Cell::Missing
            } else if let Some(n) = cell.as_f64() {
                Cell::Number(n)
            } else if let Some(s) = cell.as_str() {
                Cell::Text(s.to_string())
            } else {
                return Err(err(
                    &req.id,
                    "bad_params",
                    format!("unsupported cell at row {} column {}", i, j),
                    Some(json!({ "row": i, "column": j })),
                ));
            };
            cells.push(parsed);
        }
        rows.push(cells);
    }

    let identity_column_count =
        optional_usize(req, "identityColumnCount")?.unwrap_or(defaults.identity_column_count);
    Table::build(columns, rows, identity_column_count).map_err(|e| engine(&req.id, e))
}

pub fn optional_usize(req: &Request, key: &str) -> Result<Option<usize>, serde_json::Value> {
    match req.params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => {
            let Some(n) = v.as_u64() else {
                return Err(err(
                    &req.id,
                    "bad_params",
                    format!("{} must be a non-negative integer", key),
                    None,
                ));
            };
            Ok(Some(n as usize))
        }
    }
}

pub fn optional_f64(req: &Request, key: &str) -> Result<Option<f64>, serde_json::Value> {
    match req.params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => {
            let Some(n) = v.as_f64() else {
                return Err(err(
                    &req.id,
                    "bad_params",
                    format!("{} must be a number", key),
                    None,
                ));
            };
            Ok(Some(n))
        }
    }
}

pub fn optional_bool(req: &Request, key: &str) -> Result<Option<bool>, serde_json::Value> {
    match req.params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => {
            let Some(b) = v.as_bool() else {
                return Err(err(
                    &req.id,
                    "bad_params",
                    format!("{} must be a boolean", key),
                    None,
                ));
            };
            Ok(Some(b))
        }
    }
}

pub fn optional_str(req: &Request, key: &str) -> Result<Option<String>, serde_json::Value> {
    match req.params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => {
            let Some(s) = v.as_str() else {
                return Err(err(
                    &req.id,
                    "bad_params",
                    format!("{} must be a string", key),
                    None,
                ));
            };
            let t = s.trim();
            if t.is_empty() {
                Ok(None)
            } else {
                Ok(Some(t.to_string()))
            }
        }
    }
}

/// Serialize a report and stamp the correlation fields the UI uses to
/// pair charts with the run that produced them.
pub fn analysis_result(
    req: &Request,
    report: &impl serde::Serialize,
) -> Result<serde_json::Value, serde_json::Value> {
    let mut value = serde_json::to_value(report)
        .map_err(|e| err(&req.id, "serialize_failed", e.to_string(), None))?;
    value["analysisId"] = json!(uuid::Uuid::new_v4().to_string());
    value["generatedAt"] = json!(chrono::Utc::now().to_rfc3339());
    Ok(value)
}
