use serde::Serialize;
use serde_json::json;

/// Engine-level error with a stable string code, passed through the IPC
/// envelope untouched.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AnalysisError {
    pub fn schema(message: impl Into<String>) -> Self {
        Self {
            code: "schema_error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn schema_with_details(message: impl Into<String>, details: serde_json::Value) -> Self {
        Self {
            code: "schema_error".to_string(),
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn empty_table() -> Self {
        Self {
            code: "empty_table".to_string(),
            message: "table has no rows".to_string(),
            details: None,
        }
    }
}

/// One decoded spreadsheet cell. The caller owns file parsing; by the
/// time a cell reaches the engine it is text, a number, or absent.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Missing,
}

impl Cell {
    fn as_value(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Text(s) => s.trim().parse::<f64>().ok(),
            Cell::Missing => None,
        }
    }

    fn as_text(&self) -> String {
        match self {
            Cell::Text(s) => s.trim().to_string(),
            // Spreadsheet exports deliver serial/registration numbers as
            // floats; render whole numbers without the trailing ".0".
            Cell::Number(v) if v.fract() == 0.0 && v.is_finite() => format!("{}", *v as i64),
            Cell::Number(v) => v.to_string(),
            Cell::Missing => String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StudentRecord {
    identity: Vec<String>,
    values: Vec<Option<f64>>,
}

impl StudentRecord {
    /// Registration number: second identity column when present
    /// (serial number comes first in the exports), otherwise the first.
    pub fn regd_no(&self) -> &str {
        self.identity
            .get(1)
            .or_else(|| self.identity.first())
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    pub fn name(&self) -> &str {
        self.identity
            .get(2)
            .or_else(|| self.identity.last())
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    /// Raw subject values aligned with `Table::subject_columns`.
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }
}

/// An immutable roster table: leading identity columns plus one column
/// per subject. Built once from decoded input; analyzers only read it.
#[derive(Debug, Clone)]
pub struct Table {
    identity_columns: Vec<String>,
    subject_columns: Vec<String>,
    records: Vec<StudentRecord>,
}

impl Table {
    pub fn build(
        columns: Vec<String>,
        rows: Vec<Vec<Cell>>,
        identity_column_count: usize,
    ) -> Result<Table, AnalysisError> {
        if columns.len() < identity_column_count {
            return Err(AnalysisError::schema_with_details(
                format!(
                    "table has {} columns but {} identity columns were expected",
                    columns.len(),
                    identity_column_count
                ),
                json!({ "identityColumnCount": identity_column_count }),
            ));
        }
        if rows.is_empty() {
            return Err(AnalysisError::empty_table());
        }

        let mut records = Vec::with_capacity(rows.len());
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != columns.len() {
                return Err(AnalysisError::schema_with_details(
                    format!(
                        "row {} has {} cells, expected {}",
                        i,
                        row.len(),
                        columns.len()
                    ),
                    json!({ "row": i }),
                ));
            }
            let identity = row[..identity_column_count]
                .iter()
                .map(Cell::as_text)
                .collect();
            let values = row[identity_column_count..]
                .iter()
                .map(Cell::as_value)
                .collect();
            records.push(StudentRecord { identity, values });
        }

        let subject_columns = columns[identity_column_count..].to_vec();
        let identity_columns = columns[..identity_column_count].to_vec();
        Ok(Table {
            identity_columns,
            subject_columns,
            records,
        })
    }

    pub fn identity_columns(&self) -> &[String] {
        &self.identity_columns
    }

    pub fn subject_columns(&self) -> &[String] {
        &self.subject_columns
    }

    /// Subject columns, or a schema error when the table carries none
    /// (e.g. a 3-column export that is all identity fields).
    pub fn require_subject_columns(&self) -> Result<&[String], AnalysisError> {
        if self.subject_columns.is_empty() {
            return Err(AnalysisError::schema(
                "no subject columns after the identity columns",
            ));
        }
        Ok(&self.subject_columns)
    }

    /// Index of the subject column matching `name` case-insensitively.
    pub fn find_subject(&self, name: &str) -> Option<usize> {
        self.subject_columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }
}
