use serde::Serialize;
use serde_json::json;

use crate::table::{AnalysisError, StudentRecord, Table};

/// VB6-style half-up rounding to 1 decimal: `Int(10*x + 0.5) / 10`.
pub fn round_off_1_decimal(x: f64) -> f64 {
    ((10.0 * x) + 0.5).floor() / 10.0
}

/// Same scheme at 2 decimals, used for average percentages.
pub fn round_off_2_decimals(x: f64) -> f64 {
    ((100.0 * x) + 0.5).floor() / 100.0
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationThresholds {
    pub low: f64,
    pub high: f64,
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            low: 40.0,
            high: 60.0,
        }
    }
}

/// Performance tier for one student. Boundaries are strict on both
/// sides, so a percentage equal to either threshold is Regular.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LearnerCategory {
    SlowLearner,
    RegularLearner,
    AdvancedLearner,
}

impl LearnerCategory {
    pub fn classify(percent: f64, thresholds: &ClassificationThresholds) -> Self {
        if percent > thresholds.high {
            LearnerCategory::AdvancedLearner
        } else if percent < thresholds.low {
            LearnerCategory::SlowLearner
        } else {
            LearnerCategory::RegularLearner
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCounts {
    pub slow: usize,
    pub regular: usize,
    pub advanced: usize,
}

impl CategoryCounts {
    fn add(&mut self, category: LearnerCategory) {
        match category {
            LearnerCategory::SlowLearner => self.slow += 1,
            LearnerCategory::RegularLearner => self.regular += 1,
            LearnerCategory::AdvancedLearner => self.advanced += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.slow + self.regular + self.advanced
    }

    /// A distribution with no slow or no advanced learners is the
    /// trigger for the single-value rescale fallback.
    pub fn is_degenerate(&self) -> bool {
        self.slow == 0 || self.advanced == 0
    }

    /// Percentage shares (1 decimal) for the proportion chart.
    pub fn shares(&self) -> CategoryShares {
        let total = self.total();
        let share = |n: usize| {
            if total == 0 {
                0.0
            } else {
                round_off_1_decimal(100.0 * n as f64 / total as f64)
            }
        };
        CategoryShares {
            slow: share(self.slow),
            regular: share(self.regular),
            advanced: share(self.advanced),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShares {
    pub slow: f64,
    pub regular: f64,
    pub advanced: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentMarksRow {
    pub regd_no: String,
    pub name: String,
    pub total: f64,
    pub average: f64,
    pub category: LearnerCategory,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarksReport {
    pub thresholds: ClassificationThresholds,
    pub student_rows: Vec<StudentMarksRow>,
    pub category_counts: CategoryCounts,
    pub category_shares: CategoryShares,
}

/// Multi-subject mode: total across subject columns, average percent,
/// category per student, plus the distribution for the chart.
pub fn analyze(
    table: &Table,
    thresholds: &ClassificationThresholds,
) -> Result<MarksReport, AnalysisError> {
    let subjects = table.require_subject_columns()?;
    let subject_count = subjects.len() as f64;

    let mut student_rows = Vec::with_capacity(table.row_count());
    let mut category_counts = CategoryCounts::default();
    for rec in table.records() {
        let total: f64 = rec.values().iter().map(|v| v.unwrap_or(0.0)).sum();
        let average = round_off_2_decimals(total / subject_count);
        let category = LearnerCategory::classify(average, thresholds);
        category_counts.add(category);
        student_rows.push(StudentMarksRow {
            regd_no: rec.regd_no().to_string(),
            name: rec.name().to_string(),
            total,
            average,
            category,
        });
    }

    Ok(MarksReport {
        thresholds: *thresholds,
        student_rows,
        category_counts,
        category_shares: category_counts.shares(),
    })
}

#[derive(Debug, Clone)]
pub struct SingleMarksConfig {
    /// Score column name, matched case-insensitively.
    pub field: String,
    /// Configured exam maximum used as the first denominator.
    pub maximum: f64,
}

impl Default for SingleMarksConfig {
    fn default() -> Self {
        Self {
            field: "MARKS".to_string(),
            maximum: 60.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleStudentRow {
    pub regd_no: String,
    pub name: String,
    pub marks: f64,
    pub percent: f64,
    pub category: LearnerCategory,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleMarksReport {
    pub thresholds: ClassificationThresholds,
    pub student_rows: Vec<SingleStudentRow>,
    pub category_counts: CategoryCounts,
    pub category_shares: CategoryShares,
    /// True when the observed-max fallback fired.
    pub rescaled: bool,
    /// Denominator the final classification used.
    pub maximum_used: f64,
}

fn classify_against(
    records: &[StudentRecord],
    marks: &[f64],
    denominator: f64,
    thresholds: &ClassificationThresholds,
) -> (Vec<SingleStudentRow>, CategoryCounts) {
    let mut rows = Vec::with_capacity(marks.len());
    let mut counts = CategoryCounts::default();
    for (rec, &m) in records.iter().zip(marks) {
        let percent = if denominator > 0.0 {
            round_off_2_decimals(100.0 * m / denominator)
        } else {
            0.0
        };
        let category = LearnerCategory::classify(percent, thresholds);
        counts.add(category);
        rows.push(SingleStudentRow {
            regd_no: rec.regd_no().to_string(),
            name: rec.name().to_string(),
            marks: m,
            percent,
            category,
        });
    }
    (rows, counts)
}

/// Single-value mode: one score column against a configured maximum,
/// with the one-shot observed-max rescale fallback.
///
/// The fallback fires when the fixed maximum produces a distribution
/// with no slow or no advanced learners. It reclassifies once against
/// the maximum observed mark and accepts that result even if it is
/// still degenerate.
pub fn analyze_single(
    table: &Table,
    config: &SingleMarksConfig,
    thresholds: &ClassificationThresholds,
) -> Result<SingleMarksReport, AnalysisError> {
    table.require_subject_columns()?;
    let Some(col) = table.find_subject(&config.field) else {
        return Err(AnalysisError::schema_with_details(
            format!("required column {:?} not found", config.field),
            json!({ "field": config.field }),
        ));
    };

    let marks: Vec<f64> = table
        .records()
        .iter()
        .map(|rec| rec.values()[col].unwrap_or(0.0))
        .collect();

    let (mut rows, mut counts) =
        classify_against(table.records(), &marks, config.maximum, thresholds);
    let mut rescaled = false;
    let mut maximum_used = config.maximum;

    if counts.is_degenerate() {
        // Denominator comes from the pre-rescale marks, computed once.
        let observed_max = marks.iter().cloned().fold(0.0_f64, f64::max);
        if observed_max > 0.0 {
            let redone = classify_against(table.records(), &marks, observed_max, thresholds);
            rows = redone.0;
            counts = redone.1;
            rescaled = true;
            maximum_used = observed_max;
        }
    }

    Ok(SingleMarksReport {
        thresholds: *thresholds,
        student_rows: rows,
        category_counts: counts,
        category_shares: counts.shares(),
        rescaled,
        maximum_used,
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalColumnBuckets {
    pub subject: String,
    pub below_40: usize,
    /// Inclusive on both ends, unlike the per-student rule. Source
    /// behavior, kept as-is; see DESIGN.md.
    pub from_40_to_60: usize,
    pub above_60: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSummary {
    pub columns: Vec<TotalColumnBuckets>,
}

/// Per-subject 3-bucket counts over every column whose name contains
/// "total" (case-insensitive).
pub fn subject_summary(table: &Table) -> Result<SubjectSummary, AnalysisError> {
    let subjects = table.require_subject_columns()?;
    let selected: Vec<(usize, &String)> = subjects
        .iter()
        .enumerate()
        .filter(|(_, name)| name.to_ascii_lowercase().contains("total"))
        .collect();
    if selected.is_empty() {
        return Err(AnalysisError::schema_with_details(
            "no column containing \"total\" found",
            json!({ "pattern": "total" }),
        ));
    }

    let mut columns = Vec::with_capacity(selected.len());
    for (idx, name) in selected {
        let mut buckets = TotalColumnBuckets {
            subject: name.clone(),
            below_40: 0,
            from_40_to_60: 0,
            above_60: 0,
        };
        for rec in table.records() {
            let v = rec.values()[idx].unwrap_or(0.0);
            if v < 40.0 {
                buckets.below_40 += 1;
            } else if v <= 60.0 {
                buckets.from_40_to_60 += 1;
            } else {
                buckets.above_60 += 1;
            }
        }
        columns.push(buckets);
    }

    Ok(SubjectSummary { columns })
}
