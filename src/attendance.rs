use serde::Serialize;

use crate::table::{AnalysisError, Table};

/// Headline threshold for the at-risk table. The distribution ranges in
/// `AttendanceBucket` are fixed and do not follow this value.
#[derive(Debug, Clone, Copy)]
pub struct AttendanceConfig {
    pub threshold: f64,
    /// Clamp normalized values to 75. Used with the 75% headline
    /// threshold so students already above the bar of interest are not
    /// spread out further; a policy choice, not a numeric one.
    pub cap_at_75: bool,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            threshold: 65.0,
            cap_at_75: false,
        }
    }
}

/// Normalize one raw attendance cell to a whole percentage.
///
/// Missing cells count as 0. Values at or below 1 are fractions
/// (`0.75` means 75%) and are scaled up; everything else is already a
/// percentage. The fractional part is dropped, not rounded.
pub fn normalize_cell(raw: Option<f64>, cap_at_75: bool) -> i64 {
    let Some(v) = raw else {
        return 0;
    };
    let percent = if v <= 1.0 { v * 100.0 } else { v };
    let whole = percent.trunc() as i64;
    if cap_at_75 {
        whole.min(75)
    } else {
        whole
    }
}

/// Canonical distribution ranges for the stacked chart. Lower bound
/// inclusive, upper bound exclusive, so the four buckets partition
/// every possible value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AttendanceBucket {
    Below60,
    From60To65,
    From65To75,
    AtOrAbove75,
}

impl AttendanceBucket {
    pub fn of(percent: i64) -> Self {
        if percent < 60 {
            AttendanceBucket::Below60
        } else if percent < 65 {
            AttendanceBucket::From60To65
        } else if percent < 75 {
            AttendanceBucket::From65To75
        } else {
            AttendanceBucket::AtOrAbove75
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LowSubject {
    pub subject: String,
    pub percent: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtRiskRow {
    pub regd_no: String,
    pub name: String,
    pub low_subjects: Vec<LowSubject>,
    /// Joined form for direct display, e.g. `"DBMS (55%), OS (40%)"`.
    pub display: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectDistribution {
    pub subject: String,
    pub below_60: usize,
    pub from_60_to_65: usize,
    pub from_65_to_75: usize,
    pub at_or_above_75: usize,
    /// Students strictly below the headline threshold; feeds the
    /// per-subject bar chart and does follow the configured threshold.
    pub below_threshold: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceReport {
    pub threshold: f64,
    pub capped: bool,
    pub at_risk_rows: Vec<AtRiskRow>,
    pub subject_distribution: Vec<SubjectDistribution>,
}

pub fn analyze(table: &Table, config: &AttendanceConfig) -> Result<AttendanceReport, AnalysisError> {
    let subjects = table.require_subject_columns()?;
    let threshold = config.threshold.trunc() as i64;

    let mut at_risk_rows: Vec<AtRiskRow> = Vec::new();
    let mut distribution: Vec<SubjectDistribution> = subjects
        .iter()
        .map(|s| SubjectDistribution {
            subject: s.clone(),
            below_60: 0,
            from_60_to_65: 0,
            from_65_to_75: 0,
            at_or_above_75: 0,
            below_threshold: 0,
        })
        .collect();

    for rec in table.records() {
        let mut low_subjects: Vec<LowSubject> = Vec::new();
        for (j, subject) in subjects.iter().enumerate() {
            let percent = normalize_cell(rec.values()[j], config.cap_at_75);
            let dist = &mut distribution[j];
            match AttendanceBucket::of(percent) {
                AttendanceBucket::Below60 => dist.below_60 += 1,
                AttendanceBucket::From60To65 => dist.from_60_to_65 += 1,
                AttendanceBucket::From65To75 => dist.from_65_to_75 += 1,
                AttendanceBucket::AtOrAbove75 => dist.at_or_above_75 += 1,
            }
            if percent < threshold {
                dist.below_threshold += 1;
                low_subjects.push(LowSubject {
                    subject: subject.clone(),
                    percent,
                });
            }
        }

        if low_subjects.is_empty() {
            continue;
        }
        let display = low_subjects
            .iter()
            .map(|l| format!("{} ({}%)", l.subject, l.percent))
            .collect::<Vec<_>>()
            .join(", ");
        at_risk_rows.push(AtRiskRow {
            regd_no: rec.regd_no().to_string(),
            name: rec.name().to_string(),
            count: low_subjects.len(),
            low_subjects,
            display,
        });
    }

    Ok(AttendanceReport {
        threshold: config.threshold,
        capped: config.cap_at_75,
        at_risk_rows,
        subject_distribution: distribution,
    })
}
