use crate::ipc::error::{engine, err, ok};
use crate::ipc::helpers;
use crate::ipc::types::{AppState, Request};
use crate::marks::{self, ClassificationThresholds, SingleMarksConfig};

fn thresholds_from_params(req: &Request) -> Result<ClassificationThresholds, serde_json::Value> {
    let mut thresholds = ClassificationThresholds::default();
    let Some(obj) = req.params.get("thresholds") else {
        return Ok(thresholds);
    };
    if obj.is_null() {
        return Ok(thresholds);
    }
    let Some(map) = obj.as_object() else {
        return Err(err(
            &req.id,
            "bad_params",
            "thresholds must be an object",
            None,
        ));
    };
    if let Some(v) = map.get("low") {
        let Some(low) = v.as_f64() else {
            return Err(err(&req.id, "bad_params", "thresholds.low must be a number", None));
        };
        thresholds.low = low;
    }
    if let Some(v) = map.get("high") {
        let Some(high) = v.as_f64() else {
            return Err(err(&req.id, "bad_params", "thresholds.high must be a number", None));
        };
        thresholds.high = high;
    }
    if thresholds.low >= thresholds.high {
        return Err(err(
            &req.id,
            "bad_params",
            "thresholds.low must be below thresholds.high",
            None,
        ));
    }
    Ok(thresholds)
}

fn handle_marks_analyze(state: &mut AppState, req: &Request) -> serde_json::Value {
    let table = match helpers::table_from_params(req, &state.defaults) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let thresholds = match thresholds_from_params(req) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    let report = match marks::analyze(&table, &thresholds) {
        Ok(r) => r,
        Err(e) => return engine(&req.id, e),
    };
    match helpers::analysis_result(req, &report) {
        Ok(result) => ok(&req.id, result),
        Err(resp) => resp,
    }
}

fn handle_marks_analyze_single(state: &mut AppState, req: &Request) -> serde_json::Value {
    let table = match helpers::table_from_params(req, &state.defaults) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let thresholds = match thresholds_from_params(req) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    let mut config = SingleMarksConfig::default();
    match helpers::optional_str(req, "field") {
        Ok(Some(field)) => config.field = field,
        Ok(None) => {}
        Err(resp) => return resp,
    }
    match helpers::optional_f64(req, "maximum") {
        Ok(Some(max)) => {
            if !max.is_finite() || max <= 0.0 {
                return err(
                    &req.id,
                    "bad_params",
                    "maximum must be a positive number",
                    None,
                );
            }
            config.maximum = max;
        }
        Ok(None) => {}
        Err(resp) => return resp,
    }

    let report = match marks::analyze_single(&table, &config, &thresholds) {
        Ok(r) => r,
        Err(e) => return engine(&req.id, e),
    };
    match helpers::analysis_result(req, &report) {
        Ok(result) => ok(&req.id, result),
        Err(resp) => resp,
    }
}

fn handle_marks_subject_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let table = match helpers::table_from_params(req, &state.defaults) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let summary = match marks::subject_summary(&table) {
        Ok(s) => s,
        Err(e) => return engine(&req.id, e),
    };
    match helpers::analysis_result(req, &summary) {
        Ok(result) => ok(&req.id, result),
        Err(resp) => resp,
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "marks.analyze" => Some(handle_marks_analyze(state, req)),
        "marks.analyzeSingle" => Some(handle_marks_analyze_single(state, req)),
        "marks.subjectSummary" => Some(handle_marks_subject_summary(state, req)),
        _ => None,
    }
}
