use crate::attendance::{self, AttendanceConfig};
use crate::ipc::error::{engine, err, ok};
use crate::ipc::helpers;
use crate::ipc::types::{AppState, Request};

fn handle_attendance_analyze(state: &mut AppState, req: &Request) -> serde_json::Value {
    let table = match helpers::table_from_params(req, &state.defaults) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    let mut config = AttendanceConfig::default();
    match helpers::optional_f64(req, "threshold") {
        Ok(Some(t)) => {
            if !t.is_finite() || t <= 0.0 {
                return err(
                    &req.id,
                    "bad_params",
                    "threshold must be a positive number",
                    None,
                );
            }
            config.threshold = t;
        }
        Ok(None) => {}
        Err(resp) => return resp,
    }
    match helpers::optional_bool(req, "capAt75") {
        Ok(Some(b)) => config.cap_at_75 = b,
        Ok(None) => {}
        Err(resp) => return resp,
    }

    let report = match attendance::analyze(&table, &config) {
        Ok(r) => r,
        Err(e) => return engine(&req.id, e),
    };
    match helpers::analysis_result(req, &report) {
        Ok(result) => ok(&req.id, result),
        Err(resp) => resp,
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.analyze" => Some(handle_attendance_analyze(state, req)),
        _ => None,
    }
}
