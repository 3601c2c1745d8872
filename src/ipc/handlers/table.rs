use serde_json::json;

use crate::ipc::error::ok;
use crate::ipc::helpers;
use crate::ipc::types::{AppState, Request};

/// Column-split preview so the UI can show what will be analyzed
/// before running anything.
fn handle_table_inspect(state: &mut AppState, req: &Request) -> serde_json::Value {
    let table = match helpers::table_from_params(req, &state.defaults) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    ok(
        &req.id,
        json!({
            "identityColumns": table.identity_columns(),
            "subjectColumns": table.subject_columns(),
            "rowCount": table.row_count()
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "table.inspect" => Some(handle_table_inspect(state, req)),
        _ => None,
    }
}
