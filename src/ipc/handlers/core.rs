use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers;
use crate::ipc::types::{AppState, Request};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "identityColumnCount": state.defaults.identity_column_count
        }),
    )
}

fn defaults_json(state: &AppState) -> serde_json::Value {
    json!({ "identityColumnCount": state.defaults.identity_column_count })
}

fn handle_defaults_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, defaults_json(state))
}

fn handle_defaults_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    let count = match helpers::optional_usize(req, "identityColumnCount") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Some(count) = count {
        if count == 0 {
            return err(
                &req.id,
                "bad_params",
                "identityColumnCount must be at least 1",
                None,
            );
        }
        state.defaults.identity_column_count = count;
    }
    ok(&req.id, defaults_json(state))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "defaults.get" => Some(handle_defaults_get(state, req)),
        "defaults.set" => Some(handle_defaults_set(state, req)),
        _ => None,
    }
}
