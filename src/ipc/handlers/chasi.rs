use crate::chasi;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::plan_path;
use crate::ipc::types::{AppState, Request};
use crate::plan;
use crate::sweep;
use serde_json::{json, Value as JsonValue};

fn handle_split(state: &mut AppState, req: &Request) -> JsonValue {
    let Some(text) = req.params.get("text").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing text", None);
    };
    let fragments = chasi::split_fragments(text);
    let roles = chasi::classify(&fragments, &state.config.distributor.keywords);
    ok(&req.id, json!({ "fragments": fragments, "roles": roles }))
}

fn handle_distribute(state: &mut AppState, req: &Request) -> JsonValue {
    let description = match req.params.get("description") {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(s)) => Some(s.as_str()),
        Some(_) => {
            return err(
                &req.id,
                "bad_params",
                "description must be string or null",
                None,
            )
        }
    };
    let total = plan::parse_total_periods(req.params.get("totalPeriods"));
    let assignments = chasi::distribute(total, description, &state.config.distributor);
    ok(
        &req.id,
        json!({ "totalPeriods": total, "assignments": assignments }),
    )
}

fn handle_fill(state: &mut AppState, req: &Request) -> JsonValue {
    let path = match plan_path(state, req) {
        Ok(p) => p,
        Err(e) => return e,
    };
    if !path.is_file() {
        return err(
            &req.id,
            "plan_load_failed",
            format!("plan file not found: {}", path.to_string_lossy()),
            None,
        );
    }
    match sweep::fill_plan_file(&path, &state.config) {
        Ok(report) => ok(&req.id, json!(report)),
        Err(e) => err(&req.id, "fill_failed", format!("{e:#}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<JsonValue> {
    match req.method.as_str() {
        "chasi.split" => Some(handle_split(state, req)),
        "chasi.distribute" => Some(handle_distribute(state, req)),
        "chasi.fill" => Some(handle_fill(state, req)),
        _ => None,
    }
}
