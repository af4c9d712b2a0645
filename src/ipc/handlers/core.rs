use crate::config::PlannerConfig;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use crate::store;
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "planPath": state.plan_path.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

fn handle_plan_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let raw = match required_str(req, "path") {
        Ok(v) => PathBuf::from(v),
        Err(e) => return e,
    };
    // A directory selects the conventional plan file inside it.
    let path = if raw.is_dir() {
        raw.join(store::PLAN_FILE_NAME)
    } else {
        raw
    };

    match PlannerConfig::load_for_plan(&path) {
        Ok(config) => {
            state.config = config;
            state.plan_path = Some(path.clone());
            ok(
                &req.id,
                json!({
                    "planPath": path.to_string_lossy(),
                    "exists": path.is_file(),
                }),
            )
        }
        Err(e) => err(&req.id, "config_load_failed", format!("{e:#}"), None),
    }
}

fn handle_setup_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "config": state.config.to_json() }))
}

fn handle_setup_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(patch) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "patch must be an object", None);
    };
    state.config = state.config.patched(patch);
    ok(&req.id, json!({ "config": state.config.to_json() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "plan.select" => Some(handle_plan_select(state, req)),
        "setup.get" => Some(handle_setup_get(state, req)),
        "setup.update" => Some(handle_setup_update(state, req)),
        _ => None,
    }
}
