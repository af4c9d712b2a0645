use super::error::err;
use super::types::{AppState, Request};
use serde_json::Value as JsonValue;
use std::path::PathBuf;

pub fn required_str(req: &Request, key: &str) -> Result<String, JsonValue> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

/// Accepts `3` or `"3"`.
pub fn required_i64(req: &Request, key: &str) -> Result<i64, JsonValue> {
    let v = req.params.get(key);
    v.and_then(|v| v.as_i64())
        .or_else(|| {
            v.and_then(|v| v.as_str())
                .and_then(|s| s.trim().parse::<i64>().ok())
        })
        .ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                format!("{} must be an integer", key),
                None,
            )
        })
}

pub fn plan_path(state: &AppState, req: &Request) -> Result<PathBuf, JsonValue> {
    state
        .plan_path
        .clone()
        .ok_or_else(|| err(&req.id, "no_plan", "select a plan first", None))
}
