use crate::backup;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{plan_path, required_i64, required_str};
use crate::ipc::types::{AppState, Request};
use crate::plan::{self, UnitRecord};
use crate::store;
use serde_json::{json, Value as JsonValue};
use std::path::PathBuf;

fn handle_plan_get(state: &mut AppState, req: &Request) -> JsonValue {
    let path = match plan_path(state, req) {
        Ok(p) => p,
        Err(e) => return e,
    };
    let entries = store::load_plan_or_template(&path);
    ok(&req.id, json!({ "plan": entries }))
}

fn handle_plan_save(state: &mut AppState, req: &Request) -> JsonValue {
    let path = match plan_path(state, req) {
        Ok(p) => p,
        Err(e) => return e,
    };
    let Some(data) = req.params.get("data").cloned() else {
        return err(&req.id, "bad_params", "missing data", None);
    };
    let entries = store::normalize_pasted_plan(data);
    match store::commit_plan(&path, &entries) {
        Ok(commit) => ok(
            &req.id,
            json!({
                "count": entries.len(),
                "changed": commit.changed,
                "sha256": commit.sha256,
            }),
        ),
        Err(e) => err(&req.id, "plan_write_failed", format!("{e:#}"), None),
    }
}

fn subject_and_grade(req: &Request) -> Result<(String, i64), JsonValue> {
    let subject = required_str(req, "subject")?;
    let grade = required_i64(req, "grade")?;
    if !(1..=6).contains(&grade) {
        return Err(err(&req.id, "bad_params", "grade must be 1..6", None));
    }
    Ok((subject, grade))
}

fn handle_units_list(state: &mut AppState, req: &Request) -> JsonValue {
    let path = match plan_path(state, req) {
        Ok(p) => p,
        Err(e) => return e,
    };
    let (subject, grade) = match subject_and_grade(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let entries = store::load_plan_or_template(&path);
    let units: Vec<UnitRecord> = plan::find_entry(&entries, &subject, grade)
        .map(plan::list_units)
        .unwrap_or_default();
    ok(
        &req.id,
        json!({ "gradeBand": plan::grade_band(grade), "units": units }),
    )
}

fn handle_units_lesson(state: &mut AppState, req: &Request) -> JsonValue {
    let path = match plan_path(state, req) {
        Ok(p) => p,
        Err(e) => return e,
    };
    let (subject, grade) = match subject_and_grade(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let unit_name = match required_str(req, "unitName") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let lesson = match required_i64(req, "lesson") {
        Ok(v) if v >= 1 => match u32::try_from(v) {
            Ok(n) => n,
            Err(_) => return err(&req.id, "bad_params", "lesson is out of range", None),
        },
        Ok(_) => return err(&req.id, "bad_params", "lesson must be >= 1", None),
        Err(e) => return e,
    };

    let entries = store::load_plan_or_template(&path);
    let Some(entry) = plan::find_entry(&entries, &subject, grade) else {
        return err(&req.id, "not_found", "no plan entry for subject and grade", None);
    };
    let Some(unit) = plan::find_unit(entry, &unit_name) else {
        return err(&req.id, "not_found", "unit not found", None);
    };
    ok(
        &req.id,
        json!({
            "unit": UnitRecord::from_value(unit),
            "activity": plan::lesson_activity(unit, lesson),
        }),
    )
}

fn handle_plan_backup(state: &mut AppState, req: &Request) -> JsonValue {
    let path = match plan_path(state, req) {
        Ok(p) => p,
        Err(e) => return e,
    };
    let out = req
        .params
        .get("outPath")
        .and_then(|v| v.as_str())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| backup::default_backup_path(&path));
    match backup::backup_plan_file(&path, &out) {
        Ok(summary) => ok(
            &req.id,
            json!({
                "backupPath": out.to_string_lossy(),
                "backupFormat": summary.backup_format,
                "sha256": summary.sha256,
                "byteCount": summary.byte_count,
            }),
        ),
        Err(e) => err(&req.id, "backup_failed", format!("{e:#}"), None),
    }
}

fn handle_plan_restore(state: &mut AppState, req: &Request) -> JsonValue {
    let path = match plan_path(state, req) {
        Ok(p) => p,
        Err(e) => return e,
    };
    let in_path = match required_str(req, "inPath") {
        Ok(v) => PathBuf::from(v),
        Err(e) => return e,
    };
    match backup::restore_plan_backup(&in_path, &path) {
        Ok(summary) => ok(
            &req.id,
            json!({
                "backupFormatDetected": summary.backup_format_detected,
                "sha256": summary.sha256,
            }),
        ),
        Err(e) => err(&req.id, "backup_failed", format!("{e:#}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<JsonValue> {
    match req.method.as_str() {
        "plan.get" => Some(handle_plan_get(state, req)),
        "plan.save" => Some(handle_plan_save(state, req)),
        "plan.units.list" => Some(handle_units_list(state, req)),
        "plan.units.lesson" => Some(handle_units_lesson(state, req)),
        "plan.backup" => Some(handle_plan_backup(state, req)),
        "plan.restore" => Some(handle_plan_restore(state, req)),
        _ => None,
    }
}
