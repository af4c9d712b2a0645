use anyhow::{anyhow, Context};
use serde_json::Value as JsonValue;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const PLAN_FILE_NAME: &str = "연간지도_계획.json";
pub const TEMPLATE_FILE_NAME: &str = "연간지도_계획_템플릿.json";

#[derive(Debug, Clone)]
pub struct CommitSummary {
    pub changed: bool,
    pub sha256: String,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

pub fn load_plan(path: &Path) -> anyhow::Result<Vec<JsonValue>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read plan {}", path.to_string_lossy()))?;
    let value: JsonValue = serde_json::from_str(&text)
        .with_context(|| format!("plan {} is invalid JSON", path.to_string_lossy()))?;
    match value {
        JsonValue::Array(entries) => Ok(entries),
        _ => Err(anyhow!(
            "plan {} must be a JSON array of entries",
            path.to_string_lossy()
        )),
    }
}

/// The plan when it has entries, else the template stored beside it, else
/// nothing. Read-only lookups never fail on a bad file.
pub fn load_plan_or_template(plan_path: &Path) -> Vec<JsonValue> {
    if plan_path.is_file() {
        match load_plan(plan_path) {
            Ok(entries) if !entries.is_empty() => return entries,
            Ok(_) => tracing::debug!("plan is empty; trying template"),
            Err(e) => tracing::warn!("annual plan load failed: {e:#}"),
        }
    }
    let template_path = plan_path.with_file_name(TEMPLATE_FILE_NAME);
    if template_path.is_file() {
        match load_plan(&template_path) {
            Ok(entries) => return entries,
            Err(e) => tracing::warn!("annual plan template load failed: {e:#}"),
        }
    }
    Vec::new()
}

pub fn render_plan(plan: &[JsonValue]) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec_pretty(plan).context("failed to serialize plan")
}

/// Replaces `path` with `plan` in one rename. Identical content is not rewritten.
pub fn commit_plan(path: &Path, plan: &[JsonValue]) -> anyhow::Result<CommitSummary> {
    let bytes = render_plan(plan)?;
    let sha256 = sha256_hex(&bytes);

    if path.is_file() {
        let existing = std::fs::read(path)
            .with_context(|| format!("failed to read plan {}", path.to_string_lossy()))?;
        if sha256_hex(&existing) == sha256 {
            return Ok(CommitSummary {
                changed: false,
                sha256,
            });
        }
    }

    write_atomic(path, &bytes)?;
    Ok(CommitSummary {
        changed: true,
        sha256,
    })
}

pub fn write_atomic(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create directory {}", dir.to_string_lossy()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| anyhow!("plan path has no file name: {}", path.to_string_lossy()))?;
    let tmp = dir.join(format!(".{}.{}.writing", file_name, Uuid::new_v4()));

    let result = (|| -> anyhow::Result<()> {
        let mut out = File::create(&tmp)
            .with_context(|| format!("failed to create temp file {}", tmp.to_string_lossy()))?;
        out.write_all(bytes)
            .with_context(|| format!("failed to write temp file {}", tmp.to_string_lossy()))?;
        out.sync_all()
            .with_context(|| format!("failed to flush temp file {}", tmp.to_string_lossy()))?;
        drop(out);
        std::fs::rename(&tmp, path).with_context(|| {
            format!(
                "failed to move {} into place at {}",
                tmp.to_string_lossy(),
                path.to_string_lossy()
            )
        })
    })();

    if result.is_err() && tmp.exists() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}

/// Shapes a pasted plan body into a list of entries.
pub fn normalize_pasted_plan(value: JsonValue) -> Vec<JsonValue> {
    match value {
        JsonValue::Array(entries) => entries,
        JsonValue::Null => Vec::new(),
        JsonValue::Object(mut obj) => match obj.remove("data") {
            Some(JsonValue::Array(entries)) => entries,
            Some(JsonValue::Null) | None => vec![JsonValue::Object(obj)],
            Some(other) => vec![other],
        },
        other => vec![other],
    }
}
