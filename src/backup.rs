use anyhow::{anyhow, Context};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
const PLAN_ENTRY: &str = "plan/plan.json";
pub const BACKUP_FORMAT_V1: &str = "plannerd-plan-backup-v1";

#[derive(Debug, Clone)]
pub struct BackupSummary {
    pub backup_format: String,
    pub sha256: String,
    pub byte_count: usize,
}

#[derive(Debug, Clone)]
pub struct RestoreSummary {
    pub backup_format_detected: String,
    pub sha256: String,
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// `<dir>/backups/<stem>-<utc timestamp>.zip` for a plan at `<dir>/<stem>.json`.
pub fn default_backup_path(plan_path: &Path) -> PathBuf {
    let dir = plan_path.parent().unwrap_or_else(|| Path::new("."));
    let stem = plan_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "plan".to_string());
    let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%3fZ");
    dir.join("backups").join(format!("{}-{}.zip", stem, stamp))
}

pub fn backup_plan_file(plan_path: &Path, out_path: &Path) -> anyhow::Result<BackupSummary> {
    if !plan_path.is_file() {
        return Err(anyhow!(
            "plan file not found: {}",
            plan_path.to_string_lossy()
        ));
    }
    let plan_bytes = std::fs::read(plan_path)
        .with_context(|| format!("failed to read plan {}", plan_path.to_string_lossy()))?;
    let sha256 = sha256_hex(&plan_bytes);

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create backup file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let manifest = json!({
        "format": BACKUP_FORMAT_V1,
        "version": 1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": chrono::Utc::now().to_rfc3339(),
        "sourcePlan": plan_path.to_string_lossy(),
        "sha256": sha256,
    });
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    zip.start_file(PLAN_ENTRY, opts)
        .context("failed to start plan entry")?;
    zip.write_all(&plan_bytes)
        .context("failed to write plan entry")?;

    zip.finish().context("failed to finalize zip backup")?;

    Ok(BackupSummary {
        backup_format: BACKUP_FORMAT_V1.to_string(),
        sha256,
        byte_count: plan_bytes.len(),
    })
}

pub fn restore_plan_backup(in_path: &Path, plan_path: &Path) -> anyhow::Result<RestoreSummary> {
    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open backup {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("backup missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: serde_json::Value =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid JSON")?;
    let format = manifest
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if format != BACKUP_FORMAT_V1 {
        return Err(anyhow!("unsupported backup format: {}", format));
    }

    let mut plan_bytes = Vec::new();
    archive
        .by_name(PLAN_ENTRY)
        .context("backup missing plan/plan.json")?
        .read_to_end(&mut plan_bytes)
        .context("failed to extract plan entry")?;
    let sha256 = sha256_hex(&plan_bytes);
    let expected = manifest
        .get("sha256")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if sha256 != expected {
        return Err(anyhow!(
            "backup checksum mismatch: manifest {} but plan entry is {}",
            expected,
            sha256
        ));
    }
    serde_json::from_slice::<serde_json::Value>(&plan_bytes)
        .context("backed-up plan is invalid JSON")?;

    crate::store::write_atomic(plan_path, &plan_bytes)?;

    Ok(RestoreSummary {
        backup_format_detected: BACKUP_FORMAT_V1.to_string(),
        sha256,
    })
}
