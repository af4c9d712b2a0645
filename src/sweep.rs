use crate::backup;
use crate::chasi::{self, DistributorConfig, PeriodAssignment};
use crate::config::PlannerConfig;
use crate::plan::{self, UnitRecord};
use crate::store;
use anyhow::Context;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepSummary {
    pub units_updated: usize,
    pub units_skipped: usize,
    pub units_without_activities: usize,
    pub units_failed: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillReport {
    #[serde(flatten)]
    pub summary: SweepSummary,
    pub changed: bool,
    pub sha256: String,
    pub backup_path: Option<String>,
}

/// Fills every unit whose assignment list is empty or missing. Units that
/// already carry assignments are left exactly as they are.
pub fn sweep_plan(plan: &mut [JsonValue], config: &DistributorConfig) -> SweepSummary {
    sweep_with(plan, config, chasi::distribute)
}

type Distributor = fn(u32, Option<&str>, &DistributorConfig) -> Vec<PeriodAssignment>;

fn sweep_with(
    plan: &mut [JsonValue],
    config: &DistributorConfig,
    distribute: Distributor,
) -> SweepSummary {
    let mut summary = SweepSummary::default();
    for entry in plan.iter_mut() {
        let Some(units) = entry
            .get_mut(plan::KEY_UNITS)
            .and_then(|v| v.as_array_mut())
        else {
            continue;
        };
        for unit in units.iter_mut() {
            if !unit.is_object() {
                tracing::warn!("skipping non-object unit record");
                summary.units_failed += 1;
                continue;
            }
            if plan::has_assignments(unit) {
                summary.units_skipped += 1;
                continue;
            }

            let record = UnitRecord::from_value(unit);
            let total = plan::parse_total_periods(record.total_periods.as_ref());
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                distribute(total, record.description.as_deref(), config)
            }));
            let assignments = match outcome {
                Ok(v) => v,
                Err(_) => {
                    tracing::warn!(unit = %record.display_id(), "period distribution failed");
                    summary.units_failed += 1;
                    continue;
                }
            };
            if assignments.is_empty() {
                tracing::debug!(unit = %record.display_id(), "no activity text to distribute");
                summary.units_without_activities += 1;
                continue;
            }

            match serde_json::to_value(&assignments) {
                Ok(value) => {
                    if let Some(obj) = unit.as_object_mut() {
                        obj.insert(plan::KEY_ASSIGNMENTS.to_string(), value);
                    }
                    summary.units_updated += 1;
                }
                Err(e) => {
                    tracing::warn!(unit = %record.display_id(), "failed to encode assignments: {e}");
                    summary.units_failed += 1;
                }
            }
        }
    }
    summary
}

/// Load, sweep, commit once. Nothing is written unless the whole sweep ran.
pub fn fill_plan_file(plan_path: &Path, config: &PlannerConfig) -> anyhow::Result<FillReport> {
    let mut plan = store::load_plan(plan_path)?;
    let summary = sweep_plan(&mut plan, &config.distributor);

    let mut backup_path = None;
    if config.backup_before_write && summary.units_updated > 0 {
        let out = backup::default_backup_path(plan_path);
        backup::backup_plan_file(plan_path, &out)
            .with_context(|| format!("failed to back up plan to {}", out.to_string_lossy()))?;
        tracing::info!(backup = %out.display(), "backed up plan before rewrite");
        backup_path = Some(out.to_string_lossy().to_string());
    }

    let commit = store::commit_plan(plan_path, &plan)?;
    tracing::info!(
        units_updated = summary.units_updated,
        units_skipped = summary.units_skipped,
        units_without_activities = summary.units_without_activities,
        units_failed = summary.units_failed,
        changed = commit.changed,
        "차시별_주요_활동 추가 완료: {}개 단원",
        summary.units_updated
    );

    Ok(FillReport {
        summary,
        changed: commit.changed,
        sha256: commit.sha256,
        backup_path,
    })
}
