use crate::chasi::{DistributorConfig, FallbackPolicy, KeywordSet};
use anyhow::Context;
use serde_json::{json, Map, Value as JsonValue};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "PLANNERD_CONFIG";
pub const CONFIG_FILE_NAME: &str = "plannerd.json";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlannerConfig {
    pub distributor: DistributorConfig,
    pub backup_before_write: bool,
}

impl PlannerConfig {
    pub fn to_json(&self) -> JsonValue {
        json!({
            "preparationKeywords": self.distributor.keywords.preparation,
            "wrapupKeywords": self.distributor.keywords.wrapup,
            "fallbackPolicy": self.distributor.fallback.as_str(),
            "backupBeforeWrite": self.backup_before_write,
        })
    }

    /// Builds a config from a settings object. Keys that are missing or
    /// malformed keep their defaults.
    pub fn from_json(obj: &Map<String, JsonValue>) -> Self {
        Self::default().patched(obj)
    }

    pub fn patched(&self, obj: &Map<String, JsonValue>) -> Self {
        let preparation = keyword_list(obj.get("preparationKeywords"))
            .unwrap_or_else(|| self.distributor.keywords.preparation.clone());
        let wrapup = keyword_list(obj.get("wrapupKeywords"))
            .unwrap_or_else(|| self.distributor.keywords.wrapup.clone());
        let fallback = obj
            .get("fallbackPolicy")
            .and_then(|v| v.as_str())
            .and_then(FallbackPolicy::parse)
            .unwrap_or(self.distributor.fallback);
        let backup_before_write = obj
            .get("backupBeforeWrite")
            .and_then(|v| v.as_bool())
            .unwrap_or(self.backup_before_write);
        PlannerConfig {
            distributor: DistributorConfig {
                keywords: KeywordSet {
                    preparation,
                    wrapup,
                },
                fallback,
            },
            backup_before_write,
        }
    }

    pub fn load_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.to_string_lossy()))?;
        let value: JsonValue = serde_json::from_str(&text)
            .with_context(|| format!("config {} is invalid JSON", path.to_string_lossy()))?;
        let obj = value.as_object().with_context(|| {
            format!("config {} must be a JSON object", path.to_string_lossy())
        })?;
        Ok(Self::from_json(obj))
    }

    /// `$PLANNERD_CONFIG`, then `plannerd.json` beside the plan, then defaults.
    pub fn load_for_plan(plan_path: &Path) -> anyhow::Result<Self> {
        match config_path_for(plan_path) {
            Some(p) => {
                tracing::info!(config = %p.display(), "loading planner config");
                Self::load_file(&p)
            }
            None => {
                tracing::debug!("no planner config found; using defaults");
                Ok(Self::default())
            }
        }
    }
}

fn config_path_for(plan_path: &Path) -> Option<PathBuf> {
    if let Some(p) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(p));
    }
    let beside = plan_path
        .parent()
        .map(|d| d.join(CONFIG_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    beside.is_file().then_some(beside)
}

fn keyword_list(v: Option<&JsonValue>) -> Option<Vec<String>> {
    let arr = v?.as_array()?;
    let out: Vec<String> = arr
        .iter()
        .filter_map(|item| item.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}
