use std::path::PathBuf;

use serde::Deserialize;

use crate::config::PlannerConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Debug, Default)]
pub struct AppState {
    pub plan_path: Option<PathBuf>,
    pub config: PlannerConfig,
}
