mod backup;
mod chasi;
mod config;
mod ipc;
mod plan;
mod store;
mod sweep;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    // stdout carries IPC replies; logs go to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match std::env::args_os().nth(1) {
        Some(plan_path) => run_fill(PathBuf::from(plan_path)),
        None => {
            serve_stdio();
            ExitCode::SUCCESS
        }
    }
}

fn run_fill(plan_path: PathBuf) -> ExitCode {
    let result = config::PlannerConfig::load_for_plan(&plan_path)
        .and_then(|cfg| sweep::fill_plan_file(&plan_path, &cfg));
    match result {
        Ok(report) => {
            if report.summary.units_failed > 0 {
                tracing::warn!(units_failed = report.summary.units_failed, "some units were not filled");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("fill aborted, plan left unchanged: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn serve_stdio() {
    let mut state = ipc::AppState::default();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                let reply = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{}", reply);
                let _ = stdout.flush();
                continue;
            }
        };

        tracing::debug!(id = %req.id, method = %req.method, "request");
        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}
