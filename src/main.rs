mod calc;
mod config;
mod error;
mod gateway;
mod ipc;
mod model;
mod report;
mod rubrics;
mod session;
mod store;

use anyhow::Context;
use dotenvy::dotenv;
use serde_json::json;
use std::io::{self, BufRead, Write};
use tracing::metadata::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config = config::Config::from_env()?;

    // stdout carries the protocol; logs go to stderr.
    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false)
        .with_writer(io::stderr);
    tracing_subscriber::registry()
        .with(fmt)
        .with(LevelFilter::from_level(config.log_level))
        .init();

    let service = config.build_service()?;
    let mut store = store::LifecycleStore::new(gateway::GradingGateway::new(service));
    if let Some(path) = config.roster.as_deref() {
        let roster = gateway::normalize::load_roster_file(path)
            .with_context(|| format!("failed to seed roster from {}", path.display()))?;
        store.import(roster);
    }
    tracing::info!(
        service = config.service.as_str(),
        roster = store.len(),
        "gradingd ready"
    );

    let mut state = ipc::AppState::new(store, config.service);

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
                // No id to reply to.
                let resp = json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{resp}");
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }

    tracing::info!("stdin closed; shutting down");
    Ok(())
}
