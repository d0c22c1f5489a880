use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use bluelight_core::config::{AppConfig, LoadOptions};
use bluelight_core::{FetchCoordinator, Indicator, Region, StatusBoard, StatusFetcher};
use chrono::{Local, NaiveTime};
use serde::Serialize;

use crate::commands::CommandResult;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusOptions {
    pub json: bool,
    pub watch: bool,
    pub interval_secs: u64,
}

#[derive(Debug, Serialize)]
struct BoardEntry<'a> {
    region: Region,
    indicator: Indicator,
    status: Option<&'a str>,
    error: Option<&'a str>,
}

pub fn run(options: StatusOptions) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("status", "config_validation", error.to_string(), 2)
        }
    };

    let fetcher = match StatusFetcher::from_config(&config) {
        Ok(fetcher) => fetcher,
        Err(error) => {
            return CommandResult::failure("status", "status_client", error.to_string(), 1)
        }
    };
    let coordinator = FetchCoordinator::new(fetcher);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "status",
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                1,
            )
        }
    };

    if options.watch {
        let interval = Duration::from_secs(options.interval_secs);
        return match runtime.block_on(watch(&coordinator, interval)) {
            Ok(()) => CommandResult::output(""),
            Err(error) => CommandResult::failure("status", "watch", error.to_string(), 1),
        };
    }

    let board = runtime.block_on(coordinator.fetch_all());
    if options.json {
        CommandResult::output(render_json(&board))
    } else {
        CommandResult::output(render_board(&board, None))
    }
}

async fn watch(coordinator: &FetchCoordinator, interval: Duration) -> Result<()> {
    loop {
        let board = coordinator.fetch_all().await;
        let frame = render_board(&board, Some(Local::now().time()));

        {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{CLEAR_SCREEN}{frame}")?;
            stdout.flush()?;
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            signal = tokio::signal::ctrl_c() => {
                signal?;
                return Ok(());
            }
        }
    }
}

/// Terminal table; `updated_at` adds the watch-mode footer.
pub fn render_board(board: &StatusBoard, updated_at: Option<NaiveTime>) -> String {
    let mut lines = vec!["CSuite Deploy Status".to_string(), String::new()];

    for report in board.iter() {
        let indicator = Indicator::for_report(report);
        lines.push(format!(
            "{} {:<10} {}",
            indicator.emoji(),
            report.region.heading(),
            report.display_text()
        ));
    }

    if let Some(updated_at) = updated_at {
        lines.push(String::new());
        lines.push(format!("Last updated: {}", updated_at.format("%H:%M:%S")));
        lines.push("Press Ctrl+C to exit".to_string());
    }

    lines.join("\n")
}

pub fn render_json(board: &StatusBoard) -> String {
    let entries: Vec<BoardEntry<'_>> = board
        .iter()
        .map(|report| BoardEntry {
            region: report.region,
            indicator: Indicator::for_report(report),
            status: report.status_text(),
            error: report.error_text(),
        })
        .collect();

    serde_json::to_string_pretty(&entries).unwrap_or_else(|error| {
        CommandResult::failure("status", "serialization", error.to_string(), 1).output
    })
}
