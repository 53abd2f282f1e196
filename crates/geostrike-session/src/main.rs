//! `geostrike`: replay a scripted session and print what the player saw.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use geostrike_session::logging;
use geostrike_session::scenario::{replay, Scenario};

#[derive(Debug, Parser)]
#[command(name = "geostrike", about = "Replay a GEOSTRIKE proximity scenario")]
struct Args {
    /// Scenario file (JSON).
    scenario: PathBuf,

    /// Print every noteworthy cycle report as a JSON line.
    #[arg(long)]
    json: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose);

    let scenario = match Scenario::from_json_file(&args.scenario) {
        Ok(scenario) => scenario,
        Err(e) => {
            error!("{}: {e}", args.scenario.display());
            return ExitCode::FAILURE;
        }
    };

    let outcome = match replay(scenario) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("{}: {e}", args.scenario.display());
            return ExitCode::FAILURE;
        }
    };
    for report in &outcome.reports {
        if args.json {
            match serde_json::to_string(report) {
                Ok(line) => println!("{line}"),
                Err(e) => error!("failed to encode report: {e}"),
            }
            continue;
        }
        for alert in &report.alerts {
            println!("[{:>8} ms] {:?}: {}", alert.at_ms, alert.level, alert.message);
        }
        for notification in &report.notifications {
            println!(
                "[{:>8} ms] notify: {}: {}",
                report.now_ms, notification.title, notification.body
            );
        }
    }

    println!(
        "final: alive={} health={} ({} authoritative writes)",
        outcome.final_vitals.is_alive,
        outcome.final_vitals.health,
        outcome.writes.len()
    );
    ExitCode::SUCCESS
}
