//! CC-Admin: Custody-Chain operator CLI

use std::fs::File;
use std::io::{self, BufReader};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use cc_01_custody_ledger::dispatch::OPERATIONS;
use cc_admin::{open_dispatcher, run_batch, Cli, Command};
use custody_telemetry::{init_telemetry, metrics, TelemetryConfig};

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Returns whether every operation succeeded.
fn run() -> anyhow::Result<bool> {
    let cli = Cli::parse();

    let mut config = TelemetryConfig::from_env();
    config.service_name = "cc-admin".to_string();
    config.json_logs |= cli.json_logs;
    let _telemetry = init_telemetry(config).context("telemetry initialization failed")?;

    let all_ok = match &cli.command {
        Command::Operations => {
            for (name, alias) in OPERATIONS {
                match alias {
                    Some(alias) => println!("{:<24} (alias: {})", name, alias),
                    None => println!("{}", name),
                }
            }
            true
        }
        Command::Call { operation, args } => {
            let dispatcher = open_dispatcher(&cli.data)?;
            let response = dispatcher.dispatch(operation, args);
            println!("{}", response.to_json());
            response.is_success()
        }
        Command::Batch { script, keep_going } => {
            let dispatcher = open_dispatcher(&cli.data)?;
            let print = |response: &cc_01_custody_ledger::LedgerResponse| {
                println!("{}", response.to_json())
            };

            let summary = if script.as_os_str() == "-" {
                run_batch(&dispatcher, io::stdin().lock(), *keep_going, print)?
            } else {
                let file = File::open(script)
                    .with_context(|| format!("cannot open {}", script.display()))?;
                run_batch(&dispatcher, BufReader::new(file), *keep_going, print)?
            };

            custody_telemetry::log_custody_event!(
                info,
                "cc-admin",
                "batch finished",
                succeeded = summary.succeeded,
                failed = summary.failed
            );
            summary.failed == 0
        }
    };

    if cli.metrics {
        eprint!("{}", metrics::encode_metrics()?);
    }

    Ok(all_ok)
}
