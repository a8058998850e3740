use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use normalizer_migrate::driver::{self, RunOptions};
use normalizer_migrate::{config, report};
use std::process::ExitCode;

mod cli;
mod telemetry;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    telemetry::init(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", style(format!("Error: {e:#}")).red());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: cli::Cli) -> Result<ExitCode> {
    let mut config = config::load(cli.config.as_deref())?;
    if cli.strict_resource_id {
        config.strict_resource_id = true;
    }
    let options = RunOptions {
        dry_run: cli.dry_run,
        show_diff: cli.diff,
    };

    // With --json, stdout carries only the summary; progress moves to stderr.
    let emit = |line: &str| {
        if cli.json {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    };

    let summary = driver::run(&cli.files, &config, options, |_, result| match result {
        Ok(outcome) => {
            for line in report::file_lines(&outcome.report) {
                emit(&line);
            }
            if let Some(diff) = &outcome.diff {
                emit(diff);
            }
        }
        Err(e) => eprintln!("{}", style(format!("✗ {e}")).red()),
    });

    if cli.json {
        let json = serde_json::to_string_pretty(&summary).context("failed to serialize summary")?;
        println!("{json}");
    } else {
        println!();
        println!("{}", report::summary_line(&summary));
    }

    Ok(if summary.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
