// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use the_foundry::backends::cpp::CPP_PUBLISH;
use the_foundry::config::{load_and_validate_config, RuntimeBuilder};
use the_foundry::engine::{DispatchOutcome, RunStatus};
use the_foundry::family::Family;

/// Parsed command line: `foundry <workspace.yaml> [--phase N] [--flag] [--key=value]`
struct Invocation {
    workspace: PathBuf,
    phase: Family,
    flags: Vec<String>,
    values: Vec<(String, String)>,
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {} <workspace.yaml> [--phase <family-number>] [--<flag>] [--<key>=<value>]\n\
         Example: {} workspace.yaml --publish",
        program, program
    )
}

fn parse_args(args: &[String]) -> Result<Invocation> {
    let program = args.first().map(String::as_str).unwrap_or("foundry");
    let mut workspace = None;
    let mut phase = CPP_PUBLISH;
    let mut flags = Vec::new();
    let mut values = Vec::new();

    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        if arg == "--phase" {
            let value = rest
                .next()
                .with_context(|| format!("--phase needs a value\n{}", usage(program)))?;
            let number: u32 = value
                .parse()
                .with_context(|| format!("'{}' is not a family number", value))?;
            phase = Family(number);
        } else if let Some(option) = arg.strip_prefix("--") {
            match option.split_once('=') {
                Some((key, value)) => values.push((key.to_string(), value.to_string())),
                None => flags.push(option.to_string()),
            }
        } else if workspace.is_none() {
            workspace = Some(PathBuf::from(arg));
        } else {
            bail!("unexpected argument '{}'\n{}", arg, usage(program));
        }
    }

    let workspace = workspace.with_context(|| usage(program))?;
    Ok(Invocation {
        workspace,
        phase,
        flags,
        values,
    })
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    match run(&args).await {
        Ok(status) => std::process::exit(status.code()),
        Err(e) => {
            eprintln!("❌ {:#}", e);
            std::process::exit(RunStatus::Failure.code());
        }
    }
}

async fn run(args: &[String]) -> Result<RunStatus> {
    let invocation = parse_args(args)?;

    let cfg = load_and_validate_config(&invocation.workspace)
        .with_context(|| format!("cannot load workspace {}", invocation.workspace.display()))?;
    let runtime = RuntimeBuilder::from_config(&cfg).context("cannot build workspace runtime")?;

    let mut options = runtime.options.clone();
    for flag in &invocation.flags {
        options.set_flag(flag.clone());
    }
    for (key, value) in &invocation.values {
        options.set(key.clone(), value.clone());
    }

    let start = Instant::now();
    let mut command = runtime.command(invocation.phase).with_options(options);

    if let DispatchOutcome::Unrecognized = runtime.registry.dispatch(&mut command) {
        bail!(
            "no unit handled the {} command (is the publish flag set?)",
            invocation.phase
        );
    }

    let mut status = RunStatus::Success;
    for (unit, result) in command.join().await {
        if RunStatus::of(&result) == RunStatus::Failure {
            status = RunStatus::Failure;
        }
        match result {
            Ok(report) => {
                println!(
                    "✅ {}: {} published, {} skipped, {} failed",
                    unit,
                    report.completed.len(),
                    report.skipped.len(),
                    report.failed.len()
                );
                for skipped in &report.skipped {
                    println!("   skipped {} (missing {})", skipped.module, skipped.missing_dependency);
                }
                for failed in &report.failed {
                    println!("   failed  {}: {}", failed.module, failed.reason);
                }
            }
            Err(e) => eprintln!("❌ {}: {}", unit, e),
        }
    }

    println!("⏱️  Finished in {:?}", start.elapsed());
    Ok(status)
}
