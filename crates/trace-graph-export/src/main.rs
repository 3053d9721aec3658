// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::process::ExitCode;

use anyhow::Context;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use trace_graph::{config::Config, logger::Formatter, ExportOutcome};

#[tokio::main]
pub async fn main() -> ExitCode {
    let config = match Config::new() {
        Ok(config) => config,
        Err(e) => {
            // logging is not up yet
            eprintln!("Error loading trace graph configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.log_level) {
        eprintln!("Error initializing logging: {e:#}");
        return ExitCode::FAILURE;
    }
    debug!(
        allowed_services = %config.allow_list,
        input = %config.input_path.display(),
        "Starting trace graph export"
    );

    match run(&config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Trace graph export failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config) -> anyhow::Result<ExportOutcome> {
    trace_graph::export(config)
        .await
        .with_context(|| format!("exporting {}", config.input_path.display()))
}

fn init_logging(log_level: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_new(log_level).context("could not parse log level")?;
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .event_format(Formatter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;
    debug!("Logging subsystem enabled");
    Ok(())
}
