// MLAT Safety - Main Entry Point
// Copyright (C) 2024 - mlat-safety contributors
// Licensed under AGPL v3
//
// Runs one evaluation pass over a scenario file (or the built-in demo)
// and writes position and alert reports.

use clap::Parser;
use mlat_safety::config::{Config, EngineConfig};
use mlat_safety::engine::{Engine, Scenario};
use mlat_safety::output::{self, CsvOutput, JsonOutput, OutputHandler};
use mlat_safety::simulate;
use std::io::BufWriter;
use tracing::{error, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let config = Config::parse();

    // Initialize logging
    init_logging(config.verbose);

    let engine_config = match &config.params {
        Some(path) => {
            info!("Loading engine parameters from {}", path);
            EngineConfig::from_file(path)?
        }
        None => EngineConfig::default(),
    }
    .with_overrides(&config)?;

    let now_ms = config.now_ms.unwrap_or_else(|| chrono::Utc::now().timestamp_millis());

    let scenario = match &config.input {
        Some(path) => {
            info!("Reading scenario from {}", path);
            Scenario::from_file(path)?
        }
        None => {
            info!("No input given, running the demo scenario");
            // Arrival times relative to the start of the run. Epoch-sized
            // millisecond values would cost sub-microsecond precision.
            simulate::demo_scenario(0.0)
        }
    };

    info!(
        receivers = scenario.receivers.len(),
        detections = scenario.detections.len(),
        runways = scenario.runways.len(),
        zones = scenario.restricted_zones.len(),
        "Scenario loaded"
    );

    let engine = Engine::new(engine_config);
    let result = engine.evaluate(&scenario, now_ms);

    // Outputs
    let mut handlers: Vec<Box<dyn OutputHandler>> = Vec::new();
    match &config.write_json {
        Some(path) => {
            info!("Writing JSON results to {}", path);
            handlers.push(Box::new(JsonOutput::create(path)?));
        }
        None => handlers.push(Box::new(JsonOutput::new(BufWriter::new(std::io::stdout())))),
    }

    for filename in &config.write_csv {
        info!("Writing CSV results to {}", filename);
        match CsvOutput::new(filename) {
            Ok(csv_out) => handlers.push(Box::new(csv_out)),
            Err(e) => error!("Failed to open CSV output file {}: {}", filename, e),
        }
    }

    for handler in &mut handlers {
        output::write_output(handler.as_mut(), &result)?;
    }

    info!(
        positions = result.positions.len(),
        alerts = result.alerts.len(),
        "Done"
    );

    Ok(())
}

/// Initialize logging subsystem
fn init_logging(verbose: bool) {
    // Logs go to stderr so JSON on stdout stays machine-readable
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    if verbose {
        subscriber.with_max_level(tracing::Level::DEBUG).init();
        info!("Verbose logging enabled (DEBUG level)");
    } else {
        subscriber.with_max_level(tracing::Level::INFO).init();
    }
}
