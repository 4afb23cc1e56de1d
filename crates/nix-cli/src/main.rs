//! # nixparse
//!
//! Command line front-end of the NIX parser. Every command prints its result as
//! JSON on stdout, logs go to stderr.
//!
//! Hex inputs may be prefixed with `0x`. Passing `-` reads the input from stdin.

mod cli;
mod commands;

use self::cli::App;
use clap::Parser;
use nix_parser::TxParser;
use nix_script::{NixScriptClassifier, TracingObserver};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber, fails if one is already installed.
fn init_logger(log: Option<&str>) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = match log {
        Some(directives) => EnvFilter::try_new(directives)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let app = App::parse();

    init_logger(app.log.as_deref()).map_err(|err| format!("Failed to initialize logging: {err}"))?;
    nix_primitives::init_networks()?;

    let network = app.chain.network();
    let params = nix_primitives::registered(network)?;
    let classifier = NixScriptClassifier::new(params).with_observer(Arc::new(TracingObserver));
    let parser = TxParser::with_classifier(classifier);

    tracing::debug!(%network, "Running command");

    let output = app.command.run(&parser)?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
