// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Airship host harness.
//
// Entry point. Initialises logging, backend services and the event pump, then
// serves newline-delimited JSON host calls from stdin. Responses and relayed
// events go to stdout, one JSON object per line; logs go to stderr.
//
// Usage: airship-host [config.json]

mod dispatch;
mod services;

use std::io::Write;
use std::path::PathBuf;

use airship_core::types::HostEvent;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

use dispatch::{HostCall, Outbound, dispatch};
use services::host_services::{HostServices, load_config};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("airship host starting");

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = load_config(config_path.as_deref());

    let (events_tx, events_rx) = unbounded_channel();
    let services = match HostServices::init(config.clone(), events_tx.clone()) {
        Ok(s) => {
            drop(events_tx);
            s
        }
        Err(e) => {
            tracing::error!(error = %e, "persistent preferences failed, using in-memory fallback");
            HostServices::fallback(config, events_tx)
        }
    };

    match services.data_dir() {
        Some(dir) => tracing::info!(path = %dir.display(), "preferences are persistent"),
        None => tracing::warn!("preferences will not survive this process"),
    }

    let pump = tokio::spawn(pump_events(events_rx));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => handle_line(&services, &line).await,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "stdin read failed");
                break;
            }
        }
    }

    // Dropping the services drops the last event sender and ends the pump.
    drop(services);
    if let Err(e) = pump.await {
        tracing::warn!(error = %e, "event pump ended abnormally");
    }
    tracing::info!("airship host stopped");
}

async fn handle_line(services: &HostServices, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    let call: HostCall = match serde_json::from_str(line) {
        Ok(call) => call,
        Err(e) => {
            tracing::warn!(error = %e, "unparseable host call");
            emit(&Outbound::unparseable(line, &e));
            return;
        }
    };
    let outcome = dispatch(services, &call).await;
    emit(&Outbound::from_outcome(call.id.clone(), outcome));
}

async fn pump_events(mut events: UnboundedReceiver<HostEvent>) {
    while let Some(event) = events.recv().await {
        emit(&Outbound::Event {
            event: event.channel,
            body: event.payload,
        });
    }
}

/// Write one outbound line. The stdout lock keeps responses and events from
/// interleaving mid-line.
fn emit(outbound: &Outbound) {
    let line = match serde_json::to_string(outbound) {
        Ok(line) => line,
        Err(e) => {
            tracing::error!(error = %e, "failed to serialise outbound line");
            return;
        }
    };
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{line}").and_then(|()| stdout.flush()) {
        tracing::error!(error = %e, "stdout write failed");
    }
}
