//! # doorbridged — the doorbridge daemon
//!
//! Composition root that wires the adapters together and runs the bridge.
//!
//! ## Responsibilities
//! - Load configuration (TOML file, env overrides) and initialize logging
//! - Construct the status-service clients and open the serial link
//! - Run the control loop on its own blocking thread (it owns the serial
//!   channel and all timers)
//! - Serve the LAN admin endpoint on the async runtime, started once the
//!   device handshake has completed
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates. It is the
//! wiring layer — no bridge logic belongs here.

mod config;
mod net;

use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

use doorbridge_adapter_http_axum::{router, AdminState};
use doorbridge_adapter_serial::SerialLink;
use doorbridge_adapter_status_http::{DirectoryClient, DoorStatusClient};
use doorbridge_app::bridge::Bridge;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Construction-time failures (missing API key, absent serial device)
    // surface here as plain errors, before anything starts.
    let directory = DirectoryClient::new(&config.directory)?;
    let status = DoorStatusClient::new(&config.status)?;
    let link = Arc::new(Mutex::new(SerialLink::open(&config.serial)?));

    let admin_state = AdminState::new(Arc::clone(&link));
    let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();

    let mut bridge = Bridge::new(link, directory, status);
    std::thread::spawn(move || {
        let local_ip = net::local_ip();
        match bridge.startup(&local_ip, || {
            let _ = ready_tx.send(());
        }) {
            Ok(()) => bridge.run(),
            Err(err) => {
                tracing::error!(error = %err, "bridge startup failed");
                std::process::exit(1);
            }
        }
    });

    // The admin endpoint only makes sense once the device is talking.
    ready_rx.await?;

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "admin endpoint listening");
    axum::serve(listener, router::build(admin_state)).await?;

    Ok(())
}
