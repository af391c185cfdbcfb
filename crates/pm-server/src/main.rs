//! The `pacman-server` binary: loads configuration, constructs the
//! engine and broker, and wires the tick pipeline, fan-out, mirror
//! listener, and stdin bridge together.
//!
//! Grounded on `crates/oroboros/src/bin/server.rs`'s role as the single
//! wiring point for an otherwise fully-library codebase, reworked from
//! its UDP/`println!` loop into the async/`tracing` shape the rest of
//! this workspace uses.

mod cli;
mod engine;

use std::fs::File;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use pm_engine::GameState;
use pm_net::{Broker, ConfigError, ServerSettings};
use tokio::sync::Notify;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let settings = match load_settings(&config_path) {
        Ok(settings) => settings,
        Err(err) => {
            error!(path = %config_path, error = %err, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let control_addr = match parse_addr(&settings.server_ip, settings.web_socket_port) {
        Ok(addr) => addr,
        Err(err) => {
            error!(error = %err, "invalid control listener address");
            return ExitCode::FAILURE;
        }
    };
    let mirror_addr = match parse_addr(&settings.server_ip, settings.tcp_port) {
        Ok(addr) => addr,
        Err(err) => {
            error!(error = %err, "invalid mirror listener address");
            return ExitCode::FAILURE;
        }
    };

    let game = Arc::new(GameState::new(settings.num_active_ghosts));
    let (frame_tx, frame_rx) = crossbeam_channel::bounded(64);
    let (command_tx, command_rx) = crossbeam_channel::unbounded();

    let broker = Broker::new(command_tx.clone(), settings.one_client_per_ip, settings.trusted_client_ips.clone());
    broker.spawn_frame_pump(frame_rx);

    let engine_cancel = Arc::new(Notify::new());
    let broker_shutdown = broker.shutdown_handle();
    let _stdin_thread = cli::spawn(command_tx, Arc::clone(&engine_cancel), Arc::clone(&broker_shutdown));

    let engine_task = tokio::spawn(engine::run(
        Arc::clone(&game),
        frame_tx,
        command_rx,
        settings.game_fps,
        Arc::clone(&engine_cancel),
    ));

    info!(%control_addr, %mirror_addr, "pacman-server starting");

    let mirror_shutdown = broker.shutdown_handle();
    let frame_sender = broker.frame_sender();
    let exit = tokio::select! {
        result = broker.serve(control_addr) => result,
        result = pm_net::serve_mirror(mirror_addr, frame_sender, mirror_shutdown) => result,
    };

    engine_cancel.notify_one();
    let _ = engine_task.await;

    match exit {
        Ok(()) => {
            info!("pacman-server exited cleanly");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "fatal listener error");
            ExitCode::FAILURE
        }
    }
}

fn load_settings(path: &str) -> Result<ServerSettings, ConfigError> {
    let file = File::open(path).map_err(ConfigError::Io)?;
    ServerSettings::load(file)
}

fn parse_addr(ip: &str, port: u16) -> Result<SocketAddr, ConfigError> {
    format!("{ip}:{port}")
        .parse()
        .map_err(|_| ConfigError::InvalidField(format!("not a valid socket address: {ip}:{port}")))
}
