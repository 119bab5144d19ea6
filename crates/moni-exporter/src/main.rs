//! moni exporter
//!
//! Republishes the in-process attribute grid on `GET /metrics`, snapshotted
//! once per minute window.
//!
//! Usage: `moni-exporter [config.yaml]`

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use moni_core::{AttributeSource, MemoryGrid};
use moni_exporter::{app_state, config, host, monitor, router, shutdown};

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let path = std::env::args().nth(1).unwrap_or_else(|| config::DEFAULT_PATH.to_string());

    let cfg = match config::load_from_file(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            init_tracing("info");
            tracing::error!(error = %e, %path, "config load failed");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&cfg.log.level);

    let ip = match host::resolve(&cfg.host) {
        Ok(ip) => ip,
        Err(e) => {
            tracing::error!(error = %e, "host identity resolution failed");
            return ExitCode::FAILURE;
        }
    };
    let listen = match cfg.exporter.listen_addr() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(error = %e, "invalid listen address");
            return ExitCode::FAILURE;
        }
    };

    let grid = Arc::new(MemoryGrid::new(cfg.grid.rows, cfg.grid.cols));
    let (shutdown_tx, shutdown_rx) = shutdown::channel();
    tokio::spawn(shutdown::forward_signals(shutdown_tx));

    let monitor = cfg.monitor.enabled.then(|| {
        tokio::spawn(monitor::run(cfg.monitor.clone(), Arc::clone(&grid), shutdown_rx.clone()))
    });

    let source: Arc<dyn AttributeSource> = grid;
    let state = app_state::AppState::new(cfg, ip.clone(), source);
    let app = router::build_router(state);

    let listener = match tokio::net::TcpListener::bind(listen).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(error = %e, %listen, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::warn!(%listen, host = %ip, "moni-exporter | server restart");
    let served = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown::wait(shutdown_rx))
        .await;
    if let Err(e) = served {
        tracing::warn!(error = %e, "server failed");
    }

    if let Some(handle) = monitor {
        // The server may have failed without a shutdown signal.
        handle.abort();
        let _ = handle.await;
    }
    tracing::warn!("moni-exporter | server stop");
    ExitCode::SUCCESS
}
