use arena_server::config::ServerConfig;
use arena_server::{ServerContext, build_router, tick};
use axum_server::tls_rustls::RustlsConfig;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
/// Activates error tracing, reads the configuration, spawns the tick loop and
/// the broadcaster, then serves the router until SIGINT or SIGTERM arrives.
/// Configuration and bind failures exit non-zero; a signal-driven shutdown
/// exits clean after the sessions were told to close.
async fn main() -> ExitCode {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.environment.default_filter().into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(true) // Modul-Path (e.g. arena_server::session)
                .with_thread_ids(true) // Thread-ID (helpful for Tokio)
                .with_thread_names(true), // Thread-Name
        )
        .init();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let ctx = Arc::new(ServerContext::new(config.clone(), shutdown_rx));

    tokio::spawn(tick::run_tick_loop(ctx.clone()));
    tokio::spawn(tick::run_broadcaster(ctx.clone()));

    let handle = axum_server::Handle::new();
    {
        let handle = handle.clone();
        let ctx = ctx.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received.");
            ctx.store.end_match().await;
            // Stops tick loop and broadcaster and tells every session to close.
            let _ = shutdown_tx.send(true);
            handle.graceful_shutdown(Some(Duration::from_secs(5)));
        });
    }

    let app = build_router(ctx);
    let addr = config.listen_addr();

    let served = match &config.tls {
        Some(tls) => {
            let rustls = match RustlsConfig::from_pem_file(&tls.cert_file, &tls.key_file).await {
                Ok(rustls) => rustls,
                Err(err) => {
                    tracing::error!(%err, "Failed to load the TLS key material.");
                    return ExitCode::FAILURE;
                }
            };
            tracing::info!(%addr, "Listening with TLS.");
            axum_server::bind_rustls(addr, rustls)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
        None => {
            tracing::info!(%addr, "Listening without TLS.");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
    };

    if let Err(err) = served {
        tracing::error!(%err, "Transport failure.");
        return ExitCode::FAILURE;
    }
    tracing::info!("Clean shutdown.");
    ExitCode::SUCCESS
}

/// Resolves when SIGINT or SIGTERM arrives.
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};
    let mut sigterm = signal(SignalKind::terminate()).expect("SIGTERM handler installation");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

/// Resolves when Ctrl-C arrives.
#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
