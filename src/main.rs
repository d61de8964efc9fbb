use anyhow::Result;
use clusterwatch::*;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    tracing::info!(
        name = version::NAME,
        version = version::VERSION,
        endpoint = %app_config.channel.endpoint(),
        "Starting"
    );

    let mut store = StateStore::create();
    let publisher = publisher::Publisher::new(app_config.server.broadcast_capacity);
    let feed = publisher.attach(&mut store);

    let mut last_real = None;
    let summary = store.subscribe(move |_, issues| {
        let real = issues.iter().filter(|i| i.is_real()).count();
        if last_real != Some(real) {
            tracing::info!(issues = issues.len(), real_issues = real, "Issue set changed");
            last_real = Some(real);
        }
    });

    let server_handle = if app_config.server.enabled {
        let app = routes::app(publisher.feeds(), Arc::new(AtomicUsize::new(0)));
        let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("Listening on http://{}", addr);
        Some(tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Read API server stopped");
            }
        }))
    } else {
        None
    };

    let transport = WsTransport::new(app_config.channel.endpoint());
    let mut client = ChannelClient::new(
        transport,
        app_config.channel.reconnect_policy(),
        publisher.status_sink(),
    );

    let stopped = client.run_until(&mut store, shutdown_signal()).await;
    if !stopped && server_handle.is_some() {
        tracing::info!("Serving last known state until shutdown");
        shutdown_signal().await;
    }
    tracing::info!("Received shutdown signal");

    let _ = summary.dispose(&mut store);
    let _ = feed.dispose(&mut store);
    store.teardown();
    if let Some(handle) = server_handle {
        handle.abort();
    }
    Ok(())
}
