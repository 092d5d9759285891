//! HTTP server initialization and runtime setup.
//!
//! Builds the access log sink and factory, spawns the file writer when
//! needed, and runs the Axum server until ctrl-c.

use crate::config::{Config, SinkKind};
use crate::logger::LoggerFactory;
use crate::middleware::access_log::AccessLog;
use crate::routes::app_router;
use crate::sink::{
    ChannelSink, LineSink, TracingSink, WriterSink, open_log_file, run_sink_worker,
};
use crate::state::AppState;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Access log sink plus the background writer backing it, if any.
pub struct AccessLogSink {
    pub sink: Arc<dyn LineSink>,
    pub queue: Option<ChannelSink>,
    pub worker: Option<JoinHandle<()>>,
}

/// Creates the sink selected by `config.access_log_sink`.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
pub async fn build_sink(config: &Config) -> Result<AccessLogSink> {
    let built = match config.access_log_sink {
        SinkKind::Stdout => AccessLogSink {
            sink: Arc::new(WriterSink::stdout()),
            queue: None,
            worker: None,
        },
        SinkKind::Stderr => AccessLogSink {
            sink: Arc::new(WriterSink::stderr()),
            queue: None,
            worker: None,
        },
        SinkKind::Tracing => AccessLogSink {
            sink: Arc::new(TracingSink),
            queue: None,
            worker: None,
        },
        SinkKind::File => {
            let path = config
                .access_log_path
                .as_deref()
                .context("ACCESS_LOG_PATH must be set when ACCESS_LOG_SINK is 'file'")?;
            let file = open_log_file(path)
                .await
                .with_context(|| format!("Failed to open access log {}", path.display()))?;

            let (queue, rx) = ChannelSink::new(config.access_log_queue_capacity);
            let worker = tokio::spawn(async move {
                run_sink_worker(rx, file).await;
            });
            tracing::info!("Access log writer started ({})", path.display());

            AccessLogSink {
                sink: Arc::new(queue.clone()),
                queue: Some(queue),
                worker: Some(worker),
            }
        }
    };

    Ok(built)
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Access log sink (and background file writer)
/// - Logger factory and access log middleware
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - The access log sink cannot be created
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let request_id_header = config.request_id_header_name()?;

    let AccessLogSink {
        sink,
        queue,
        worker,
    } = build_sink(&config).await?;

    let factory = LoggerFactory::new(sink)
        .with_panic_context(config.access_log_panic_context)
        .with_timestamps(config.access_log_timestamp);
    let access_log = AccessLog::new(factory).with_request_id_header(request_id_header.clone());

    let app = app_router(AppState::new(queue), access_log, request_id_header);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router owned every sender; once it is gone the writer drains and exits.
    if let Some(worker) = worker {
        worker.await.context("Access log writer panicked")?;
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
