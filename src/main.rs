use clap::Parser;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tubely_backend::config::{MediaConfig, SecurityConfig, StorageConfig};
use tubely_backend::infrastructure::{database, storage};
use tubely_backend::services::ingest::IngestService;
use tubely_backend::services::media::{FfmpegRemuxer, FfprobeClassifier};
use tubely_backend::services::metadata::DatabaseMetadataStore;
use tubely_backend::services::staging::StagingArea;
use tubely_backend::{AppState, create_app};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port for the API server
    #[arg(short, long, default_value_t = 8091)]
    port: u16,

    /// Relaxed development settings (open CORS, fixed secret)
    #[arg(long)]
    dev: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tubely_backend=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting Tubely Backend...");

    // Setup Infrastructure
    let db = database::setup_database().await?;

    let security_config = if args.dev {
        SecurityConfig::development()
    } else {
        SecurityConfig::from_env()
    };
    info!(
        "🛡️  Security Config: Max Video={}MB, Max Thumbnail={}MB",
        security_config.max_video_size / 1024 / 1024,
        security_config.max_thumbnail_size / 1024 / 1024
    );

    let media_config = MediaConfig::from_env();
    info!(
        "🎞️  Media tools: {} / {} (staging in {})",
        media_config.ffprobe_bin.display(),
        media_config.ffmpeg_bin.display(),
        media_config.staging_dir.display()
    );

    let storage_config = StorageConfig::from_env();
    let stores = storage::setup_storage(&storage_config).await?;

    let ingest = Arc::new(IngestService::new(
        Arc::new(DatabaseMetadataStore::new(db.clone())),
        StagingArea::new(media_config.staging_dir.clone()),
        Arc::new(FfprobeClassifier::from_config(&media_config)),
        Arc::new(FfmpegRemuxer::from_config(&media_config)),
        stores.videos,
        stores.thumbnails,
        security_config.clone(),
    ));

    let state = AppState {
        db,
        ingest,
        config: security_config,
        assets_root: storage_config.assets_root.clone(),
    };

    let app = create_app(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            })
            .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
                info!("📥 {} {}", request.method(), request.uri());
            })
            .on_response(
                |response: &axum::http::Response<_>,
                 latency: std::time::Duration,
                 _span: &tracing::Span| {
                    info!(
                        "📤 Finished in {:?} with status {}",
                        latency,
                        response.status()
                    );
                },
            ),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("✅ Server ready at http://{}", addr);
    info!("📖 Swagger UI: http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("🛑 Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, starting graceful shutdown...");
        },
    }
}
