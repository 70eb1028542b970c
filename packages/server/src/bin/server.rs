use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vidnote_server::{router, AppState, Secrets, ServerConfig, StorageKind};
use vidnote_store::{
    BlobStore, DiskApiBlobStore, JsonFileMarkupStore, MarkupStore, MemoryBlobStore,
    MemoryMarkupStore,
};

#[derive(Parser, Debug)]
#[command(name = "vidnote-server")]
#[command(about = "Video timecode annotation server", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long)]
    bind: Option<String>,

    /// Directory for markup records
    #[arg(long)]
    data_dir: Option<String>,

    /// Config file (default: ./vidnote.config.json when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep everything in memory
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let cwd = std::env::current_dir()?;

    let mut config = match &args.config {
        Some(path) => ServerConfig::load_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => ServerConfig::load(&cwd)?,
    };
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }
    if args.memory {
        config.storage = Some(StorageKind::Memory);
    }

    let secrets = Secrets::from_env();
    if secrets.admin_password.is_none() {
        tracing::warn!("ADMIN_PASSWORD is not set; admin routes will refuse requests");
    }

    let (markups, blobs): (Arc<dyn MarkupStore>, Arc<dyn BlobStore>) =
        match config.storage_kind(&secrets) {
            StorageKind::Memory => {
                info!("Using in-memory storage");
                (
                    Arc::new(MemoryMarkupStore::new()),
                    Arc::new(MemoryBlobStore::default()),
                )
            }
            StorageKind::DiskApi => {
                let token = secrets
                    .disk_api_key
                    .clone()
                    .context("disk-api storage needs DISK_API_KEY")?;
                let data_dir = config.get_data_dir(&cwd);
                info!("Markups in {}", data_dir.display());
                let store = JsonFileMarkupStore::open(&data_dir)
                    .await
                    .with_context(|| format!("opening {}", data_dir.display()))?;
                let blobs = DiskApiBlobStore::new(config.disk_api_base.clone(), token)
                    .context("building disk api client")?;
                (Arc::new(store), Arc::new(blobs))
            }
        };

    let state = AppState::new(markups, blobs)
        .with_admin_password(secrets.admin_password)
        .with_folders(&config.video_folder, &config.image_folder)
        .with_max_upload_bytes(config.max_upload_bytes);

    let app = router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    info!("Listening on {}", config.bind);

    axum::serve(listener, app).await?;
    Ok(())
}
