use std::net::SocketAddr;

use dev_host::{build_router, load_settings, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(
        upload_dir = %settings.upload_dir.display(),
        entities = ?settings.entities,
        "starting development host"
    );
    let app = build_router(AppState::new(settings));

    info!(%addr, "development host listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
