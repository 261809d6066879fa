use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::info;

use crate::config::Config;
use crate::server::AppContext;
use crate::server::connection::Connection;

pub async fn run(cfg: Config) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.listen_addr)
        .await
        .with_context(|| format!("Failed to open local address {}", cfg.listen_addr))?;
    info!("Listening on {}", cfg.listen_addr);
    info!(
        upload_dir = %cfg.upload_dir().display(),
        max_files = cfg.max_files,
        "Serving uploads"
    );

    let ctx = Arc::new(AppContext::new(cfg).await?);
    serve(listener, ctx).await
}

/// Accepts connections forever, one task per connection.
///
/// A failed accept or a failed connection is logged and never stops the
/// loop. At most `max_connections` connections are served at once; further
/// clients wait in the kernel backlog.
pub async fn serve(listener: TcpListener, ctx: Arc<AppContext>) -> anyhow::Result<()> {
    let limit = Arc::new(Semaphore::new(ctx.config.max_connections));

    loop {
        let permit = Arc::clone(&limit).acquire_owned().await?;

        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!("Error accepting connection: {}", e);
                continue;
            }
        };
        tracing::debug!("Accepted connection from {}", peer);

        let ctx = Arc::clone(&ctx);
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, ctx);
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {}", peer, e);
            }
            drop(permit);
        });
    }
}
