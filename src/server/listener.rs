use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{Instrument, debug, error, info, warn};

use crate::config::Config;
use crate::http::connection::{Connection, ConnectionSettings};
use crate::server::router::Router;

const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

pub async fn run(cfg: &Config, router: Arc<Router>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.server.listen_addr)
        .await
        .with_context(|| format!("binding {}", cfg.server.listen_addr))?;
    info!("Listening on {}", listener.local_addr()?);

    serve(
        listener,
        router,
        ConnectionSettings::from(&cfg.server),
        cfg.server.max_connections,
    )
    .await
}

/// Accepts connections forever, one task per connection.
///
/// At most `max_connections` sessions run at once; when the limit is reached
/// the loop waits for a slot before accepting again. Accept errors are logged
/// and never end the loop.
pub async fn serve(
    listener: TcpListener,
    router: Arc<Router>,
    settings: ConnectionSettings,
    max_connections: usize,
) -> anyhow::Result<()> {
    let limit = Arc::new(Semaphore::new(max_connections));

    loop {
        let permit = Arc::clone(&limit).acquire_owned().await?;

        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "Failed to accept connection");
                tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        if let Err(e) = socket.set_nodelay(true) {
            debug!(error = %e, "Could not set TCP_NODELAY");
        }

        let router = Arc::clone(&router);
        let settings = settings.clone();
        tokio::spawn(
            async move {
                let _permit = permit;
                let mut conn = Connection::new(socket, router, settings);
                if let Err(e) = conn.run().await {
                    error!("Connection error from {}: {}", peer, e);
                }
                debug!(requests = conn.requests_served(), "Connection closed");
            }
            .instrument(tracing::info_span!("connection", %peer)),
        );
    }
}
