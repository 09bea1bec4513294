//! In-process relay for network tests.

use tokio::net::TcpListener;
use tracing::error;

/// Serve a fresh relay on an ephemeral port and return its `http://` base URL.
pub(crate) async fn spawn_relay() -> std::io::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = relay::routes::app(relay::state::RelayState::new());
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "test relay stopped");
        }
    });
    Ok(format!("http://{addr}"))
}
