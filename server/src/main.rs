use std::io;

use relay::routes;
use relay::state::RelayState;

const DEFAULT_PORT: u16 = 8000;

#[tokio::main]
async fn main() -> io::Result<()> {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt::init();
    if let Err(e) = dotenv {
        if !e.not_found() {
            tracing::warn!(error = %e, "failed to read .env");
        }
    }

    let port = port_from_env()?;
    let app = routes::app(RelayState::new());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    tracing::info!(%port, "relay listening");
    axum::serve(listener, app).await
}

fn port_from_env() -> io::Result<u16> {
    match std::env::var("PORT") {
        Ok(raw) => raw
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("invalid PORT {raw:?}: {e}"))),
        Err(_) => Ok(DEFAULT_PORT),
    }
}
