use std::net::SocketAddr;
use std::path::PathBuf;

use chatapp_mock_server::MockData;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chatapp_mock_server=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let host = std::env::var("CHATAPP_MOCK_HOST").unwrap_or_else(|_| "127.0.0.1".into());
    let port: u16 = std::env::var("CHATAPP_MOCK_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    let data = match std::env::var("CHATAPP_MOCK_FIXTURES") {
        Ok(dir) => {
            info!("Seeding from {}", dir);
            MockData::from_dir(&PathBuf::from(dir))?
        }
        Err(_) => MockData::seeded(),
    };

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    chatapp_mock_server::serve(listener, data.shared()).await?;

    Ok(())
}
