use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let auth_port = std::env::var("AUTH_PORT").unwrap_or_else(|_| "3001".to_string());
    let api_addr = format!("127.0.0.1:{port}");
    let auth_addr = format!("127.0.0.1:{auth_port}");

    let api = TcpListener::bind(&api_addr).await?;
    let auth = TcpListener::bind(&auth_addr).await?;
    info!("api listening on {api_addr}, auth listening on {auth_addr}");
    mock_server::run(api, auth).await
}
