use tokio::signal;
use tracing::warn;

pub async fn listen_for_shutdown() {
    // 等待 Ctrl+C 信号
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        return std::future::pending().await;
    }
    warn!("Shutdown signal received, stopping websocket sessions and server...");
}
