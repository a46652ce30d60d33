use std::time::Duration;

use tokio::net::TcpListener;
use tracing::info;

use crate::app::App;
use crate::config::Config;
use crate::http::connection::Connection;
use crate::messaging::Messaging;

/// Longest the accept wait blocks before the message bus gets pumped again.
const PUMP_INTERVAL: Duration = Duration::from_millis(10);

/// Accepts connections forever, serving each one to completion before the next.
pub async fn run(cfg: &Config, app: &App, messaging: &mut Messaging) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.server.listen_addr).await?;
    info!("Listening on {}", cfg.server.listen_addr);

    if let Some(path) = &app.ws_handlers().path {
        if messaging.is_active() {
            info!(path = %path, port = cfg.server.websocket_port, "Message bus attached");
        } else {
            tracing::warn!(path = %path, "Messaging callbacks registered but no bus attached");
        }
    }

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((socket, peer)) => {
                        info!("Accepted connection from {}", peer);

                        let host = socket
                            .local_addr()
                            .map(|addr| addr.ip().to_string())
                            .unwrap_or_else(|_| "localhost".to_string());

                        Connection::new(socket, app, &cfg.server, host).run().await;
                    }
                    Err(e) => {
                        tracing::error!("Accept failed: {}", e);
                    }
                }
            }

            _ = tokio::time::sleep(PUMP_INTERVAL) => {}
        }

        messaging.pump();
    }
}
