//! Prometheus exposition for `echobench up --metrics-port`.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Bind the metrics endpoint and serve it from a background task.
pub async fn start_metrics_server(port: u16) -> std::io::Result<()> {
    echobench_core::metrics::register();

    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "Metrics available at GET /metrics");

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    tokio::spawn(async move {
                        if let Err(e) = respond(socket).await {
                            tracing::debug!(error = %e, "Metrics request failed");
                        }
                    });
                }
                Err(e) => tracing::warn!(error = %e, "Metrics accept failed"),
            }
        }
    });

    Ok(())
}

async fn respond(mut socket: TcpStream) -> std::io::Result<()> {
    let mut buf = [0u8; 1024];
    let n = socket.read(&mut buf).await?;
    let request_line = String::from_utf8_lossy(&buf[..n]);

    let (status, body) = if request_line.starts_with("GET /metrics") {
        ("200 OK", echobench_core::metrics::encode_text())
    } else {
        ("404 Not Found", String::from("not found\n"))
    };

    let response = format!(
        "HTTP/1.0 {}\r\nConnection: close\r\nContent-Length: {}\r\nContent-Type: text/plain; version=0.0.4\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    socket.write_all(response.as_bytes()).await?;
    socket.flush().await
}
