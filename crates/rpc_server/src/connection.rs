//! Per-connection worker: read request lines, write response lines.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::error::RpcError;
use crate::metrics::ServerMetrics;
use crate::request::RpcResponse;
use crate::router::RequestRouter;

/// Outcome of reading one line
#[derive(Debug, PartialEq, Eq)]
enum LineRead {
    Line,
    TooLong,
    Eof,
}

/// Read up to and including the next `\n`, at most `limit` content bytes.
async fn read_line<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    limit: usize,
) -> std::io::Result<LineRead> {
    let n = (&mut *reader)
        .take(limit as u64 + 1)
        .read_until(b'\n', buf)
        .await?;

    if n == 0 {
        Ok(LineRead::Eof)
    } else if buf.last() == Some(&b'\n') || n <= limit {
        // a final line without newline is still served
        Ok(LineRead::Line)
    } else {
        Ok(LineRead::TooLong)
    }
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &RpcResponse,
) -> Result<(), RpcError> {
    let mut bytes = serde_json::to_vec(response)?;
    bytes.push(b'\n');
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}

/// Serve one client until EOF, an over-limit line, an IO error or shutdown.
///
/// Requests on one connection are answered in order. A malformed line gets
/// an error response and the connection stays open.
#[instrument(
    name = "rpc_connection",
    skip(stream, router, metrics, shutdown),
    fields(peer = %peer)
)]
pub async fn handle_connection<S>(
    stream: S,
    peer: SocketAddr,
    router: RequestRouter,
    max_request_bytes: usize,
    metrics: Arc<ServerMetrics>,
    mut shutdown: watch::Receiver<bool>,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    debug!("connection opened");

    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::with_capacity(1024);
    let mut served: u64 = 0;

    loop {
        buf.clear();
        let read = tokio::select! {
            read = read_line(&mut reader, &mut buf, max_request_bytes) => read,
            _ = shutdown.changed() => {
                debug!("server shutting down, closing connection");
                break;
            }
        };

        match read {
            Ok(LineRead::Eof) => break,
            Ok(LineRead::TooLong) => {
                metrics.inc_oversized();
                metrics.inc_response(false);
                warn!(limit = max_request_bytes, "request line too long, closing connection");
                let error = RpcError::RequestTooLarge {
                    limit: max_request_bytes,
                };
                let _ = write_response(&mut writer, &RpcResponse::error(0, &error)).await;
                break;
            }
            Ok(LineRead::Line) => {
                let text = String::from_utf8_lossy(&buf);
                let line = text.trim();
                if line.is_empty() {
                    continue;
                }

                let response = router.handle_line(line);
                metrics.inc_response(response.is_ok());
                served += 1;

                if let Err(e) = write_response(&mut writer, &response).await {
                    debug!(error = %e, "write failed, closing connection");
                    break;
                }
            }
            Err(e) => {
                debug!(error = %e, "read failed, closing connection");
                break;
            }
        }
    }

    debug!(requests = served, "connection closed");
}
