//! Standard I/O transport for MCP
//!
//! Accepts both `Content-Length` framed messages and newline-delimited
//! JSON. Each response is written back in the framing its request used.
//!
//! IMPORTANT: All logging MUST go to stderr. stdout is reserved for
//! JSON-RPC protocol messages only.

use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};

use crate::error::ServerError;
use crate::mcp::protocol::*;
use crate::mcp::PlaybookMcpServer;

const CONTENT_LENGTH_HEADER: &str = "Content-Length:";

/// Largest message body accepted with `Content-Length` framing
pub const MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;

/// How a message was delimited on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// LSP-style `Content-Length` header block followed by the body
    ContentLength,
    /// One JSON document per line
    Line,
}

/// Run the MCP server using stdio transport
pub async fn run_stdio_server(server: PlaybookMcpServer) -> Result<(), ServerError> {
    tracing::info!("Starting stdio transport");

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    serve(&server, stdin, stdout).await
}

/// Answer every request on `reader` until EOF
pub async fn serve<R, W>(
    server: &PlaybookMcpServer,
    mut reader: R,
    mut writer: W,
) -> Result<(), ServerError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        let (framing, body) = match read_message(&mut reader).await {
            Ok(Some(message)) => message,
            Ok(None) => {
                tracing::info!("EOF reached, shutting down");
                break;
            }
            Err(ServerError::IoError(e)) => {
                tracing::error!("Failed to read message: {}", e);
                break;
            }
            Err(e) => {
                tracing::error!("Failed to read message: {}", e);
                continue;
            }
        };

        let response = match serde_json::from_slice::<JsonRpcRequest>(&body) {
            Ok(request) => {
                tracing::debug!("Received request: {:?}", request.method);
                server.handle_request(request).await
            }
            Err(e) => {
                tracing::warn!("Unparseable message: {}", e);
                Some(JsonRpcResponse::error(
                    None,
                    PARSE_ERROR,
                    format!("Parse error: {}", e),
                ))
            }
        };

        if let Some(response) = response {
            if let Err(e) = write_message(&mut writer, &response, framing).await {
                tracing::error!("Failed to write response: {}", e);
            }
        }
    }

    Ok(())
}

/// Read one message body from the input stream. Blank lines between
/// messages are skipped.
///
/// Lines are read as raw bytes, so a line that is not valid UTF-8 comes
/// back as a [`Framing::Line`] body and fails JSON parsing instead of
/// ending the session.
pub async fn read_message<R>(reader: &mut R) -> Result<Option<(Framing, Vec<u8>)>, ServerError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();

    let header = loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            return Ok(None); // EOF
        }
        let trimmed = line.trim_ascii();
        if !trimmed.is_empty() {
            break trimmed.to_vec();
        }
    };

    let Some(length) = header.strip_prefix(CONTENT_LENGTH_HEADER.as_bytes()) else {
        return Ok(Some((Framing::Line, header)));
    };

    let length = String::from_utf8_lossy(length);
    let content_length: usize = length
        .trim()
        .parse()
        .map_err(|_| ServerError::ProtocolError(format!("Invalid Content-Length: {}", length)))?;

    if content_length > MAX_MESSAGE_BYTES {
        return Err(ServerError::ProtocolError(format!(
            "Content-Length {} exceeds limit of {} bytes",
            content_length, MAX_MESSAGE_BYTES
        )));
    }

    // Skip any remaining headers up to the blank separator
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 || line.trim_ascii().is_empty() {
            break;
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).await?;

    Ok(Some((Framing::ContentLength, body)))
}

/// Write a JSON-RPC message to the output stream
pub async fn write_message<W>(
    writer: &mut W,
    response: &JsonRpcResponse,
    framing: Framing,
) -> Result<(), ServerError>
where
    W: AsyncWrite + Unpin,
{
    let body = serde_json::to_string(response)?;

    match framing {
        Framing::ContentLength => {
            let header = format!("{} {}\r\n\r\n", CONTENT_LENGTH_HEADER, body.len());
            writer.write_all(header.as_bytes()).await?;
            writer.write_all(body.as_bytes()).await?;
        }
        Framing::Line => {
            writer.write_all(body.as_bytes()).await?;
            writer.write_all(b"\n").await?;
        }
    }
    writer.flush().await?;

    Ok(())
}
