//! Stdio message framing.
//!
//! Input may be newline-delimited JSON or `Content-Length` framed; the framing
//! of each request is remembered so its response goes back the same way.

use std::io;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    Lines,
    ContentLength,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Message(Value),
    /// The frame was delimited correctly but its payload is not JSON.
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub framing: Framing,
    pub payload: Inbound,
}

/// Largest `Content-Length` body accepted. Bigger frames are skipped unread.
pub const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// Reads the next frame. `Ok(None)` on a clean end of input.
///
/// Garbage on the wire becomes [`Inbound::Malformed`] and reading goes on;
/// only I/O failures and a stream cut off inside a frame are errors.
pub async fn read_message<R>(reader: &mut R) -> io::Result<Option<Frame>>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let mut raw = Vec::new();
        if reader.read_until(b'\n', &mut raw).await? == 0 {
            return Ok(None);
        }
        let Ok(line) = std::str::from_utf8(&raw) else {
            return Ok(Some(Frame {
                framing: Framing::Lines,
                payload: Inbound::Malformed("line is not valid UTF-8".to_string()),
            }));
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !opens_header_block(trimmed) {
            return Ok(Some(Frame {
                framing: Framing::Lines,
                payload: parse_payload(trimmed.as_bytes()),
            }));
        }
        let payload = match read_headers(reader, trimmed).await? {
            None => Inbound::Malformed("missing or invalid Content-Length header".to_string()),
            Some(length) if length > MAX_FRAME_BYTES => {
                skip_body(reader, length).await?;
                Inbound::Malformed(format!(
                    "frame of {length} bytes exceeds the {MAX_FRAME_BYTES} byte limit"
                ))
            }
            Some(length) => {
                let mut body = vec![0_u8; length];
                reader.read_exact(&mut body).await?;
                parse_payload(&body)
            }
        };
        return Ok(Some(Frame {
            framing: Framing::ContentLength,
            payload,
        }));
    }
}

/// A header block starts with a usable `Content-Length` or a `Content-Type`
/// line. Any other `name: value` line is just a malformed message.
fn opens_header_block(line: &str) -> bool {
    match line.split_once(':') {
        Some((name, _)) if name.trim().eq_ignore_ascii_case("content-type") => true,
        _ => content_length(line).is_some(),
    }
}

/// Consumes a header block whose first line is `first`, up to and including
/// the blank separator line. Returns the declared body length, if any.
async fn read_headers<R>(reader: &mut R, first: &str) -> io::Result<Option<usize>>
where
    R: AsyncBufRead + Unpin,
{
    let mut length = content_length(first);
    loop {
        let mut raw = Vec::new();
        if reader.read_until(b'\n', &mut raw).await? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Unexpected EOF while reading MCP headers",
            ));
        }
        let line = String::from_utf8_lossy(&raw);
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return Ok(length);
        }
        if let Some(parsed) = content_length(line) {
            length = Some(parsed);
        }
    }
}

async fn skip_body<R>(reader: &mut R, length: usize) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let expected = length as u64;
    let skipped = tokio::io::copy(&mut (&mut *reader).take(expected), &mut tokio::io::sink()).await?;
    if skipped < expected {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "Unexpected EOF inside an oversized MCP frame",
        ));
    }
    Ok(())
}

fn content_length(line: &str) -> Option<usize> {
    let (name, value) = line.split_once(':')?;
    if !name.trim().eq_ignore_ascii_case("content-length") {
        return None;
    }
    value.trim().parse().ok()
}

fn parse_payload(bytes: &[u8]) -> Inbound {
    match serde_json::from_slice(bytes) {
        Ok(value) => Inbound::Message(value),
        Err(e) => Inbound::Malformed(e.to_string()),
    }
}

pub async fn write_message<W>(writer: &mut W, framing: Framing, value: &Value) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let body = serde_json::to_vec(value).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Failed to serialize JSON: {e}"),
        )
    })?;
    match framing {
        Framing::Lines => {
            writer.write_all(&body).await?;
            writer.write_all(b"\n").await?;
        }
        Framing::ContentLength => {
            let header = format!(
                "Content-Length: {}\r\nContent-Type: application/json\r\n\r\n",
                body.len()
            );
            writer.write_all(header.as_bytes()).await?;
            writer.write_all(&body).await?;
        }
    }
    writer.flush().await
}
