//! Server-Sent Events (SSE) processing for streaming responses.
//!
//! `streamGenerateContent?alt=sse` answers with one `data:` line per event,
//! each holding a JSON [`GenerateContentResponse`] chunk. This module turns the
//! raw byte stream of the HTTP response into a stream of parsed chunks.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;

use crate::client::error_for_status;
use crate::observability::{STREAM_BYTES, STREAM_CHUNKS, STREAM_ERRORS};
use crate::{Error, GenerateContentResponse, Result};

/// Process a stream of bytes into a stream of response chunks.
///
/// Events may be split across network reads, and a multi-byte character may
/// straddle two reads; bytes are buffered until a full event is available.
/// The stream ends after the first transport error.
pub fn process_sse<S>(byte_stream: S) -> impl Stream<Item = Result<GenerateContentResponse>>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + Send + 'static,
{
    let stream = byte_stream.map(|result| {
        result
            .map_err(|e| Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e))))
    });

    let buffer: Vec<u8> = Vec::new();

    stream::unfold(
        (stream, buffer, 0, false),
        move |(mut stream, mut buffer, mut scanned, done)| async move {
            if done {
                return None;
            }
            loop {
                // First check if we have a complete event in the buffer
                if let Some(raw) = take_event(&mut buffer, &mut scanned) {
                    if let Some(event) = parse_event(&raw) {
                        return Some((event, (stream, buffer, scanned, false)));
                    }
                    continue;
                }

                match stream.next().await {
                    Some(Ok(bytes)) => {
                        STREAM_BYTES.count(bytes.len() as u64);
                        buffer.extend_from_slice(&bytes);
                    }
                    Some(Err(e)) => {
                        STREAM_ERRORS.click();
                        return Some((Err(e), (stream, buffer, scanned, true)));
                    }
                    None => {
                        // A final event without its trailing blank line.
                        let rest = std::mem::take(&mut buffer);
                        return parse_event(&rest)
                            .map(|event| (event, (stream, buffer, scanned, true)));
                    }
                }
            }
        },
    )
}

/// Removes the first complete event from `buffer`, without its separator.
///
/// `scanned` counts the leading bytes already searched without finding a
/// separator, so each byte is only searched again if a separator could
/// start there.
fn take_event(buffer: &mut Vec<u8>, scanned: &mut usize) -> Option<Vec<u8>> {
    let Some((len, separator)) = find_event_end(buffer, *scanned) else {
        *scanned = buffer.len();
        return None;
    };
    let mut event: Vec<u8> = buffer.drain(..len + separator).collect();
    event.truncate(len);
    *scanned = 0;
    Some(event)
}

/// Finds the earliest blank-line separator, returning the event length and
/// the separator length. Bytes before `from` are known to hold no complete
/// separator; the last three of them may still begin one.
fn find_event_end(buffer: &[u8], from: usize) -> Option<(usize, usize)> {
    for i in from.saturating_sub(3)..buffer.len() {
        if buffer[i..].starts_with(b"\n\n") {
            return Some((i, 2));
        }
        if buffer[i..].starts_with(b"\r\n\r\n") {
            return Some((i, 4));
        }
    }
    None
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StreamPayload {
    Error { error: ErrorDetail },
    Chunk(GenerateContentResponse),
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Parses one raw event. Returns `None` for events that carry no data
/// (comments, keep-alives, `[DONE]` markers).
fn parse_event(raw: &[u8]) -> Option<Result<GenerateContentResponse>> {
    let text = match std::str::from_utf8(raw) {
        Ok(text) => text,
        Err(e) => {
            STREAM_ERRORS.click();
            return Some(Err(Error::encoding(
                format!("Invalid UTF-8 in stream: {e}"),
                Some(Box::new(e)),
            )));
        }
    };

    let data: Vec<&str> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| data.strip_prefix(' ').unwrap_or(data))
        .collect();
    if data.is_empty() {
        return None;
    }
    let data = data.join("\n");
    if data.trim() == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<StreamPayload>(&data) {
        Ok(StreamPayload::Chunk(chunk)) => {
            STREAM_CHUNKS.click();
            Some(Ok(chunk))
        }
        Ok(StreamPayload::Error { error }) => {
            STREAM_ERRORS.click();
            Some(Err(error_for_status(
                error.code.unwrap_or(500),
                error.status,
                error.message.unwrap_or_else(|| data.clone()),
                None,
            )))
        }
        Err(e) => {
            STREAM_ERRORS.click();
            Some(Err(Error::serialization(
                format!("Failed to parse event JSON: {e}"),
                Some(Box::new(e)),
            )))
        }
    }
}
