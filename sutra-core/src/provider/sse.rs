//! Decoding of server-sent-event chat completion streams.
//!
//! OpenAI-compatible services stream one JSON chunk per `data:` line and end
//! with `data: [DONE]`. Network chunks do not respect line boundaries, so
//! bytes are buffered until a full line is available.

use super::types::{ProviderError, Result, TextStream};
use async_stream::try_stream;
use futures::{Stream, StreamExt};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    error: Option<StreamError>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    message: String,
}

#[derive(Debug, PartialEq)]
enum Event {
    Content(String),
    Done,
    Skip,
}

fn parse_line(raw: &[u8]) -> Result<Event> {
    let line = String::from_utf8_lossy(raw);
    let line = line.trim_end_matches(['\n', '\r']);

    // Blank separators, comments (": keep-alive") and other fields
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(Event::Skip);
    };
    let data = data.trim_start();
    if data == "[DONE]" {
        return Ok(Event::Done);
    }

    let chunk: StreamChunk = serde_json::from_str(data)?;
    if let Some(error) = chunk.error {
        return Err(ProviderError::Api {
            status: None,
            message: error.message,
        });
    }

    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty())
        .map_or(Event::Skip, Event::Content))
}

/// Turns a raw byte stream into a stream of text fragments.
///
/// Empty deltas (role announcements, finish markers) produce nothing. The
/// stream ends at `[DONE]` or when the bytes run out.
pub fn decode<S, B, E>(bytes: S) -> TextStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<ProviderError> + Send + 'static,
{
    Box::pin(try_stream! {
        let mut bytes = Box::pin(bytes);
        let mut buffer: Vec<u8> = Vec::new();
        let mut done = false;

        while !done {
            let chunk = match bytes.next().await {
                Some(chunk) => chunk.map_err(Into::<ProviderError>::into)?,
                None => break,
            };
            buffer.extend_from_slice(chunk.as_ref());

            while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=newline).collect();
                match parse_line(&line)? {
                    Event::Content(text) => yield text,
                    Event::Done => {
                        done = true;
                        break;
                    }
                    Event::Skip => {}
                }
            }
        }

        // A final line may arrive without its trailing newline.
        if !done && !buffer.is_empty() {
            if let Event::Content(text) = parse_line(&buffer)? {
                yield text;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn chunk(content: &str) -> String {
        format!(
            "data: {}\n\n",
            serde_json::json!({"choices": [{"index": 0, "delta": {"content": content}}]})
        )
    }

    async fn collect(parts: Vec<Vec<u8>>) -> Vec<Result<String>> {
        let bytes = stream::iter(parts.into_iter().map(Ok::<_, ProviderError>));
        decode(bytes).collect().await
    }

    #[test]
    fn test_parse_line_variants() {
        assert_eq!(parse_line(b"\n").unwrap(), Event::Skip);
        assert_eq!(parse_line(b": keep-alive\n").unwrap(), Event::Skip);
        assert_eq!(parse_line(b"data: [DONE]\r\n").unwrap(), Event::Done);
        assert_eq!(
            parse_line(chunk("Om").trim_end().as_bytes()).unwrap(),
            Event::Content("Om".to_string())
        );
        assert_eq!(
            parse_line(br#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#).unwrap(),
            Event::Skip
        );
    }

    #[test]
    fn test_parse_line_malformed_json() {
        assert!(matches!(
            parse_line(b"data: {not json"),
            Err(ProviderError::Json(_))
        ));
    }

    #[test]
    fn test_parse_line_error_payload() {
        let err = parse_line(br#"data: {"error":{"message":"rate limited"}}"#).unwrap_err();
        assert!(matches!(err, ProviderError::Api { message, .. } if message == "rate limited"));
    }

    #[tokio::test]
    async fn test_decode_stops_at_done() {
        let body = format!("{}{}data: [DONE]\n\n{}", chunk("Do "), chunk("your duty"), chunk("ignored"));
        let fragments: Vec<String> = collect(vec![body.into_bytes()])
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(fragments, vec!["Do ", "your duty"]);
    }

    #[tokio::test]
    async fn test_decode_reassembles_split_lines() {
        let body = format!("{}{}", chunk("Karma"), chunk(" yoga"));
        let bytes = body.into_bytes();
        let parts: Vec<Vec<u8>> = bytes.chunks(7).map(<[u8]>::to_vec).collect();

        let fragments: Vec<String> = collect(parts)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(fragments, vec!["Karma", " yoga"]);
    }

    #[tokio::test]
    async fn test_decode_splits_multibyte_characters() {
        let body = chunk("Kṛṣṇa");
        let bytes = body.into_bytes();
        let parts: Vec<Vec<u8>> = bytes.chunks(1).map(<[u8]>::to_vec).collect();

        let fragments: Vec<Result<String>> = collect(parts).await;
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].as_ref().unwrap(), "Kṛṣṇa");
    }

    #[tokio::test]
    async fn test_decode_trailing_line_without_newline() {
        let body = chunk("last");
        let fragments = collect(vec![body.trim_end().as_bytes().to_vec()]).await;
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].as_ref().unwrap(), "last");
    }

    #[tokio::test]
    async fn test_decode_ends_with_error() {
        let body = format!("{}data: {{broken\n\n{}", chunk("partial"), chunk("never"));
        let items = collect(vec![body.into_bytes()]).await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "partial");
        assert!(matches!(items[1], Err(ProviderError::Json(_))));
    }

    #[tokio::test]
    async fn test_decode_transport_error() {
        let parts = vec![
            Ok(chunk("a").into_bytes()),
            Err(ProviderError::Other("connection reset".to_string())),
        ];
        let items: Vec<Result<String>> = decode(stream::iter(parts)).collect().await;

        assert_eq!(items.len(), 2);
        assert!(matches!(items[1], Err(ProviderError::Other(_))));
    }
}
