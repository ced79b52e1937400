use crate::llm::TokenStream;
use anyhow::{anyhow, Result};
use bytes_buffer::LineBuffer;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use serde::Deserialize;

/// Convert an Ollama newline-delimited JSON chat response into a `TokenStream`.
pub(crate) fn ollama_ndjson_to_stream(response: reqwest::Response) -> TokenStream {
    let bytes = Box::pin(response.bytes_stream());
    let stream = futures::stream::unfold(
        (bytes, LineBuffer::default(), false),
        |(mut bytes, mut buffer, finished)| async move {
            if finished {
                return None;
            }
            loop {
                if let Some(line) = buffer.next_line() {
                    match parse_ollama_line(&line) {
                        Some(Err(e)) => return Some((Err(e), (bytes, buffer, true))),
                        Some(token) => return Some((token, (bytes, buffer, false))),
                        None => continue,
                    }
                }

                match bytes.next().await {
                    Some(Ok(chunk)) => buffer.extend(&chunk),
                    Some(Err(e)) => {
                        let err = anyhow!(e).context("Ollama stream interrupted");
                        return Some((Err(err), (bytes, buffer, true)));
                    }
                    None => {
                        let line = buffer.take_rest()?;
                        let token = parse_ollama_line(&line)?;
                        return Some((token, (bytes, buffer, true)));
                    }
                }
            }
        },
    );
    Box::pin(stream)
}

#[derive(Deserialize)]
struct OllamaChatChunk {
    #[serde(default)]
    message: Option<OllamaChunkMessage>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct OllamaChunkMessage {
    #[serde(default)]
    content: String,
}

fn parse_ollama_line(line: &str) -> Option<Result<String>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match serde_json::from_str::<OllamaChatChunk>(line) {
        Ok(chunk) => {
            if let Some(error) = chunk.error {
                return Some(Err(anyhow!("Ollama stream error: {}", error)));
            }
            chunk
                .message
                .map(|m| m.content)
                .filter(|content| !content.is_empty())
                .map(Ok)
        }
        Err(e) => Some(Err(anyhow!("Failed to parse Ollama stream line: {}", e))),
    }
}

/// Convert an OpenAI-compatible server-sent-events response into a `TokenStream`.
pub(crate) fn openai_sse_to_stream(response: reqwest::Response) -> TokenStream {
    let event_stream = response.bytes_stream().eventsource();
    let mapped = tokio_stream::StreamExt::filter_map(event_stream, |event| match event {
        Ok(event) => parse_openai_sse_event(&event.data),
        Err(e) => Some(Err(anyhow!("Failed to read event stream: {}", e))),
    });
    Box::pin(mapped)
}

#[derive(Deserialize)]
struct OpenAiStreamChunk {
    choices: Vec<OpenAiStreamChoice>,
}

#[derive(Deserialize)]
struct OpenAiStreamChoice {
    delta: OpenAiStreamDelta,
}

#[derive(Deserialize)]
struct OpenAiStreamDelta {
    #[serde(default)]
    content: Option<String>,
}

fn parse_openai_sse_event(data: &str) -> Option<Result<String>> {
    if data == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<OpenAiStreamChunk>(data) {
        Ok(chunk) => chunk
            .choices
            .first()
            .and_then(|c| c.delta.content.clone())
            .filter(|content| !content.is_empty())
            .map(Ok),
        Err(e) => Some(Err(anyhow!("Failed to parse SSE data: {}", e))),
    }
}

mod bytes_buffer {
    /// Accumulates raw bytes and hands out complete lines
    #[derive(Default)]
    pub(super) struct LineBuffer {
        buf: Vec<u8>,
    }

    impl LineBuffer {
        pub(super) fn extend(&mut self, bytes: &[u8]) {
            self.buf.extend_from_slice(bytes);
        }

        /// Next newline-terminated line, without the terminator
        pub(super) fn next_line(&mut self) -> Option<String> {
            let pos = self.buf.iter().position(|b| *b == b'\n')?;
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            Some(String::from_utf8_lossy(&line[..pos]).into_owned())
        }

        /// Whatever is left once the input has ended
        pub(super) fn take_rest(&mut self) -> Option<String> {
            if self.buf.is_empty() {
                return None;
            }
            let rest = std::mem::take(&mut self.buf);
            Some(String::from_utf8_lossy(&rest).into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::bytes_buffer::LineBuffer;
    use super::*;

    #[test]
    fn test_line_buffer_splits_across_chunks() {
        let mut buffer = LineBuffer::default();
        buffer.extend(b"{\"a\":");
        assert!(buffer.next_line().is_none());
        buffer.extend(b"1}\n{\"b\":2}\n{\"c\"");
        assert_eq!(buffer.next_line().unwrap(), "{\"a\":1}");
        assert_eq!(buffer.next_line().unwrap(), "{\"b\":2}");
        assert!(buffer.next_line().is_none());
        assert_eq!(buffer.take_rest().unwrap(), "{\"c\"");
        assert!(buffer.take_rest().is_none());
    }

    #[test]
    fn test_parse_ollama_content_line() {
        let line = r#"{"model":"llama3.3","message":{"role":"assistant","content":"Ahoy"},"done":false}"#;
        assert_eq!(parse_ollama_line(line).unwrap().unwrap(), "Ahoy");
    }

    #[test]
    fn test_parse_ollama_done_line_is_skipped() {
        let line = r#"{"model":"llama3.3","message":{"role":"assistant","content":""},"done":true}"#;
        assert!(parse_ollama_line(line).is_none());
        assert!(parse_ollama_line("   ").is_none());
    }

    #[test]
    fn test_parse_ollama_error_line() {
        let err = parse_ollama_line(r#"{"error":"model not found"}"#).unwrap().unwrap_err();
        assert!(err.to_string().contains("model not found"));
    }

    #[test]
    fn test_parse_openai_delta() {
        let data = r#"{"choices":[{"index":0,"delta":{"content":" matey!"}}]}"#;
        assert_eq!(parse_openai_sse_event(data).unwrap().unwrap(), " matey!");
    }

    #[test]
    fn test_parse_openai_done_and_role_only() {
        assert!(parse_openai_sse_event("[DONE]").is_none());
        let data = r#"{"choices":[{"index":0,"delta":{"role":"assistant"}}]}"#;
        assert!(parse_openai_sse_event(data).is_none());
    }

    #[test]
    fn test_parse_openai_invalid_json() {
        assert!(parse_openai_sse_event("{oops").unwrap().is_err());
    }
}
