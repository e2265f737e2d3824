// Copyright 2026 notes_rag_engine contributors
// SPDX-License-Identifier: MIT
//
//! Blocking HTTP client for a local Ollama-compatible inference backend.
//!
//! Implements both collaborator seams: `/api/embed` for batch
//! embeddings, `/api/generate` (non-streaming) for answers. Every
//! request is time-boxed by the configured timeout; the backend can
//! otherwise block for the full model inference time.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::backend::{AnswerGenerator, TextEmbedder};
use crate::config::EngineConfig;
use crate::error::RagError;

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Render a non-success reply, picking up the backend's `error` detail
/// when the body carries one.
fn status_detail(response: reqwest::blocking::Response) -> String {
    let status = response.status();
    match response
        .text()
        .ok()
        .and_then(|body| serde_json::from_str::<ErrorResponse>(&body).ok())
    {
        Some(detail) => format!("backend returned {}: {}", status, detail.error),
        None => format!("backend returned {}", status),
    }
}

pub struct OllamaClient {
    http: reqwest::blocking::Client,
    base_url: String,
    generation_model: String,
    embedding_model: String,
}

impl OllamaClient {
    pub fn new(config: &EngineConfig) -> Result<Self, RagError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| RagError::InvalidConfiguration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            generation_model: config.generation_model.clone(),
            embedding_model: config.embedding_model.clone(),
        })
    }
}

impl TextEmbedder for OllamaClient {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("[ollama] embedding {} texts with {}", texts.len(), self.embedding_model);

        let response = self
            .http
            .post(format!("{}/api/embed", self.base_url))
            .json(&EmbedRequest {
                model: &self.embedding_model,
                input: texts,
            })
            .send()
            .map_err(|e| RagError::Embedding(format!("backend unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(RagError::Embedding(status_detail(response)));
        }

        let body: EmbedResponse = response
            .json()
            .map_err(|e| RagError::Embedding(format!("malformed response: {}", e)))?;

        if body.embeddings.len() != texts.len() {
            return Err(RagError::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                body.embeddings.len()
            )));
        }

        Ok(body.embeddings)
    }
}

impl AnswerGenerator for OllamaClient {
    fn generate(&self, prompt: &str) -> Result<String, RagError> {
        debug!("[ollama] generating with {}, prompt {} chars", self.generation_model, prompt.len());

        let response = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(&GenerateRequest {
                model: &self.generation_model,
                prompt,
                stream: false,
            })
            .send()
            .map_err(|e| RagError::GeneratorUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RagError::Generator(status_detail(response)));
        }

        let body: GenerateResponse = response
            .json()
            .map_err(|e| RagError::Generator(format!("malformed response: {}", e)))?;

        Ok(body.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    fn test_config(base_url: String) -> EngineConfig {
        EngineConfig {
            base_url,
            request_timeout_secs: 5,
            ..EngineConfig::default()
        }
    }

    /// Serve exactly one request with the given status line and JSON body.
    fn spawn_stub(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = stream.read(&mut buf).unwrap_or(0);
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
                if let Some(header_end) = received
                    .windows(4)
                    .position(|w| w == b"\r\n\r\n")
                {
                    let headers = String::from_utf8_lossy(&received[..header_end]).to_string();
                    let content_length = headers
                        .lines()
                        .find_map(|line| {
                            let lower = line.to_ascii_lowercase();
                            let value = lower.strip_prefix("content-length:")?;
                            value.trim().parse::<usize>().ok()
                        })
                        .unwrap_or(0);
                    if received.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let reply = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(reply.as_bytes());
        });

        format!("http://{}", addr)
    }

    /// An address nothing is listening on.
    fn dead_address() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    #[test]
    fn test_generate_returns_response_field() {
        let url = spawn_stub("200 OK", r#"{"response": " Paris is the capital. ", "done": true}"#);
        let client = OllamaClient::new(&test_config(url)).unwrap();

        let answer = client.generate("Question: capital of France?").unwrap();
        assert_eq!(answer, " Paris is the capital. ");
    }

    #[test]
    fn test_generate_unreachable_backend() {
        let client = OllamaClient::new(&test_config(dead_address())).unwrap();

        let err = client.generate("anything").unwrap_err();
        assert!(matches!(err, RagError::GeneratorUnavailable(_)));
        // Remediation guidance is part of the user-visible message
        assert!(err.to_string().contains("ollama serve"));
    }

    #[test]
    fn test_generate_non_success_status() {
        let url = spawn_stub("500 Internal Server Error", r#"{"error": "model not loaded"}"#);
        let client = OllamaClient::new(&test_config(url)).unwrap();

        let err = client.generate("anything").unwrap_err();
        assert!(matches!(err, RagError::Generator(_)));
        // The backend's own error detail is surfaced to the user
        assert!(err.to_string().contains("model not loaded"));
    }

    #[test]
    fn test_generate_malformed_body() {
        let url = spawn_stub("200 OK", r#"{"done": true}"#);
        let client = OllamaClient::new(&test_config(url)).unwrap();

        assert!(matches!(
            client.generate("anything").unwrap_err(),
            RagError::Generator(_)
        ));
    }

    #[test]
    fn test_embed_returns_one_vector_per_input() {
        let url = spawn_stub("200 OK", r#"{"embeddings": [[1.0, 0.0], [0.0, 1.0]]}"#);
        let client = OllamaClient::new(&test_config(url)).unwrap();

        let vectors = client
            .embed(&["first".to_string(), "second".to_string()])
            .unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_embed_count_mismatch_rejected() {
        let url = spawn_stub("200 OK", r#"{"embeddings": [[1.0, 0.0]]}"#);
        let client = OllamaClient::new(&test_config(url)).unwrap();

        let err = client
            .embed(&["first".to_string(), "second".to_string()])
            .unwrap_err();
        assert!(matches!(err, RagError::Embedding(_)));
    }

    #[test]
    fn test_embed_unreachable_backend() {
        let client = OllamaClient::new(&test_config(dead_address())).unwrap();

        assert!(matches!(
            client.embed(&["text".to_string()]).unwrap_err(),
            RagError::Embedding(_)
        ));
    }

    #[test]
    fn test_embed_empty_batch_skips_request() {
        // No stub running; an empty batch must not touch the network.
        let client = OllamaClient::new(&test_config(dead_address())).unwrap();
        assert!(client.embed(&[]).unwrap().is_empty());
    }
}
