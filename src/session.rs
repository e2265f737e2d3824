// Copyright 2026 notes_rag_engine contributors
// SPDX-License-Identifier: MIT
//
//! Session store and the two pipelines that operate on it.
//!
//! A session owns one document's retrieval state for its lifetime:
//! `process_document` runs extract → chunk → embed → index and swaps the
//! state in atomically; `answer_query` runs embed → search → prompt →
//! generate against whatever complete state is current. Nothing is
//! persisted; dropping the session discards the index.

use std::sync::{Arc, Mutex, RwLock, TryLockError};

use log::{debug, info};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::backend::{AnswerGenerator, TextEmbedder, TextExtractor};
use crate::chunker;
use crate::config::EngineConfig;
use crate::document_parser::DocumentParser;
use crate::error::RagError;
use crate::flat_index::FlatIndex;
use crate::ollama::OllamaClient;

fn fingerprint(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Outcome of a successful document build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    pub chunk_count: usize,
    pub dimension: usize,
    /// True when the document matched the already-indexed content and the
    /// existing index was kept.
    pub duplicate: bool,
}

/// Answer to a query, plus the retrieved chunks the prompt was grounded
/// on, in ascending-distance order.
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<String>,
}

/// Complete retrieval state for one processed document. Chunk `i` always
/// corresponds to index position `i`.
struct IndexedNotes {
    fingerprint: String,
    chunks: Vec<String>,
    index: FlatIndex,
}

/// One user session: a single document in flight, queryable once built.
///
/// State lives behind an `RwLock` and is only ever replaced wholesale, so
/// a query racing a rebuild sees either the previous complete state or
/// the new one. A second build attempted while one is running is rejected
/// with `Busy` by the build gate.
pub struct Session {
    id: Uuid,
    config: EngineConfig,
    extractor: Arc<dyn TextExtractor>,
    embedder: Arc<dyn TextEmbedder>,
    generator: Arc<dyn AnswerGenerator>,
    state: RwLock<Option<IndexedNotes>>,
    build_gate: Mutex<()>,
}

impl Session {
    pub fn new(
        config: EngineConfig,
        extractor: Arc<dyn TextExtractor>,
        embedder: Arc<dyn TextEmbedder>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Result<Self, RagError> {
        config.validate()?;
        let id = Uuid::new_v4();
        info!("[session] {} created", id);
        Ok(Self {
            id,
            config,
            extractor,
            embedder,
            generator,
            state: RwLock::new(None),
            build_gate: Mutex::new(()),
        })
    }

    /// Wire all collaborator seams to the defaults: the bundled document
    /// parsers and a local Ollama-compatible backend.
    pub fn with_ollama(config: EngineConfig) -> Result<Self, RagError> {
        let client = Arc::new(OllamaClient::new(&config)?);
        Self::new(config, Arc::new(DocumentParser), client.clone(), client)
    }

    /// Build the retrieval state for one document.
    ///
    /// Runs extract → chunk → embed → index, then swaps the session state
    /// in a single write. Any failure leaves the previous state (if any)
    /// untouched. Re-processing the identical document short-circuits and
    /// keeps the existing index.
    pub fn process_document(&self, bytes: &[u8]) -> Result<BuildReport, RagError> {
        let _gate = match self.build_gate.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return Err(RagError::Busy),
        };

        info!("[session] {} processing document, {} bytes", self.id, bytes.len());

        let text = self.extractor.extract(bytes)?;
        if text.trim().is_empty() {
            return Err(RagError::EmptyDocument);
        }

        let fingerprint = fingerprint(&text);
        {
            let state = self.state.read().unwrap();
            if let Some(notes) = state.as_ref() {
                if notes.fingerprint == fingerprint {
                    info!("[session] {} duplicate document, keeping existing index", self.id);
                    return Ok(BuildReport {
                        chunk_count: notes.chunks.len(),
                        dimension: notes.index.dimension(),
                        duplicate: true,
                    });
                }
            }
        }

        let chunks = chunker::chunk(&text, self.config.chunk_size)?;
        debug!("[session] {} split into {} chunks", self.id, chunks.len());

        let vectors = self.embedder.embed(&chunks)?;
        if vectors.len() != chunks.len() {
            return Err(RagError::Embedding(format!(
                "expected {} vectors, got {}",
                chunks.len(),
                vectors.len()
            )));
        }
        // The session's vector dimension is whatever the embedder produced
        // for the first chunk.
        let dimension = vectors.first().map(|v| v.len()).unwrap_or(0);
        if dimension == 0 {
            return Err(RagError::Embedding(
                "backend returned zero-dimension vectors".to_string(),
            ));
        }

        let mut index = FlatIndex::new(dimension)?;
        index.add(vectors)?;

        let report = BuildReport {
            chunk_count: chunks.len(),
            dimension,
            duplicate: false,
        };

        let mut state = self.state.write().unwrap();
        *state = Some(IndexedNotes {
            fingerprint,
            chunks,
            index,
        });

        info!(
            "[session] {} index ready: {} chunks, dimension {}",
            self.id, report.chunk_count, report.dimension
        );
        Ok(report)
    }

    /// Answer a question against the indexed document, retrieving the
    /// configured number of chunks as context.
    pub fn answer_query(&self, query: &str) -> Result<Answer, RagError> {
        self.answer_query_with_k(query, self.config.top_k)
    }

    /// Answer a question, retrieving up to `k` chunks as context.
    pub fn answer_query_with_k(&self, query: &str, k: usize) -> Result<Answer, RagError> {
        if !self.is_ready() {
            return Err(RagError::NotReady);
        }
        let query = query.trim();
        if query.is_empty() {
            return Err(RagError::EmptyQuery);
        }
        if k == 0 {
            return Err(RagError::InvalidConfiguration(
                "k must be greater than 0".to_string(),
            ));
        }

        let query_vector = self
            .embedder
            .embed(&[query.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Embedding("backend returned no vector for the query".to_string()))?;

        let sources: Vec<String> = {
            let state = self.state.read().unwrap();
            let notes = state.as_ref().ok_or(RagError::NotReady)?;
            let hits = notes.index.search(&query_vector, k)?;
            hits.iter().map(|hit| notes.chunks[hit.position].clone()).collect()
        };

        let context = sources.join("\n\n");
        let prompt = build_prompt(&context, query);
        debug!(
            "[session] {} prompt assembled from {} chunks, querying generator",
            self.id,
            sources.len()
        );

        let answer = self.generator.generate(&prompt)?;
        Ok(Answer {
            text: answer.trim().to_string(),
            sources,
        })
    }

    pub fn is_ready(&self) -> bool {
        self.state.read().unwrap().is_some()
    }

    /// Number of indexed chunks; 0 when no document has been processed.
    pub fn chunk_count(&self) -> usize {
        self.state
            .read()
            .unwrap()
            .as_ref()
            .map(|notes| notes.chunks.len())
            .unwrap_or(0)
    }

    /// Drop the indexed state, returning the session to not-ready.
    pub fn clear(&self) {
        *self.state.write().unwrap() = None;
        info!("[session] {} cleared", self.id);
    }
}

fn build_prompt(context: &str, query: &str) -> String {
    format!(
        "Use the following notes to answer:\n\n{}\n\nQuestion: {}\nAnswer:",
        context, query
    )
}
