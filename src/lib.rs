// Copyright 2026 notes_rag_engine contributors
// SPDX-License-Identifier: MIT

//! Retrieval-augmented question answering over one uploaded document.
//!
//! The pipeline: document bytes → text extraction → fixed-size chunking
//! → batch embedding → exact nearest-neighbor index; then per query:
//! embed → search → context assembly → prompt → local generation
//! backend. All state is in-memory and scoped to a [`Session`].
//!
//! Inference runs outside this crate: embeddings and answers come from a
//! local Ollama-compatible HTTP backend (or any other implementation of
//! the seams in [`backend`]).

pub mod backend;
pub mod chunker;
pub mod config;
pub mod document_parser;
pub mod error;
pub mod flat_index;
pub mod logger;
pub mod ollama;
pub mod session;

pub use backend::{AnswerGenerator, TextEmbedder, TextExtractor};
pub use config::EngineConfig;
pub use error::RagError;
pub use flat_index::{FlatIndex, SearchHit};
pub use logger::init_logger;
pub use ollama::OllamaClient;
pub use session::{Answer, BuildReport, Session};
