//! PubMed article extraction with rule-based sentence splitting and
//! token-budget chunking of abstracts.

pub mod api;
pub mod chunking;
pub mod config;
pub mod output;
pub mod pipeline;
pub mod pubmed;
pub mod sentence;
pub mod telemetry;
pub mod tokenizer;

pub use chunking::{chunk_sentences, chunk_text, Chunk, ChunkParams};
pub use sentence::{mark_boundaries, split_sentences};
pub use tokenizer::TokenCounter;
