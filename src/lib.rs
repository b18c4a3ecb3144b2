//! # docchat
//!
//! Question answering over your own documents from the command line.
//!
//! docchat extracts text from PDF (and plain-text) files, splits it into
//! overlapping chunks, embeds each chunk via the Google Generative Language
//! API, and persists the resulting vector index to disk. Questions are
//! answered by retrieving the most similar chunks and prompting a
//! generative model with them as context.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌─────────────┐   ┌───────────────┐
//! │ Documents │──▶│ Extract +   │──▶│  Vector index  │
//! │ PDF/txt/md│   │ Chunk+Embed │   │  (JSON file)   │
//! └───────────┘   └─────────────┘   └──────┬────────┘
//!                                          │
//!                     question ──▶ retrieve top-K ──▶ prompt ──▶ answer
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export GOOGLE_API_KEY=...
//! docchat build ./papers/        # extract, chunk, embed, index
//! docchat ask "What is the main finding?"
//! docchat chat                   # interactive session with answer cache
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Pipeline error kinds |
//! | [`extract`] | Document text extraction |
//! | [`chunk`] | Overlapping text chunking |
//! | [`embedding`] | Embedding service client |
//! | [`index`] | Vector index build, persistence, and search |
//! | [`generate`] | Generative-model service client |
//! | [`answer`] | Prompt construction and answering |
//! | [`session`] | Chat session with per-question cache |
//! | [`ingest`] | The `build` command |
//! | [`ask`] | The `ask` and `chat` commands |

pub mod answer;
pub mod ask;
pub mod chunk;
pub mod config;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod generate;
pub mod index;
pub mod ingest;
pub mod session;
